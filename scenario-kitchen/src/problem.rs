/*
 *  SPDX-License-Identifier: Apache-2.0 OR MIT
 *  © 2020-2022 ETH Zurich and other contributors, see AUTHORS.txt for details
 */

use std::collections::BTreeMap;

use foon_mcts_core::{
    FoonGraph, FunctionalUnit, FunctionalUnitId, Kitchen, KitchenItem, MotionTable, ObjectId,
    ObjectNode, PlannerError, ProducerIndex,
};
use serde::{Deserialize, Serialize};

/// A functional unit as written in problem files, referring to its inputs by id.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FunctionalUnitEntry {
    pub id: FunctionalUnitId,
    #[serde(default)]
    pub inputs: Vec<ObjectId>,
    pub motion: String,
}

/// The functional units able to produce an object, in preference order.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProducerEntry {
    pub object: ObjectId,
    pub functional_units: Vec<FunctionalUnitId>,
}

/// A complete planning problem: the task graph, the kitchen and the goal unit.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KitchenProblem {
    pub objects: Vec<ObjectNode>,
    pub functional_units: Vec<FunctionalUnitEntry>,
    #[serde(default)]
    pub producers: Vec<ProducerEntry>,
    pub motions: BTreeMap<String, f64>,
    #[serde(default)]
    pub kitchen: Vec<KitchenItem>,
    #[serde(default)]
    pub utensils: Vec<String>,
    pub goal: FunctionalUnitId,
}

impl KitchenProblem {
    /// Resolves the input references and builds the graph and kitchen snapshot.
    pub fn build(&self) -> Result<(FoonGraph, Kitchen), PlannerError> {
        let objects = self
            .objects
            .iter()
            .map(|object| (object.id, object))
            .collect::<BTreeMap<_, _>>();
        let functional_units = self
            .functional_units
            .iter()
            .map(|entry| {
                let inputs = entry
                    .inputs
                    .iter()
                    .map(|id| {
                        objects.get(id).map(|&object| object.clone()).ok_or_else(|| {
                            PlannerError::UnknownObject {
                                functional_unit: entry.id,
                                object: *id,
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(FunctionalUnit::new(entry.id, inputs, entry.motion.clone()))
            })
            .collect::<Result<Vec<_>, PlannerError>>()?;
        let producers = self
            .producers
            .iter()
            .map(|entry| (entry.object, entry.functional_units.clone()))
            .collect::<ProducerIndex>();
        let motions = MotionTable::new(
            self.motions
                .iter()
                .map(|(motion, rate)| (motion.as_str(), *rate)),
        )?;

        let graph = FoonGraph::new(self.objects.clone(), functional_units, producers, motions)?;
        if !graph.contains(self.goal) {
            return Err(PlannerError::UnknownFunctionalUnit(self.goal));
        }
        let kitchen = Kitchen::new(self.kitchen.clone(), self.utensils.iter().cloned());
        Ok((graph, kitchen))
    }
}
