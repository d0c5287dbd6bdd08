/*
 *  SPDX-License-Identifier: Apache-2.0 OR MIT
 *  © 2020-2022 ETH Zurich and other contributors, see AUTHORS.txt for details
 */

use std::collections::BTreeMap;

use ordered_float::NotNan;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{FunctionalUnitId, ObjectId, PlannerError};

/// The probability of a motion to succeed, in [0, 1].
pub type SuccessRate = NotNan<f64>;

/// An object required as input by a functional unit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ObjectNode {
    pub id: ObjectId,
    pub label: String,
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub container: Option<String>,
}

impl ObjectNode {
    /// Creates a bare object with no states, ingredients or container.
    pub fn new(id: ObjectId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            states: Vec::new(),
            ingredients: Vec::new(),
            container: None,
        }
    }

    /// Sets the states, builder style.
    pub fn with_states<S: Into<String>>(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.states = states.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the ingredients, builder style.
    pub fn with_ingredients<S: Into<String>>(
        mut self,
        ingredients: impl IntoIterator<Item = S>,
    ) -> Self {
        self.ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the container, builder style.
    pub fn in_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }
}

/// An action node of the task graph: required input objects and the motion performing it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FunctionalUnit {
    pub id: FunctionalUnitId,
    #[serde(default)]
    pub inputs: Vec<ObjectNode>,
    pub motion: String,
}

impl FunctionalUnit {
    pub fn new(id: FunctionalUnitId, inputs: Vec<ObjectNode>, motion: impl Into<String>) -> Self {
        Self {
            id,
            inputs,
            motion: motion.into(),
        }
    }
}

/// The result of looking up the producers of an object.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProducerLookup<'a> {
    /// At least one functional unit produces the object.
    Candidates(&'a [FunctionalUnitId]),
    /// The index has no or an empty entry for the object.
    NoProducer,
}

impl<'a> ProducerLookup<'a> {
    /// Returns the candidates, empty if there is no producer.
    pub fn candidates(self) -> &'a [FunctionalUnitId] {
        match self {
            ProducerLookup::Candidates(candidates) => candidates,
            ProducerLookup::NoProducer => &[],
        }
    }
}

/// Maps objects to the functional units able to produce them.
#[derive(Clone, Debug, Default)]
pub struct ProducerIndex {
    producers: FxHashMap<ObjectId, Vec<FunctionalUnitId>>,
}

impl ProducerIndex {
    /// Adds a producer for an object, after the already known ones.
    pub fn insert(&mut self, object: ObjectId, producer: FunctionalUnitId) {
        self.producers.entry(object).or_default().push(producer);
    }

    /// Looks up the producers of an object.
    pub fn lookup(&self, object: ObjectId) -> ProducerLookup<'_> {
        match self.producers.get(&object) {
            Some(candidates) if !candidates.is_empty() => ProducerLookup::Candidates(candidates),
            _ => ProducerLookup::NoProducer,
        }
    }

    /// Iterates over all referenced producers.
    pub fn producers(&self) -> impl Iterator<Item = FunctionalUnitId> + '_ {
        self.producers.values().flatten().copied()
    }

    /// Returns the number of objects with an entry.
    pub fn len(&self) -> usize {
        self.producers.len()
    }

    /// Returns whether the index has no entry.
    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }
}

impl FromIterator<(ObjectId, Vec<FunctionalUnitId>)> for ProducerIndex {
    fn from_iter<T: IntoIterator<Item = (ObjectId, Vec<FunctionalUnitId>)>>(iter: T) -> Self {
        let mut index = ProducerIndex::default();
        for (object, producers) in iter {
            index.producers.entry(object).or_default().extend(producers);
        }
        index
    }
}

/// Maps motions to their success rate.
#[derive(Clone, Debug, Default)]
pub struct MotionTable {
    rates: FxHashMap<String, SuccessRate>,
}

impl MotionTable {
    /// Builds the table, failing if a rate is not in [0, 1].
    pub fn new<S: Into<String>>(
        rates: impl IntoIterator<Item = (S, f64)>,
    ) -> Result<Self, PlannerError> {
        let rates = rates
            .into_iter()
            .map(|(motion, rate)| {
                let motion = motion.into();
                match NotNan::new(rate) {
                    Ok(rate) if (0.0..=1.0).contains(&*rate) => Ok((motion, rate)),
                    _ => Err(PlannerError::InvalidSuccessRate { motion, rate }),
                }
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { rates })
    }

    /// Returns the success rate of a motion, None if unknown.
    pub fn get(&self, motion: &str) -> Option<SuccessRate> {
        self.rates.get(motion).copied()
    }

    /// Returns whether the motion is known.
    pub fn contains(&self, motion: &str) -> bool {
        self.rates.contains_key(motion)
    }
}

/// The task graph the planner searches: objects, functional units, producers and motion rates.
///
/// All cross references are checked by [FoonGraph::new].
#[derive(Clone, Debug)]
pub struct FoonGraph {
    objects: BTreeMap<ObjectId, ObjectNode>,
    functional_units: BTreeMap<FunctionalUnitId, FunctionalUnit>,
    producers: ProducerIndex,
    motions: MotionTable,
}

impl FoonGraph {
    /// Builds the graph and checks that it is self-consistent.
    pub fn new(
        objects: Vec<ObjectNode>,
        functional_units: Vec<FunctionalUnit>,
        producers: ProducerIndex,
        motions: MotionTable,
    ) -> Result<Self, PlannerError> {
        let mut object_table = BTreeMap::new();
        for object in objects {
            let id = object.id;
            if object_table.insert(id, object).is_some() {
                return Err(PlannerError::DuplicateObject(id));
            }
        }

        let mut unit_table = BTreeMap::new();
        for unit in functional_units {
            if !motions.contains(&unit.motion) {
                return Err(PlannerError::UnknownMotion {
                    functional_unit: unit.id,
                    motion: unit.motion,
                });
            }
            if let Some(input) = unit
                .inputs
                .iter()
                .find(|input| !object_table.contains_key(&input.id))
            {
                return Err(PlannerError::UnknownObject {
                    functional_unit: unit.id,
                    object: input.id,
                });
            }
            let id = unit.id;
            if unit_table.insert(id, unit).is_some() {
                return Err(PlannerError::DuplicateFunctionalUnit(id));
            }
        }

        if let Some(producer) = producers.producers().find(|id| !unit_table.contains_key(id)) {
            return Err(PlannerError::UnknownFunctionalUnit(producer));
        }

        log::debug!(
            "Built graph with {} objects, {} functional units and {} produced objects",
            object_table.len(),
            unit_table.len(),
            producers.len()
        );

        Ok(Self {
            objects: object_table,
            functional_units: unit_table,
            producers,
            motions,
        })
    }

    /// Returns an object node, None if unknown.
    pub fn object(&self, id: ObjectId) -> Option<&ObjectNode> {
        self.objects.get(&id)
    }

    /// Returns a functional unit, None if unknown.
    pub fn functional_unit(&self, id: FunctionalUnitId) -> Option<&FunctionalUnit> {
        self.functional_units.get(&id)
    }

    /// Returns whether the functional unit is part of the graph.
    pub fn contains(&self, id: FunctionalUnitId) -> bool {
        self.functional_units.contains_key(&id)
    }

    /// Iterates over all functional units, by increasing id.
    pub fn functional_units(&self) -> impl Iterator<Item = &FunctionalUnit> {
        self.functional_units.values()
    }

    /// Looks up the producers of an object.
    pub fn producers(&self, object: ObjectId) -> ProducerLookup<'_> {
        self.producers.lookup(object)
    }

    /// Returns the motion table.
    pub fn motions(&self) -> &MotionTable {
        &self.motions
    }

    /// Returns a functional unit known to be in the graph.
    ///
    /// Panics if the id is unknown, only use for ids checked by [FoonGraph::new].
    pub(crate) fn unit(&self, id: FunctionalUnitId) -> &FunctionalUnit {
        &self.functional_units[&id]
    }

    /// Returns the success rate of the motion of a functional unit known to be in the graph.
    pub(crate) fn unit_success_rate(&self, id: FunctionalUnitId) -> f64 {
        let unit = self.unit(id);
        // motions are checked when building the graph
        self.motions.get(&unit.motion).map_or(0., NotNan::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_parts() -> (Vec<ObjectNode>, Vec<FunctionalUnit>, MotionTable) {
        let onion = ObjectNode::new(ObjectId(1), "onion").with_states(["chopped"]);
        let objects = vec![onion.clone()];
        let units = vec![
            FunctionalUnit::new(FunctionalUnitId(0), vec![onion], "pour"),
            FunctionalUnit::new(FunctionalUnitId(1), vec![], "chop"),
        ];
        let motions = MotionTable::new([("pour", 0.9), ("chop", 0.5)]).unwrap();
        (objects, units, motions)
    }

    #[test]
    fn lookup_distinguishes_empty_entries() {
        let mut index = [(ObjectId(1), vec![]), (ObjectId(2), vec![])]
            .into_iter()
            .collect::<ProducerIndex>();
        index.insert(ObjectId(1), FunctionalUnitId(1));
        assert_eq!(
            index.lookup(ObjectId(1)),
            ProducerLookup::Candidates(&[FunctionalUnitId(1)])
        );
        assert_eq!(index.lookup(ObjectId(2)), ProducerLookup::NoProducer);
        assert_eq!(index.lookup(ObjectId(3)), ProducerLookup::NoProducer);
        assert!(index.lookup(ObjectId(3)).candidates().is_empty());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn motion_rates_must_be_probabilities() {
        assert!(MotionTable::new([("stir", 1.0), ("pour", 0.0)]).is_ok());
        assert_eq!(
            MotionTable::new([("stir", 1.5)]).unwrap_err(),
            PlannerError::InvalidSuccessRate {
                motion: "stir".into(),
                rate: 1.5
            }
        );
        assert!(matches!(
            MotionTable::new([("stir", f64::NAN)]),
            Err(PlannerError::InvalidSuccessRate { .. })
        ));
        assert!(MotionTable::new([("stir", -0.1)]).is_err());
    }

    #[test]
    fn valid_graph() {
        let (objects, units, motions) = graph_parts();
        let producers = [(ObjectId(1), vec![FunctionalUnitId(1)])]
            .into_iter()
            .collect();
        let graph = FoonGraph::new(objects, units, producers, motions).unwrap();
        assert!(graph.contains(FunctionalUnitId(0)));
        assert_eq!(graph.functional_units().count(), 2);
        assert_eq!(graph.unit_success_rate(FunctionalUnitId(1)), 0.5);
        assert_eq!(graph.object(ObjectId(1)).unwrap().label, "onion");
    }

    #[test]
    fn unknown_motion_fails_fast() {
        let (objects, mut units, motions) = graph_parts();
        units[1].motion = "flambe".into();
        assert_eq!(
            FoonGraph::new(objects, units, ProducerIndex::default(), motions).unwrap_err(),
            PlannerError::UnknownMotion {
                functional_unit: FunctionalUnitId(1),
                motion: "flambe".into()
            }
        );
    }

    #[test]
    fn unknown_producer_fails_fast() {
        let (objects, units, motions) = graph_parts();
        let producers = [(ObjectId(1), vec![FunctionalUnitId(7)])]
            .into_iter()
            .collect();
        assert_eq!(
            FoonGraph::new(objects, units, producers, motions).unwrap_err(),
            PlannerError::UnknownFunctionalUnit(FunctionalUnitId(7))
        );
    }

    #[test]
    fn duplicates_and_unknown_objects_fail_fast() {
        let (objects, units, motions) = graph_parts();
        let mut twice = units.clone();
        twice.push(units[0].clone());
        assert_eq!(
            FoonGraph::new(
                objects.clone(),
                twice,
                ProducerIndex::default(),
                motions.clone()
            )
            .unwrap_err(),
            PlannerError::DuplicateFunctionalUnit(FunctionalUnitId(0))
        );
        let mut objects_twice = objects.clone();
        objects_twice.push(objects[0].clone());
        assert_eq!(
            FoonGraph::new(
                objects_twice,
                units.clone(),
                ProducerIndex::default(),
                motions.clone()
            )
            .unwrap_err(),
            PlannerError::DuplicateObject(ObjectId(1))
        );
        assert_eq!(
            FoonGraph::new(vec![], units, ProducerIndex::default(), motions).unwrap_err(),
            PlannerError::UnknownObject {
                functional_unit: FunctionalUnitId(0),
                object: ObjectId(1)
            }
        );
    }
}
