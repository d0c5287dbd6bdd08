/*
 *  SPDX-License-Identifier: Apache-2.0 OR MIT
 *  © 2020-2022 ETH Zurich and other contributors, see AUTHORS.txt for details
 */

use crate::{FoonGraph, FunctionalUnit, Kitchen, ObjectNode};

/// The read-only inputs of a planning run: the task graph and the kitchen snapshot.
#[derive(Debug)]
pub struct Context<'a> {
    /// the task graph
    pub graph: &'a FoonGraph,
    /// what is on hand
    pub kitchen: &'a Kitchen,
}
impl Copy for Context<'_> {}
impl Clone for Context<'_> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph,
            kitchen: self.kitchen,
        }
    }
}
impl<'a> Context<'a> {
    /// Creates a new Context from its components.
    pub fn new(graph: &'a FoonGraph, kitchen: &'a Kitchen) -> Self {
        Self { graph, kitchen }
    }

    /// Returns whether the input at `index` of `unit` is a bare container already implied
    /// by another input of the same unit being inside it.
    ///
    /// For example "bowl containing flour" is redundant next to "flour in bowl".
    pub fn is_redundant(&self, unit: &FunctionalUnit, index: usize) -> bool {
        let input = &unit.inputs[index];
        if !self.kitchen.is_utensil(&input.label) {
            return false;
        }
        let ingredient = match input.ingredients.as_slice() {
            [ingredient] => ingredient,
            _ => return false,
        };
        unit.inputs.iter().enumerate().any(|(other_index, other)| {
            other_index != index
                && other.label == *ingredient
                && other.container.as_deref() == Some(input.label.as_str())
        })
    }

    /// Returns whether all inputs of `unit` are on hand.
    pub fn all_inputs_present(&self, unit: &FunctionalUnit) -> bool {
        unit.inputs.iter().all(|input| self.kitchen.contains(input))
    }

    /// Returns the inputs of `unit` that are neither redundant nor on hand, in declaration order.
    pub fn unmet_requirements<'u>(
        &self,
        unit: &'u FunctionalUnit,
    ) -> impl Iterator<Item = &'u ObjectNode> + 'u
    where
        'a: 'u,
    {
        let ctx: Context<'u> = *self;
        unit.inputs
            .iter()
            .enumerate()
            .filter(move |(index, input)| {
                !ctx.is_redundant(unit, *index) && !ctx.kitchen.contains(input)
            })
            .map(|(_, input)| input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FunctionalUnitId, KitchenItem, MotionTable, ObjectId, ProducerIndex};

    fn flour_in_bowl() -> (FoonGraph, Kitchen) {
        let flour = ObjectNode::new(ObjectId(1), "flour").in_container("bowl");
        let bowl = ObjectNode::new(ObjectId(2), "bowl").with_ingredients(["flour"]);
        let egg = ObjectNode::new(ObjectId(3), "egg");
        let unit = FunctionalUnit::new(
            FunctionalUnitId(2),
            vec![flour.clone(), bowl.clone(), egg.clone()],
            "pour",
        );
        let graph = FoonGraph::new(
            vec![flour, bowl, egg.clone()],
            vec![unit],
            ProducerIndex::default(),
            MotionTable::new([("pour", 1.0)]).unwrap(),
        )
        .unwrap();
        let kitchen = Kitchen::new(vec![KitchenItem::from(&egg)], ["bowl"]);
        (graph, kitchen)
    }

    #[test]
    fn container_of_other_input_is_redundant() {
        let (graph, kitchen) = flour_in_bowl();
        let ctx = Context::new(&graph, &kitchen);
        let unit = graph.functional_unit(FunctionalUnitId(2)).unwrap();
        assert!(!ctx.is_redundant(unit, 0));
        assert!(ctx.is_redundant(unit, 1));
        assert!(!ctx.is_redundant(unit, 2));
        let unmet = ctx
            .unmet_requirements(unit)
            .map(|input| input.id)
            .collect::<Vec<_>>();
        assert_eq!(unmet, vec![ObjectId(1)]);
        assert!(!ctx.all_inputs_present(unit));
    }

    #[test]
    fn not_redundant_unless_utensil() {
        let (graph, _) = flour_in_bowl();
        let kitchen = Kitchen::default();
        let ctx = Context::new(&graph, &kitchen);
        let unit = graph.functional_unit(FunctionalUnitId(2)).unwrap();
        assert!(!ctx.is_redundant(unit, 1));
        assert_eq!(ctx.unmet_requirements(unit).count(), 3);
    }

    #[test]
    fn not_redundant_with_several_ingredients() {
        let (graph, kitchen) = flour_in_bowl();
        let ctx = Context::new(&graph, &kitchen);
        let mut unit = graph.functional_unit(FunctionalUnitId(2)).unwrap().clone();
        unit.inputs[1].ingredients.push("sugar".into());
        assert!(!ctx.is_redundant(&unit, 1));
        unit.inputs[1].ingredients.clear();
        assert!(!ctx.is_redundant(&unit, 1));
    }
}
