/*
 *  SPDX-License-Identifier: Apache-2.0 OR MIT
 *  © 2020-2022 ETH Zurich and other contributors, see AUTHORS.txt for details
 */

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ObjectNode;

/// An object physically available in the kitchen.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KitchenItem {
    pub label: String,
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub container: Option<String>,
}

impl KitchenItem {
    /// Returns whether this item is exactly the required object,
    /// states and ingredients being compared regardless of their order.
    pub fn matches(&self, requirement: &ObjectNode) -> bool {
        self.label == requirement.label
            && self.container == requirement.container
            && same_multiset(&self.states, &requirement.states)
            && same_multiset(&self.ingredients, &requirement.ingredients)
    }
}

impl From<&ObjectNode> for KitchenItem {
    fn from(object: &ObjectNode) -> Self {
        Self {
            label: object.label.clone(),
            states: object.states.clone(),
            ingredients: object.ingredients.clone(),
            container: object.container.clone(),
        }
    }
}

fn same_multiset(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a = a.iter().collect::<Vec<_>>();
    let mut b = b.iter().collect::<Vec<_>>();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

/// Returns whether a required object is present among the given items.
pub fn exists(items: &[KitchenItem], requirement: &ObjectNode) -> bool {
    items.iter().any(|item| item.matches(requirement))
}

/// A snapshot of the kitchen: the items on hand and the labels of objects used as containers.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Kitchen {
    #[serde(default)]
    pub items: Vec<KitchenItem>,
    #[serde(default)]
    pub utensils: BTreeSet<String>,
}

impl Kitchen {
    pub fn new(
        items: Vec<KitchenItem>,
        utensils: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            items,
            utensils: utensils.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns whether the required object is on hand.
    pub fn contains(&self, requirement: &ObjectNode) -> bool {
        exists(&self.items, requirement)
    }

    /// Returns whether the label designates a container.
    pub fn is_utensil(&self, label: &str) -> bool {
        self.utensils.contains(label)
    }
}

#[cfg(test)]
mod tests {
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::ObjectId;

    fn salad() -> ObjectNode {
        ObjectNode::new(ObjectId(3), "salad")
            .with_states(["mixed", "seasoned", "cold"])
            .with_ingredients(["lettuce", "tomato", "onion", "tomato"])
            .in_container("bowl")
    }

    #[test]
    fn exact_match() {
        let items = vec![KitchenItem::from(&salad())];
        assert!(exists(&items, &salad()));
        assert!(!exists(&[], &salad()));
    }

    #[test]
    fn order_does_not_matter() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let required = salad();
        for _ in 0..20 {
            let mut item = KitchenItem::from(&required);
            item.states.shuffle(&mut rng);
            item.ingredients.shuffle(&mut rng);
            assert!(item.matches(&required));
            let mut permuted = required.clone();
            permuted.states.shuffle(&mut rng);
            permuted.ingredients.shuffle(&mut rng);
            assert!(exists(&[item], &permuted));
        }
    }

    #[test]
    fn multiplicity_matters() {
        let mut item = KitchenItem::from(&salad());
        item.ingredients = vec!["lettuce", "tomato", "onion", "onion"]
            .into_iter()
            .map(String::from)
            .collect();
        assert!(!item.matches(&salad()));
    }

    #[test]
    fn no_partial_match() {
        let required = salad();
        let mut other_label = KitchenItem::from(&required);
        other_label.label = "soup".into();
        let mut other_container = KitchenItem::from(&required);
        other_container.container = None;
        let mut missing_state = KitchenItem::from(&required);
        missing_state.states.pop();
        let mut extra_ingredient = KitchenItem::from(&required);
        extra_ingredient.ingredients.push("cucumber".into());
        let kitchen = Kitchen::new(
            vec![other_label, other_container, missing_state, extra_ingredient],
            ["bowl"],
        );
        assert!(!kitchen.contains(&required));
        assert!(kitchen.is_utensil("bowl"));
        assert!(!kitchen.is_utensil("salad"));
    }
}
