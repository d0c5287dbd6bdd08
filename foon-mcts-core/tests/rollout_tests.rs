/*
 *  SPDX-License-Identifier: Apache-2.0 OR MIT
 *  © 2020-2022 ETH Zurich and other contributors, see AUTHORS.txt for details
 */

use foon_mcts_core::{
    Context, FoonGraph, FunctionalUnit, FunctionalUnitId, Kitchen, KitchenItem, MotionTable,
    NodeId, ObjectId, ObjectNode, PlannerConfiguration, Rollout, RolloutOutcome, MCTS,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const BATTER: FunctionalUnitId = FunctionalUnitId(2);
const POUR_FLOUR: FunctionalUnitId = FunctionalUnitId(3);
const FILL_BOWL: FunctionalUnitId = FunctionalUnitId(4);

fn flour_in_bowl() -> ObjectNode {
    ObjectNode::new(ObjectId(1), "flour").in_container("bowl")
}

fn bowl_of_flour() -> ObjectNode {
    ObjectNode::new(ObjectId(2), "bowl").with_ingredients(["flour"])
}

/// The batter needs flour in a bowl and a bowl containing flour, the latter being implied
/// by the former. Each has its own producer; producing the bare bowl always fails.
fn batter_graph() -> FoonGraph {
    FoonGraph::new(
        vec![flour_in_bowl(), bowl_of_flour()],
        vec![
            FunctionalUnit::new(BATTER, vec![flour_in_bowl(), bowl_of_flour()], "whisk"),
            FunctionalUnit::new(POUR_FLOUR, vec![], "pour"),
            FunctionalUnit::new(FILL_BOWL, vec![], "fill"),
        ],
        [
            (ObjectId(1), vec![POUR_FLOUR]),
            (ObjectId(2), vec![FILL_BOWL]),
        ]
        .into_iter()
        .collect(),
        MotionTable::new([("whisk", 1.0), ("pour", 1.0), ("fill", 0.0)]).unwrap(),
    )
    .unwrap()
}

#[test]
fn redundant_container_is_never_expanded() {
    let graph = batter_graph();
    let kitchen = Kitchen::new(vec![], ["bowl"]);
    let mut mcts = MCTS::new(&graph, &kitchen, BATTER, PlannerConfiguration::with_seed(0)).unwrap();
    let children = mcts.expand(NodeId::ROOT);
    assert_eq!(children.len(), 1);
    assert_eq!(mcts.node(children[0]).unwrap().functional_unit(), POUR_FLOUR);
}

#[test]
fn redundant_container_is_never_picked() {
    let graph = batter_graph();
    let kitchen = Kitchen::new(vec![], ["bowl"]);
    let mut mcts = MCTS::new(&graph, &kitchen, BATTER, PlannerConfiguration::with_seed(0)).unwrap();
    // picking the bowl would lead to its failing producer
    assert_eq!(mcts.simulate(NodeId::ROOT, 100), 100);
}

#[test]
fn bowl_is_required_when_not_a_utensil() {
    let graph = batter_graph();
    let kitchen = Kitchen::default();
    let mut mcts = MCTS::new(&graph, &kitchen, BATTER, PlannerConfiguration::with_seed(0)).unwrap();
    assert_eq!(mcts.expand(NodeId::ROOT).len(), 2);
    let successes = mcts.simulate(NodeId::ROOT, 100);
    // roughly half of the rollouts pick the bowl and fail
    assert!(successes > 25 && successes < 75, "{successes}");
}

#[test]
fn only_redundant_requirements_missing_fails() {
    let graph = batter_graph();
    let kitchen = Kitchen::new(vec![KitchenItem::from(&flour_in_bowl())], ["bowl"]);
    let ctx = Context::new(&graph, &kitchen);
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    assert_eq!(
        Rollout::new(ctx, 100).run(&mut rng, BATTER),
        RolloutOutcome::NoUnmetRequirement
    );

    let mut mcts = MCTS::new(&graph, &kitchen, BATTER, PlannerConfiguration::with_seed(0)).unwrap();
    assert_eq!(mcts.simulate(NodeId::ROOT, 10), 0);
    assert!(mcts.expand(NodeId::ROOT).is_empty());
}

#[test]
fn inputs_on_hand_always_succeed() {
    let graph = batter_graph();
    let kitchen = Kitchen::new(
        vec![
            KitchenItem::from(&bowl_of_flour()),
            KitchenItem::from(&flour_in_bowl()),
        ],
        ["bowl"],
    );
    for seed in 0..5 {
        let mut mcts =
            MCTS::new(&graph, &kitchen, BATTER, PlannerConfiguration::with_seed(seed)).unwrap();
        for k in [0, 1, 10, 100] {
            assert_eq!(mcts.simulate(NodeId::ROOT, k), k);
        }
        // nothing to expand either
        assert!(mcts.expand(NodeId::ROOT).is_empty());
        assert_eq!(mcts.run(5, 3), 15);
    }
}

#[test]
fn missing_producer_always_fails() {
    let cake = ObjectNode::new(ObjectId(7), "cake").with_states(["baked"]);
    let icing = ObjectNode::new(ObjectId(8), "icing");
    let graph = FoonGraph::new(
        vec![cake.clone(), icing.clone()],
        vec![
            FunctionalUnit::new(FunctionalUnitId(0), vec![cake, icing], "decorate"),
            FunctionalUnit::new(FunctionalUnitId(1), vec![], "spread"),
        ],
        [
            (ObjectId(7), vec![]),
            (ObjectId(8), vec![FunctionalUnitId(1)]),
        ]
        .into_iter()
        .collect(),
        MotionTable::new([("decorate", 1.0), ("spread", 1.0)]).unwrap(),
    )
    .unwrap();
    let kitchen = Kitchen::default();
    let mut mcts = MCTS::new(
        &graph,
        &kitchen,
        FunctionalUnitId(0),
        PlannerConfiguration::with_seed(5),
    )
    .unwrap();
    // the cake has no producer, the icing one is expanded
    let children = mcts.expand(NodeId::ROOT);
    assert_eq!(children.len(), 1);

    // a rollout may pick the icing first, but then needs the cake
    let ctx = mcts.context();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    for _ in 0..50 {
        let outcome = Rollout::new(ctx, 100).run(&mut rng, FunctionalUnitId(0));
        assert!(
            matches!(
                outcome,
                RolloutOutcome::NoProducer | RolloutOutcome::Success
            ),
            "{outcome:?}"
        );
    }

    // with the icing on hand, only the cake remains
    let kitchen = Kitchen::new(
        vec![KitchenItem {
            label: "icing".into(),
            states: vec![],
            ingredients: vec![],
            container: None,
        }],
        Vec::<String>::new(),
    );
    let mut mcts = MCTS::new(
        &graph,
        &kitchen,
        FunctionalUnitId(0),
        PlannerConfiguration::with_seed(5),
    )
    .unwrap();
    for k in [0, 1, 10, 100] {
        assert_eq!(mcts.simulate(NodeId::ROOT, k), 0);
    }
    assert_eq!(mcts.run(10, 4), 0);
}
