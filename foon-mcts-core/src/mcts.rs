/*
 *  SPDX-License-Identifier: Apache-2.0 OR MIT
 *  © 2020-2022 ETH Zurich and other contributors, see AUTHORS.txt for details
 */

use std::fmt::Write;
use std::time::{Duration, Instant};

use rand::prelude::{thread_rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::*;

/// The state of a running planner instance.
pub struct MCTS<'a> {
    // Statistics
    time: Duration,

    // Config
    config: PlannerConfiguration,
    success_estimator: Box<dyn SuccessEstimator>,

    // Run-specific parameters
    ctx: Context<'a>,
    seed: u64,

    // Nodes, the root is at index 0
    nodes: Vec<Node>,

    // Globals
    iterations: u32,
    rollouts: u32,

    // Rng
    rng: ChaCha8Rng,
}

impl<'a> MCTS<'a> {
    /// Instantiates a new search tree whose root is the goal functional unit `root`.
    pub fn new(
        graph: &'a FoonGraph,
        kitchen: &'a Kitchen,
        root: FunctionalUnitId,
        config: PlannerConfiguration,
    ) -> Result<Self, PlannerError> {
        Self::new_with_estimator(graph, kitchen, root, config, Box::new(RolloutEstimator))
    }

    /// Instantiates a new search tree using a custom success estimator instead of rollouts.
    pub fn new_with_estimator(
        graph: &'a FoonGraph,
        kitchen: &'a Kitchen,
        root: FunctionalUnitId,
        config: PlannerConfiguration,
        success_estimator: Box<dyn SuccessEstimator>,
    ) -> Result<Self, PlannerError> {
        if !graph.contains(root) {
            return Err(PlannerError::UnknownFunctionalUnit(root));
        }
        if config.max_steps == 0 {
            return Err(PlannerError::InvalidMaxSteps);
        }
        if config.exploration.is_nan() || config.exploration < 0. {
            return Err(PlannerError::InvalidExploration(config.exploration));
        }

        // Compute seed
        let cur_seed = config.seed.unwrap_or_else(|| thread_rng().next_u64());

        Ok(MCTS {
            time: Duration::default(),
            config,
            success_estimator,
            ctx: Context::new(graph, kitchen),
            seed: cur_seed,
            nodes: vec![Node::new(root, None)],
            iterations: 0,
            rollouts: 0,
            rng: ChaCha8Rng::seed_from_u64(cur_seed),
        })
    }

    /// Executes the MCTS search for `iterations` iterations, running `rollouts` rollouts
    /// per iteration.
    ///
    /// Returns the success count of the last frontier node visited, which is the root's
    /// if no iteration ran. See [MCTS::root_success_count] for the aggregate over the whole tree.
    pub fn run(&mut self, iterations: u32, rollouts: u32) -> u64 {
        // Reset globals
        self.iterations = 0;
        self.rollouts = rollouts;

        let start = Instant::now();
        let mut frontier = NodeId::ROOT;
        for _ in 0..iterations {
            self.iterations += 1;

            // Selection
            frontier = self.tree_policy(self.iterations);

            // Expansion, only of already-visited frontier nodes
            if self.nodes[frontier.0].visits > 0 {
                let children = self.expand(frontier);
                log::debug!(
                    "T{}\t{} ({}) - Expanded {} children",
                    self.iterations,
                    frontier,
                    self.nodes[frontier.0].functional_unit,
                    children.len()
                );
            }

            // Simulation
            let successes = self.simulate(frontier, rollouts);

            // Backpropagation
            self.backpropagate(frontier, successes);
        }
        self.time = start.elapsed();

        log::debug!(
            "Ran {} iterations in {:?}, {} nodes, root {}/{}, last frontier {}",
            iterations,
            self.time,
            self.nodes.len(),
            self.root_success_count(),
            self.root_visits(),
            frontier
        );
        log::trace!("Search tree:\n{}", self.tree_description());

        self.nodes[frontier.0].success_count
    }

    /// MCTS tree policy: descends from the root using [MCTS::select_child] until a frontier node.
    fn tree_policy(&self, total_iterations: u32) -> NodeId {
        let mut node = NodeId::ROOT;
        while let Some(child) = self.select_child(node, total_iterations) {
            log::trace!(
                "T{}\t{} - Select {} ({})",
                total_iterations,
                node,
                child,
                self.nodes[child.0].functional_unit
            );
            node = child;
        }
        node
    }

    /// Returns the UCB1 score of a node, given the total number of iterations so far.
    ///
    /// Unvisited nodes score infinity so that every child is tried once before exploitation.
    pub fn ucb1(&self, node: NodeId, total_iterations: u32) -> f64 {
        let node = &self.nodes[node.0];
        if node.visits == 0 {
            return f64::INFINITY;
        }
        let visits = f64::from(node.visits);
        let exploitation = match self.config.exploitation {
            ExploitationScaling::PerVisit => node.success_count as f64 / visits,
            ExploitationScaling::PerRollout => {
                node.success_count as f64 / (visits * f64::from(self.rollouts.max(1)))
            }
        };
        let exploration = (f64::from(total_iterations).ln() / visits).sqrt();
        exploitation + self.config.exploration * exploration
    }

    /// Returns the child with the highest UCB1 score, the earliest one on ties.
    ///
    /// Returns None if the node has no child.
    pub fn select_child(&self, node: NodeId, total_iterations: u32) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for &child in &self.nodes[node.0].children {
            let score = self.ucb1(child, total_iterations);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((child, score)),
            }
        }
        best.map(|(child, _)| child)
    }

    /// MCTS expansion phase: adds one child per producer of each missing, non-redundant input
    /// of the node's functional unit.
    ///
    /// Returns the newly created children. A node is only expanded once, later calls return
    /// an empty list.
    pub fn expand(&mut self, node: NodeId) -> Vec<NodeId> {
        if self.nodes[node.0].expanded {
            log::debug!("{} already expanded, skipping", node);
            return Vec::new();
        }
        self.nodes[node.0].expanded = true;

        let ctx = self.ctx;
        let unit = ctx.graph.unit(self.nodes[node.0].functional_unit);
        let producers = ctx
            .unmet_requirements(unit)
            .flat_map(move |input| {
                let lookup = ctx.graph.producers(input.id);
                if lookup == ProducerLookup::NoProducer {
                    log::debug!("{}\tNo producer for {} ({})", unit.id, input.id, input.label);
                }
                lookup.candidates().iter().copied()
            })
            .collect::<Vec<_>>();

        let mut children = Vec::with_capacity(producers.len());
        for producer in producers {
            let child = NodeId(self.nodes.len());
            self.nodes.push(Node::new(producer, Some(node)));
            self.nodes[node.0].children.push(child);
            log::trace!("\tCreating {} for {} under {}", child, producer, node);
            children.push(child);
        }
        children
    }

    /// MCTS simulation phase: estimates how many of `rollouts` attempts from the node succeed.
    pub fn simulate(&mut self, node: NodeId, rollouts: u32) -> u32 {
        let functional_unit = self.nodes[node.0].functional_unit;
        let successes = self.success_estimator.estimate(
            &mut self.rng,
            &self.config,
            self.ctx,
            functional_unit,
            rollouts,
        );
        debug_assert!(successes <= rollouts);
        successes.min(rollouts)
    }

    /// MCTS backpropagation phase: adds one visit and `successes` to the node and all its
    /// ancestors.
    pub fn backpropagate(&mut self, node: NodeId, successes: u32) {
        let mut current = Some(node);
        while let Some(id) = current {
            let node = &mut self.nodes[id.0];
            node.update(successes);
            current = node.parent;
        }
    }

    /// Returns the visited child of a node with the best success count per visit,
    /// the earliest one on ties.
    pub fn best_child(&self, node: NodeId) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for &child in self.children(node) {
            let node = &self.nodes[child.0];
            if node.visits == 0 {
                continue;
            }
            let value = node.success_count as f64 / f64::from(node.visits);
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((child, value)),
            }
        }
        best.map(|(child, _)| child)
    }

    /// Returns the best alternative for the goal, using exploration value of 0.
    pub fn best_child_at_root(&self) -> Option<NodeId> {
        self.best_child(NodeId::ROOT)
    }

    /// Returns the fraction of successful rollouts through a node, using the rollout count
    /// of the last run.
    ///
    /// Returns None if the node was never visited.
    pub fn success_rate(&self, node: NodeId) -> Option<f64> {
        let node = self.nodes.get(node.0)?;
        if node.visits == 0 || self.rollouts == 0 {
            return None;
        }
        Some(node.success_count as f64 / (f64::from(node.visits) * f64::from(self.rollouts)))
    }

    /// Renders the tree as indented text, one line per node, in depth-first order.
    pub fn tree_description(&self) -> String {
        let mut description = String::new();
        let mut stack = vec![(NodeId::ROOT, 0)];
        while let Some((id, depth)) = stack.pop() {
            let node = &self.nodes[id.0];
            // writing to a String cannot fail
            let _ = writeln!(
                description,
                "{:indent$}Node: {}, Visits: {}, Successes: {}",
                "",
                node.functional_unit.0,
                node.visits,
                node.success_count,
                indent = depth * 2
            );
            stack.extend(node.children.iter().rev().map(|&child| (child, depth + 1)));
        }
        description
    }

    /// Returns the read-only inputs of the search.
    pub fn context(&self) -> Context<'a> {
        self.ctx
    }

    /// Returns the configuration of the search.
    pub fn config(&self) -> &PlannerConfiguration {
        &self.config
    }

    /// Returns the root node of the search tree.
    pub fn root_node(&self) -> &Node {
        &self.nodes[NodeId::ROOT.0]
    }

    /// Returns the number of visits of the root, the number of iterations ever run.
    pub fn root_visits(&self) -> u32 {
        self.root_node().visits
    }

    /// Returns the success count of the root, aggregating all rollouts ever run.
    pub fn root_success_count(&self) -> u64 {
        self.root_node().success_count
    }

    /// Returns a node, None if the id is not part of this tree.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Returns the children of a node, empty if the id is not part of this tree.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map_or(&[], |node| node.children.as_slice())
    }

    /// Returns an iterator over all nodes in the tree, in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of iterations of the last run.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Returns the seed of the tree.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the duration of the last run.
    pub fn time(&self) -> Duration {
        self.time
    }
}

/// When `graphviz` feature is enabled, provides plotting of the search tree.
#[cfg(feature = "graphviz")]
pub mod graphviz {
    use super::*;
    use std::{
        borrow::Cow,
        collections::VecDeque,
        io::{self, Write},
        sync::atomic::{AtomicUsize, Ordering},
    };

    use dot::{Arrow, Edges, GraphWalk, Id, Kind, LabelText, Labeller, Nodes, Style};

    /// Renders the search tree as graphviz's dot format.
    pub fn plot_mcts_tree<W: Write>(mcts: &MCTS, w: &mut W) -> io::Result<()> {
        dot::render(mcts, w)
    }

    /// An edge between a node and one of its children.
    #[derive(Clone, Copy, Debug)]
    pub struct Edge {
        parent: NodeId,
        child: NodeId,
        best: bool,
    }

    /// The depth of the graph to plot, in number of nodes.
    static GRAPH_OUTPUT_DEPTH: AtomicUsize = AtomicUsize::new(4);

    /// Sets the depth of the graph to plot, in number of nodes.
    pub fn set_graph_output_depth(depth: usize) {
        GRAPH_OUTPUT_DEPTH.store(depth, Ordering::Relaxed);
    }
    /// Gets the depth of the graph to plot, in number of nodes.
    pub fn get_graph_output_depth() -> usize {
        GRAPH_OUTPUT_DEPTH.load(Ordering::Relaxed)
    }

    impl MCTS<'_> {
        /// Nodes up to the plotting depth, breadth first.
        fn relevant_nodes(&self) -> Vec<NodeId> {
            let max_depth = get_graph_output_depth();
            let mut nodes = Vec::new();
            let mut queue = VecDeque::from([(NodeId::ROOT, 0)]);
            while let Some((id, depth)) = queue.pop_front() {
                if depth >= max_depth {
                    continue;
                }
                nodes.push(id);
                queue.extend(self.children(id).iter().map(|&child| (child, depth + 1)));
            }
            nodes
        }
    }

    impl<'a> GraphWalk<'a, NodeId, Edge> for MCTS<'_> {
        fn nodes(&'a self) -> Nodes<'a, NodeId> {
            Nodes::Owned(self.relevant_nodes())
        }

        fn edges(&'a self) -> Edges<'a, Edge> {
            let nodes = self.relevant_nodes();
            let mut edges = Vec::new();
            for &parent in &nodes {
                let best = self.best_child(parent);
                for &child in self.children(parent) {
                    if nodes.contains(&child) {
                        edges.push(Edge {
                            parent,
                            child,
                            best: Some(child) == best,
                        });
                    }
                }
            }
            Edges::Owned(edges)
        }

        fn source(&'a self, edge: &Edge) -> NodeId {
            edge.parent
        }

        fn target(&'a self, edge: &Edge) -> NodeId {
            edge.child
        }
    }

    impl<'a> Labeller<'a, NodeId, Edge> for MCTS<'_> {
        fn graph_id(&'a self) -> Id<'a> {
            Id::new(format!("goal_{}", self.root_node().functional_unit.0)).unwrap()
        }

        fn node_id(&'a self, n: &NodeId) -> Id<'a> {
            Id::new(format!("n{}", n.0)).unwrap()
        }

        fn node_label(&'a self, n: &NodeId) -> LabelText<'a> {
            let node = &self.nodes[n.0];
            let motion = self
                .ctx
                .graph
                .functional_unit(node.functional_unit)
                .map_or("", |unit| unit.motion.as_str());
            LabelText::LabelStr(Cow::Owned(format!(
                "{} ({})\nN: {}, S: {}\nP: {}",
                node.functional_unit,
                motion,
                node.visits,
                node.success_count,
                self.success_rate(*n)
                    .map(|rate| format!("{:.2}", rate))
                    .unwrap_or_else(|| "None".to_owned()),
            )))
        }

        fn node_style(&'a self, n: &NodeId) -> Style {
            if *n == NodeId::ROOT {
                Style::Bold
            } else {
                Style::Filled
            }
        }

        fn node_color(&'a self, n: &NodeId) -> Option<LabelText<'a>> {
            if *n == NodeId::ROOT {
                Some(LabelText::LabelStr(Cow::Borrowed("red")))
            } else {
                // from red (always failing) to green (always succeeding)
                let hue = self.success_rate(*n).unwrap_or(0.).min(1.) / 3.;
                Some(LabelText::LabelStr(Cow::Owned(format!(
                    "{:.3} 0.500 1.000",
                    hue
                ))))
            }
        }

        fn edge_style(&'a self, edge: &Edge) -> Style {
            if edge.best {
                Style::Bold
            } else {
                Style::Solid
            }
        }

        fn edge_color(&'a self, edge: &Edge) -> Option<LabelText<'a>> {
            if edge.best {
                Some(LabelText::LabelStr(Cow::Borrowed("red")))
            } else {
                None
            }
        }

        fn edge_label(&'a self, edge: &Edge) -> LabelText<'a> {
            LabelText::LabelStr(Cow::Owned(format!(
                "U: {:.2}",
                self.ucb1(edge.child, self.iterations.max(1))
            )))
        }

        fn edge_start_arrow(&'a self, _e: &Edge) -> Arrow {
            Arrow::none()
        }

        fn edge_end_arrow(&'a self, _e: &Edge) -> Arrow {
            Arrow::normal()
        }

        fn kind(&self) -> Kind {
            Kind::Digraph
        }
    }
}
