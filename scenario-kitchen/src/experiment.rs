/*
 *  SPDX-License-Identifier: Apache-2.0 OR MIT
 *  © 2020-2022 ETH Zurich and other contributors, see AUTHORS.txt for details
 */

use std::path::Path;

use foon_mcts_core::graphviz::set_graph_output_depth;
use foon_mcts_core::{FoonGraph, FunctionalUnitId, Kitchen, NodeId, MCTS};
use rand::{thread_rng, RngCore};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{plot_tree, ExperimentConfig, ScenarioError};

/// The outcome of one planner run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunReport {
    pub run: usize,
    pub seed: u64,
    /// success count of the last simulated node
    pub success_count: u64,
    pub root_visits: u32,
    pub root_success_count: u64,
    /// root successes per rollout
    pub success_rate: Option<f64>,
    pub best_alternative: Option<FunctionalUnitId>,
    pub node_count: usize,
    /// wall-clock duration in seconds
    pub duration: f64,
}

/// A loaded experiment, ready to run.
pub struct Experiment {
    pub config: ExperimentConfig,
    goal: FunctionalUnitId,
    graph: FoonGraph,
    kitchen: Kitchen,
}

impl Experiment {
    /// Loads and validates the problem, file sources being relative to `working_dir`.
    pub fn new(config: ExperimentConfig, working_dir: &Path) -> Result<Self, ScenarioError> {
        if config.batch.runs == 0 {
            return Err(ScenarioError::NoRuns);
        }
        let problem = config.problem.load(working_dir)?;
        let (graph, kitchen) = problem.build()?;
        Ok(Self {
            config,
            goal: problem.goal,
            graph,
            kitchen,
        })
    }

    pub fn graph(&self) -> &FoonGraph {
        &self.graph
    }

    pub fn kitchen(&self) -> &Kitchen {
        &self.kitchen
    }

    /// Runs `batch.runs` planners in parallel, run `i` being seeded with the base seed plus `i`.
    pub fn run(&self, plot_dir: Option<&Path>) -> Result<Vec<RunReport>, ScenarioError> {
        set_graph_output_depth(self.config.graphs_depth);
        let base_seed = self
            .config
            .planner
            .seed
            .unwrap_or_else(|| thread_rng().next_u64());
        log::info!(
            "Running {} planners with base seed {}",
            self.config.batch.runs,
            base_seed
        );
        (0..self.config.batch.runs)
            .into_par_iter()
            .map(|run| self.run_once(run, base_seed.wrapping_add(run as u64), plot_dir))
            .collect()
    }

    /// Runs a single planner with the given seed.
    pub fn run_once(
        &self,
        run: usize,
        seed: u64,
        plot_dir: Option<&Path>,
    ) -> Result<RunReport, ScenarioError> {
        let mut config = self.config.planner.clone();
        config.seed = Some(seed);
        let mut mcts = MCTS::new(&self.graph, &self.kitchen, self.goal, config)?;
        let success_count = mcts.run(self.config.iterations, self.config.rollouts);
        if let Some(dir) = plot_dir {
            let path = plot_tree(&mcts, dir, run)?;
            log::debug!("Run {} tree written to {}", run, path.display());
        }

        let report = RunReport {
            run,
            seed,
            success_count,
            root_visits: mcts.root_visits(),
            root_success_count: mcts.root_success_count(),
            success_rate: mcts.success_rate(NodeId::ROOT),
            best_alternative: mcts
                .best_child_at_root()
                .and_then(|child| mcts.node(child))
                .map(|node| node.functional_unit()),
            node_count: mcts.node_count(),
            duration: mcts.time().as_secs_f64(),
        };
        log::info!(
            "Run {}: {} successes at the last frontier, root success rate {:?}",
            run,
            report.success_count,
            report.success_rate
        );
        Ok(report)
    }
}

/// Loads the experiment described by `config` and runs it.
pub fn run_experiment(
    config: ExperimentConfig,
    working_dir: &Path,
    plot_dir: Option<&Path>,
) -> Result<Vec<RunReport>, ScenarioError> {
    Experiment::new(config, working_dir)?.run(plot_dir)
}
