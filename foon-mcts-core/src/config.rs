/*
 *  SPDX-License-Identifier: Apache-2.0 OR MIT
 *  © 2020-2022 ETH Zurich and other contributors, see AUTHORS.txt for details
 */

use serde::{Deserialize, Serialize};

/// How the exploitation term of UCB1 is scaled.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExploitationScaling {
    /// `success_count / visits`, which exceeds 1 when several rollouts are run per visit
    #[default]
    PerVisit,
    /// `success_count / (visits * rollouts)`, an empirical success probability
    PerRollout,
}

/// The configuration of an MCTS instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PlannerConfiguration {
    /// exploration factor to use in UCB1 to balance exploration and exploitation
    pub exploration: f64,
    /// maximum number of producer steps a rollout may take before failing
    pub max_steps: u32,
    /// scaling of the exploitation term
    pub exploitation: ExploitationScaling,
    /// optionally, a user-given seed
    pub seed: Option<u64>,
}

impl Default for PlannerConfiguration {
    fn default() -> Self {
        Self {
            exploration: 2.,
            max_steps: 100,
            exploitation: ExploitationScaling::PerVisit,
            seed: None,
        }
    }
}

impl PlannerConfiguration {
    /// Returns the default configuration with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }
}
