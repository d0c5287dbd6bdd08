/*
 *  SPDX-License-Identifier: Apache-2.0 OR MIT
 *  © 2020-2022 ETH Zurich and other contributors, see AUTHORS.txt for details
 */

use std::io;

use foon_mcts_core::PlannerError;

/// Errors while loading or running an experiment.
#[derive(thiserror::Error, Debug)]
pub enum ScenarioError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid planner input: {0}")]
    Planner(#[from] PlannerError),

    #[error("batch must contain at least one run")]
    NoRuns,

    #[error("invalid 'set' override \"{0}\", should be \"some.path=value\"")]
    InvalidOverride(String),
}

impl ScenarioError {
    pub(crate) fn io(path: impl Into<String>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| ScenarioError::Io { path, source }
    }
}
