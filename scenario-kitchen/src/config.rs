/*
 *  SPDX-License-Identifier: Apache-2.0 OR MIT
 *  © 2020-2022 ETH Zurich and other contributors, see AUTHORS.txt for details
 */

use std::path::Path;
use std::{fs, io};

use foon_mcts_core::graphviz::get_graph_output_depth;
use foon_mcts_core::PlannerConfiguration;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{KitchenProblem, ScenarioError};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BatchConfig {
    #[serde(default = "runs_default")]
    pub runs: usize,
}

fn runs_default() -> usize {
    1
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            runs: runs_default(),
        }
    }
}

/// Where the problem comes from, file paths being relative to the working directory.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProblemSource {
    File { path: String },
    Inline(KitchenProblem),
}

impl ProblemSource {
    pub fn load(&self, working_dir: &Path) -> Result<KitchenProblem, ScenarioError> {
        match self {
            ProblemSource::File { path } => {
                let path = working_dir.join(path);
                let file = fs::File::open(&path)
                    .map_err(ScenarioError::io(path.display().to_string()))?;
                Ok(serde_json::from_reader(io::BufReader::new(file))?)
            }
            ProblemSource::Inline(problem) => Ok(problem.clone()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExperimentConfig {
    #[serde(default = "iterations_default")]
    pub iterations: u32,
    #[serde(default = "rollouts_default")]
    pub rollouts: u32,
    #[serde(default = "Default::default")]
    pub planner: PlannerConfiguration,
    #[serde(default = "Default::default")]
    pub batch: BatchConfig,
    #[serde(default = "get_graph_output_depth")]
    pub graphs_depth: usize,
    pub problem: ProblemSource,
}

fn iterations_default() -> u32 {
    1000
}

fn rollouts_default() -> u32 {
    10
}

impl ExperimentConfig {
    /// Reads a config file, `-` meaning stdin, then applies the `some.path=value` overrides.
    pub fn load<'s>(
        path: &str,
        overrides: impl IntoIterator<Item = &'s str>,
    ) -> Result<Self, ScenarioError> {
        let mut json: Value = match path {
            "-" => {
                let stdin = io::stdin();
                serde_json::from_reader(stdin.lock())?
            }
            path => {
                let file = fs::File::open(path).map_err(ScenarioError::io(path))?;
                serde_json::from_reader(io::BufReader::new(file))?
            }
        };
        for assignment in overrides {
            apply_override(&mut json, assignment)?;
        }
        Ok(serde_json::from_value(json)?)
    }
}

/// Sets the value at a dotted path, creating intermediate objects as needed.
pub fn apply_override(json: &mut Value, assignment: &str) -> Result<(), ScenarioError> {
    let invalid = || ScenarioError::InvalidOverride(assignment.to_owned());
    let (path, value) = assignment.split_once('=').ok_or_else(invalid)?;
    let value: Value = serde_json::from_str(value)?;

    let mut keys = path.split('.').peekable();
    let mut object = json;
    while let Some(key) = keys.next() {
        if key.is_empty() {
            return Err(invalid());
        }
        let map = object.as_object_mut().ok_or_else(invalid)?;
        if keys.peek().is_none() {
            map.insert(key.to_owned(), value);
            return Ok(());
        }
        // Key is not present or not an object
        if !map.get(key).map_or(false, Value::is_object) {
            map.insert(key.to_owned(), Value::Object(Default::default()));
        }
        object = map.get_mut(key).ok_or_else(invalid)?;
    }
    Err(invalid())
}
