/*
 *  SPDX-License-Identifier: Apache-2.0 OR MIT
 *  © 2020-2022 ETH Zurich and other contributors, see AUTHORS.txt for details
 */

use std::fs;
use std::path::{Path, PathBuf};

use foon_mcts_core::graphviz::plot_mcts_tree;
use foon_mcts_core::MCTS;

use crate::ScenarioError;

/// Writes the search tree of a run as `run{run:04}.dot` in `dir`, returning the file path.
pub fn plot_tree(mcts: &MCTS, dir: &Path, run: usize) -> Result<PathBuf, ScenarioError> {
    fs::create_dir_all(dir).map_err(ScenarioError::io(dir.display().to_string()))?;
    let path = dir.join(format!("run{:04}.dot", run));
    let mut file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
        .map_err(ScenarioError::io(path.display().to_string()))?;
    plot_mcts_tree(mcts, &mut file).map_err(ScenarioError::io(path.display().to_string()))?;
    Ok(path)
}
