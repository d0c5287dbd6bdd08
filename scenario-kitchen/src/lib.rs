/*
 *  SPDX-License-Identifier: Apache-2.0 OR MIT
 *  © 2020-2022 ETH Zurich and other contributors, see AUTHORS.txt for details
 */

//! Kitchen preparation experiments: problem and experiment files, batch runs and tree plots
//! around the FOON planner.

mod config;
mod error;
mod experiment;
mod graph;
mod problem;

pub use config::*;
pub use error::*;
pub use experiment::*;
pub use graph::*;
pub use problem::*;
