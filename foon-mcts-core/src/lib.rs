/*
 *  SPDX-License-Identifier: Apache-2.0 OR MIT
 *  © 2020-2022 ETH Zurich and other contributors, see AUTHORS.txt for details
 */

//! This is the core of the FOON planner, containing the [MCTS] algorithm estimating how likely
//! a goal object can be prepared from what is currently available in a kitchen.
//!
//! The planner searches alternative preparation subgraphs of a task graph made of
//! [functional units](FunctionalUnit), each of them an action consuming some
//! [required objects](ObjectNode) and performed through a motion with a known success rate.
//! Alternatives are weighted by stochastic rollouts, see [Rollout].
//!
//! The graph, the producer index and the kitchen snapshot are built by the caller,
//! typically from files, see the `scenario-kitchen` crate.

mod config;
mod context;
mod error;
mod graph;
mod kitchen;
mod mcts;
mod node;
mod rollout;

pub use config::*;
pub use context::*;
pub use error::*;
pub use graph::*;
pub use kitchen::*;
pub use mcts::*;
pub use node::*;
pub use rollout::*;

/// The identifier of an object node in the task graph, essentially a u32.
#[derive(
    Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ObjectId(pub u32);
impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "O{}", self.0)
    }
}

/// The identifier of a functional unit in the task graph, essentially a u32.
#[derive(
    Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct FunctionalUnitId(pub u32);
impl std::fmt::Display for FunctionalUnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FU{}", self.0)
    }
}
