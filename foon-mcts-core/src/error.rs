/*
 *  SPDX-License-Identifier: Apache-2.0 OR MIT
 *  © 2020-2022 ETH Zurich and other contributors, see AUTHORS.txt for details
 */

use crate::{FunctionalUnitId, ObjectId};

/// Inconsistencies in the planner inputs, detected when building the graph or the planner.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    /// A functional unit uses a motion absent from the motion table.
    #[error("functional unit {functional_unit} uses unknown motion \"{motion}\"")]
    UnknownMotion {
        functional_unit: FunctionalUnitId,
        motion: String,
    },

    /// A motion success rate is not a probability.
    #[error("motion \"{motion}\" has success rate {rate}, expected a value in [0, 1]")]
    InvalidSuccessRate { motion: String, rate: f64 },

    /// A functional unit is referenced but not part of the graph.
    #[error("unknown functional unit {0}")]
    UnknownFunctionalUnit(FunctionalUnitId),

    /// Two functional units share the same identifier.
    #[error("functional unit {0} is defined more than once")]
    DuplicateFunctionalUnit(FunctionalUnitId),

    /// Two object nodes share the same identifier.
    #[error("object {0} is defined more than once")]
    DuplicateObject(ObjectId),

    /// A functional unit requires an object absent from the object table.
    #[error("functional unit {functional_unit} requires unknown object {object}")]
    UnknownObject {
        functional_unit: FunctionalUnitId,
        object: ObjectId,
    },

    /// Rollouts must be allowed at least one producer step.
    #[error("max steps must be at least 1")]
    InvalidMaxSteps,

    /// The UCB1 exploration factor is negative or not a number.
    #[error("exploration factor {0} must be a non-negative number")]
    InvalidExploration(f64),
}
