/*
 *  SPDX-License-Identifier: Apache-2.0 OR MIT
 *  © 2020-2022 ETH Zurich and other contributors, see AUTHORS.txt for details
 */

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::{Context, FunctionalUnitId, PlannerConfiguration, ProducerLookup};

/// How a single rollout ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RolloutOutcome {
    /// All inputs of the current functional unit are on hand.
    Success,
    /// Some inputs are missing but all of them are redundant containers.
    NoUnmetRequirement,
    /// The chosen missing object has no producer.
    NoProducer,
    /// The motion of the chosen producer failed.
    MotionFailure,
    /// The walk took the maximum number of steps.
    StepLimitReached,
}

impl RolloutOutcome {
    pub fn is_success(self) -> bool {
        self == RolloutOutcome::Success
    }
}

/// A bounded random walk down the producers of missing inputs.
///
/// Starting from a functional unit, each step picks uniformly one missing input, then uniformly
/// one of its producers, and samples the producer's motion. The walk succeeds as soon as all
/// inputs of the current unit are on hand, and fails at the first failed motion.
pub struct Rollout<'a> {
    ctx: Context<'a>,
    max_steps: u32,
}

impl<'a> Rollout<'a> {
    pub fn new(ctx: Context<'a>, max_steps: u32) -> Self {
        Self { ctx, max_steps }
    }

    /// Runs one rollout from `start`.
    ///
    /// Per step, the random draws are made in that order: missing input, producer, motion.
    pub fn run(&self, rng: &mut ChaCha8Rng, start: FunctionalUnitId) -> RolloutOutcome {
        let graph = self.ctx.graph;
        let mut current = graph.unit(start);
        let mut steps = 0;
        loop {
            if self.ctx.all_inputs_present(current) {
                log::trace!("✓ {} all inputs on hand after {} steps", current.id, steps);
                return RolloutOutcome::Success;
            }

            let unmet = self
                .ctx
                .unmet_requirements(current)
                .map(|input| input.id)
                .collect::<Vec<_>>();
            if unmet.is_empty() {
                log::trace!("! {} only redundant inputs are missing", current.id);
                return RolloutOutcome::NoUnmetRequirement;
            }

            let object = unmet[rng.gen_range(0..unmet.len())];
            let producer = match graph.producers(object) {
                ProducerLookup::Candidates(candidates) => {
                    candidates[rng.gen_range(0..candidates.len())]
                }
                ProducerLookup::NoProducer => {
                    log::trace!("! {} no producer for {}", current.id, object);
                    return RolloutOutcome::NoProducer;
                }
            };

            let success_rate = graph.unit_success_rate(producer);
            if !rng.gen_bool(success_rate) {
                log::trace!(
                    "! {} motion of {} failed (rate {})",
                    current.id,
                    producer,
                    success_rate
                );
                return RolloutOutcome::MotionFailure;
            }

            log::trace!("  {} produces {} for {}", producer, object, current.id);
            current = graph.unit(producer);
            steps += 1;
            if steps >= self.max_steps {
                log::trace!("! {} reached step limit {}", current.id, self.max_steps);
                return RolloutOutcome::StepLimitReached;
            }
        }
    }

    /// Runs `rollouts` independent rollouts from `start` and returns how many succeeded.
    pub fn simulate(&self, rng: &mut ChaCha8Rng, start: FunctionalUnitId, rollouts: u32) -> u32 {
        (0..rollouts)
            .filter(|_| self.run(rng, start).is_success())
            .count() as u32
    }
}

/// An estimator of how many of `rollouts` attempts at executing a functional unit succeed.
pub trait SuccessEstimator: Send {
    /// Estimates the number of successes among `rollouts` attempts, in `[0, rollouts]`.
    fn estimate(
        &mut self,
        rng: &mut ChaCha8Rng,
        config: &PlannerConfiguration,
        ctx: Context,
        functional_unit: FunctionalUnitId,
        rollouts: u32,
    ) -> u32;
}

/// MCTS default policy using simulation-based rollouts.
#[derive(Clone, Copy, Debug, Default)]
pub struct RolloutEstimator;
impl SuccessEstimator for RolloutEstimator {
    fn estimate(
        &mut self,
        rng: &mut ChaCha8Rng,
        config: &PlannerConfiguration,
        ctx: Context,
        functional_unit: FunctionalUnitId,
        rollouts: u32,
    ) -> u32 {
        let successes =
            Rollout::new(ctx, config.max_steps).simulate(rng, functional_unit, rollouts);
        log::debug!(
            "{}\tRollouts: {}/{} succeeded",
            functional_unit,
            successes,
            rollouts
        );
        successes
    }
}
