// Per-tick orchestration of controller, plant and strip chart
// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use num_traits::Float;

use crate::graph::{DrawInstruction, GraphConfig, ScrollGraph};
use crate::pid::{FuncPidController, PidConfig, PidConfigError, PidContext, PidTerms};
use crate::plant::{Plant, PlantError};

/// The page of the widget currently on screen.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum View {
    /// Block diagram annotated with gains and signals.
    #[default]
    Diagram,
    /// Table of every parameter and signal.
    Values,
    /// Scrolling strip chart. Only this view feeds the [`ScrollGraph`].
    Graph,
}

impl View {
    /// The view to the left, `None` at the leftmost one.
    pub fn previous(self) -> Option<View> {
        match self {
            View::Diagram => None,
            View::Values => Some(View::Diagram),
            View::Graph => Some(View::Values),
        }
    }

    /// The view to the right, `None` at the rightmost one.
    pub fn next(self) -> Option<View> {
        match self {
            View::Diagram => Some(View::Values),
            View::Values => Some(View::Graph),
            View::Graph => None,
        }
    }
}

/// Why a tick left every state untouched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The tick source is detached.
    Disabled,
    /// The plant could not be stepped.
    Plant(PlantError),
}

/// Result of one [`Regulator::tick`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TickOutcome<F> {
    /// Nothing changed.
    Skipped(SkipReason),
    /// Controller, plant and chart advanced by one tick.
    Updated {
        /// Control output applied to the plant.
        output: F,
        /// Process value the plant returned.
        measured: F,
        /// Present while the graph view is active and the chart is primed.
        draw: Option<DrawInstruction>,
    },
}

/// Closes the loop between a [`FuncPidController`] and a [`Plant`] once per tick and feeds the
/// resulting samples to a [`ScrollGraph`].
///
/// A tick either commits a full update of controller, plant and chart, or changes nothing. The
/// controller is the functional one so that a tick computes on a copy of the [`PidContext`] and
/// only commits it once the plant step succeeds.
///
/// The chart's tick period always equals the controller's sample time. Only the gains and the
/// dead band can be edited after construction.
#[derive(Debug)]
pub struct Regulator<F: Float, P> {
    controller: FuncPidController<F>,
    ctx: PidContext<F>,
    plant: P,
    graph: ScrollGraph<F>,
    measured: F,
    view: View,
    enabled: bool,
}

impl<F: Float, P: Plant<F>> Regulator<F, P> {
    /// Builds an enabled regulator on the diagram view.
    ///
    /// The tick period of `graph_config` is replaced by the sample time of `pid_config`.
    pub fn new(pid_config: PidConfig<F>, graph_config: GraphConfig<F>, plant: P) -> Self {
        let graph_config = graph_config.with_tick_period(pid_config.sample_time());
        Self {
            controller: FuncPidController::new(pid_config),
            ctx: PidContext::new(),
            plant,
            graph: ScrollGraph::new(graph_config),
            measured: F::zero(),
            view: View::default(),
            enabled: true,
        }
    }

    /// Runs one control period.
    ///
    /// The controller acts on the measurement taken during the previous tick; the plant then
    /// receives the new output and yields the measurement for the next one.
    pub fn tick(&mut self) -> TickOutcome<F> {
        if !self.enabled {
            return TickOutcome::Skipped(SkipReason::Disabled);
        }
        if !self.plant.is_ready() {
            log::debug!("plant not ready, tick skipped");
            return TickOutcome::Skipped(SkipReason::Plant(PlantError::AcquisitionUnavailable));
        }

        let (output, ctx) = self
            .controller
            .compute(self.ctx, self.ctx.target(), self.measured);

        let measured = match self.plant.step(output) {
            Ok(measured) => measured,
            Err(err) => {
                log::warn!("plant step failed, tick skipped: {:?}", err);
                return TickOutcome::Skipped(SkipReason::Plant(err));
            }
        };

        self.ctx = ctx;
        self.measured = measured;
        log::trace!("tick committed");

        let draw = match self.view {
            View::Graph => self.graph.push_sample(ctx.target(), measured, output),
            View::Diagram | View::Values => None,
        };

        TickOutcome::Updated {
            output,
            measured,
            draw,
        }
    }

    /// Re-arms the loop: clears the controller's memory, then its output and measurement, and
    /// returns the plant to rest.
    pub fn reset(&mut self) {
        log::debug!("regulator reset");
        self.ctx.reset();
        self.ctx.clear_output();
        self.measured = F::zero();
        self.plant.reset();
    }

    /// Stops mutating state on subsequent ticks.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Resumes ticking.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Whether ticks currently update state.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The view currently on screen.
    pub fn view(&self) -> View {
        self.view
    }

    /// Moves one view to the left. Returns `true` if the view changed and needs a full repaint.
    pub fn select_previous_view(&mut self) -> bool {
        self.select(self.view.previous())
    }

    /// Moves one view to the right. Returns `true` if the view changed and needs a full repaint.
    pub fn select_next_view(&mut self) -> bool {
        self.select(self.view.next())
    }

    fn select(&mut self, view: Option<View>) -> bool {
        match view {
            Some(view) => {
                self.view = view;
                true
            }
            None => false,
        }
    }

    /// The set point.
    pub fn target(&self) -> F {
        self.ctx.target()
    }

    /// Changes the set point. Takes effect on the next tick.
    pub fn set_target(&mut self, target: F) {
        self.ctx.set_target(target);
    }

    /// The latest process value returned by the plant.
    pub fn measured(&self) -> F {
        self.measured
    }

    /// The control output of the last committed tick.
    pub fn output(&self) -> F {
        self.ctx.output()
    }

    /// The controller state of the last committed tick.
    pub fn context(&self) -> &PidContext<F> {
        &self.ctx
    }

    /// The last output split into its three terms.
    pub fn terms(&self) -> PidTerms<F> {
        self.controller.terms(&self.ctx)
    }

    /// The tuning parameters.
    pub fn config(&self) -> &PidConfig<F> {
        self.controller.config()
    }

    /// Sets the proportional gain. Takes effect on the next tick.
    pub fn set_kp(&mut self, kp: F) {
        self.controller.config_mut().set_kp(kp);
    }

    /// Sets the integral gain. Takes effect on the next tick.
    pub fn set_ki(&mut self, ki: F) {
        self.controller.config_mut().set_ki(ki);
    }

    /// Sets the derivative gain. Takes effect on the next tick.
    pub fn set_kd(&mut self, kd: F) {
        self.controller.config_mut().set_kd(kd);
    }

    /// Sets all three gains. Takes effect on the next tick.
    pub fn set_gains(&mut self, kp: F, ki: F, kd: F) {
        self.controller.config_mut().set_gains(kp, ki, kd);
    }

    /// Sets the dead-band threshold of the integrator. See [`PidConfig::set_epsilon`].
    pub fn set_epsilon(&mut self, epsilon: F) -> Result<(), PidConfigError> {
        self.controller.config_mut().set_epsilon(epsilon)
    }

    /// The plant under control.
    pub fn plant(&self) -> &P {
        &self.plant
    }

    /// The plant under control, mutably.
    pub fn plant_mut(&mut self) -> &mut P {
        &mut self.plant
    }

    /// The strip chart.
    pub fn graph(&self) -> &ScrollGraph<F> {
        &self.graph
    }
}
