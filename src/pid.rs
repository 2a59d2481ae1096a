// Discrete-time PID law with a dead-band integrator
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

use core::time::Duration;

use num_traits::Float;

use crate::cast;

/// Errors raised when validating a [`PidConfig`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum PidConfigError {
    /// The sample time is zero, so the integral and derivative terms would divide by zero.
    #[cfg_attr(feature = "std", error("Sample time must be greater than zero"))]
    InvalidSampleTime,

    /// The dead-band threshold is negative or NaN.
    #[cfg_attr(feature = "std", error("Dead-band epsilon must be non-negative"))]
    InvalidEpsilon,
}

/// Tuning parameters of the PID law.
///
/// Gains carry no inherent bounds and may be edited freely while the loop is running. The sample
/// time doubles as the tick period of the loop, so it is validated to be non-zero.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidConfig<F: Float> {
    /// Proportional gain.
    /// Defaults to 1.0.
    kp: F,

    /// Integral gain.
    /// Defaults to 0.0.
    ki: F,

    /// Derivative gain.
    /// Defaults to 0.0.
    kd: F,

    /// Sample interval of the loop.
    /// Defaults to 20ms.
    sample_time: Duration,

    /// `sample_time` in seconds, cached in the working float type.
    dt: F,

    /// Errors whose magnitude is at or below this threshold do not accumulate into the integral.
    /// Defaults to 0.01.
    epsilon: F,
}

impl<F: Float> Default for PidConfig<F> {
    fn default() -> Self {
        let sample_time = Duration::from_millis(20);
        PidConfig {
            kp: F::one(),
            ki: F::zero(),
            kd: F::zero(),
            sample_time,
            dt: cast(sample_time.as_secs_f64()),
            epsilon: cast(0.01),
        }
    }
}

impl<F: Float> PidConfig<F> {
    /// Returns the proportional gain.
    pub fn kp(&self) -> F {
        self.kp
    }

    /// Returns the integral gain.
    pub fn ki(&self) -> F {
        self.ki
    }

    /// Returns the derivative gain.
    pub fn kd(&self) -> F {
        self.kd
    }

    /// Convenience method that returns the proportional, integral, and derivative gains together as a tuple.
    pub fn gains(&self) -> (F, F, F) {
        (self.kp, self.ki, self.kd)
    }

    /// Returns the sample interval.
    pub fn sample_time(&self) -> Duration {
        self.sample_time
    }

    /// Returns the sample interval in seconds.
    pub fn dt(&self) -> F {
        self.dt
    }

    /// Returns the dead-band threshold of the integrator.
    pub fn epsilon(&self) -> F {
        self.epsilon
    }

    /// Sets the proportional gain.
    pub fn set_kp(&mut self, kp: F) {
        self.kp = kp;
    }

    /// Sets the integral gain.
    pub fn set_ki(&mut self, ki: F) {
        self.ki = ki;
    }

    /// Sets the derivative gain.
    pub fn set_kd(&mut self, kd: F) {
        self.kd = kd;
    }

    /// Convenience method to set the proportional, integral, and derivative gains together
    pub fn set_gains(&mut self, kp: F, ki: F, kd: F) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    /// Sets the sample interval.
    ///
    /// # Returns
    /// - `Err(PidConfigError::InvalidSampleTime)` if the interval is zero. The previous interval
    ///   is kept.
    pub fn set_sample_time(&mut self, sample_time: Duration) -> Result<(), PidConfigError> {
        self.dt = validate_sample_time(sample_time)?;
        self.sample_time = sample_time;
        Ok(())
    }

    /// Sets the dead-band threshold of the integrator.
    ///
    /// # Returns
    /// - `Err(PidConfigError::InvalidEpsilon)` if `epsilon` is negative or NaN.
    pub fn set_epsilon(&mut self, epsilon: F) -> Result<(), PidConfigError> {
        self.epsilon = validate_epsilon(epsilon)?;
        Ok(())
    }
}

fn validate_sample_time<F: Float>(sample_time: Duration) -> Result<F, PidConfigError> {
    num_traits::cast::<f64, F>(sample_time.as_secs_f64())
        .filter(|dt| dt.is_finite() && *dt > F::zero())
        .ok_or(PidConfigError::InvalidSampleTime)
}

fn validate_epsilon<F: Float>(epsilon: F) -> Result<F, PidConfigError> {
    if epsilon.is_nan() || epsilon < F::zero() {
        return Err(PidConfigError::InvalidEpsilon);
    }
    Ok(epsilon)
}

/// Builder for [`PidConfig`]. Validation is deferred to [`PidConfigBuilder::build`], so a
/// degenerate configuration never reaches a running controller.
#[derive(Copy, Clone, Debug)]
pub struct PidConfigBuilder<F: Float> {
    kp: F,
    ki: F,
    kd: F,
    sample_time: Duration,
    epsilon: F,
}

impl<F: Float> Default for PidConfigBuilder<F> {
    fn default() -> Self {
        let config = PidConfig::default();
        PidConfigBuilder {
            kp: config.kp,
            ki: config.ki,
            kd: config.kd,
            sample_time: config.sample_time,
            epsilon: config.epsilon,
        }
    }
}

impl<F: Float> PidConfigBuilder<F> {
    /// Sets the proportional gain.
    pub fn kp(mut self, kp: F) -> Self {
        self.kp = kp;
        self
    }

    /// Sets the integral gain.
    pub fn ki(mut self, ki: F) -> Self {
        self.ki = ki;
        self
    }

    /// Sets the derivative gain.
    pub fn kd(mut self, kd: F) -> Self {
        self.kd = kd;
        self
    }

    /// Sets the sample interval. Checked by [`PidConfigBuilder::build`].
    pub fn sample_time(mut self, sample_time: Duration) -> Self {
        self.sample_time = sample_time;
        self
    }

    /// Sets the dead-band threshold. Checked by [`PidConfigBuilder::build`].
    pub fn epsilon(mut self, epsilon: F) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Validates the parameters and produces the configuration.
    pub fn build(self) -> Result<PidConfig<F>, PidConfigError> {
        Ok(PidConfig {
            kp: self.kp,
            ki: self.ki,
            kd: self.kd,
            sample_time: self.sample_time,
            dt: validate_sample_time(self.sample_time)?,
            epsilon: validate_epsilon(self.epsilon)?,
        })
    }
}

/// The individual contributions of the three PID terms to the most recent output.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidTerms<F> {
    /// `kp * error`
    pub proportional: F,
    /// `ki * integral`
    pub integral: F,
    /// `kd * derivative`
    pub derivative: F,
}

/// Running state of the PID law.
///
/// Every field except the set point is written only by [`FuncPidController::compute`] and the
/// two reset steps.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PidContext<F> {
    target: F,
    current: F,
    output: F,
    error: F,
    integral: F,
    derivative: F,
}

impl<F: Float> PidContext<F> {
    /// Creates a zeroed context with a set point of 0.
    pub fn new() -> Self {
        Self {
            target: F::zero(),
            current: F::zero(),
            output: F::zero(),
            error: F::zero(),
            integral: F::zero(),
            derivative: F::zero(),
        }
    }

    /// Creates a context seeded with a set point
    pub fn with_target(target: F) -> Self {
        Self {
            target,
            ..Self::new()
        }
    }

    /// Returns the set point.
    pub fn target(&self) -> F {
        self.target
    }

    /// Changes the set point. Takes effect on the next computation.
    pub fn set_target(&mut self, target: F) {
        self.target = target;
    }

    /// The measured process value consumed by the most recent computation.
    pub fn current(&self) -> F {
        self.current
    }

    /// The control output of the most recent computation.
    pub fn output(&self) -> F {
        self.output
    }

    /// `target - current` as of the most recent computation.
    pub fn error(&self) -> F {
        self.error
    }

    /// Accumulated `error * dt` outside the dead band.
    pub fn integral(&self) -> F {
        self.integral
    }

    /// Backward difference of the error over one sample interval.
    pub fn derivative(&self) -> F {
        self.derivative
    }

    /// Clears the controller's memory: integral, derivative and error.
    ///
    /// `output` and `current` survive; use [`PidContext::clear_output`] as the second step of a
    /// full re-arm.
    pub fn reset(&mut self) {
        log::debug!("PID state reset");
        self.integral = F::zero();
        self.derivative = F::zero();
        self.error = F::zero();
    }

    /// Zeroes the last output and the last measured value.
    pub fn clear_output(&mut self) {
        self.output = F::zero();
        self.current = F::zero();
    }
}

/// A functional implementation of the PID law.
///
/// The controller holds only its configuration; the running state is passed in and returned with
/// each call to `compute`, which makes `compute` a pure function of `(context, target, measured)`.
#[derive(Copy, Clone, Debug)]
pub struct FuncPidController<F: Float> {
    config: PidConfig<F>,
}

/// A stateful implementation of the PID law that owns its [`PidContext`].
#[derive(Copy, Clone, Debug)]
pub struct PidController<F: Float> {
    ctx: PidContext<F>,
    controller: FuncPidController<F>,
}

impl<F: Float> FuncPidController<F> {
    /// Creates a controller with the given tuning.
    pub fn new(config: PidConfig<F>) -> Self {
        FuncPidController { config }
    }

    /// Returns the tuning parameters.
    pub fn config(&self) -> &PidConfig<F> {
        &self.config
    }

    /// Returns the tuning parameters for editing between computations.
    pub fn config_mut(&mut self) -> &mut PidConfig<F> {
        &mut self.config
    }

    /// Runs one tick of the PID law.
    ///
    /// The integral accumulates `error * dt` only while `|error| > epsilon`; the derivative is the
    /// backward difference of the error over one sample interval.
    ///
    /// # Arguments
    /// - `ctx`: The state left by the previous tick.
    /// - `target`: The set point.
    /// - `measured`: The process value. It is not clamped.
    ///
    /// # Returns
    /// The control output and the updated state.
    pub fn compute(&self, mut ctx: PidContext<F>, target: F, measured: F) -> (F, PidContext<F>) {
        let dt = self.config.dt;
        let error = target - measured;

        if error.abs() > self.config.epsilon {
            ctx.integral = ctx.integral + error * dt;
        }

        let derivative = (error - ctx.error) / dt;

        let output = self.config.kp * error
            + self.config.ki * ctx.integral
            + self.config.kd * derivative;

        ctx.target = target;
        ctx.current = measured;
        ctx.error = error;
        ctx.derivative = derivative;
        ctx.output = output;
        (output, ctx)
    }

    /// Splits the output held in `ctx` into its three terms using the current gains.
    pub fn terms(&self, ctx: &PidContext<F>) -> PidTerms<F> {
        PidTerms {
            proportional: self.config.kp * ctx.error,
            integral: self.config.ki * ctx.integral,
            derivative: self.config.kd * ctx.derivative,
        }
    }
}

impl<F: Float> PidController<F> {
    /// Creates a controller with a zeroed context.
    pub fn new(config: PidConfig<F>) -> Self {
        Self {
            ctx: PidContext::new(),
            controller: FuncPidController::new(config),
        }
    }

    /// Returns the tuning parameters.
    pub fn config(&self) -> &PidConfig<F> {
        &self.controller.config
    }

    /// Returns the tuning parameters for editing between updates.
    pub fn config_mut(&mut self) -> &mut PidConfig<F> {
        &mut self.controller.config
    }

    /// Returns the running state.
    pub fn context(&self) -> &PidContext<F> {
        &self.ctx
    }

    /// Runs one tick of the PID law and keeps the new state. See [`FuncPidController::compute`].
    pub fn update(&mut self, target: F, measured: F) -> F {
        let (output, ctx) = self.controller.compute(self.ctx, target, measured);
        self.ctx = ctx;
        output
    }

    /// See [`PidContext::target`].
    pub fn target(&self) -> F {
        self.ctx.target
    }

    /// See [`PidContext::set_target`].
    pub fn set_target(&mut self, target: F) {
        self.ctx.target = target;
    }

    /// See [`PidContext::current`].
    pub fn current(&self) -> F {
        self.ctx.current
    }

    /// See [`PidContext::output`].
    pub fn output(&self) -> F {
        self.ctx.output
    }

    /// See [`PidContext::error`].
    pub fn error(&self) -> F {
        self.ctx.error
    }

    /// See [`PidContext::integral`].
    pub fn integral(&self) -> F {
        self.ctx.integral
    }

    /// See [`PidContext::derivative`].
    pub fn derivative(&self) -> F {
        self.ctx.derivative
    }

    /// Splits the last output into its three terms.
    pub fn terms(&self) -> PidTerms<F> {
        self.controller.terms(&self.ctx)
    }

    /// See [`PidContext::reset`].
    pub fn reset(&mut self) {
        self.ctx.reset();
    }

    /// See [`PidContext::clear_output`].
    pub fn clear_output(&mut self) {
        self.ctx.clear_output();
    }
}
