#![warn(missing_docs)]

//! # PID Scope
//!
//! A tick-driven PID regulator for oscilloscope-class instruments. The same loop drives either a
//! simulated first-order plant or a physical process read through an acquisition front end and
//! driven through a calibrated output stage, and its signals are plotted on a scrolling strip
//! chart one pixel column per tick.
//!
//! ## Features
//!
//! - Discrete PID law with a fixed sample interval:
//!   - Dead-band integrator: errors within `epsilon` of zero do not accumulate.
//!   - Backward-difference derivative of the error.
//!   - Two-step reset: clearing the controller's memory and clearing its output are separate.
//!
//! - Plants behind one [`plant::Plant`] trait:
//!   - [`plant::SimulatedPlant`], a `1/(s+1)` lag discretized at the loop rate.
//!   - [`plant::RealPlant`], reading the window average of an acquisition channel and writing a
//!     calibrated device code. A disabled front end skips the tick instead of failing.
//!
//! - A strip chart that turns every sample into column-local draw segments, suppresses connecting
//!   lines across large output jumps, and signals when the cursor wraps.
//!
//! No drawing happens here; the display surface consumes [`graph::DrawInstruction`]s and the
//! controller state.
//!
//! ## Usage
//!
//! ### Functional PID Controller
//!
//! `compute` is functionally pure: the same context and inputs always give the same output and
//! next context.
//!
//! ```rust
//! use pid_scope::pid::{FuncPidController, PidConfigBuilder, PidContext};
//!
//! let config = PidConfigBuilder::default()
//!     .kp(2.0)
//!     .ki(0.5)
//!     .build()
//!     .expect("Invalid PID config");
//! let pid = FuncPidController::new(config);
//! let ctx = PidContext::<f64>::new();
//!
//! let (output, ctx) = pid.compute(ctx, 1.0, 0.25);
//! assert_eq!(ctx.output(), output);
//! ```
//!
//! ### Closing the loop
//!
//! ```rust
//! use pid_scope::graph::GraphConfig;
//! use pid_scope::pid::PidConfig;
//! use pid_scope::plant::SimulatedPlant;
//! use pid_scope::regulator::{Regulator, TickOutcome};
//!
//! let mut regulator = Regulator::new(
//!     PidConfig::<f32>::default(),
//!     GraphConfig::default(),
//!     SimulatedPlant::default(),
//! );
//! regulator.set_target(1.0);
//!
//! for _ in 0..100 {
//!     match regulator.tick() {
//!         TickOutcome::Updated { draw: Some(draw), .. } => {
//!             // hand `draw` to the display surface
//!             let _ = draw;
//!         }
//!         TickOutcome::Updated { .. } => {}
//!         TickOutcome::Skipped(reason) => panic!("unexpected skip: {:?}", reason),
//!     }
//! }
//! ```
//!
//! ## License
//!
#![no_std]

#[cfg(feature = "std")]
extern crate std;

use num_traits::Float;

/// The discrete PID law and its configuration.
pub mod pid;

/// Processes the regulator drives, simulated or real.
pub mod plant;

/// The scrolling strip chart.
pub mod graph;

/// The per-tick orchestrator tying controller, plant and chart together.
pub mod regulator;

/// Converts a literal into the working float type.
pub(crate) fn cast<F: Float>(value: f64) -> F {
    num_traits::cast(value).unwrap_or_else(F::nan)
}

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;
