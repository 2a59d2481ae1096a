// Plants driven by the regulator: a simulated first-order lag and a real sensor/actuator pair
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

use crate::cast;

/// Errors raised by a plant step. Both are recoverable: the tick is skipped and the previous
/// measurement and output stay valid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum PlantError {
    /// The acquisition channel is disabled.
    #[cfg_attr(feature = "std", error("Acquisition channel is unavailable"))]
    AcquisitionUnavailable,

    /// The acquisition channel produced no samples in the requested window.
    #[cfg_attr(feature = "std", error("Acquisition window holds no samples"))]
    NoSamples,
}

/// The process under control.
///
/// A plant consumes the latest controller output and returns the new process value. Which plant
/// drives the loop is chosen once, when the regulator is built.
pub trait Plant<F: Float> {
    /// Whether the plant can be stepped on this tick. A regulator skips the whole tick otherwise.
    fn is_ready(&self) -> bool {
        true
    }

    /// Applies `output` to the process and returns the measured process value.
    fn step(&mut self, output: F) -> Result<F, PlantError>;

    /// Returns the process to rest. Called by the regulator's reset command.
    fn reset(&mut self) {}
}

/// A simulated first-order lag, `1/(s+1)` discretized at the loop rate:
///
/// `level[n] = 0.9 * level[n-1] + 0.1 * output[n]`
///
/// Driven with a constant output `V`, the level converges geometrically to `V` with ratio 0.9
/// per tick.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SimulatedPlant<F> {
    level: F,
}

impl<F: Float> SimulatedPlant<F> {
    const RETENTION: f64 = 0.9;
    const GAIN: f64 = 0.1;

    /// Creates a plant resting at `level`.
    pub fn new(level: F) -> Self {
        Self { level }
    }

    /// The current process value.
    pub fn level(&self) -> F {
        self.level
    }
}

impl<F: Float> Plant<F> for SimulatedPlant<F> {
    fn step(&mut self, output: F) -> Result<F, PlantError> {
        let retention: F = cast(Self::RETENTION);
        let gain: F = cast(Self::GAIN);
        self.level = self.level * retention + output * gain;
        Ok(self.level)
    }

    fn reset(&mut self) {
        self.level = F::zero();
    }
}

/// Input channel of the acquisition front end.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Channel {
    /// First input channel.
    #[default]
    Ch1,
    /// Second input channel.
    Ch2,
}

/// The span of the acquisition buffer that statistics are computed over.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Window {
    /// Every sample in the buffer.
    #[default]
    All,
    /// `len` samples starting at `start`, truncated to the buffer.
    Range {
        /// Index of the first sample.
        start: usize,
        /// Number of samples.
        len: usize,
    },
}

impl Window {
    /// Returns the part of `samples` covered by this window.
    pub fn select<'a, T>(&self, samples: &'a [T]) -> &'a [T] {
        match *self {
            Window::All => samples,
            Window::Range { start, len } => {
                let start = start.min(samples.len());
                let end = start.saturating_add(len).min(samples.len());
                &samples[start..end]
            }
        }
    }
}

/// Summary statistics over an acquisition window.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Statistics<F> {
    /// Smallest sample.
    pub min: F,
    /// Largest sample.
    pub max: F,
    /// Arithmetic mean.
    pub avg: F,
    /// Root mean square.
    pub rms: F,
    /// `max - min`
    pub peak_to_peak: F,
    /// Number of samples in the window.
    pub count: usize,
}

impl<F: Float> Statistics<F> {
    /// Computes every statistic over `samples`. Returns `None` for an empty slice.
    pub fn from_samples(samples: &[F]) -> Option<Self> {
        let (&first, rest) = samples.split_first()?;

        let (min, max, sum, sum_sq) = rest.iter().fold(
            (first, first, first, first * first),
            |(min, max, sum, sum_sq), &x| (min.min(x), max.max(x), sum + x, sum_sq + x * x),
        );

        let n: F = cast(samples.len() as f64);
        Some(Statistics {
            min,
            max,
            avg: sum / n,
            rms: (sum_sq / n).sqrt(),
            peak_to_peak: max - min,
            count: samples.len(),
        })
    }
}

/// The acquisition front end a real plant reads its process value from.
pub trait Acquisition<F> {
    /// Whether the front end is currently acquiring.
    fn is_enabled(&self) -> bool;

    /// Computes statistics of `channel` over `window`, or `None` if the window is empty.
    fn read_statistics(&mut self, channel: Channel, window: Window) -> Option<Statistics<F>>;
}

/// The output stage a real plant drives, typically a DAC.
pub trait Actuator<F> {
    /// Converts an output in engineering units into a device code.
    fn calibrated_code(&self, value: F) -> u16;

    /// Writes a device code to the output stage.
    fn write(&mut self, code: u16);
}

/// Errors raised when building a [`CalibrationTable`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum CalibrationError {
    /// The table has no points.
    #[cfg_attr(feature = "std", error("Calibration table has no points"))]
    Empty,

    /// Values are not strictly ascending, or one of them is NaN.
    #[cfg_attr(
        feature = "std",
        error("Calibration points must be strictly ascending in value")
    )]
    Unsorted,
}

/// Piecewise-linear lookup from engineering units to device codes.
///
/// Values outside the table map to the code of the nearest end point.
#[derive(Copy, Clone, Debug)]
pub struct CalibrationTable<'a, F> {
    points: &'a [(F, u16)],
}

impl<'a, F: Float> CalibrationTable<'a, F> {
    /// Wraps `(value, code)` points sorted by strictly ascending value.
    pub fn new(points: &'a [(F, u16)]) -> Result<Self, CalibrationError> {
        if points.is_empty() {
            return Err(CalibrationError::Empty);
        }
        // NaN values fail the comparison as well
        if !points.windows(2).all(|w| w[0].0 < w[1].0) || points[0].0.is_nan() {
            return Err(CalibrationError::Unsorted);
        }
        Ok(Self { points })
    }

    /// The `(value, code)` points of the table.
    pub fn points(&self) -> &'a [(F, u16)] {
        self.points
    }

    /// Looks up the code for `value`. NaN maps to the lowest code.
    pub fn code(&self, value: F) -> u16 {
        let (Some(&(low, low_code)), Some(&(high, high_code))) =
            (self.points.first(), self.points.last())
        else {
            return 0;
        };

        if value.is_nan() || value <= low {
            return low_code;
        }
        if value >= high {
            return high_code;
        }

        for w in self.points.windows(2) {
            let ((v0, c0), (v1, c1)) = (w[0], w[1]);
            if value <= v1 {
                let c0f: F = cast(f64::from(c0));
                let c1f: F = cast(f64::from(c1));
                let t = (value - v0) / (v1 - v0);
                return (c0f + t * (c1f - c0f)).round().to_u16().unwrap_or(c0);
            }
        }
        high_code
    }
}

/// A physical process observed through an [`Acquisition`] front end and driven through an
/// [`Actuator`].
///
/// Each step reads the window average of the configured channel, then writes the calibrated code
/// of the controller output. A disabled front end or an empty window aborts the step before
/// anything is written.
#[derive(Debug)]
pub struct RealPlant<A, D> {
    acquisition: A,
    actuator: D,
    channel: Channel,
    window: Window,
}

impl<A, D> RealPlant<A, D> {
    /// Reads channel 1 over the whole buffer.
    pub fn new(acquisition: A, actuator: D) -> Self {
        Self {
            acquisition,
            actuator,
            channel: Channel::default(),
            window: Window::default(),
        }
    }

    /// Reads `channel` instead.
    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    /// Averages over `window` instead.
    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// The channel the process value is read from.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// The span the process value is averaged over.
    pub fn window(&self) -> Window {
        self.window
    }

    /// The acquisition front end.
    pub fn acquisition(&self) -> &A {
        &self.acquisition
    }

    /// The acquisition front end, mutably.
    pub fn acquisition_mut(&mut self) -> &mut A {
        &mut self.acquisition
    }

    /// The output stage.
    pub fn actuator(&self) -> &D {
        &self.actuator
    }

    /// The output stage, mutably.
    pub fn actuator_mut(&mut self) -> &mut D {
        &mut self.actuator
    }

    /// Releases the front end and the output stage.
    pub fn into_parts(self) -> (A, D) {
        (self.acquisition, self.actuator)
    }
}

impl<F, A, D> Plant<F> for RealPlant<A, D>
where
    F: Float,
    A: Acquisition<F>,
    D: Actuator<F>,
{
    fn is_ready(&self) -> bool {
        self.acquisition.is_enabled()
    }

    fn step(&mut self, output: F) -> Result<F, PlantError> {
        if !self.acquisition.is_enabled() {
            log::warn!("acquisition disabled, skipping plant step");
            return Err(PlantError::AcquisitionUnavailable);
        }

        let stats = self
            .acquisition
            .read_statistics(self.channel, self.window)
            .ok_or(PlantError::NoSamples)?;

        let code = self.actuator.calibrated_code(output);
        self.actuator.write(code);
        Ok(stats.avg)
    }
}
