// Strip-chart engine mapping the per-tick samples onto a fixed-width pixel buffer
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

/// Number of vertical divisions spanned by the plot area.
const DIVISIONS: f64 = 8.0;

/// Number of horizontal voltage gridlines, the top edge included.
const VOLTAGE_GRIDLINES: u32 = 4;

/// Errors raised when validating a [`GraphConfig`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum GraphConfigError {
    /// The plot is zero columns wide.
    #[cfg_attr(feature = "std", error("Plot width must be greater than zero"))]
    InvalidWidth,

    /// The plot is zero rows tall, or too tall to address with an `i32` row.
    #[cfg_attr(feature = "std", error("Plot height must be greater than zero"))]
    InvalidHeight,

    /// Volts per division is zero, negative or not finite.
    #[cfg_attr(
        feature = "std",
        error("Volts per division must be positive and finite")
    )]
    InvalidVoltsPerDivision,

    /// Vertical gridlines would be zero columns apart.
    #[cfg_attr(feature = "std", error("Gridline spacing must be greater than zero"))]
    InvalidGridlineSpacing,
}

/// Geometry and scale of the strip chart.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GraphConfig<F: Float> {
    /// Plot width in pixels; one column per tick.
    /// Defaults to 320.
    width: u32,

    /// Plot height in pixels.
    /// Defaults to 174.
    height: u32,

    /// Vertical scale. The plot spans eight divisions.
    /// Defaults to 0.2 V.
    volts_per_division: F,

    /// Time represented by one column.
    /// Defaults to 20ms.
    tick_period: Duration,

    /// Output steps larger than this many rows are drawn as a point instead of a line.
    /// Defaults to 40.
    jump_threshold: u32,

    /// Columns between vertical gridlines.
    /// Defaults to 50.
    gridline_spacing: u32,
}

impl<F: Float> Default for GraphConfig<F> {
    fn default() -> Self {
        GraphConfig {
            width: 320,
            height: 174,
            volts_per_division: cast(0.2),
            tick_period: Duration::from_millis(20),
            jump_threshold: 40,
            gridline_spacing: 50,
        }
    }
}

impl<F: Float> GraphConfig<F> {
    /// Plot width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Plot height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Volts spanned by one of the eight vertical divisions.
    pub fn volts_per_division(&self) -> F {
        self.volts_per_division
    }

    /// Time represented by one column.
    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    /// Largest output step, in rows, still drawn as a line.
    pub fn jump_threshold(&self) -> u32 {
        self.jump_threshold
    }

    /// Columns between vertical gridlines.
    pub fn gridline_spacing(&self) -> u32 {
        self.gridline_spacing
    }

    /// Returns a copy whose columns are `tick_period` apart. Every other field is kept.
    pub fn with_tick_period(mut self, tick_period: Duration) -> Self {
        self.tick_period = tick_period;
        self
    }
}

/// Builder for [`GraphConfig`].
#[derive(Copy, Clone, Debug)]
pub struct GraphConfigBuilder<F: Float> {
    width: u32,
    height: u32,
    volts_per_division: F,
    tick_period: Duration,
    jump_threshold: u32,
    gridline_spacing: u32,
}

impl<F: Float> Default for GraphConfigBuilder<F> {
    fn default() -> Self {
        let config = GraphConfig::default();
        GraphConfigBuilder {
            width: config.width,
            height: config.height,
            volts_per_division: config.volts_per_division,
            tick_period: config.tick_period,
            jump_threshold: config.jump_threshold,
            gridline_spacing: config.gridline_spacing,
        }
    }
}

impl<F: Float> GraphConfigBuilder<F> {
    /// Sets the plot width in pixels.
    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Sets the plot height in pixels.
    pub fn height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    /// Sets the volts spanned by one vertical division.
    pub fn volts_per_division(mut self, volts_per_division: F) -> Self {
        self.volts_per_division = volts_per_division;
        self
    }

    /// Sets the time represented by one column.
    pub fn tick_period(mut self, tick_period: Duration) -> Self {
        self.tick_period = tick_period;
        self
    }

    /// Sets the largest output step, in rows, still drawn as a line.
    pub fn jump_threshold(mut self, jump_threshold: u32) -> Self {
        self.jump_threshold = jump_threshold;
        self
    }

    /// Sets the number of columns between vertical gridlines.
    pub fn gridline_spacing(mut self, gridline_spacing: u32) -> Self {
        self.gridline_spacing = gridline_spacing;
        self
    }

    /// Validates the geometry and scale.
    pub fn build(self) -> Result<GraphConfig<F>, GraphConfigError> {
        if self.width == 0 {
            return Err(GraphConfigError::InvalidWidth);
        }
        // Rows are i32 so the height must fit as well
        if self.height == 0 || i32::try_from(self.height).is_err() {
            return Err(GraphConfigError::InvalidHeight);
        }
        if !(self.volts_per_division.is_finite() && self.volts_per_division > F::zero()) {
            return Err(GraphConfigError::InvalidVoltsPerDivision);
        }
        if self.gridline_spacing == 0 {
            return Err(GraphConfigError::InvalidGridlineSpacing);
        }

        Ok(GraphConfig {
            width: self.width,
            height: self.height,
            volts_per_division: self.volts_per_division,
            tick_period: self.tick_period,
            jump_threshold: self.jump_threshold,
            gridline_spacing: self.gridline_spacing,
        })
    }
}

/// One channel's mark in a single column. Rows count up from the bottom edge of the plot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// A vertical line joining the previous row to the new one.
    Line {
        /// Row of the previous sample.
        from: i32,
        /// Row of the new sample.
        to: i32,
    },
    /// A lone pixel at the new row.
    Point {
        /// Row of the new sample.
        row: i32,
    },
}

/// What the display surface must draw for one sample.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DrawInstruction {
    /// Column the three segments are drawn in.
    pub column: u32,
    /// Setpoint trace.
    pub target: Segment,
    /// Measured process value trace.
    pub input: Segment,
    /// Controller output trace.
    pub output: Segment,
    /// The cursor ran off the right edge and went back to column 0; the plot must be redrawn
    /// from scratch.
    pub wrapped: bool,
}

/// Plotted rows of one sample.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rows {
    /// Row of the setpoint.
    pub target: i32,
    /// Row of the measured process value.
    pub input: i32,
    /// Row of the controller output.
    pub output: i32,
}

/// A horizontal gridline and the voltage it marks.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VoltageGridline<F> {
    /// Row the gridline is drawn at.
    pub row: i32,
    /// Voltage printed next to the gridline.
    pub volts: F,
}

/// A vertical gridline, labelled with its elapsed time on every other line.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimeGridline<F> {
    /// Column the gridline is drawn at.
    pub column: u32,
    /// Elapsed time at this column, `None` on unlabelled lines.
    pub seconds: Option<F>,
}

/// Rolling one-pixel-per-tick plot of target, input and output.
///
/// The three channels share one cursor. The first sample only primes the previous rows; each
/// later sample yields a [`DrawInstruction`] for the cursor column and advances the cursor,
/// wrapping to column 0 at the right edge.
#[derive(Copy, Clone, Debug)]
pub struct ScrollGraph<F: Float> {
    config: GraphConfig<F>,
    cursor: u32,
    prev: Option<Rows>,
}

impl<F: Float> ScrollGraph<F> {
    /// Creates an empty chart with the cursor at column 0.
    pub fn new(config: GraphConfig<F>) -> Self {
        Self {
            config,
            cursor: 0,
            prev: None,
        }
    }

    /// Geometry and scale the chart was built with.
    pub fn config(&self) -> &GraphConfig<F> {
        &self.config
    }

    /// Column the next segment lands in.
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Rows of the last pushed sample, `None` before the first one.
    pub fn last_rows(&self) -> Option<Rows> {
        self.prev
    }

    /// Maps a value in volts to a row, clamped to `[0, height]`.
    ///
    /// Out-of-range values sit flush against the edge; NaN lands on row 0.
    pub fn row(&self, value: F) -> i32 {
        let height: F = cast(f64::from(self.config.height));
        let divisions: F = cast(DIVISIONS);
        (value / self.config.volts_per_division * height / divisions)
            .round()
            .max(F::zero())
            .min(height)
            .to_i32()
            .unwrap_or(0)
    }

    /// Plots one sample.
    ///
    /// # Returns
    /// `None` for the priming sample, otherwise the segments to draw at the pre-advance cursor.
    pub fn push_sample(&mut self, target: F, input: F, output: F) -> Option<DrawInstruction> {
        let rows = Rows {
            target: self.row(target),
            input: self.row(input),
            output: self.row(output),
        };

        let prev = self.prev.replace(rows)?;

        let output = if rows.output.abs_diff(prev.output) > self.config.jump_threshold {
            Segment::Point { row: rows.output }
        } else {
            Segment::Line {
                from: prev.output,
                to: rows.output,
            }
        };

        let column = self.cursor;
        self.cursor += 1;
        let wrapped = self.cursor >= self.config.width;
        if wrapped {
            log::debug!("strip chart wrapped after {} columns", self.config.width);
            self.cursor = 0;
        }

        Some(DrawInstruction {
            column,
            target: Segment::Line {
                from: prev.target,
                to: rows.target,
            },
            input: Segment::Line {
                from: prev.input,
                to: rows.input,
            },
            output,
            wrapped,
        })
    }

    /// Horizontal gridlines at each quarter of the plot height, bottom to top.
    pub fn voltage_gridlines(&self) -> impl Iterator<Item = VoltageGridline<F>> {
        let height = u64::from(self.config.height);
        let volts_per_division = self.config.volts_per_division;
        (1..=VOLTAGE_GRIDLINES).map(move |i| {
            let row = height * u64::from(i) / u64::from(VOLTAGE_GRIDLINES);
            let level: F = cast(f64::from(i) * 2.0);
            VoltageGridline {
                // height fits in i32, see GraphConfigBuilder::build
                row: i32::try_from(row).unwrap_or(i32::MAX),
                volts: volts_per_division * level,
            }
        })
    }

    /// Vertical gridlines every `gridline_spacing` columns, column 0 excluded.
    pub fn time_gridlines(&self) -> impl Iterator<Item = TimeGridline<F>> {
        let tick: F = cast(self.config.tick_period.as_secs_f64());
        let spacing = self.config.gridline_spacing;
        (1..)
            .map(move |index: u32| (index, index.saturating_mul(spacing)))
            .take_while({
                let width = self.config.width;
                move |&(_, column)| column < width
            })
            .map(move |(index, column)| {
                let elapsed: F = cast(f64::from(column));
                TimeGridline {
                    column,
                    seconds: (index % 2 == 0).then(|| tick * elapsed),
                }
            })
    }
}
