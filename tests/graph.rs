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

use pid_scope::graph::*;

use approx::assert_relative_eq;
use std::time::Duration;

/// One row per 0.1V on an 80-row plot, so rows read straight off the values.
fn make_graph(width: u32) -> ScrollGraph<f64> {
    let config = GraphConfigBuilder::default()
        .width(width)
        .height(80)
        .volts_per_division(1.0)
        .build()
        .unwrap();
    ScrollGraph::new(config)
}

mod test_graph_config {

    use super::*;

    #[test]
    fn test_defaults() {
        let config = GraphConfig::<f64>::default();
        assert_eq!(config.width(), 320);
        assert_eq!(config.height(), 174);
        assert_eq!(config.volts_per_division(), 0.2);
        assert_eq!(config.tick_period(), Duration::from_millis(20));
        assert_eq!(config.jump_threshold(), 40);
        assert_eq!(config.gridline_spacing(), 50);
    }

    #[test]
    fn test_build_rejects_degenerate_geometry() {
        let build = |builder: GraphConfigBuilder<f64>| builder.build().map(|_| ());

        assert_eq!(
            build(GraphConfigBuilder::default().width(0)),
            Err(GraphConfigError::InvalidWidth)
        );
        assert_eq!(
            build(GraphConfigBuilder::default().height(0)),
            Err(GraphConfigError::InvalidHeight)
        );
        assert_eq!(
            build(GraphConfigBuilder::default().height(u32::MAX)),
            Err(GraphConfigError::InvalidHeight)
        );
        for it in [0.0, -0.2, f64::NAN, f64::INFINITY] {
            assert_eq!(
                build(GraphConfigBuilder::default().volts_per_division(it)),
                Err(GraphConfigError::InvalidVoltsPerDivision)
            );
        }
        assert_eq!(
            build(GraphConfigBuilder::default().gridline_spacing(0)),
            Err(GraphConfigError::InvalidGridlineSpacing)
        );
    }
}

mod test_row_mapping {

    use super::*;

    #[test]
    fn test_default_scale() {
        let graph = ScrollGraph::new(GraphConfig::<f64>::default());
        // 1V / 0.2V * 174 / 8 = 108.75
        assert_eq!(graph.row(1.0), 109);
        assert_eq!(graph.row(0.0), 0);
        assert_eq!(graph.row(1.6), 174);
    }

    #[test]
    fn test_out_of_range_values_clamp_to_edges() {
        let graph = make_graph(100);
        assert_eq!(graph.row(-3.0), 0);
        assert_eq!(graph.row(8.0), 80);
        assert_eq!(graph.row(1e12), 80);
        assert_eq!(graph.row(f64::NEG_INFINITY), 0);
        assert_eq!(graph.row(f64::NAN), 0);
    }

    #[test]
    fn test_rounding() {
        let graph = make_graph(100);
        assert_eq!(graph.row(1.04), 10);
        assert_eq!(graph.row(1.06), 11);
    }
}

mod test_scroll {

    use super::*;

    #[test]
    fn test_first_sample_primes_only() {
        let mut graph = make_graph(100);
        assert_eq!(graph.last_rows(), None);

        assert_eq!(graph.push_sample(1.0, 2.0, 3.0), None);
        assert_eq!(graph.cursor(), 0);
        assert_eq!(
            graph.last_rows(),
            Some(Rows {
                target: 10,
                input: 20,
                output: 30
            })
        );
    }

    #[test]
    fn test_segments_join_previous_rows() {
        let mut graph = make_graph(100);
        graph.push_sample(1.0, 2.0, 3.0);

        let draw = graph.push_sample(1.0, 2.5, 4.0).unwrap();
        assert_eq!(
            draw,
            DrawInstruction {
                column: 0,
                target: Segment::Line { from: 10, to: 10 },
                input: Segment::Line { from: 20, to: 25 },
                output: Segment::Line { from: 30, to: 40 },
                wrapped: false,
            }
        );
        assert_eq!(graph.cursor(), 1);

        let draw = graph.push_sample(0.5, 2.0, 3.0).unwrap();
        assert_eq!(draw.column, 1);
        assert_eq!(draw.target, Segment::Line { from: 10, to: 5 });
        assert_eq!(draw.input, Segment::Line { from: 25, to: 20 });
        assert_eq!(draw.output, Segment::Line { from: 40, to: 30 });
    }

    #[test]
    fn test_large_output_jump_draws_point() {
        let mut graph = make_graph(100);
        graph.push_sample(0.0, 0.0, 1.0);

        // 10 -> 60 exceeds the jump threshold
        let draw = graph.push_sample(0.0, 0.0, 6.0).unwrap();
        assert_eq!(draw.output, Segment::Point { row: 60 });

        // 60 -> 40 does not
        let draw = graph.push_sample(0.0, 0.0, 4.0).unwrap();
        assert_eq!(draw.output, Segment::Line { from: 60, to: 40 });

        // Exactly at the threshold still joins, and downward jumps count too
        let draw = graph.push_sample(0.0, 0.0, 0.0).unwrap();
        assert_eq!(draw.output, Segment::Line { from: 40, to: 0 });
        let draw = graph.push_sample(0.0, 0.0, 5.0).unwrap();
        assert_eq!(draw.output, Segment::Point { row: 50 });
        let draw = graph.push_sample(0.0, 0.0, 0.0).unwrap();
        assert_eq!(draw.output, Segment::Point { row: 0 });
    }

    #[test]
    fn test_jump_policy_applies_only_to_output() {
        let mut graph = make_graph(100);
        graph.push_sample(0.0, 0.0, 0.0);

        let draw = graph.push_sample(8.0, 8.0, 0.0).unwrap();
        assert_eq!(draw.target, Segment::Line { from: 0, to: 80 });
        assert_eq!(draw.input, Segment::Line { from: 0, to: 80 });
    }

    #[test]
    fn test_custom_jump_threshold() {
        let config = GraphConfigBuilder::default()
            .height(80)
            .volts_per_division(1.0)
            .jump_threshold(5)
            .build()
            .unwrap();
        let mut graph = ScrollGraph::new(config);
        graph.push_sample(0.0, 0.0, 1.0);
        let draw = graph.push_sample(0.0, 0.0, 1.6).unwrap();
        assert_eq!(draw.output, Segment::Point { row: 16 });
    }

    #[test]
    fn test_wrap_after_width_samples() {
        const WIDTH: u32 = 16;
        let mut graph = make_graph(WIDTH);
        graph.push_sample(0.0, 0.0, 0.0);

        for i in 0..WIDTH {
            let draw = graph.push_sample(1.0, 1.0, 1.0).unwrap();
            assert_eq!(draw.column, i);
            assert_eq!(draw.wrapped, i == WIDTH - 1);
        }
        assert_eq!(graph.cursor(), 0);

        // Drawing carries on from the left edge
        let draw = graph.push_sample(1.0, 1.0, 1.0).unwrap();
        assert_eq!(draw.column, 0);
        assert!(!draw.wrapped);
    }

    #[test]
    fn test_single_column_plot_wraps_every_sample() {
        let mut graph = make_graph(1);
        graph.push_sample(0.0, 0.0, 0.0);
        for _ in 0..5 {
            let draw = graph.push_sample(0.0, 0.0, 0.0).unwrap();
            assert_eq!(draw.column, 0);
            assert!(draw.wrapped);
        }
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn wraps_exactly_once_per_width(
            width in 1u32..400,
            samples in prop::collection::vec((-10.0..10.0f64, -10.0..10.0f64, -10.0..10.0f64), 1..4),
        ) {
            let mut graph = make_graph(width);
            prop_assert_eq!(graph.push_sample(0.0, 0.0, 0.0), None);

            let mut wraps = 0;
            for i in 0..width as usize {
                let (t, x, y) = samples[i % samples.len()];
                let draw = graph.push_sample(t, x, y).unwrap();
                prop_assert!(draw.column < width);
                wraps += usize::from(draw.wrapped);
            }
            prop_assert_eq!(wraps, 1);
            prop_assert_eq!(graph.cursor(), 0);
        }

        #[test]
        fn rows_stay_inside_plot(values in prop::collection::vec(prop::num::f64::ANY, 1..30)) {
            let mut graph = make_graph(8);
            for v in values {
                graph.push_sample(v, v, v);
                let rows = graph.last_rows().unwrap();
                for row in [rows.target, rows.input, rows.output] {
                    prop_assert!((0..=80).contains(&row));
                }
            }
        }
    }
}

mod test_gridlines {

    use super::*;

    #[test]
    fn test_voltage_gridlines() {
        let graph = ScrollGraph::new(GraphConfig::<f64>::default());
        let lines: Vec<_> = graph.voltage_gridlines().collect();

        assert_eq!(lines.len(), 4);
        let rows: Vec<_> = lines.iter().map(|l| l.row).collect();
        assert_eq!(rows, vec![43, 87, 130, 174]);
        for (line, volts) in lines.iter().zip([0.4, 0.8, 1.2, 1.6]) {
            assert_relative_eq!(line.volts, volts);
        }
    }

    #[test]
    fn test_time_gridlines() {
        let graph = ScrollGraph::new(GraphConfig::<f64>::default());
        let lines: Vec<_> = graph.time_gridlines().collect();

        let columns: Vec<_> = lines.iter().map(|l| l.column).collect();
        assert_eq!(columns, vec![50, 100, 150, 200, 250, 300]);

        let labelled: Vec<_> = lines
            .iter()
            .filter_map(|l| l.seconds.map(|s| (l.column, s)))
            .collect();
        assert_eq!(labelled.len(), 3);
        for ((column, seconds), (expected_column, expected_seconds)) in
            labelled.into_iter().zip([(100, 2.0), (200, 4.0), (300, 6.0)])
        {
            assert_eq!(column, expected_column);
            assert_relative_eq!(seconds, expected_seconds);
        }
    }

    #[test]
    fn test_narrow_plot_has_no_time_gridlines() {
        let graph = make_graph(50);
        assert_eq!(graph.time_gridlines().count(), 0);
    }
}
