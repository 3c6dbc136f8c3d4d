//! Projection of relative polar traces into absolute plane coordinates.
//!
//! The service reports each gesture as turn/travel pairs relative to the
//! previous step. Rendering needs absolute positions, so the trace is folded
//! left to right with a running heading and position. Each output point
//! depends on every prior segment, so this is inherently sequential.

use crate::{Coordinate, Trace};

/// Project a trace onto the plane, anchored at `origin`.
///
/// The heading starts at zero and accumulates each segment's turn; the
/// position then steps `distance` along the accumulated heading. The X axis
/// is mirrored (`x -= cos(heading) * distance`) so that clockwise-positive
/// turns render as leftward drift, matching the service's coordinate frame.
///
/// The output has exactly one coordinate per segment; an empty trace yields
/// an empty sequence.
pub fn trace_to_coordinates(trace: &Trace, origin: Coordinate) -> Vec<Coordinate> {
    let mut heading = 0.0_f64;
    let mut position = origin;

    trace
        .points
        .iter()
        .map(|segment| {
            heading += segment.angle;
            position.x -= heading.cos() * segment.distance;
            position.y += heading.sin() * segment.distance;
            position
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Segment;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    const EPS: f64 = 1e-9;

    fn assert_close(a: Coordinate, b: Coordinate) {
        assert!(
            (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS,
            "expected {:?}, got {:?}",
            b,
            a
        );
    }

    #[test]
    fn test_empty_trace_yields_empty_output() {
        let coords = trace_to_coordinates(&Trace::empty(), Coordinate::new(100.0, 100.0));
        assert!(coords.is_empty());
    }

    #[test]
    fn test_output_length_matches_input_length() {
        for n in [1, 2, 7, 100] {
            let trace = Trace::new(vec![Segment::new(FRAC_PI_4, 2.0); n]);
            let coords = trace_to_coordinates(&trace, Coordinate::new(0.0, 0.0));
            assert_eq!(coords.len(), n);
        }
    }

    #[test]
    fn test_single_segment_sets_initial_heading() {
        // heading starts at 0, so the first segment's angle applies directly
        let origin = Coordinate::new(320.0, 240.0);
        let trace = Trace::new(vec![Segment::new(0.0, 10.0)]);
        let coords = trace_to_coordinates(&trace, origin);
        assert_close(coords[0], Coordinate::new(310.0, 240.0));

        let trace = Trace::new(vec![Segment::new(FRAC_PI_2, 10.0)]);
        let coords = trace_to_coordinates(&trace, origin);
        assert_close(coords[0], Coordinate::new(320.0, 250.0));
    }

    #[test]
    fn test_heading_accumulates_across_segments() {
        // Two quarter turns: first step goes +y, second (heading now pi) goes +x
        let trace = Trace::new(vec![
            Segment::new(FRAC_PI_2, 1.0),
            Segment::new(FRAC_PI_2, 1.0),
        ]);
        let coords = trace_to_coordinates(&trace, Coordinate::new(0.0, 0.0));

        assert_close(coords[0], Coordinate::new(0.0, 1.0));
        assert_close(coords[1], Coordinate::new(1.0, 1.0));
    }

    #[test]
    fn test_transform_is_deterministic() {
        let trace = Trace::new(vec![
            Segment::new(0.3, 5.0),
            Segment::new(-1.2, 2.5),
            Segment::new(2.8, 0.0),
            Segment::new(0.05, 14.0),
        ]);
        let origin = Coordinate::new(50.0, -20.0);

        let first = trace_to_coordinates(&trace, origin);
        let second = trace_to_coordinates(&trace, origin);
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_distance_segment_only_turns() {
        let trace = Trace::new(vec![
            Segment::new(FRAC_PI_2, 0.0),
            Segment::new(FRAC_PI_2, 3.0),
        ]);
        let coords = trace_to_coordinates(&trace, Coordinate::new(0.0, 0.0));

        assert_close(coords[0], Coordinate::new(0.0, 0.0));
        // heading is now pi: step goes straight +x
        assert_close(coords[1], Coordinate::new(3.0, 0.0));
    }
}
