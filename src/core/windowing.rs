use crate::core::{DataPoint, TimeRange};

/// Returns points whose timestamp falls inside an inclusive time window.
///
/// `points` must be ascending by timestamp; the window is located by binary
/// search so live series with long histories stay cheap to slice.
#[must_use]
pub fn points_in_time_window(points: &[DataPoint], window: TimeRange) -> &[DataPoint] {
    let start = points.partition_point(|point| point.x < window.min());
    let end = points.partition_point(|point| point.x <= window.max());
    if start >= end {
        return &[];
    }
    &points[start..end]
}

#[cfg(test)]
mod tests {
    use super::points_in_time_window;
    use crate::core::{DataPoint, TimeRange};

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let points: Vec<DataPoint> = (0..10)
            .map(|i| DataPoint::new(i as f64 * 10.0, i as f64))
            .collect();
        let window = TimeRange::new(20.0, 50.0).expect("range");
        let visible = points_in_time_window(&points, window);
        assert_eq!(visible.len(), 4);
        assert_eq!(visible[0].x, 20.0);
        assert_eq!(visible[3].x, 50.0);
    }

    #[test]
    fn window_outside_data_is_empty() {
        let points = vec![DataPoint::new(0.0, 1.0), DataPoint::new(1.0, 2.0)];
        let window = TimeRange::new(5.0, 9.0).expect("range");
        assert!(points_in_time_window(&points, window).is_empty());
    }
}
