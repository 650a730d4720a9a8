use itertools::Itertools;
use tracing::debug;

use crate::model::{AnimationLog, CombinedSeries, FramePoint};

/// Expands `combined` into growing-prefix frames, one per unique timestamp.
///
/// Frame `i` holds every point at or before the i-th unique timestamp, so the
/// log grows quadratically with the number of timestamps. Each frame is
/// self-contained, which is what a client-side player that replaces the whole
/// trace per frame expects.
pub fn expand(combined: &CombinedSeries) -> AnimationLog {
    let points = combined.points();
    let cutoffs = points
        .iter()
        .map(|p| p.timestamp)
        .sorted()
        .dedup()
        .collect_vec();

    let mut entries = Vec::new();

    for (frame, cutoff) in cutoffs.iter().enumerate() {
        // CombinedSeries is always sorted, so the frame is a prefix
        let end = points.partition_point(|p| p.timestamp <= *cutoff);

        entries.extend(points[..end].iter().map(|point| FramePoint {
            frame,
            point: point.clone(),
        }));
    }

    debug!(
        frames = cutoffs.len(),
        entries = entries.len(),
        "expanded animation frames"
    );

    AnimationLog {
        frame_count: cutoffs.len(),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use itertools::Itertools;

    use super::expand;
    use crate::{
        builder::build,
        model::{CombinedSeries, PricePoint},
    };

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn plain(points: &[crate::model::FramePoint]) -> Vec<PricePoint> {
        points.iter().map(|e| e.point.clone()).collect()
    }

    #[test]
    fn unittest_single_instrument_frames() -> eyre::Result<()> {
        let series = build(&[100.0, 110.0, 90.0], "A", start(), Duration::days(1))?;
        let log = expand(&CombinedSeries::merge([&series]));

        assert_eq!(log.frame_count, 3);
        assert_eq!(log.frame_sizes(), vec![1, 2, 3]);
        assert_eq!(log.len(), 6);
        assert_eq!(plain(log.frame(2)), series.points().to_vec());

        Ok(())
    }

    #[test]
    fn unittest_two_instruments_share_frames() -> eyre::Result<()> {
        let a = build(&[1.0, 2.0, 3.0], "A", start(), Duration::days(1))?;
        let b = build(&[10.0, 20.0], "B", start() + Duration::days(1), Duration::days(1))?;
        let combined = CombinedSeries::merge([&a, &b]);
        let log = expand(&combined);

        // unique days: 01, 02, 03
        assert_eq!(log.frame_count, 3);
        assert_eq!(log.frame_sizes(), vec![1, 3, 5]);

        for (prev, next) in (0..log.frame_count).tuple_windows() {
            let prev = plain(log.frame(prev));
            let next = plain(log.frame(next));
            assert_eq!(next[..prev.len()], prev[..]);
        }

        assert_eq!(plain(log.frame(2)), combined.points().to_vec());
        assert!(log.entries().iter().all(|e| e.frame < log.frame_count));

        Ok(())
    }

    #[test]
    fn unittest_expand_is_deterministic() -> eyre::Result<()> {
        let a = build(&[5.0, 4.0, 6.0, 7.0], "A", start(), Duration::days(1))?;
        let b = build(&[1.0, 1.5, 2.0, 2.5], "B", start(), Duration::days(1))?;
        let combined = CombinedSeries::merge([&a, &b]);

        assert_eq!(expand(&combined), expand(&combined));

        Ok(())
    }

    #[test]
    fn unittest_deserialized_points_are_sorted() -> eyre::Result<()> {
        let series = build(&[1.0, 2.0, 3.0], "A", start(), Duration::days(1))?;
        let shuffled = [2, 0, 1].map(|ix| series.points()[ix].clone());

        let json = serde_json::to_string(&shuffled)?;
        let combined: CombinedSeries = serde_json::from_str(&json)?;
        assert_eq!(combined.points(), series.points());

        let log = expand(&combined);
        assert_eq!(log.frame_sizes(), vec![1, 2, 3]);
        assert_eq!(plain(log.frame(0)), vec![series.points()[0].clone()]);

        Ok(())
    }

    #[test]
    fn unittest_boundary_inputs() -> eyre::Result<()> {
        let empty = expand(&CombinedSeries::default());
        assert_eq!(empty.frame_count, 0);
        assert!(empty.is_empty());
        assert!(empty.frame(0).is_empty());

        let one = build(&[7.0], "A", start(), Duration::days(1))?;
        let log = expand(&CombinedSeries::merge([&one]));
        assert_eq!(log.frame_count, 1);
        assert_eq!(log.frame_sizes(), vec![1]);

        Ok(())
    }
}
