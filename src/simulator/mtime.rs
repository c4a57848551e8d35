use crate::data::ordering::{sort_records, PHANTOM_POSITION};
use crate::data::{EventKind, Record, TimeRecord, Timed};

/// Insert phantom observations at forced sample times
///
/// `times` and `extra` are merged, sorted and de-duplicated, and non-finite
/// times are discarded. `records` must already be sorted by time; its first
/// and last record bound the times that are kept. A time at or below the first
/// record time is skipped, and the scan stops at the first time at or beyond
/// the last record time. Each kept time becomes a [EventKind::Phantom] record
/// excluded from the output, and the whole stream is re-sorted by time and
/// position.
///
/// With `debug` set, each boundary is reported once per call.
pub fn add_mtime(records: &mut Vec<Record>, times: &[f64], extra: &[f64], debug: bool) {
    if times.is_empty() && extra.is_empty() {
        return;
    }
    let (mintime, maxtime, id) = match (records.first(), records.last()) {
        (Some(first), Some(last)) => (first.time(), last.time(), first.record().id()),
        _ => return,
    };

    let screened = screen_times(times, extra, mintime, maxtime);
    if debug && screened.below {
        tracing::info!(mintime, "dropping mtimes <= min observation time");
    }
    if debug && screened.above {
        tracing::info!(maxtime, "dropping mtimes >= max observation time");
    }

    for time in screened.kept {
        let mut obs = TimeRecord::new(EventKind::Phantom, time, 0, PHANTOM_POSITION, id);
        obs.set_output(false);
        records.push(Record::Observation(obs));
    }

    sort_records(records);
}

/// Forced times that survive the stream bounds
#[derive(Debug, Default, PartialEq)]
struct Screened {
    kept: Vec<f64>,
    /// Some time fell at or below the first record
    below: bool,
    /// The scan stopped at a time at or beyond the last record
    above: bool,
}

fn screen_times(times: &[f64], extra: &[f64], mintime: f64, maxtime: f64) -> Screened {
    let mut merged: Vec<f64> = times
        .iter()
        .chain(extra.iter())
        .copied()
        .filter(|time| time.is_finite())
        .collect();
    merged.sort_by(|a, b| a.total_cmp(b));
    merged.dedup();

    let mut screened = Screened::default();
    for time in merged {
        if time <= mintime {
            screened.below = true;
            continue;
        }
        if time >= maxtime {
            screened.above = true;
            break;
        }
        screened.kept.push(time);
    }
    screened
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DoseEvent;

    fn stream() -> Vec<Record> {
        vec![
            DoseEvent::new(1, EventKind::Dose, 100.0, 0.0, 0.0, 0, 4.0).into(),
            TimeRecord::observation(24.0, 1, 1, 4.0).into(),
            TimeRecord::observation(100.0, 1, 2, 4.0).into(),
        ]
    }

    fn phantoms(records: &[Record]) -> Vec<f64> {
        records
            .iter()
            .filter(|r| r.kind() == EventKind::Phantom)
            .map(|r| r.time())
            .collect()
    }

    #[test]
    fn test_boundaries_are_excluded() {
        let mut records = stream();
        add_mtime(&mut records, &[-5.0, 0.0, 50.0, 100.0, 150.0], &[], true);
        assert_eq!(phantoms(&records), vec![50.0]);
        assert_eq!(records.len(), 4);

        let phantom = records.iter().find(|r| r.kind() == EventKind::Phantom).unwrap();
        assert!(!phantom.output());
        assert_eq!(phantom.pos(), PHANTOM_POSITION);
        assert_eq!(phantom.record().id(), 4.0);
    }

    #[test]
    fn test_merges_and_deduplicates() {
        let mut records = stream();
        add_mtime(&mut records, &[60.0, 12.0, 24.0], &[12.0, 36.0], false);
        assert_eq!(phantoms(&records), vec![12.0, 24.0, 36.0, 60.0]);
        let times: Vec<f64> = records.iter().map(|r| r.time()).collect();
        assert_eq!(times, vec![0.0, 12.0, 24.0, 24.0, 36.0, 60.0, 100.0]);
        // the phantom sorts ahead of the observation at the same time
        assert_eq!(records[2].kind(), EventKind::Phantom);
    }

    #[test]
    fn test_no_times_is_a_no_op() {
        let mut records = stream();
        let before = records.clone();
        add_mtime(&mut records, &[], &[], true);
        assert_eq!(records, before);
    }

    #[test]
    fn test_non_finite_times_are_discarded() {
        let mut records = stream();
        add_mtime(&mut records, &[f64::NAN, 50.0, f64::INFINITY], &[f64::NAN], true);
        let times: Vec<f64> = records.iter().map(|r| r.time()).collect();
        assert_eq!(times, vec![0.0, 24.0, 50.0, 100.0]);
    }

    #[test]
    fn test_each_boundary_is_flagged_once() {
        let screened = screen_times(&[-5.0, -1.0, 0.0, 40.0, 100.0, 150.0], &[200.0], 0.0, 100.0);
        assert_eq!(
            screened,
            Screened {
                kept: vec![40.0],
                below: true,
                above: true,
            }
        );

        let inside = screen_times(&[10.0, 20.0], &[], 0.0, 100.0);
        assert!(!inside.below && !inside.above);
        assert_eq!(inside.kept, vec![10.0, 20.0]);
    }

    #[test]
    fn test_empty_stream_is_left_alone() {
        let mut records = Vec::new();
        add_mtime(&mut records, &[1.0], &[], false);
        assert!(records.is_empty());
    }
}
