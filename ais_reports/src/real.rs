use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use vessel_estimation::evaluation::GroundTruth;
use vessel_estimation::state::{Report, ReportStream};

use crate::{ReportError, Trial, KNOTS_PER_MPS};

/// One row of a recorded trial: `epoch,mmsi,x,y,speed,course` with the position already
/// projected to metres, speed in knots and course in degrees.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
struct ReportRecord {
    epoch: i64,
    mmsi: u64,
    x: f64,
    y: f64,
    speed: f64,
    course: f64,
}

/// # Explanation
/// Reads a recorded trial from header-less CSV rows. When `mmsi` is given only the reports of
/// that vessel are kept. Rows that do not advance the clock are skipped with a warning, since
/// AIS receivers often log the same message twice.
///
/// # Returns
/// A trial whose ground truth is the report positions and whose origin is the epoch of the
/// first kept row.
pub fn read_trial<R: Read>(name: &str, reader: R, mmsi: Option<u64>) -> Result<Trial, ReportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut first_epoch: Option<i64> = None;
    let mut last_epoch = i64::MIN;
    let mut reports = Vec::new();

    for record in csv_reader.deserialize() {
        let record: ReportRecord = record?;
        if mmsi.map_or(false, |mmsi| mmsi != record.mmsi) {
            continue;
        }
        if record.epoch <= last_epoch {
            log::warn!(
                "Skipping report of {} at {}: not after the previous report at {}",
                record.mmsi,
                record.epoch,
                last_epoch
            );
            continue;
        }
        last_epoch = record.epoch;

        let origin = *first_epoch.get_or_insert(record.epoch);
        reports.push(Report::new(
            (record.epoch - origin) as f64,
            record.x,
            record.y,
            record.speed / KNOTS_PER_MPS,
            record.course,
        ));
    }

    let first_epoch = first_epoch.ok_or(ReportError::NoReports { mmsi })?;
    let origin: Option<DateTime<Utc>> = Utc.timestamp_opt(first_epoch, 0).single();
    let reports = ReportStream::new(reports)?;
    log::info!(
        "Read {} reports over {} s for trial {}",
        reports.len(),
        reports.duration(),
        name
    );

    Ok(Trial {
        name: name.to_string(),
        ground_truth: GroundTruth::from_reports(&reports),
        reports,
        origin,
    })
}

/// Reads a recorded trial from a file, named after the file stem.
pub fn read_trial_file<P: AsRef<Path>>(path: P, mmsi: Option<u64>) -> Result<Trial, ReportError> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("real");
    let file = File::open(path)?;
    read_trial(name, file, mmsi)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_VESSELS: &str = "\
1668592800,636018145,0.0,0.0,10.0,90.0
1668592803,111111111,500.0,500.0,3.0,180.0
1668592804,636018145,20.5,0.0,10.0,90.0
1668592804,636018145,20.5,0.0,10.0,90.0
1668592810,636018145,51.0,1.5,9.5,88.0
";

    #[test]
    fn test_read_filters_vessel() {
        let trial = read_trial("test", TWO_VESSELS.as_bytes(), Some(636018145)).unwrap();
        let reports = trial.reports.reports();
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[1].time, 4.0);
        assert_eq!(reports[2].time, 10.0);
        assert!((reports[0].speed - 10.0 / KNOTS_PER_MPS).abs() < 1e-12);
        assert_eq!(trial.ground_truth.x(), &[0.0, 20.5, 51.0]);
        assert_eq!(trial.origin.map(|origin| origin.timestamp()), Some(1668592800));
    }

    #[test]
    fn test_read_without_filter_keeps_all_vessels() {
        let trial = read_trial("test", TWO_VESSELS.as_bytes(), None).unwrap();
        assert_eq!(trial.reports.len(), 4);
    }

    #[test]
    fn test_unknown_vessel() {
        let result = read_trial("test", TWO_VESSELS.as_bytes(), Some(42));
        assert!(matches!(result, Err(ReportError::NoReports { mmsi: Some(42) })));
    }

    #[test]
    fn test_malformed_row() {
        let result = read_trial("test", "1668592800,1,0.0,zero,1.0,0.0\n".as_bytes(), None);
        assert!(matches!(result, Err(ReportError::Csv(_))));
    }
}
