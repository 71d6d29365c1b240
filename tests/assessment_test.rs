use std::collections::BTreeSet;
use std::fs;

use approx::assert_relative_eq;
use trackcheck_rs::assessment::{self, aggregate, reconstruct, summarize};
use trackcheck_rs::integration::{NoTranscode, OverlayRenderer, Session};
use trackcheck_rs::remap::{apply_batch, remap};
use trackcheck_rs::{
    ClassifierThresholds, DetectionTable, Error, ReconstructConfig, RemapRequest, SessionConfig,
};

const HEADER: &str = "frame,track_id,class_id,confidence,x1,y1,x2,y2\n";

fn table(body: &str) -> DetectionTable {
    DetectionTable::from_reader(format!("{HEADER}{body}").as_bytes()).unwrap()
}

#[test]
fn test_table_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracks.csv");
    let original = table(
        "2,1,0,0.9,10,10,20,20\n\
         0,1,0,0.8,8,10,18,20\n\
         2,-1,3,0.35,0,0,4,4\n",
    );

    trackcheck_rs::table::save(&original.to_frames(), &path).unwrap();
    let frames = trackcheck_rs::table::load(&path).unwrap();

    assert_eq!(frames.len(), 3);
    assert!(frames[1].is_empty());
    assert_eq!(frames, original.to_frames());
}

#[test]
fn test_full_precision_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracks.csv");
    let body = "0,1,0,0.8765432238578796,1234.56789,20.123456789,1300.987654321,80.5\n\
                1,1,0,0.30000001,1235.25,20.5,1301.25,81.125\n";
    fs::write(&path, format!("{HEADER}{body}")).unwrap();

    let loaded = DetectionTable::load(&path).unwrap();
    loaded.save(&path).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), format!("{HEADER}{body}"));
    assert_eq!(DetectionTable::load(&path).unwrap(), loaded);
}

#[test]
fn test_gap_counting() {
    // Frames 1, 2, 5, 6, 9: two breaks in continuity.
    let rec = reconstruct(
        &table(
            "1,4,0,0.9,0,0,10,10\n\
             2,4,0,0.9,0,0,10,10\n\
             5,4,0,0.9,0,0,10,10\n\
             6,4,0,0.9,0,0,10,10\n\
             9,4,0,0.9,0,0,10,10\n",
        )
        .to_frames(),
        &ReconstructConfig::default(),
    );
    let summary = summarize(&rec)[&4];

    assert_eq!(summary.gap_count, 2);
    assert_eq!((summary.start_frame, summary.end_frame), (1, 9));
    assert_eq!(summary.total_detections, 5);
}

#[test]
fn test_velocity_skips_gaps() {
    // Centers move 3-4-5 between frames 0 and 1, then jump across a gap.
    let rec = reconstruct(
        &table(
            "0,1,0,0.9,0,0,2,2\n\
             1,1,0,0.9,3,4,5,6\n\
             4,1,0,0.9,100,100,102,102\n",
        )
        .to_frames(),
        &ReconstructConfig::default(),
    );
    let samples = rec.track(1).unwrap().velocity_samples();

    assert_eq!(samples.len(), 1);
    assert_relative_eq!(samples[0], 5.0, epsilon = 1e-9);
}

#[test]
fn test_confidence_threshold_is_strict() {
    let frames = table(
        "0,1,0,0.3,0,0,1,1\n\
         1,1,0,0.31,0,0,1,1\n\
         1,2,0,0.3,0,0,1,1\n\
         2,3,0,0.30000001,0,0,1,1\n",
    )
    .to_frames();
    let rec = reconstruct(&frames, &ReconstructConfig { min_confidence: 0.3 });

    assert_eq!(rec.tracks().keys().copied().collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(rec.track(1).unwrap().detection_count(), 1);
}

#[test]
fn test_single_detection_track_has_zero_stability() {
    let rec = reconstruct(
        &table("3,8,0,0.9,0,0,10,10\n").to_frames(),
        &ReconstructConfig::default(),
    );
    let metrics = aggregate(&rec).unwrap();

    assert_eq!(metrics.total_tracks, 1);
    assert_eq!(metrics.avg_velocity_consistency, None);
    assert_eq!(metrics.avg_size_consistency, None);
    assert_eq!(metrics.avg_confidence_stability, None);
    assert_eq!(metrics.track_stability_score, 0.0);
}

#[test]
fn test_empty_table_cannot_be_aggregated() {
    let rec = reconstruct(
        &table("0,1,0,0.1,0,0,1,1\n").to_frames(),
        &ReconstructConfig::default(),
    );
    assert!(matches!(aggregate(&rec), Err(Error::EmptyInput)));
}

#[test]
fn test_merge_closes_fragmentation() {
    let t = table(
        "10,7,0,0.9,0,0,10,10\n\
         11,7,0,0.9,1,0,11,10\n\
         12,7,0,0.9,2,0,12,10\n\
         13,9,0,0.9,3,0,13,10\n\
         14,9,0,0.9,4,0,14,10\n",
    );
    let thresholds = ClassifierThresholds {
        min_duration: 4,
        ..Default::default()
    };

    let before = assessment::assess(&t.to_frames(), &ReconstructConfig::default(), &thresholds)
        .unwrap();
    assert_eq!(before.flagged, BTreeSet::from([7, 9]));

    let merged = apply_batch(&t, &[RemapRequest::new(9, 7)]);
    let after =
        assessment::assess(&merged.table.to_frames(), &ReconstructConfig::default(), &thresholds)
            .unwrap();

    assert_eq!(after.metrics.total_tracks, 1);
    assert_eq!(after.summaries[&7].gap_count, 0);
    assert_eq!(after.summaries[&7].duration(), 5);
    assert!(after.flagged.is_empty());
}

#[test]
fn test_noop_remap_leaves_file_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracks.csv");
    let t = table("0,1,0,0.9,0,0,1,1\n1,1,0,0.9,0,0,1,1\n");
    t.save(&path).unwrap();
    let bytes = fs::read(&path).unwrap();

    let outcome = remap(&DetectionTable::load(&path).unwrap(), 5, 1);
    assert!(outcome.is_noop());
    outcome.table.save(&path).unwrap();

    assert_eq!(fs::read(&path).unwrap(), bytes);
}

#[test]
fn test_session_review_flow() {
    let dir = tempfile::tempdir().unwrap();
    let table_path = dir.path().join("tracks.csv");
    let video_path = dir.path().join("clip.mp4");
    fs::write(
        &table_path,
        format!(
            "{HEADER}\
             0,1,0,0.9,0,0,10,10\n\
             1,1,0,0.9,1,0,11,10\n\
             3,2,0,0.9,3,0,13,10\n\
             4,2,0,0.9,4,0,14,10\n"
        ),
    )
    .unwrap();
    fs::write(&video_path, b"").unwrap();

    let mut session =
        Session::open(&table_path, Some(&video_path), SessionConfig::default()).unwrap();
    assert_eq!(session.edge_frames(), Some((vec![0, 3], vec![1, 4])));

    let update = session
        .apply_remaps(
            &[RemapRequest::new(2, 1), RemapRequest::new(6, 1)],
            &mut OverlayRenderer,
            &mut NoTranscode,
        )
        .unwrap();

    assert!(update.changed());
    assert_eq!(update.reports[1].rows_changed, 0);
    let artifact = update.artifact.unwrap();
    assert!(artifact.ends_with("clip_processed_r1.json"));
    assert!(artifact.exists());

    let assessment = session.assess().unwrap();
    assert_eq!(assessment.metrics.total_tracks, 1);
    assert_eq!(assessment.summaries[&1].gap_count, 1);
    assert_eq!(session.edge_frames(), Some((vec![0], vec![4])));

    // A fresh session sees the persisted correction.
    let reopened = Session::open(&table_path, None::<&str>, SessionConfig::default()).unwrap();
    assert_eq!(reopened.table(), session.table());
}
