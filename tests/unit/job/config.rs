use super::*;
use crate::media::probe::VideoMetadata;

const JOB: &str = r#"{
  "video_file": "run1.mp4",
  "output_path": "out/run1_overlay.mp4",
  "data_time_at_video_start": -1.0,
  "title": "Pressures",
  "ylabel": "Pressure (bar)",
  "ylim": [-30.0, 80.0],
  "slowmo_amount": 2.0,
  "compositor": { "hwaccel": "d3d11va" },
  "channels": [
    { "label": "PTX101", "time": [-1.0, 0.0, 1.0, 2.0], "data": [1.0, 2.0, 3.0, 4.0] },
    { "path": "ptx102.json" },
    { "path": "ptx103.json", "label": "Tank" }
  ]
}"#;

fn channel_file(name: &str) -> String {
    format!(r#"{{ "name": "{name}", "time": [0.0, 0.5, 1.0], "data": [5.0, 6.0, 7.0] }}"#)
}

fn write_job(dir: &Path) -> PathBuf {
    std::fs::write(dir.join("ptx102.json"), channel_file("PTX102")).unwrap();
    std::fs::write(dir.join("ptx103.json"), channel_file("PTX103")).unwrap();
    let p = dir.join("job.json");
    std::fs::write(&p, JOB).unwrap();
    p
}

#[test]
fn parses_with_defaults() {
    let job = JobFile::from_reader(JOB.as_bytes()).unwrap();
    assert_eq!(job.xlabel, "Time (seconds)");
    assert_eq!(job.ylim, Some((-30.0, 80.0)));
    assert_eq!(job.compositor.hwaccel.as_deref(), Some("d3d11va"));
    assert_eq!(job.compositor.input_rate, 60);
    assert_eq!(job.style, PlotStyle::default());
    assert_eq!(job.channels.len(), 3);
    job.validate().unwrap();
}

#[test]
fn unknown_fields_are_serde_errors() {
    let err = JobFile::from_reader(r#"{ "video": "a.mp4" }"#.as_bytes()).unwrap_err();
    assert!(matches!(err, OverplotError::Serde(_)));
}

#[test]
fn paths_resolve_against_the_job_file() {
    let dir = tempfile::tempdir().unwrap();
    let job = JobFile::from_path(write_job(dir.path())).unwrap();
    let opts = job.options();
    assert_eq!(opts.video_file, dir.path().join("run1.mp4"));
    assert_eq!(opts.output_path, dir.path().join("out/run1_overlay.mp4"));

    let channels = job.load_channels().unwrap();
    let labels: Vec<&str> = channels.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, ["PTX101", "PTX102", "Tank"]);
    assert_eq!(channels[1].data, vec![5.0, 6.0, 7.0]);
}

#[test]
fn into_job_with_metadata_registers_channels() {
    let dir = tempfile::tempdir().unwrap();
    let mut job = JobFile::from_path(write_job(dir.path())).unwrap();
    job.style.dpi = 30.0;
    let meta = VideoMetadata::new(10.0, 300, 160, 90).unwrap();
    let overlay = job.into_job_with_metadata(meta).unwrap();
    assert_eq!(overlay.channel_count(), 3);
    assert!((overlay.metadata().duration_sec - 5.0).abs() < 1e-12);
}

#[test]
fn validation_catches_bad_entries_before_probing() {
    let base = JobFile::from_reader(JOB.as_bytes()).unwrap();

    let mut job = base.clone();
    job.channels[0].data = Some(vec![1.0]);
    assert!(matches!(job.validate(), Err(OverplotError::Validation(_))));

    let mut job = base.clone();
    job.channels[1].time = Some(vec![0.0]);
    assert!(job.validate().is_err());

    let mut job = base.clone();
    job.channels[0].label = None;
    assert!(job.validate().is_err());

    let mut job = base.clone();
    job.channels.clear();
    assert!(job.validate().is_err());

    let mut job = base.clone();
    job.ylim = Some((5.0, 5.0));
    assert!(job.validate().is_err());

    let mut job = base.clone();
    job.slowmo_amount = Some(0.0);
    assert!(job.validate().is_err());

    let mut job = base;
    job.compositor.input_rate = 0;
    assert!(job.validate().is_err());
}

#[test]
fn into_job_rejects_missing_video() {
    let dir = tempfile::tempdir().unwrap();
    let job = JobFile::from_path(write_job(dir.path())).unwrap();
    let err = job.into_job().unwrap_err();
    assert!(matches!(err, OverplotError::Validation(_)));
}

#[test]
fn missing_channel_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("job.json");
    std::fs::write(&p, JOB).unwrap();
    let job = JobFile::from_path(&p).unwrap();
    assert!(job.load_channels().is_err());
}
