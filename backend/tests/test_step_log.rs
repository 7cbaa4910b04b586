//! Step Log Tests
//!
//! A campaign written through the CSV sink, read back and summarised.

mod common;

use common::{catalog_of, cut_in_record, rear_end_record, PointMassSubstrate};
use cut_in_simulator_core_rs::metrics::summarize_step_log;
use cut_in_simulator_core_rs::orchestrator::{CampaignConfig, Orchestrator};
use cut_in_simulator_core_rs::sink::{read_step_log, CsvStepLog, StepSink, STEP_LOG_HEADER};
use std::fs::{self, File};

fn campaign_config(log_dir: &std::path::Path) -> CampaignConfig {
    let json = format!(
        r#"{{"scenario_path": "unused.csv", "episodes": 2, "log_dir": {:?}, "max_steps_per_episode": 10}}"#,
        log_dir.display().to_string()
    );
    CampaignConfig::from_json_str(&json).unwrap()
}

#[test]
fn test_campaign_writes_one_row_per_tick() {
    let dir = tempfile::tempdir().unwrap();
    let config = campaign_config(dir.path());
    let (sink, path, run_id) = config.open_step_log().unwrap();

    let mut orch = Orchestrator::new(
        config.orchestrator_config(),
        catalog_of(vec![cut_in_record(), rear_end_record()]),
        PointMassSubstrate::new(),
        sink,
    )
    .unwrap();
    let summary = orch.run_campaign(2).unwrap();
    drop(orch);

    assert_eq!(summary.total_steps, 11);
    assert!(path
        .to_string_lossy()
        .contains(&format!("testing_log_{}", run_id)));

    let text = fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some(STEP_LOG_HEADER.join(",").as_str()));
    assert_eq!(lines.count(), 11);

    let rows = read_step_log(File::open(&path).unwrap()).unwrap();
    assert_eq!(rows.iter().filter(|r| r.episode == 0).count(), 10);
    assert_eq!(rows.iter().filter(|r| r.episode == 1).count(), 1);
    assert!(rows.last().unwrap().crash);
}

#[test]
fn test_summaries_from_log_match_live_summaries() {
    let mut orch = Orchestrator::new(
        campaign_config(std::path::Path::new("unused")).orchestrator_config(),
        catalog_of(vec![cut_in_record(), rear_end_record()]),
        PointMassSubstrate::new(),
        CsvStepLog::new(Vec::new()).unwrap(),
    )
    .unwrap();

    let first = orch.run_episode().unwrap();
    let second = orch.run_episode().unwrap();

    let (_, _, sink) = orch.into_parts();
    let bytes = sink.into_inner().unwrap();
    let rows = read_step_log(bytes.as_slice()).unwrap();

    let summaries = summarize_step_log(&rows, None);
    assert_eq!(summaries[&0].steps, first.safety.steps);
    // Logged values carry 6 decimals
    let logged = summaries[&0].min_separation.unwrap();
    let live = first.safety.min_separation.unwrap();
    assert!((logged - live).abs() < 1e-6);
    assert_eq!(summaries[&1].first_collision_step, second.safety.first_collision_step);

    let only_second = summarize_step_log(&rows, Some(1));
    assert_eq!(only_second.len(), 1);
    assert!(only_second[&1].collided());
}

#[test]
fn test_step_sink_with_log_dir_writes_campaign_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut orch = Orchestrator::new(
        campaign_config(dir.path()).orchestrator_config(),
        catalog_of(vec![cut_in_record(), rear_end_record()]),
        PointMassSubstrate::new(),
        StepSink::open(Some(dir.path())).unwrap(),
    )
    .unwrap();

    orch.run_campaign(2).unwrap();

    assert!(orch.sink().records().is_empty());
    assert_eq!(orch.sink().rows_written(), 11);
    let path = orch.sink().path().unwrap().to_path_buf();
    assert!(path.starts_with(dir.path()));

    // Rows are flushed at each episode end
    let rows = read_step_log(File::open(&path).unwrap()).unwrap();
    assert_eq!(rows.len(), 11);
}

#[test]
fn test_step_sink_in_memory_drains_between_episodes() {
    let mut orch = Orchestrator::new(
        campaign_config(std::path::Path::new("unused")).orchestrator_config(),
        catalog_of(vec![cut_in_record(), rear_end_record()]),
        PointMassSubstrate::new(),
        StepSink::open(None).unwrap(),
    )
    .unwrap();

    orch.run_episode().unwrap();
    let first = orch.sink_mut().drain();
    orch.run_episode().unwrap();
    let second = orch.sink_mut().drain();

    assert_eq!(first.len(), 10);
    assert!(first.iter().all(|r| r.episode == 0));
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].episode, 1);
    assert!(orch.sink().records().is_empty());
    assert!(orch.sink().path().is_none());
}
