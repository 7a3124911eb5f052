//! End-to-end event scenarios for the capture orchestrator: marker ordering,
//! interleavings, legacy short-circuit, and warning-log behavior across a
//! whole browser job.

use std::sync::Arc;

use parking_lot::Mutex;
use video_capture_orchestrator::prelude::*;

type Markers = Arc<Mutex<Vec<String>>>;

fn marker_hooks(markers: &Markers) -> CaptureHooks {
    CaptureHooks {
        on_workspace_init_start: Some({
            let markers = Arc::clone(markers);
            Box::new(move || markers.lock().push("workspace-init-start".to_string()))
        }),
        on_workspace_ready: Some({
            let markers = Arc::clone(markers);
            Box::new(move |_| markers.lock().push("job-start-complete".to_string()))
        }),
        on_run_registered: Some({
            let markers = Arc::clone(markers);
            Box::new(move |_| markers.lock().push("run-created".to_string()))
        }),
        on_names_generated: Some({
            let markers = Arc::clone(markers);
            Box::new(move |_, _| markers.lock().push("name-generation-complete".to_string()))
        }),
    }
}

fn config_for(base: &std::path::Path) -> CaptureConfig {
    CaptureConfig {
        videos_base_path: base.to_path_buf(),
        ..Default::default()
    }
}

fn run_event(run_id: &str, legacy: bool) -> TestRunEvent {
    TestRunEvent {
        run_id: run_id.to_string(),
        legacy,
        index: Some(1),
        browser_connection: BrowserConnectionInfo {
            id: "connection-1".to_string(),
            supports_frame_data: true,
        },
        unresolved_placeholders: Vec::new(),
    }
}

#[test]
fn start_run_done_produces_exact_marker_order_and_one_record() {
    let base = tempfile::tempdir().unwrap();
    let markers: Markers = Arc::new(Mutex::new(Vec::new()));
    let mut orchestrator = CaptureOrchestrator::new(
        &config_for(base.path()),
        "job-1",
        shared_warning_log(),
        marker_hooks(&markers),
    );

    orchestrator.handle_event(JobEvent::Start).unwrap();
    orchestrator
        .handle_event(JobEvent::TestRunCreated(run_event("run-1", false)))
        .unwrap();
    orchestrator.handle_event(JobEvent::Done).unwrap();

    assert_eq!(
        markers.lock().as_slice(),
        [
            "workspace-init-start",
            "job-start-complete",
            "run-created",
            "name-generation-complete",
        ]
    );

    let records: Vec<&TestRunRecord> = orchestrator.registry().records().collect();
    assert_eq!(records.len(), 1);
    let video = records[0].temp_video_path.as_ref().unwrap();
    assert!(!video.as_os_str().is_empty());
    assert!(video.starts_with(base.path()));
}

#[test]
fn run_arriving_before_start_still_waits_for_workspace() {
    let base = tempfile::tempdir().unwrap();
    let markers: Markers = Arc::new(Mutex::new(Vec::new()));
    let mut orchestrator = CaptureOrchestrator::new(
        &config_for(base.path()),
        "job-1",
        shared_warning_log(),
        marker_hooks(&markers),
    );

    orchestrator
        .handle_event(JobEvent::TestRunCreated(run_event("run-1", false)))
        .unwrap();
    orchestrator.handle_event(JobEvent::Start).unwrap();
    orchestrator.handle_event(JobEvent::Done).unwrap();

    assert_eq!(
        markers.lock().as_slice(),
        [
            "run-created",
            "workspace-init-start",
            "job-start-complete",
            "name-generation-complete",
        ]
    );
}

#[test]
fn multiple_parked_runs_drain_in_arrival_order() {
    let base = tempfile::tempdir().unwrap();
    let generated: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let hooks = CaptureHooks {
        on_names_generated: Some({
            let generated = Arc::clone(&generated);
            Box::new(move |run_id, _| generated.lock().push(run_id.to_string()))
        }),
        ..Default::default()
    };
    let mut orchestrator = CaptureOrchestrator::new(
        &config_for(base.path()),
        "job-1",
        shared_warning_log(),
        hooks,
    );

    for id in ["run-1", "run-2", "run-3"] {
        orchestrator
            .handle_event(JobEvent::TestRunCreated(run_event(id, false)))
            .unwrap();
    }
    orchestrator.handle_event(JobEvent::Start).unwrap();

    assert_eq!(generated.lock().as_slice(), ["run-1", "run-2", "run-3"]);

    // Every run got distinct artifact names in the shared workspace.
    let videos: Vec<_> = orchestrator
        .registry()
        .records()
        .map(|r| r.temp_video_path.clone().unwrap())
        .collect();
    let unique: std::collections::HashSet<_> = videos.iter().collect();
    assert_eq!(unique.len(), videos.len());
}

#[test]
fn legacy_runs_are_invisible_to_registry_and_name_generator() {
    let base = tempfile::tempdir().unwrap();
    let markers: Markers = Arc::new(Mutex::new(Vec::new()));
    let warnings = shared_warning_log();
    let mut orchestrator = CaptureOrchestrator::new(
        &config_for(base.path()),
        "job-1",
        Arc::clone(&warnings),
        marker_hooks(&markers),
    );

    orchestrator.handle_event(JobEvent::Start).unwrap();
    orchestrator
        .handle_event(JobEvent::TestRunCreated(run_event("legacy-run", true)))
        .unwrap();
    orchestrator.handle_event(JobEvent::Done).unwrap();

    assert!(orchestrator.registry().is_empty());
    assert!(warnings.lock().is_empty());
    assert_eq!(
        markers.lock().as_slice(),
        ["workspace-init-start", "job-start-complete"],
        "no run markers for a legacy run"
    );
}

#[test]
fn channel_driven_job_on_a_worker_thread() {
    let base = tempfile::tempdir().unwrap();
    let config = config_for(base.path());
    let warnings = shared_warning_log();
    let mut orchestrator = CaptureOrchestrator::new(
        &config,
        "job-1",
        Arc::clone(&warnings),
        CaptureHooks::default(),
    );

    let (tx, rx) = crossbeam_channel::bounded::<JobEvent>(16);
    let worker = std::thread::Builder::new()
        .name("vco-orchestrator".to_string())
        .spawn(move || {
            orchestrator.run(&rx).unwrap();
            orchestrator
        })
        .unwrap();

    tx.send(JobEvent::Start).unwrap();
    let mut with_placeholders = run_event("run-1", false);
    with_placeholders.unresolved_placeholders =
        vec!["${TEST_INDEX}".to_string(), "${FIXTURE}".to_string()];
    tx.send(JobEvent::TestRunCreated(with_placeholders)).unwrap();
    tx.send(JobEvent::TestRunCreated(run_event("run-2", true)))
        .unwrap();
    tx.send(JobEvent::Done).unwrap();

    let orchestrator = worker.join().unwrap();

    assert_eq!(orchestrator.registry().len(), 1);
    let record = orchestrator.registry().get("run-1").unwrap();
    assert_eq!(record.state, RunState::Finalized);
    assert!(record.temp_video_path.is_some());

    let guard = warnings.lock();
    assert_eq!(guard.len(), 1);
    assert_eq!(
        guard.messages()[0],
        "The \"${TEST_INDEX}\", \"${FIXTURE}\" path pattern placeholders cannot be applied \
         to the recorded video.\n\nThe placeholders were replaced with an empty string."
    );
}

#[test]
fn two_jobs_share_nothing() {
    let base = tempfile::tempdir().unwrap();
    let config = config_for(base.path());

    let mut first = CaptureOrchestrator::new(
        &config,
        "job-a",
        shared_warning_log(),
        CaptureHooks::default(),
    );
    let mut second = CaptureOrchestrator::new(
        &config,
        "job-b",
        shared_warning_log(),
        CaptureHooks::default(),
    );

    first.handle_event(JobEvent::Start).unwrap();
    second.handle_event(JobEvent::Start).unwrap();
    first
        .handle_event(JobEvent::TestRunCreated(run_event("run-1", false)))
        .unwrap();
    second
        .handle_event(JobEvent::TestRunCreated(run_event("run-1", false)))
        .unwrap();

    let a = first.capture_plan("run-1").unwrap();
    let b = second.capture_plan("run-1").unwrap();
    assert_ne!(a.temp_video_path, b.temp_video_path);
}

#[test]
fn warning_log_survives_the_job_for_export() {
    let base = tempfile::tempdir().unwrap();
    let warnings = shared_warning_log();
    let mut orchestrator = CaptureOrchestrator::new(
        &config_for(base.path()),
        "job-1",
        Arc::clone(&warnings),
        CaptureHooks::default(),
    );

    orchestrator.handle_event(JobEvent::Start).unwrap();
    let mut event = run_event("run-1", false);
    event.unresolved_placeholders = vec!["${TEST_INDEX}".to_string()];
    orchestrator.handle_event(JobEvent::TestRunCreated(event)).unwrap();
    orchestrator.handle_event(JobEvent::Done).unwrap();

    let export = base.path().join("warnings.jsonl");
    warnings.lock().export_jsonl(&export).unwrap();

    let content = std::fs::read_to_string(&export).unwrap();
    assert_eq!(content.lines().count(), 1);
    let parsed: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
    assert!(
        parsed["message"]
            .as_str()
            .unwrap()
            .contains("path pattern placeholder")
    );
}
