//! Session behavior against a real (in-memory) store.
//!
//! Every failure path must leave the working set exactly as it was.

use mindease_core::{
    config::DashboardConfig,
    error::MindError,
    event::IngestSource,
    notification::{SwapConfirmation, SwapDispatcher, SwapNotification, SWAP_SUBJECT},
    remote::Prediction,
    scoring::StressLevel,
    session::DashboardSession,
    store::DashboardStore,
};
use std::cell::RefCell;

const ROSTER: &str = "\
employee_id,name,avg_hours,error_rate,night_shifts,login_count,task_count,patients_handled,shift
C1,Dr. Kim,12,10,5,100,150,50,Night-1
W1,Nurse Bell,6,5,2,50,75,25,Evening
H1,Nurse Ortiz,0,0,0,0,0,0,Day-A
";

#[derive(Default)]
struct RecordingDispatcher {
    sent: RefCell<Vec<(SwapNotification, SwapConfirmation)>>,
}

impl SwapDispatcher for RecordingDispatcher {
    fn dispatch(&self, notification: &SwapNotification, confirmation: &SwapConfirmation) {
        self.sent.borrow_mut().push((notification.clone(), confirmation.clone()));
    }
}

fn shared_store(name: &str) -> DashboardStore {
    let store = DashboardStore::open(&format!("file:{name}?mode=memory&cache=shared"))
        .expect("open shared store");
    store.migrate().expect("migration");
    store
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn session_with_roster() -> DashboardSession {
    init_logging();
    let mut session = DashboardSession::build_test("test-session".into(), 7).expect("session");
    session.ingest_delimited(ROSTER).expect("ingest roster");
    session
}

#[test]
fn empty_store_seeds_demo_roster() {
    let mut session = DashboardSession::build_test("demo".into(), 42).expect("session");
    session.load_or_seed().expect("load");
    assert_eq!(session.records().len(), 20);
    assert_eq!(session.records()[0].employee_id, "E001");
    let n = session.store.event_count("demo", "demo_data_generated").expect("count");
    assert_eq!(n, 1);
}

#[test]
fn same_seed_gives_same_demo_roster() {
    let mut a = DashboardSession::build_test("a".into(), 1234).expect("a");
    let mut b = DashboardSession::build_test("b".into(), 1234).expect("b");
    a.seed_demo().expect("seed a");
    b.seed_demo().expect("seed b");
    assert_eq!(a.records(), b.records());
}

#[test]
fn snapshot_is_visible_from_another_context() {
    let mut first =
        DashboardSession::open("first".into(), 1, DashboardConfig::default_test(), shared_store("ctx_share"))
            .expect("first");
    first.ingest_delimited(ROSTER).expect("ingest");

    let other_store = first.store.reopen().expect("reopen");
    let mut second =
        DashboardSession::open("second".into(), 2, DashboardConfig::default_test(), other_store)
            .expect("second");
    second.load_or_seed().expect("load");

    assert_eq!(second.records(), first.records());
    assert_eq!(second.store.event_count("second", "snapshot_loaded").expect("count"), 1);
}

#[test]
fn snapshot_keeps_scores_bit_exact() {
    let mut session = session_with_roster();
    let predictions = vec![Prediction { employee_id: "W1".into(), stress_score: 0.1 + 0.2 }];
    session.apply_predictions(&predictions).expect("apply");

    let stored = session
        .store
        .load_working_set("employeeData")
        .expect("load")
        .expect("snapshot present");
    for (s, r) in stored.iter().zip(session.records()) {
        assert_eq!(s.stress_score().to_bits(), r.stress_score().to_bits(), "{}", r.employee_id);
    }
    assert_eq!(stored, session.records());
}

#[test]
fn unreadable_snapshot_falls_back_to_demo() {
    let store = DashboardStore::in_memory().expect("store");
    store.migrate().expect("migration");
    store.put_value("employeeData", "{not json").expect("put");

    let mut session =
        DashboardSession::open("bad".into(), 5, DashboardConfig::default_test(), store).expect("session");
    session.load_or_seed().expect("load");

    assert_eq!(session.records().len(), 20);
    assert_eq!(session.store.event_count("bad", "snapshot_unreadable").expect("count"), 1);
}

#[test]
fn stored_levels_are_recomputed_on_load() {
    let store = DashboardStore::in_memory().expect("store");
    store.migrate().expect("migration");
    let tampered = r#"[{"employee_id":"T1","name":"Tam","avg_hours":0.0,"error_rate":0.0,
        "night_shifts":0.0,"login_count":0.0,"task_count":0.0,"patients_handled":0.0,
        "shift":"Day","stress_score":0.95,"stress_level":"healthy"}]"#;
    store.put_value("employeeData", tampered).expect("put");

    let mut session =
        DashboardSession::open("t".into(), 5, DashboardConfig::default_test(), store).expect("session");
    session.load_or_seed().expect("load");
    assert_eq!(session.records()[0].stress_level(), StressLevel::Critical);
}

#[test]
fn failed_ingest_keeps_working_set() {
    let mut session = session_with_roster();
    let before = session.records().to_vec();

    let err = session.ingest_delimited("only_a_header\n").unwrap_err();
    assert!(matches!(err, MindError::MalformedInput { .. }));
    assert_eq!(session.records(), before.as_slice());
    assert_eq!(session.store.event_count("test-session", "ingest_rejected").expect("count"), 1);
}

#[test]
fn ingest_rows_replace_the_set() {
    let mut session = session_with_roster();
    let row = serde_json::json!({ "employee_id": "Z9", "name": "Zed" });
    let rows = vec![row.as_object().cloned().expect("object")];
    session.ingest_rows(&rows, IngestSource::Rows).expect("ingest rows");
    assert_eq!(session.records().len(), 1);
    assert_eq!(session.records()[0].employee_id, "Z9");
}

#[test]
fn swap_with_unknown_id_changes_nothing() {
    let mut session = session_with_roster();
    let before = session.records().to_vec();
    let dispatcher = RecordingDispatcher::default();

    let err = session.apply_swap("C1", "NOPE", &dispatcher).unwrap_err();
    assert!(matches!(err, MindError::EmployeeNotFound { .. }), "got {err:?}");
    assert_eq!(session.records(), before.as_slice());
    assert!(dispatcher.sent.borrow().is_empty());
    assert_eq!(session.store.event_count("test-session", "swap_rejected").expect("count"), 1);
}

#[test]
fn swap_with_self_is_rejected() {
    let mut session = session_with_roster();
    let before = session.records().to_vec();
    let err = session.apply_swap("C1", "C1", &RecordingDispatcher::default()).unwrap_err();
    assert!(matches!(err, MindError::InvalidSwap { .. }));
    assert_eq!(session.records(), before.as_slice());
}

#[test]
fn swap_mutates_persists_and_dispatches() {
    let mut session = session_with_roster();
    let dispatcher = RecordingDispatcher::default();

    let outcome = session.apply_swap("C1", "H1", &dispatcher).expect("swap");

    assert_eq!(outcome.staff.shift, "Day-A");
    assert_eq!(outcome.swap_with.shift, "Night-1");
    assert!((outcome.staff.stress_score() - 0.8).abs() < 1e-9);
    assert_eq!(outcome.swap_with.stress_score(), 0.0);

    let sent = dispatcher.sent.borrow();
    assert_eq!(sent.len(), 1);
    let (note, confirm) = &sent[0];
    assert_eq!(note.to, "Nurse Ortiz");
    assert_eq!(note.from, "MindEase AI System");
    assert_eq!(note.subject, SWAP_SUBJECT);
    // Composed from the pre-swap state.
    assert!(note.message.contains("Dr. Kim is experiencing high stress levels (100%)"));
    assert!(note.message.contains("- Dr. Kim: Night-1 shift, 5 night shifts this week"));
    assert!(note.message.contains("approximately 50%"));
    assert_eq!((confirm.from.as_str(), confirm.to.as_str()), ("C1", "H1"));

    let stored = session
        .store
        .load_working_set("employeeData")
        .expect("load")
        .expect("snapshot present");
    assert_eq!(stored, session.records());
    assert_eq!(session.store.event_count("test-session", "swap_applied").expect("count"), 1);
}

#[test]
fn swap_survives_a_failed_snapshot_write() {
    init_logging();
    let uri = "file:swap_degrade?mode=memory&cache=shared";
    let mut session =
        DashboardSession::open("degrade".into(), 1, DashboardConfig::default_test(), shared_store("swap_degrade"))
            .expect("session");
    session.ingest_delimited(ROSTER).expect("ingest");

    let flags = rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE | rusqlite::OpenFlags::SQLITE_OPEN_URI;
    let raw = rusqlite::Connection::open_with_flags(uri, flags).expect("raw connection");
    raw.execute_batch("DROP TABLE kv_store").expect("drop kv_store");

    let dispatcher = RecordingDispatcher::default();
    let outcome = session.apply_swap("C1", "H1", &dispatcher).expect("swap still succeeds");

    assert_eq!(outcome.staff.shift, "Day-A");
    assert_eq!(session.find("C1").expect("C1").shift, "Day-A");
    assert_eq!(session.find("H1").expect("H1").shift, "Night-1");
    assert_eq!(dispatcher.sent.borrow().len(), 1);
    assert_eq!(session.store.event_count("degrade", "swap_applied").expect("count"), 1);
}

#[test]
fn predictions_overwrite_matching_scores_only() {
    let mut session = session_with_roster();
    let predictions = vec![
        Prediction { employee_id: "H1".into(), stress_score: 1.7 },
        Prediction { employee_id: "ghost".into(), stress_score: 0.1 },
    ];
    let matched = session.apply_predictions(&predictions).expect("apply");

    assert_eq!(matched, 1);
    let h1 = session.find("H1").expect("H1");
    assert_eq!(h1.stress_score(), 1.0);
    assert_eq!(h1.stress_level(), StressLevel::Critical);
    assert_eq!(session.find("ghost"), None);
}

#[test]
fn refresh_keeps_set_when_snapshot_is_garbage() {
    let mut session = session_with_roster();
    let before = session.records().to_vec();
    session.store.put_value("employeeData", "garbage").expect("put");

    let replaced = session.refresh_from_store().expect("refresh");
    assert!(!replaced);
    assert_eq!(session.records(), before.as_slice());
}

#[test]
fn first_visit_is_reported_once() {
    let mut session = DashboardSession::build_test("visit".into(), 0).expect("session");
    assert!(session.first_visit().expect("first"));
    assert!(!session.first_visit().expect("second"));
}

#[test]
fn plan_and_summary_follow_the_working_set() {
    let session = session_with_roster();
    let proposals = session.plan();
    assert_eq!(proposals.len(), 1);
    assert_eq!(proposals[0].staff_id, "C1");
    assert_eq!(proposals[0].swap_with_id, "H1");
    assert_eq!(proposals[0].expected_reduction, 50);

    let summary = session.optimization_summary();
    assert_eq!(summary.swap_count, 1);
    assert_eq!(summary.average_reduction, 50);
    assert_eq!(summary.balance, 33);
}

#[test]
fn event_log_is_sequenced() {
    let session = session_with_roster();
    let events = session.store.events_for_session("test-session").expect("events");
    assert_eq!(events[0].event_type, "session_opened");
    assert_eq!(events[1].event_type, "data_ingested");
    for (i, e) in events.iter().enumerate() {
        assert_eq!(e.seq, i as u64 + 1);
    }
}

#[test]
fn invalid_config_is_rejected_at_open() {
    let mut config = DashboardConfig::default_test();
    config.scoring.weights.hours = 0.9;
    let store = DashboardStore::in_memory().expect("store");
    store.migrate().expect("migration");
    let err = DashboardSession::open("cfg".into(), 0, config, store).err().expect("must fail");
    assert!(matches!(err, MindError::Config { .. }));
}
