//! Integration tests for restoring tasks and progress across reloads.

use std::rc::Rc;

use noir_core::storage::{PROJECTS_KEY, TASKS_KEY};
use noir_core::{Config, Database, KvStore, Mode, Pomodoro};

#[test]
fn test_progress_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noir.db");
    let config = Config::default();

    {
        let db = Rc::new(Database::open_at(&path).unwrap());
        let mut p = Pomodoro::restore(&config, Rc::clone(&db)).with_session_log(db);
        p.add_task("Thesis", Some(3), Some("Study")).unwrap();
        p.start();
        for i in 0..125 {
            p.tick_at(i * 1_000);
        }
        assert_eq!(p.session().remaining_secs, 1375);
    }

    // Last snapshot was at 1380 seconds remaining.
    let db = Rc::new(Database::open_at(&path).unwrap());
    let p = Pomodoro::restore(&config, db);
    assert_eq!(p.tasks().len(), 1);
    assert_eq!(p.tasks()[0].saved_remaining_secs, Some(1380));
    assert_eq!(p.session().mode, Mode::Focus);
    assert_eq!(p.session().remaining_secs, 1380);
    assert!(!p.session().running);
}

#[test]
fn test_corrupt_store_falls_back_to_defaults() {
    let db = Rc::new(Database::open_memory().unwrap());
    db.kv_set(TASKS_KEY, "[{\"broken\":").unwrap();
    db.kv_set(PROJECTS_KEY, "{}").unwrap();

    let p = Pomodoro::restore(&Config::default(), db);
    assert!(p.tasks().is_empty());
    assert_eq!(p.projects().names(), ["Work", "Study", "Other"]);
    assert!(p.current_task_id().is_none());
    assert_eq!(p.session().remaining_secs, 1500);
}

#[test]
fn test_configured_durations_apply() {
    let mut config = Config::default();
    config.set_value("timer.focus_minutes", "50").unwrap();
    config.set_value("timer.rest_minutes", "10").unwrap();

    let mut p = Pomodoro::restore(&config, Rc::new(Database::open_memory().unwrap()));
    assert_eq!(p.session().remaining_secs, 3000);
    p.switch_mode(Mode::Rest);
    assert_eq!(p.session().remaining_secs, 600);
}

#[test]
fn test_session_log_records_expiries() {
    let db = Rc::new(Database::open_memory().unwrap());
    let mut config = Config::default();
    config.set_value("timer.focus_minutes", "1").unwrap();
    config.set_value("timer.rest_minutes", "1").unwrap();

    let mut p = Pomodoro::restore(&config, Rc::clone(&db)).with_session_log(Rc::clone(&db));
    p.add_task("Inbox zero", None, Some("Work")).unwrap();
    p.start();
    for i in 0..60 {
        p.tick_at(i * 1_000);
    }
    p.start();
    for i in 0..60 {
        p.tick_at(100_000 + i * 1_000);
    }

    let stats = db.stats_today().unwrap();
    assert_eq!(stats.total_sessions, 2);
    assert_eq!(stats.focus_sessions, 1);
    assert_eq!(stats.focus_secs, 60);
    assert_eq!(stats.rest_secs, 60);
    assert_eq!(p.tasks()[0].finished_cycles, 1);
}
