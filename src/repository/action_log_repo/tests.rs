use super::ActionLogRepository;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::student::Actor;
use rusqlite::Connection;
use serde_json::json;
use std::sync::{Arc, Mutex};

fn setup_test_db() -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().unwrap();
    crate::db::configure_sqlite_connection(&conn).unwrap();
    crate::db::init_schema(&conn).unwrap();
    Arc::new(Mutex::new(conn))
}

fn registrar() -> Actor {
    Actor::new("reg-1", "registrar@uni.edu")
}

#[test]
fn test_insert_and_find_by_id() {
    let repo = ActionLogRepository::new(setup_test_db());

    let log = ActionLog::new(ActionType::CreateTranscript, &registrar(), "T1")
        .with_payload(&json!({ "grade": "A", "student_id": "S1" }))
        .with_detail("grade posted");
    let id = repo.insert(&log).unwrap();
    assert_eq!(id, log.action_id);

    let found = repo.find_by_id(&id).unwrap().unwrap();
    assert_eq!(found.action_type, "CreateTranscript");
    assert_eq!(found.entity_name, "Transcript");
    assert_eq!(found.actor_email, "registrar@uni.edu");
    assert_eq!(found.payload_json.unwrap()["grade"], "A");
    assert_eq!(found.detail.as_deref(), Some("grade posted"));

    assert!(repo.find_by_id("missing").unwrap().is_none());
}

#[test]
fn test_find_by_entity_and_actor() {
    let repo = ActionLogRepository::new(setup_test_db());
    let other = Actor::new("adm-2", "admin@uni.edu");

    repo.insert(&ActionLog::new(ActionType::Enroll, &registrar(), "E1")).unwrap();
    repo.insert(&ActionLog::new(ActionType::DropEnrollment, &registrar(), "E1")).unwrap();
    repo.insert(&ActionLog::new(ActionType::ForceEnroll, &other, "E2")).unwrap();

    let e1 = repo.find_by_entity("Enrollment", "E1").unwrap();
    assert_eq!(e1.len(), 2);
    // 同一秒内按插入顺序倒序
    assert_eq!(e1[0].action_type, "DropEnrollment");

    assert_eq!(repo.find_by_actor("adm-2", 10).unwrap().len(), 1);
    assert_eq!(repo.find_recent(2).unwrap().len(), 2);
    assert_eq!(repo.count_by_action_type("Enroll").unwrap(), 1);
}
