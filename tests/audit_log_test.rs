// ==========================================
// 审计日志集成测试
// ==========================================
// 职责: 验证各写操作都落审计记录，且携带操作人
// ==========================================


#[cfg(test)]
mod audit_log_test {
    use super::test_helpers::*;
    use course_registry::domain::{ActionType, Actor, Semester};

    #[test]
    fn test_mutations_are_audited() {
        let (_tmp, state) = setup_state();
        seed_student(&state, "s1", "Alice");
        seed_course(&state, "cs101", "CS101", 3);
        seed_section(&state, "cs101-a", "cs101", Semester::Fall, 2025, 10);
        seed_plan(&state, "plan-cs", "Computer Science", 120, &[("cs101", true, 1, 1)]);

        let registrar = registrar();
        let advisor = Actor::new("advisor-07", "advisor@example.edu");

        state.enrollment_api.add_to_cart("s1", "cs101-a").unwrap();
        let enrollments = state.enrollment_api.enroll_from_cart("s1", &registrar).unwrap();
        let enrollment_id = enrollments[0].enrollment_id.clone();

        let transcript = state
            .transcript_api
            .create_transcript("s1", "cs101", "cs101-a", "B", Semester::Fall, 2025, &registrar)
            .unwrap();
        state
            .transcript_api
            .update_grade(&transcript.transcript_id, "A", &registrar)
            .unwrap();
        state
            .progress_api
            .assign_academic_plan("s1", Some("plan-cs"), &advisor)
            .unwrap();

        let repo = &state.action_log_repo;

        let enroll_logs = repo.find_by_entity("Enrollment", &enrollment_id).unwrap();
        assert_eq!(enroll_logs.len(), 1);
        assert_eq!(enroll_logs[0].action_type, ActionType::Enroll.as_str());
        assert_eq!(enroll_logs[0].actor_id, "registrar-01");

        let transcript_logs = repo
            .find_by_entity("Transcript", &transcript.transcript_id)
            .unwrap();
        assert_eq!(transcript_logs.len(), 2);
        // 最新在前
        assert_eq!(transcript_logs[0].action_type, ActionType::UpdateGrade.as_str());
        assert_eq!(transcript_logs[1].action_type, ActionType::CreateTranscript.as_str());

        let advisor_logs = repo.find_by_actor("advisor-07", 10).unwrap();
        assert_eq!(advisor_logs.len(), 1);
        assert_eq!(advisor_logs[0].entity_name, "Student");
        assert_eq!(advisor_logs[0].entity_id, "s1");
        assert_eq!(advisor_logs[0].actor_email, "advisor@example.edu");

        assert_eq!(repo.count_by_action_type("CreateTranscript").unwrap(), 1);
        assert_eq!(repo.find_recent(100).unwrap().len(), 4);
    }

    #[test]
    fn test_failed_mutation_is_not_audited() {
        let (_tmp, state) = setup_state();
        seed_student(&state, "s1", "Alice");
        seed_course(&state, "cs101", "CS101", 3);
        seed_section(&state, "cs101-a", "cs101", Semester::Fall, 2025, 0);

        assert!(state
            .enrollment_api
            .force_enroll("s1", "cs101-a", &registrar())
            .is_err());
        assert!(state
            .transcript_api
            .create_transcript("s1", "cs101", "cs101-a", "X", Semester::Fall, 2025, &registrar())
            .is_err());

        assert!(state.action_log_repo.find_recent(10).unwrap().is_empty());
    }
}
