// ==========================================
// EnrollmentApi 集成测试
// ==========================================
// 覆盖: 购物车 / 结算 / 原子回滚 / 强制选课 / 退课 / 审批
// ==========================================


#[cfg(test)]
mod enrollment_api_test {
    use super::test_helpers::*;
    use course_registry::api::ApiError;
    use course_registry::app::AppState;
    use course_registry::config::config_keys;
    use course_registry::domain::{Enrollment, EnrollmentStatus};
    use course_registry::engine::events::{EnrollmentNotifier, NotifyResult};
    use std::sync::{Arc, Mutex};

    /// 记录通知调用的测试通知者
    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl EnrollmentNotifier for RecordingNotifier {
        fn notify_pending(&self, enrollment: &Enrollment) -> NotifyResult {
            self.events
                .lock()
                .unwrap()
                .push(format!("pending:{}", enrollment.section_id));
            Ok(())
        }

        fn notify_approved(&self, enrollment: &Enrollment) -> NotifyResult {
            self.events
                .lock()
                .unwrap()
                .push(format!("approved:{}", enrollment.section_id));
            Ok(())
        }

        fn notify_declined(&self, enrollment: &Enrollment, reason: &str) -> NotifyResult {
            self.events
                .lock()
                .unwrap()
                .push(format!("declined:{}:{}", enrollment.section_id, reason));
            Ok(())
        }
    }

    /// 通知失败不影响业务结果
    struct FailingNotifier;

    impl EnrollmentNotifier for FailingNotifier {
        fn notify_pending(&self, _enrollment: &Enrollment) -> NotifyResult {
            Err("smtp down".into())
        }

        fn notify_approved(&self, _enrollment: &Enrollment) -> NotifyResult {
            Err("smtp down".into())
        }

        fn notify_declined(&self, _enrollment: &Enrollment, _reason: &str) -> NotifyResult {
            Err("smtp down".into())
        }
    }

    fn seed_basic(state: &AppState) {
        seed_student(state, "s1", "Alice");
        seed_course_with_section(state, "cs101", 3, "cs101-a", 2);
        seed_course_with_section(state, "ma201", 4, "ma201-a", 1);
    }

    // ==========================================
    // 购物车
    // ==========================================

    #[test]
    fn test_cart_add_list_remove() {
        let (_tmp, state) = setup_state();
        seed_basic(&state);
        let api = &state.enrollment_api;

        api.add_to_cart("s1", "cs101-a").unwrap();
        api.add_to_cart("s1", "ma201-a").unwrap();
        assert_eq!(api.list_cart("s1").unwrap().len(), 2);

        // 同一教学班重复加入
        assert!(matches!(
            api.add_to_cart("s1", "cs101-a"),
            Err(ApiError::ValidationError(_))
        ));

        api.remove_from_cart("s1", "cs101-a").unwrap();
        let cart = api.list_cart("s1").unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].section_id, "ma201-a");

        assert!(matches!(
            api.remove_from_cart("s1", "cs101-a"),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_cart_rejects_unknown_student_or_section() {
        let (_tmp, state) = setup_state();
        seed_basic(&state);
        let api = &state.enrollment_api;

        assert!(matches!(api.add_to_cart("ghost", "cs101-a"), Err(ApiError::NotFound(_))));
        assert!(matches!(api.add_to_cart("s1", "nope"), Err(ApiError::NotFound(_))));
        assert!(matches!(api.add_to_cart("", "cs101-a"), Err(ApiError::ValidationError(_))));
    }

    // ==========================================
    // 结算
    // ==========================================

    #[test]
    fn test_enroll_from_cart_success() {
        let (_tmp, state) = setup_state();
        seed_basic(&state);
        let api = &state.enrollment_api;

        api.add_to_cart("s1", "cs101-a").unwrap();
        api.add_to_cart("s1", "ma201-a").unwrap();

        let created = api.enroll_from_cart("s1", &registrar()).unwrap();
        assert_eq!(created.len(), 2);
        assert!(created.iter().all(|e| e.status == EnrollmentStatus::Enrolled));

        assert_eq!(available_seats(&state, "cs101-a"), 1);
        assert_eq!(available_seats(&state, "ma201-a"), 0);
        assert!(api.list_cart("s1").unwrap().is_empty());

        let views = api.get_student_enrollments("s1").unwrap();
        assert_eq!(views.len(), 2);
        assert!(views.iter().any(|v| v.course_code == "MA201" && v.credit_hours == 4));
    }

    #[test]
    fn test_enroll_from_empty_cart() {
        let (_tmp, state) = setup_state();
        seed_basic(&state);

        let result = state.enrollment_api.enroll_from_cart("s1", &registrar());
        assert!(matches!(result, Err(ApiError::EmptyCart(_))));
    }

    #[test]
    fn test_checkout_is_atomic_when_one_section_is_full() {
        let (_tmp, state) = setup_state();
        seed_basic(&state);
        seed_student(&state, "s2", "Bob");
        let api = &state.enrollment_api;

        // s2 占满 ma201-a
        api.force_enroll("s2", "ma201-a", &registrar()).unwrap();
        assert_eq!(available_seats(&state, "ma201-a"), 0);

        api.add_to_cart("s1", "cs101-a").unwrap();
        api.add_to_cart("s1", "ma201-a").unwrap();

        let result = api.enroll_from_cart("s1", &registrar());
        assert!(matches!(result, Err(ApiError::CapacityExceeded(ref id)) if id == "ma201-a"));

        // 整体回滚：cs101-a 席位未被扣减，购物车保留
        assert_eq!(available_seats(&state, "cs101-a"), 2);
        assert!(api.get_student_enrollments("s1").unwrap().is_empty());
        assert_eq!(api.list_cart("s1").unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_active_enrollment_rejected() {
        let (_tmp, state) = setup_state();
        seed_basic(&state);
        let api = &state.enrollment_api;

        api.force_enroll("s1", "cs101-a", &registrar()).unwrap();
        api.add_to_cart("s1", "cs101-a").unwrap();

        let result = api.enroll_from_cart("s1", &registrar());
        assert!(matches!(result, Err(ApiError::DuplicateEnrollment { .. })));
        assert_eq!(available_seats(&state, "cs101-a"), 1);
    }

    // ==========================================
    // 强制选课 / 退课 / 删除
    // ==========================================

    #[test]
    fn test_force_enroll_respects_capacity() {
        let (_tmp, state) = setup_state();
        seed_basic(&state);
        seed_student(&state, "s2", "Bob");
        let api = &state.enrollment_api;

        api.force_enroll("s1", "ma201-a", &registrar()).unwrap();
        assert!(matches!(
            api.force_enroll("s2", "ma201-a", &registrar()),
            Err(ApiError::CapacityExceeded(_))
        ));
        assert!(matches!(
            api.force_enroll("ghost", "cs101-a", &registrar()),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_drop_restores_seat_and_allows_reenroll() {
        let (_tmp, state) = setup_state();
        seed_basic(&state);
        let api = &state.enrollment_api;

        let enrollment = api.force_enroll("s1", "ma201-a", &registrar()).unwrap();
        assert_eq!(available_seats(&state, "ma201-a"), 0);

        let dropped = api.drop_enrollment(&enrollment.enrollment_id, &registrar()).unwrap();
        assert_eq!(dropped.status, EnrollmentStatus::Dropped);
        assert_eq!(available_seats(&state, "ma201-a"), 1);

        // 终态不可再退
        assert!(matches!(
            api.drop_enrollment(&enrollment.enrollment_id, &registrar()),
            Err(ApiError::InvalidStateTransition { .. })
        ));

        // 退课后可重新选课，生成新记录
        let again = api.force_enroll("s1", "ma201-a", &registrar()).unwrap();
        assert_ne!(again.enrollment_id, enrollment.enrollment_id);
        assert_eq!(api.get_student_enrollments("s1").unwrap().len(), 2);
    }

    #[test]
    fn test_delete_enrollment_restores_seat_only_when_active() {
        let (_tmp, state) = setup_state();
        seed_basic(&state);
        let api = &state.enrollment_api;

        let active = api.force_enroll("s1", "cs101-a", &registrar()).unwrap();
        api.delete_enrollment(&active.enrollment_id, &registrar()).unwrap();
        assert_eq!(available_seats(&state, "cs101-a"), 2);

        let dropped = api.force_enroll("s1", "cs101-a", &registrar()).unwrap();
        api.drop_enrollment(&dropped.enrollment_id, &registrar()).unwrap();
        api.delete_enrollment(&dropped.enrollment_id, &registrar()).unwrap();
        assert_eq!(available_seats(&state, "cs101-a"), 2);

        assert!(matches!(
            api.delete_enrollment(&dropped.enrollment_id, &registrar()),
            Err(ApiError::NotFound(_))
        ));
    }

    // ==========================================
    // 审批流程
    // ==========================================

    fn setup_with_notifier(
        notifier: Arc<dyn EnrollmentNotifier>,
    ) -> (tempfile::NamedTempFile, AppState) {
        let (tmp, db_path) = create_test_db().unwrap();
        let state = AppState::with_notifier(db_path, notifier).unwrap();
        state
            .config_manager
            .set_global_config_value(config_keys::REQUIRE_APPROVAL, "true")
            .unwrap();
        seed_basic(&state);
        (tmp, state)
    }

    #[test]
    fn test_approval_workflow_notifies() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (_tmp, state) = setup_with_notifier(notifier.clone());
        let api = &state.enrollment_api;

        api.add_to_cart("s1", "cs101-a").unwrap();
        api.add_to_cart("s1", "ma201-a").unwrap();
        let created = api.enroll_from_cart("s1", &registrar()).unwrap();

        let cs = created.iter().find(|e| e.section_id == "cs101-a").unwrap();
        let ma = created.iter().find(|e| e.section_id == "ma201-a").unwrap();

        let approved = api.approve_enrollment(&cs.enrollment_id, &registrar()).unwrap();
        assert_eq!(approved.status, EnrollmentStatus::Enrolled);
        assert_eq!(approved.approved_by.as_deref(), Some("registrar-01"));
        assert!(approved.approved_at.is_some());

        assert!(matches!(
            api.decline_enrollment(&ma.enrollment_id, "  ", &registrar()),
            Err(ApiError::ValidationError(_))
        ));
        let declined = api
            .decline_enrollment(&ma.enrollment_id, "prerequisite missing", &registrar())
            .unwrap();
        assert_eq!(declined.status, EnrollmentStatus::Dropped);
        assert_eq!(declined.decline_reason.as_deref(), Some("prerequisite missing"));
        assert_eq!(available_seats(&state, "ma201-a"), 1);

        let events = notifier.events();
        assert_eq!(events.iter().filter(|e| e.starts_with("pending:")).count(), 2);
        assert!(events.contains(&"approved:cs101-a".to_string()));
        assert!(events.contains(&"declined:ma201-a:prerequisite missing".to_string()));

        // 已驳回的记录不可再审批
        assert!(matches!(
            api.approve_enrollment(&ma.enrollment_id, &registrar()),
            Err(ApiError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_notifier_failure_does_not_fail_enrollment() {
        let (_tmp, state) = setup_with_notifier(Arc::new(FailingNotifier));
        let api = &state.enrollment_api;

        api.add_to_cart("s1", "cs101-a").unwrap();
        let created = api.enroll_from_cart("s1", &registrar()).unwrap();
        assert_eq!(created.len(), 1);

        api.approve_enrollment(&created[0].enrollment_id, &registrar())
            .unwrap();
        assert_eq!(available_seats(&state, "cs101-a"), 1);
    }

    #[test]
    fn test_no_pending_notice_without_approval() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (_tmp, db_path) = create_test_db().unwrap();
        let state = AppState::with_notifier(db_path, notifier.clone()).unwrap();
        seed_basic(&state);

        state.enrollment_api.add_to_cart("s1", "cs101-a").unwrap();
        state.enrollment_api.enroll_from_cart("s1", &registrar()).unwrap();
        assert!(notifier.events().is_empty());
    }
}
