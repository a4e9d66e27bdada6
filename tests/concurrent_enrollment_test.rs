// ==========================================
// 并发选课测试
// ==========================================
// 职责: 验证席位争用下不超卖、不丢失
// 说明: 每个线程持有独立 AppState（独立连接），共享同一数据库文件
// ==========================================


#[cfg(test)]
mod concurrent_enrollment_test {
    use super::test_helpers::*;
    use course_registry::api::ApiError;
    use course_registry::app::AppState;
    use course_registry::domain::Semester;
    use std::sync::{Arc, Barrier};
    use std::thread;

    const STUDENTS: usize = 8;

    fn seed_students(state: &AppState) {
        for i in 0..STUDENTS {
            seed_student(state, &format!("s{}", i), &format!("Student {}", i));
        }
    }

    #[test]
    fn test_concurrent_checkout_never_oversells() {
        let (_tmp, db_path) = create_test_db().unwrap();
        let capacity = 3;
        {
            let state = AppState::new(db_path.clone()).unwrap();
            seed_students(&state);
            seed_course(&state, "cs101", "CS101", 3);
            seed_section(&state, "cs101-a", "cs101", Semester::Fall, 2025, capacity);
            for i in 0..STUDENTS {
                state
                    .enrollment_api
                    .add_to_cart(&format!("s{}", i), "cs101-a")
                    .unwrap();
            }
        }

        let barrier = Arc::new(Barrier::new(STUDENTS));
        let handles: Vec<_> = (0..STUDENTS)
            .map(|i| {
                let db_path = db_path.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    let state = AppState::new(db_path).unwrap();
                    barrier.wait();
                    state
                        .enrollment_api
                        .enroll_from_cart(&format!("s{}", i), &registrar())
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        let rejected = results
            .iter()
            .filter(|r| matches!(r, Err(ApiError::CapacityExceeded(_))))
            .count();
        assert_eq!(succeeded, capacity as usize);
        assert_eq!(rejected, STUDENTS - capacity as usize);

        let state = AppState::new(db_path).unwrap();
        assert_eq!(available_seats(&state, "cs101-a"), 0);

        let conn = state.conn.lock().unwrap();
        let active: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM enrollment WHERE section_id = 'cs101-a' AND status = 'ENROLLED'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(active, capacity as i64);
    }

    #[test]
    fn test_concurrent_drop_and_enroll_keeps_seat_count_consistent() {
        let (_tmp, db_path) = create_test_db().unwrap();
        let holder_ids: Vec<String> = {
            let state = AppState::new(db_path.clone()).unwrap();
            seed_students(&state);
            seed_course(&state, "ma201", "MA201", 4);
            seed_section(&state, "ma201-a", "ma201", Semester::Spring, 2026, 4);
            (0..4)
                .map(|i| {
                    state
                        .enrollment_api
                        .force_enroll(&format!("s{}", i), "ma201-a", &registrar())
                        .unwrap()
                        .enrollment_id
                })
                .collect()
        };

        // s0..s3 退课，s4..s7 同时抢位
        let barrier = Arc::new(Barrier::new(STUDENTS));
        let mut handles = Vec::new();
        for (i, enrollment_id) in holder_ids.into_iter().enumerate() {
            let db_path = db_path.clone();
            let barrier = barrier.clone();
            handles.push(thread::spawn(move || {
                let state = AppState::new(db_path).unwrap();
                barrier.wait();
                state
                    .enrollment_api
                    .drop_enrollment(&enrollment_id, &registrar())
                    .map(|_| i)
            }));
        }
        for i in 4..STUDENTS {
            let db_path = db_path.clone();
            let barrier = barrier.clone();
            handles.push(thread::spawn(move || {
                let state = AppState::new(db_path).unwrap();
                barrier.wait();
                state
                    .enrollment_api
                    .force_enroll(&format!("s{}", i), "ma201-a", &registrar())
                    .map(|_| i)
            }));
        }

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for r in &results {
            assert!(
                matches!(r, Ok(_) | Err(ApiError::CapacityExceeded(_))),
                "unexpected result: {:?}",
                r
            );
        }

        let state = AppState::new(db_path).unwrap();
        let seats = available_seats(&state, "ma201-a");
        let conn = state.conn.lock().unwrap();
        let active: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM enrollment WHERE section_id = 'ma201-a' AND status = 'ENROLLED'",
                [],
                |row| row.get(0),
            )
            .unwrap();

        // 席位守恒：剩余 + 在读 = 容量
        assert_eq!(i64::from(seats) + active, 4);
        assert!(seats >= 0);
    }
}
