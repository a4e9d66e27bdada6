// ==========================================
// 成绩 CSV 导入集成测试
// ==========================================


#[cfg(test)]
mod grade_import_test {
    use super::test_helpers::*;
    use course_registry::app::AppState;
    use course_registry::domain::Semester;
    use course_registry::importer::{ImportError, RowOutcome};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn seed(state: &AppState) {
        seed_student(state, "s1", "Alice");
        seed_student(state, "s2", "Bob");
        seed_course(state, "cs101", "CS101", 3);
        seed_course(state, "ma201", "MA201", 4);
        seed_section(state, "cs101-f25", "cs101", Semester::Fall, 2025, 30);
        seed_section(state, "ma201-f25", "ma201", Semester::Fall, 2025, 30);
    }

    fn csv_file() -> NamedTempFile {
        tempfile::Builder::new().suffix(".csv").tempfile().unwrap()
    }

    #[test]
    fn test_import_mixed_rows() {
        let (_tmp, state) = setup_state();
        seed(&state);

        let csv = "\
Student_ID,course_id,section_id,grade,semester,year
s1,cs101,cs101-f25,A,Fall,2025
s1,ma201,ma201-f25,b-,fall,2025
s2,cs101,cs101-f25,Q,Fall,2025
ghost,cs101,cs101-f25,A,Fall,2025
s2,ma201,ma201-f25,B,Winter,2025
s2,ma201,ma201-f25,B,Fall,twenty
s1,cs101,cs101-f25,C,Fall,2025
,,,,,
s2,ma201,ma201-f25,,Fall,2025
";

        let report = state
            .grade_importer
            .import_reader(csv.as_bytes(), &registrar())
            .unwrap();

        assert_eq!(report.total_rows, 8);
        assert_eq!(report.imported, 2);
        assert_eq!(report.failed, 6);

        let failed_rows: Vec<usize> = report
            .outcomes
            .iter()
            .filter_map(|o| match o {
                RowOutcome::Failed { row, .. } => Some(*row),
                RowOutcome::Imported { .. } => None,
            })
            .collect();
        // 空白行（第 9 行）被跳过，后续行号仍与文件一致
        assert_eq!(failed_rows, vec![4, 5, 6, 7, 8, 10]);

        // 每行独立提交，成功行已触发 GPA 重算
        let s1 = state.student_repo.find_by_id("s1").unwrap().unwrap();
        assert_eq!(s1.gpa, 3.26);
        assert_eq!(s1.completed_credits, 7);

        let s2 = state.student_repo.find_by_id("s2").unwrap().unwrap();
        assert_eq!(s2.gpa, 0.0);
        assert_eq!(s2.completed_credits, 0);
    }

    #[test]
    fn test_report_rows_follow_file_lines_after_blank_row() {
        let (_tmp, state) = setup_state();
        seed(&state);

        let csv = "\
student_id,course_id,section_id,grade,semester,year
,,,,,
s1,cs101,cs101-f25,Q,Fall,2025
";
        let report = state
            .grade_importer
            .import_reader(csv.as_bytes(), &registrar())
            .unwrap();

        assert_eq!(report.total_rows, 1);
        assert!(matches!(report.outcomes[0], RowOutcome::Failed { row: 3, .. }));
    }

    #[test]
    fn test_import_file_missing_column() {
        let (_tmp, state) = setup_state();
        seed(&state);

        let mut file = csv_file();
        writeln!(file, "student_id,course_id,grade,semester,year").unwrap();
        writeln!(file, "s1,cs101,A,Fall,2025").unwrap();
        file.flush().unwrap();

        let result = state.grade_importer.import_file(file.path(), &registrar());
        assert!(matches!(result, Err(ImportError::MissingColumn(ref c)) if c == "section_id"));
        assert!(state.transcript_api.get_transcripts_by_student("s1").unwrap().is_empty());
    }

    #[test]
    fn test_import_file_success() {
        let (_tmp, state) = setup_state();
        seed(&state);

        let mut file = csv_file();
        writeln!(file, "student_id,course_id,section_id,grade,semester,year").unwrap();
        writeln!(file, "s2,cs101,cs101-f25,B+,FALL,2025").unwrap();
        file.flush().unwrap();

        let report = state
            .grade_importer
            .import_file(file.path(), &registrar())
            .unwrap();
        assert_eq!(report.imported, 1);

        let rows = state.transcript_api.get_transcripts_by_student("s2").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].grade, "B+");
    }

    #[test]
    fn test_import_file_not_found() {
        let (_tmp, state) = setup_state();
        let result = state.grade_importer.import_file(
            std::path::Path::new("/definitely/not/here.csv"),
            &registrar(),
        );
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }
}
