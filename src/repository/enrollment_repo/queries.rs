use super::mutations::{find_active, find_enrollment};
use super::{map_enrollment_row, EnrollmentRepository, ENROLLMENT_COLUMNS};
use crate::domain::enrollment::{Enrollment, EnrollmentView};
use crate::domain::types::EnrollmentStatus;
use crate::repository::db_utils::{parse_semester, parse_status, parse_ts, semester_order_sql};
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Result as SqliteResult};

impl EnrollmentRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 按ID查询
    pub fn find_by_id(&self, enrollment_id: &str) -> RepositoryResult<Option<Enrollment>> {
        let conn = self.get_conn()?;
        find_enrollment(&conn, enrollment_id)
    }

    /// 查询某学生在某教学班的在读记录
    pub fn find_active(
        &self,
        student_id: &str,
        section_id: &str,
    ) -> RepositoryResult<Option<Enrollment>> {
        let conn = self.get_conn()?;
        find_active(&conn, student_id, section_id)
    }

    /// 查询学生全部选课记录（含退课/结课）
    pub fn find_by_student(&self, student_id: &str) -> RepositoryResult<Vec<Enrollment>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM enrollment WHERE student_id = ?1 \
             ORDER BY enrolled_at DESC, enrollment_id ASC",
            ENROLLMENT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let enrollments = stmt
            .query_map(params![student_id], map_enrollment_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(enrollments)
    }

    /// 查询学生选课展示视图
    ///
    /// Enrollment → Section → Course → Instructor（教师可为空）
    pub fn find_views_by_student(&self, student_id: &str) -> RepositoryResult<Vec<EnrollmentView>> {
        let conn = self.get_conn()?;
        // 最近学期在前
        let sql = format!(
            r#"
            SELECT
                e.enrollment_id, e.section_id, c.course_id, c.code, c.title, c.credit_hours,
                s.semester, s.year, i.full_name, e.status, e.grade, e.enrolled_at
            FROM enrollment e
            JOIN section s ON s.section_id = e.section_id
            JOIN course c ON c.course_id = s.course_id
            LEFT JOIN instructor i ON i.instructor_id = s.instructor_id
            WHERE e.student_id = ?1
            ORDER BY s.year DESC, {} DESC, c.code ASC
            "#,
            semester_order_sql("s.semester")
        );
        let mut stmt = conn.prepare(&sql)?;

        let views = stmt
            .query_map(params![student_id], |row| {
                Ok(EnrollmentView {
                    enrollment_id: row.get(0)?,
                    section_id: row.get(1)?,
                    course_id: row.get(2)?,
                    course_code: row.get(3)?,
                    course_title: row.get(4)?,
                    credit_hours: row.get(5)?,
                    semester: parse_semester(6, &row.get::<_, String>(6)?)?,
                    year: row.get(7)?,
                    instructor_name: row.get(8)?,
                    status: parse_status(9, &row.get::<_, String>(9)?)?,
                    grade: row.get(10)?,
                    enrolled_at: parse_ts(11, &row.get::<_, String>(11)?)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(views)
    }

    /// 学生在读课程ID列表（经由 ENROLLED 状态的选课记录）
    pub fn find_active_course_ids(&self, student_id: &str) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT s.course_id
            FROM enrollment e
            JOIN section s ON s.section_id = e.section_id
            WHERE e.student_id = ?1 AND e.status = ?2
            "#,
        )?;
        let ids = stmt
            .query_map(
                params![student_id, EnrollmentStatus::Enrolled.to_db_str()],
                |row| row.get(0),
            )?
            .collect::<SqliteResult<Vec<String>>>()?;
        Ok(ids)
    }

    /// 统计教学班在读人数
    pub fn count_active_in_section(&self, section_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM enrollment WHERE section_id = ?1 AND status = ?2",
            params![section_id, EnrollmentStatus::Enrolled.to_db_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
