// ==========================================
// 选课与学业档案引擎 - 课程/教学班仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 课程/教师/教学班的维护属于外部 CRUD，这里只提供
//       读取接口与数据准备用的插入接口；席位计数只由
//       EnrollmentRepository 在事务内修改
// ==========================================

use crate::domain::course::{Course, Instructor, Section};
use crate::repository::db_utils::parse_semester;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// CourseRepository - 课程/教学班仓储
// ==========================================
pub struct CourseRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CourseRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 课程
    // ==========================================

    pub fn insert_course(&self, course: &Course) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO course (course_id, code, title, credit_hours) VALUES (?1, ?2, ?3, ?4)",
            params![course.course_id, course.code, course.title, course.credit_hours],
        )?;
        Ok(())
    }

    /// 更新课程学分（外部 CRUD 行为，已登记成绩的学分快照不受影响）
    pub fn update_course_credits(
        &self,
        course_id: &str,
        credit_hours: i32,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE course SET credit_hours = ?2 WHERE course_id = ?1",
            params![course_id, credit_hours],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found("Course", course_id));
        }
        Ok(())
    }

    pub fn find_course(&self, course_id: &str) -> RepositoryResult<Option<Course>> {
        let conn = self.get_conn()?;
        let course = conn
            .query_row(
                "SELECT course_id, code, title, credit_hours FROM course WHERE course_id = ?1",
                params![course_id],
                |row| {
                    Ok(Course {
                        course_id: row.get(0)?,
                        code: row.get(1)?,
                        title: row.get(2)?,
                        credit_hours: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(course)
    }

    // ==========================================
    // 教师
    // ==========================================

    pub fn insert_instructor(&self, instructor: &Instructor) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO instructor (instructor_id, full_name, email) VALUES (?1, ?2, ?3)",
            params![instructor.instructor_id, instructor.full_name, instructor.email],
        )?;
        Ok(())
    }

    // ==========================================
    // 教学班
    // ==========================================

    pub fn insert_section(&self, section: &Section) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO section (
                section_id, course_id, instructor_id, semester, year, capacity, available_seats
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                section.section_id,
                section.course_id,
                section.instructor_id,
                section.semester.to_db_str(),
                section.year,
                section.capacity,
                section.available_seats,
            ],
        )?;
        Ok(())
    }

    pub fn find_section(&self, section_id: &str) -> RepositoryResult<Option<Section>> {
        let conn = self.get_conn()?;
        find_section(&conn, section_id)
    }
}

// ==========================================
// 辅助函数（事务内复用）
// ==========================================

pub(crate) fn find_section(
    conn: &Connection,
    section_id: &str,
) -> RepositoryResult<Option<Section>> {
    let section = conn
        .query_row(
            r#"
            SELECT section_id, course_id, instructor_id, semester, year, capacity, available_seats
            FROM section
            WHERE section_id = ?1
            "#,
            params![section_id],
            map_section_row,
        )
        .optional()?;
    Ok(section)
}

fn map_section_row(row: &Row<'_>) -> rusqlite::Result<Section> {
    Ok(Section {
        section_id: row.get(0)?,
        course_id: row.get(1)?,
        instructor_id: row.get(2)?,
        semester: parse_semester(3, &row.get::<_, String>(3)?)?,
        year: row.get(4)?,
        capacity: row.get(5)?,
        available_seats: row.get(6)?,
    })
}
