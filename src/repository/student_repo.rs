// ==========================================
// 选课与学业档案引擎 - 学生档案仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: gpa / completed_credits 不提供单独的更新入口，
//       只能通过 TranscriptRepository 的重算事务写入
// ==========================================

use crate::domain::student::Student;
use crate::domain::types::EnrollmentStatus;
use crate::repository::db_utils::restore_seat;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

// ==========================================
// StudentRepository - 学生档案仓储
// ==========================================
pub struct StudentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudentRepository {
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

    /// 新建学生档案（身份管理由外部负责，此处供数据准备使用）
    pub fn insert(&self, student: &Student) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO student (
                student_id, full_name, email, completed_credits, gpa, academic_plan_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                student.student_id,
                student.full_name,
                student.email,
                student.completed_credits,
                student.gpa,
                student.academic_plan_id,
            ],
        )?;
        Ok(())
    }

    /// 按学号查询
    pub fn find_by_id(&self, student_id: &str) -> RepositoryResult<Option<Student>> {
        let conn = self.get_conn()?;
        find_student(&conn, student_id)
    }

    /// 分配/取消培养方案
    ///
    /// # 返回
    /// - Ok(()): 更新成功
    /// - Err(NotFound): 学生不存在
    pub fn assign_plan(&self, student_id: &str, plan_id: Option<&str>) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE student SET academic_plan_id = ?2 WHERE student_id = ?1",
            params![student_id, plan_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::not_found("Student", student_id));
        }
        Ok(())
    }

    /// 删除学生（选课、成绩、购物车级联删除）
    ///
    /// 级联删除前先为每条在读选课归还席位，与删除本身处于同一 IMMEDIATE 事务。
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 学生不存在
    pub fn delete(&self, student_id: &str) -> RepositoryResult<bool> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let active_sections: Vec<String> = {
            let mut stmt = tx.prepare(
                "SELECT section_id FROM enrollment WHERE student_id = ?1 AND status = ?2",
            )?;
            let rows = stmt.query_map(
                params![student_id, EnrollmentStatus::Enrolled.to_db_str()],
                |row| row.get(0),
            )?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        for section_id in &active_sections {
            restore_seat(&tx, section_id)?;
        }

        let rows = tx.execute("DELETE FROM student WHERE student_id = ?1", params![student_id])?;
        tx.commit()?;

        if rows > 0 {
            info!(student_id, released_seats = active_sections.len(), "学生档案已删除");
        }
        Ok(rows > 0)
    }
}

// ==========================================
// 辅助函数（事务内复用）
// ==========================================

pub(crate) fn find_student(
    conn: &Connection,
    student_id: &str,
) -> RepositoryResult<Option<Student>> {
    let student = conn
        .query_row(
            r#"
            SELECT student_id, full_name, email, completed_credits, gpa, academic_plan_id
            FROM student
            WHERE student_id = ?1
            "#,
            params![student_id],
            map_student_row,
        )
        .optional()?;
    Ok(student)
}

pub(crate) fn student_exists(conn: &Connection, student_id: &str) -> RepositoryResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM student WHERE student_id = ?1",
            params![student_id],
            |_row| Ok(true),
        )
        .optional()?;
    Ok(found.unwrap_or(false))
}

fn map_student_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        student_id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        completed_credits: row.get(3)?,
        gpa: row.get(4)?,
        academic_plan_id: row.get(5)?,
    })
}
