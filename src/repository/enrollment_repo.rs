// ==========================================
// 选课与学业档案引擎 - 选课仓储
// ==========================================
// 红线: Repository 不含业务规则判定，只保证原子性
// 红线: 席位扣减必须与选课写入在同一个 IMMEDIATE 事务内，
//       且使用 "available_seats > 0" 条件扣减（compare-and-decrement）
// ==========================================

mod mutations;
mod queries;


use crate::domain::enrollment::Enrollment;
use crate::repository::db_utils::{parse_opt_ts, parse_status, parse_ts};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// EnrollmentRepository - 选课仓储
// ==========================================
pub struct EnrollmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EnrollmentRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

pub(crate) const ENROLLMENT_COLUMNS: &str = r#"
    enrollment_id, student_id, section_id, enrolled_at, status, grade,
    approved_at, approved_by, decline_reason
"#;

pub(crate) fn map_enrollment_row(row: &Row<'_>) -> rusqlite::Result<Enrollment> {
    Ok(Enrollment {
        enrollment_id: row.get(0)?,
        student_id: row.get(1)?,
        section_id: row.get(2)?,
        enrolled_at: parse_ts(3, &row.get::<_, String>(3)?)?,
        status: parse_status(4, &row.get::<_, String>(4)?)?,
        grade: row.get(5)?,
        approved_at: parse_opt_ts(6, row.get(6)?)?,
        approved_by: row.get(7)?,
        decline_reason: row.get(8)?,
    })
}
