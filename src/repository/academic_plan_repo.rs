// ==========================================
// 选课与学业档案引擎 - 培养方案仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 培养方案对本引擎只读，插入接口仅供数据准备
// ==========================================

use crate::domain::academic_plan::{AcademicPlan, AcademicPlanCourse};
use crate::domain::types::CourseType;
use crate::repository::db_utils::parse_course_type;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// AcademicPlanRepository - 培养方案仓储
// ==========================================
pub struct AcademicPlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AcademicPlanRepository {
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

    /// 新建培养方案（不含课程）
    pub fn insert_plan(
        &self,
        plan_id: &str,
        major_name: &str,
        total_credits_required: i32,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO academic_plan (plan_id, major_name, total_credits_required) \
             VALUES (?1, ?2, ?3)",
            params![plan_id, major_name, total_credits_required],
        )?;
        Ok(())
    }

    /// 向方案添加一门推荐课程
    pub fn add_plan_course(
        &self,
        plan_id: &str,
        course_id: &str,
        is_required: bool,
        recommended_year: i32,
        recommended_semester: i32,
        course_type: CourseType,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO academic_plan_course (
                plan_id, course_id, is_required, recommended_year, recommended_semester, course_type
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                plan_id,
                course_id,
                is_required,
                recommended_year,
                recommended_semester,
                course_type.to_db_str(),
            ],
        )?;
        Ok(())
    }

    /// 是否存在
    pub fn exists(&self, plan_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM academic_plan WHERE plan_id = ?1",
                params![plan_id],
                |_row| Ok(true),
            )
            .optional()?;
        Ok(found.unwrap_or(false))
    }

    /// 查询方案及其课程列表（按推荐学年/学期排序）
    ///
    /// # 返回
    /// - Ok(Some(AcademicPlan)): 找到方案
    /// - Ok(None): 方案不存在
    pub fn find_by_id(&self, plan_id: &str) -> RepositoryResult<Option<AcademicPlan>> {
        let conn = self.get_conn()?;

        let header: Option<(String, String, i32)> = conn
            .query_row(
                "SELECT plan_id, major_name, total_credits_required \
                 FROM academic_plan WHERE plan_id = ?1",
                params![plan_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let (plan_id, major_name, total_credits_required) = match header {
            Some(h) => h,
            None => return Ok(None),
        };

        let mut stmt = conn.prepare(
            r#"
            SELECT
                pc.course_id, c.code, c.title, c.credit_hours,
                pc.is_required, pc.recommended_year, pc.recommended_semester, pc.course_type
            FROM academic_plan_course pc
            JOIN course c ON c.course_id = pc.course_id
            WHERE pc.plan_id = ?1
            ORDER BY pc.recommended_year ASC, pc.recommended_semester ASC, c.code ASC
            "#,
        )?;

        let courses = stmt
            .query_map(params![plan_id], |row| {
                Ok(AcademicPlanCourse {
                    course_id: row.get(0)?,
                    course_code: row.get(1)?,
                    course_title: row.get(2)?,
                    credit_hours: row.get(3)?,
                    is_required: row.get(4)?,
                    recommended_year: row.get(5)?,
                    recommended_semester: row.get(6)?,
                    course_type: parse_course_type(&row.get::<_, String>(7)?),
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(Some(AcademicPlan {
            plan_id,
            major_name,
            total_credits_required,
            courses,
        }))
    }
}
