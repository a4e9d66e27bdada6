// ==========================================
// 选课与学业档案引擎 - 成绩台账仓储
// ==========================================
// 红线: Repository 不含业务规则（GPA 公式由调用方以闭包注入）
// 红线: 成绩写入 + GPA 全量重算 + 学生档案回写 在同一个 IMMEDIATE 事务内，
//       重算失败则成绩变更一并回滚
// ==========================================

use crate::domain::student::GpaSnapshot;
use crate::domain::transcript::{Transcript, TranscriptFilter};
use crate::domain::types::{EnrollmentStatus, Semester};
use crate::repository::db_utils::{
    build_where_clause, format_ts, parse_semester, parse_ts, semester_order_sql,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{
    params, Connection, OptionalExtension, Result as SqliteResult, Row, ToSql, TransactionBehavior,
};
use std::sync::{Arc, Mutex, MutexGuard};

const TRANSCRIPT_COLUMNS: &str = r#"
    transcript_id, student_id, course_id, section_id, grade, grade_points,
    credit_hours, semester, year, completed_at
"#;

// ==========================================
// TranscriptRepository - 成绩台账仓储
// ==========================================
pub struct TranscriptRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TranscriptRepository {
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
    // 写入操作（均触发 GPA 重算）
    // ==========================================

    /// 登记成绩并重算 GPA
    ///
    /// 同一事务内：
    /// 1. 写入成绩（三元组唯一）
    /// 2. 对应的在读选课记录 ENROLLED → COMPLETED，并记录成绩
    /// 3. 全量重算学生 GPA / 已获学分并回写
    ///
    /// # 返回
    /// - Ok(GpaSnapshot): 重算后的学生派生字段
    /// - Err(DuplicateTranscript): 三元组已存在，表不变
    pub fn insert_with_refresh<F>(
        &self,
        transcript: &Transcript,
        refresh: F,
    ) -> RepositoryResult<GpaSnapshot>
    where
        F: Fn(&[Transcript]) -> GpaSnapshot,
    {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            r#"
            INSERT INTO transcript (
                transcript_id, student_id, course_id, section_id, grade, grade_points,
                credit_hours, semester, year, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                transcript.transcript_id,
                transcript.student_id,
                transcript.course_id,
                transcript.section_id,
                transcript.grade,
                transcript.grade_points,
                transcript.credit_hours,
                transcript.semester.to_db_str(),
                transcript.year,
                format_ts(&transcript.completed_at),
            ],
        )
        .map_err(|e| match RepositoryError::from(e) {
            RepositoryError::UniqueConstraintViolation(_) => RepositoryError::DuplicateTranscript {
                student_id: transcript.student_id.clone(),
                course_id: transcript.course_id.clone(),
                section_id: transcript.section_id.clone(),
            },
            other => other,
        })?;

        tx.execute(
            r#"
            UPDATE enrollment
            SET status = ?3, grade = ?4
            WHERE student_id = ?1 AND section_id = ?2 AND status = ?5
            "#,
            params![
                transcript.student_id,
                transcript.section_id,
                EnrollmentStatus::Completed.to_db_str(),
                transcript.grade,
                EnrollmentStatus::Enrolled.to_db_str(),
            ],
        )?;

        let snapshot = refresh_student_gpa(&tx, &transcript.student_id, &refresh)?;
        tx.commit()?;
        Ok(snapshot)
    }

    /// 修改成绩并重算 GPA
    ///
    /// # 返回
    /// - Ok((Transcript, GpaSnapshot)): 修改后的成绩与重算结果
    pub fn update_grade_with_refresh<F>(
        &self,
        transcript_id: &str,
        grade: &str,
        grade_points: f64,
        refresh: F,
    ) -> RepositoryResult<(Transcript, GpaSnapshot)>
    where
        F: Fn(&[Transcript]) -> GpaSnapshot,
    {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut transcript = find_transcript(&tx, transcript_id)?
            .ok_or_else(|| RepositoryError::not_found("Transcript", transcript_id))?;

        tx.execute(
            "UPDATE transcript SET grade = ?2, grade_points = ?3 WHERE transcript_id = ?1",
            params![transcript_id, grade, grade_points],
        )?;
        // 已结课的选课记录同步成绩显示
        tx.execute(
            r#"
            UPDATE enrollment SET grade = ?3
            WHERE student_id = ?1 AND section_id = ?2 AND status = ?4
            "#,
            params![
                transcript.student_id,
                transcript.section_id,
                grade,
                EnrollmentStatus::Completed.to_db_str(),
            ],
        )?;

        let snapshot = refresh_student_gpa(&tx, &transcript.student_id, &refresh)?;
        tx.commit()?;

        transcript.grade = grade.to_string();
        transcript.grade_points = grade_points;
        Ok((transcript, snapshot))
    }

    /// 删除成绩并用剩余记录重算 GPA
    ///
    /// # 返回
    /// - Ok((Transcript, GpaSnapshot)): 被删除的成绩与重算结果
    pub fn delete_with_refresh<F>(
        &self,
        transcript_id: &str,
        refresh: F,
    ) -> RepositoryResult<(Transcript, GpaSnapshot)>
    where
        F: Fn(&[Transcript]) -> GpaSnapshot,
    {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let transcript = find_transcript(&tx, transcript_id)?
            .ok_or_else(|| RepositoryError::not_found("Transcript", transcript_id))?;

        tx.execute(
            "DELETE FROM transcript WHERE transcript_id = ?1",
            params![transcript_id],
        )?;

        let snapshot = refresh_student_gpa(&tx, &transcript.student_id, &refresh)?;
        tx.commit()?;
        Ok((transcript, snapshot))
    }

    /// 仅重算 GPA（无成绩变更）
    pub fn refresh_student<F>(&self, student_id: &str, refresh: F) -> RepositoryResult<GpaSnapshot>
    where
        F: Fn(&[Transcript]) -> GpaSnapshot,
    {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let snapshot = refresh_student_gpa(&tx, student_id, &refresh)?;
        tx.commit()?;
        Ok(snapshot)
    }

    // ==========================================
    // 查询操作（无副作用）
    // ==========================================

    /// 按ID查询
    pub fn find_by_id(&self, transcript_id: &str) -> RepositoryResult<Option<Transcript>> {
        let conn = self.get_conn()?;
        find_transcript(&conn, transcript_id)
    }

    /// 三元组是否已有成绩
    pub fn exists_for(
        &self,
        student_id: &str,
        course_id: &str,
        section_id: &str,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let found = conn
            .query_row(
                r#"
                SELECT 1 FROM transcript
                WHERE student_id = ?1 AND course_id = ?2 AND section_id = ?3
                "#,
                params![student_id, course_id, section_id],
                |_row| Ok(true),
            )
            .optional()?;
        Ok(found.unwrap_or(false))
    }

    /// 查询学生全部成绩（按时间顺序）
    pub fn find_by_student(&self, student_id: &str) -> RepositoryResult<Vec<Transcript>> {
        let conn = self.get_conn()?;
        load_student_transcripts(&conn, student_id)
    }

    /// 查询学生某学期成绩
    pub fn find_by_semester(
        &self,
        student_id: &str,
        semester: Semester,
        year: i32,
    ) -> RepositoryResult<Vec<Transcript>> {
        self.find_all(&TranscriptFilter {
            student_id: Some(student_id.to_string()),
            course_id: None,
            semester: Some(semester),
            year: Some(year),
        })
    }

    /// 按可选条件查询成绩
    pub fn find_all(&self, filter: &TranscriptFilter) -> RepositoryResult<Vec<Transcript>> {
        let conn = self.get_conn()?;

        let where_clause = build_where_clause(&[
            ("student_id", filter.student_id.is_some()),
            ("course_id", filter.course_id.is_some()),
            ("semester", filter.semester.is_some()),
            ("year", filter.year.is_some()),
        ]);
        let sql = format!(
            "SELECT {} FROM transcript{} \
             ORDER BY student_id ASC, year ASC, {} ASC, completed_at ASC",
            TRANSCRIPT_COLUMNS,
            where_clause,
            semester_order_sql("semester")
        );

        let semester = filter.semester.map(|s| s.to_db_str());
        let mut bind: Vec<&dyn ToSql> = Vec::new();
        if let Some(ref v) = filter.student_id {
            bind.push(v);
        }
        if let Some(ref v) = filter.course_id {
            bind.push(v);
        }
        if let Some(ref v) = semester {
            bind.push(v);
        }
        if let Some(ref v) = filter.year {
            bind.push(v);
        }

        let mut stmt = conn.prepare(&sql)?;
        let transcripts = stmt
            .query_map(bind.as_slice(), map_transcript_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(transcripts)
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 事务内全量重算并回写学生 GPA / 已获学分
fn refresh_student_gpa<F>(
    conn: &Connection,
    student_id: &str,
    refresh: &F,
) -> RepositoryResult<GpaSnapshot>
where
    F: Fn(&[Transcript]) -> GpaSnapshot,
{
    let transcripts = load_student_transcripts(conn, student_id)?;
    let snapshot = refresh(&transcripts);

    let rows = conn.execute(
        "UPDATE student SET gpa = ?2, completed_credits = ?3 WHERE student_id = ?1",
        params![student_id, snapshot.gpa, snapshot.completed_credits],
    )?;
    if rows == 0 {
        return Err(RepositoryError::not_found("Student", student_id));
    }

    tracing::debug!(
        student_id,
        gpa = snapshot.gpa,
        completed_credits = snapshot.completed_credits,
        rows = transcripts.len(),
        "GPA 重算完成"
    );
    Ok(snapshot)
}

fn load_student_transcripts(
    conn: &Connection,
    student_id: &str,
) -> RepositoryResult<Vec<Transcript>> {
    let sql = format!(
        "SELECT {} FROM transcript WHERE student_id = ?1 \
         ORDER BY year ASC, {} ASC, completed_at ASC",
        TRANSCRIPT_COLUMNS,
        semester_order_sql("semester")
    );
    let mut stmt = conn.prepare(&sql)?;
    let transcripts = stmt
        .query_map(params![student_id], map_transcript_row)?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(transcripts)
}

fn find_transcript(conn: &Connection, transcript_id: &str) -> RepositoryResult<Option<Transcript>> {
    let sql = format!(
        "SELECT {} FROM transcript WHERE transcript_id = ?1",
        TRANSCRIPT_COLUMNS
    );
    let transcript = conn
        .query_row(&sql, params![transcript_id], map_transcript_row)
        .optional()?;
    Ok(transcript)
}

fn map_transcript_row(row: &Row<'_>) -> rusqlite::Result<Transcript> {
    Ok(Transcript {
        transcript_id: row.get(0)?,
        student_id: row.get(1)?,
        course_id: row.get(2)?,
        section_id: row.get(3)?,
        grade: row.get(4)?,
        grade_points: row.get(5)?,
        credit_hours: row.get(6)?,
        semester: parse_semester(7, &row.get::<_, String>(7)?)?,
        year: row.get(8)?,
        completed_at: parse_ts(9, &row.get::<_, String>(9)?)?,
    })
}
