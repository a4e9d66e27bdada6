use super::{map_enrollment_row, EnrollmentRepository, ENROLLMENT_COLUMNS};
use crate::domain::enrollment::Enrollment;
use crate::domain::types::EnrollmentStatus;
use crate::repository::db_utils::{format_ts, restore_seat};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::student_repo::student_exists;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

impl EnrollmentRepository {
    // ==========================================
    // 选课写入
    // ==========================================

    /// 原子批量选课
    ///
    /// 所有教学班在同一个 IMMEDIATE 事务内完成：任一教学班失败（不存在/重复/满员）
    /// 整个事务回滚，已扣减的席位与已写入的选课记录全部撤销，购物车保持不变。
    ///
    /// # 参数
    /// - `student_id`: 学号
    /// - `section_ids`: 教学班列表
    /// - `enrolled_at`: 选课时间
    /// - `clear_cart`: 成功后是否在同一事务内清空购物车
    ///
    /// # 返回
    /// - Ok(Vec<Enrollment>): 新建的选课记录（与 section_ids 顺序一致）
    /// - Err(NotFound / DuplicateEnrollment / CapacityExceeded): 任一教学班失败
    pub fn enroll_sections(
        &self,
        student_id: &str,
        section_ids: &[String],
        enrolled_at: NaiveDateTime,
        clear_cart: bool,
    ) -> RepositoryResult<Vec<Enrollment>> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !student_exists(&tx, student_id)? {
            return Err(RepositoryError::not_found("Student", student_id));
        }

        let mut created = Vec::with_capacity(section_ids.len());
        for section_id in section_ids {
            created.push(enroll_in_tx(&tx, student_id, section_id, enrolled_at)?);
        }

        if clear_cart {
            tx.execute(
                "DELETE FROM cart_item WHERE student_id = ?1",
                params![student_id],
            )?;
        }

        tx.commit()?;
        Ok(created)
    }

    /// 单个教学班选课（独立事务）
    pub fn enroll_one(
        &self,
        student_id: &str,
        section_id: &str,
        enrolled_at: NaiveDateTime,
    ) -> RepositoryResult<Enrollment> {
        let mut created =
            self.enroll_sections(student_id, &[section_id.to_string()], enrolled_at, false)?;
        created
            .pop()
            .ok_or_else(|| RepositoryError::InternalError("选课事务未返回记录".to_string()))
    }

    // ==========================================
    // 状态变更
    // ==========================================

    /// 释放在读选课（退课 / 审批驳回）：ENROLLED → DROPPED 并归还席位
    ///
    /// 状态校验放在事务内，避免并发退课重复归还席位。
    pub fn release(
        &self,
        enrollment_id: &str,
        decline_reason: Option<&str>,
    ) -> RepositoryResult<Enrollment> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut enrollment = find_enrollment(&tx, enrollment_id)?
            .ok_or_else(|| RepositoryError::not_found("Enrollment", enrollment_id))?;
        ensure_transition(&enrollment, EnrollmentStatus::Dropped)?;

        tx.execute(
            r#"
            UPDATE enrollment
            SET status = ?2, decline_reason = COALESCE(?3, decline_reason)
            WHERE enrollment_id = ?1
            "#,
            params![
                enrollment_id,
                EnrollmentStatus::Dropped.to_db_str(),
                decline_reason
            ],
        )?;
        restore_seat(&tx, &enrollment.section_id)?;
        tx.commit()?;

        enrollment.status = EnrollmentStatus::Dropped;
        if let Some(reason) = decline_reason {
            enrollment.decline_reason = Some(reason.to_string());
        }
        Ok(enrollment)
    }

    /// 审批通过：记录审批人与审批时间（状态保持 ENROLLED）
    pub fn approve(
        &self,
        enrollment_id: &str,
        approved_by: &str,
        approved_at: NaiveDateTime,
    ) -> RepositoryResult<Enrollment> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut enrollment = find_enrollment(&tx, enrollment_id)?
            .ok_or_else(|| RepositoryError::not_found("Enrollment", enrollment_id))?;
        if !enrollment.is_active() {
            return Err(RepositoryError::InvalidStateTransition {
                from: enrollment.status.to_string(),
                to: "APPROVED".to_string(),
            });
        }

        tx.execute(
            "UPDATE enrollment SET approved_at = ?2, approved_by = ?3 WHERE enrollment_id = ?1",
            params![enrollment_id, format_ts(&approved_at), approved_by],
        )?;
        tx.commit()?;

        enrollment.approved_at = Some(approved_at);
        enrollment.approved_by = Some(approved_by.to_string());
        Ok(enrollment)
    }

    /// 管理员物理删除选课记录；若删除的是在读记录则归还席位
    ///
    /// # 返回
    /// - Ok(Enrollment): 被删除的记录
    pub fn delete(&self, enrollment_id: &str) -> RepositoryResult<Enrollment> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let enrollment = find_enrollment(&tx, enrollment_id)?
            .ok_or_else(|| RepositoryError::not_found("Enrollment", enrollment_id))?;

        tx.execute(
            "DELETE FROM enrollment WHERE enrollment_id = ?1",
            params![enrollment_id],
        )?;
        if enrollment.is_active() {
            restore_seat(&tx, &enrollment.section_id)?;
        }
        tx.commit()?;

        Ok(enrollment)
    }
}

// ==========================================
// 事务内原语
// ==========================================

/// 单教学班选课原语（调用方负责事务）
///
/// 检查顺序: 教学班存在 → 无在读重复 → 条件扣减席位 → 写入选课
fn enroll_in_tx(
    conn: &Connection,
    student_id: &str,
    section_id: &str,
    enrolled_at: NaiveDateTime,
) -> RepositoryResult<Enrollment> {
    let section_found: Option<i32> = conn
        .query_row(
            "SELECT available_seats FROM section WHERE section_id = ?1",
            params![section_id],
            |row| row.get(0),
        )
        .optional()?;
    if section_found.is_none() {
        return Err(RepositoryError::not_found("Section", section_id));
    }

    if find_active(conn, student_id, section_id)?.is_some() {
        return Err(duplicate_enrollment(student_id, section_id));
    }

    // compare-and-decrement: 席位为 0 时影响行数为 0
    let decremented = conn.execute(
        r#"
        UPDATE section
        SET available_seats = available_seats - 1
        WHERE section_id = ?1 AND available_seats > 0
        "#,
        params![section_id],
    )?;
    if decremented == 0 {
        return Err(RepositoryError::CapacityExceeded {
            section_id: section_id.to_string(),
        });
    }

    let enrollment = Enrollment::new(
        uuid::Uuid::new_v4().to_string(),
        student_id,
        section_id,
        enrolled_at,
    );

    conn.execute(
        r#"
        INSERT INTO enrollment (
            enrollment_id, student_id, section_id, enrolled_at, status, grade,
            approved_at, approved_by, decline_reason
        ) VALUES (?1, ?2, ?3, ?4, ?5, NULL, NULL, NULL, NULL)
        "#,
        params![
            enrollment.enrollment_id,
            enrollment.student_id,
            enrollment.section_id,
            format_ts(&enrollment.enrolled_at),
            enrollment.status.to_db_str(),
        ],
    )
    .map_err(|e| match RepositoryError::from(e) {
        RepositoryError::UniqueConstraintViolation(_) => {
            duplicate_enrollment(student_id, section_id)
        }
        other => other,
    })?;

    Ok(enrollment)
}

fn ensure_transition(enrollment: &Enrollment, next: EnrollmentStatus) -> RepositoryResult<()> {
    if enrollment.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(RepositoryError::InvalidStateTransition {
            from: enrollment.status.to_string(),
            to: next.to_string(),
        })
    }
}

fn duplicate_enrollment(student_id: &str, section_id: &str) -> RepositoryError {
    RepositoryError::DuplicateEnrollment {
        student_id: student_id.to_string(),
        section_id: section_id.to_string(),
    }
}

pub(crate) fn find_enrollment(
    conn: &Connection,
    enrollment_id: &str,
) -> RepositoryResult<Option<Enrollment>> {
    let sql = format!(
        "SELECT {} FROM enrollment WHERE enrollment_id = ?1",
        ENROLLMENT_COLUMNS
    );
    let enrollment = conn
        .query_row(&sql, params![enrollment_id], map_enrollment_row)
        .optional()?;
    Ok(enrollment)
}

pub(crate) fn find_active(
    conn: &Connection,
    student_id: &str,
    section_id: &str,
) -> RepositoryResult<Option<Enrollment>> {
    let sql = format!(
        "SELECT {} FROM enrollment WHERE student_id = ?1 AND section_id = ?2 AND status = ?3",
        ENROLLMENT_COLUMNS
    );
    let enrollment = conn
        .query_row(
            &sql,
            params![student_id, section_id, EnrollmentStatus::Enrolled.to_db_str()],
            map_enrollment_row,
        )
        .optional()?;
    Ok(enrollment)
}
