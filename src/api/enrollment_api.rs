// ==========================================
// 选课与学业档案引擎 - 选课 API
// ==========================================
// 职责: 购物车管理、结算选课、强制选课、退课、审批、管理员删除
// 红线: 结算为全有或全无（单事务：全部选课 + 清空购物车）
// 红线: 审计 / 通知失败只告警，不影响已提交的业务结果
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::api::error::{require_id, ApiError, ApiResult};
use crate::config::PolicyConfigReader;
use crate::domain::action_log::ActionType;
use crate::domain::enrollment::{CartItem, Enrollment, EnrollmentView};
use crate::domain::student::Actor;
use crate::engine::audit::{self, AuditLogger};
use crate::engine::events::{EnrollmentNotifier, NotifyResult};
use crate::repository::{
    CartRepository, CourseRepository, EnrollmentRepository, RepositoryError, StudentRepository,
};

// ==========================================
// EnrollmentApi - 选课 API
// ==========================================

/// 选课API
///
/// 职责：
/// 1. 购物车增删查
/// 2. 购物车结算（原子）与管理员强制选课
/// 3. 退课 / 审批通过 / 审批驳回 / 物理删除
/// 4. 审计与审批通知
pub struct EnrollmentApi {
    student_repo: Arc<StudentRepository>,
    course_repo: Arc<CourseRepository>,
    cart_repo: Arc<CartRepository>,
    enrollment_repo: Arc<EnrollmentRepository>,
    config: Arc<dyn PolicyConfigReader>,
    audit: Arc<dyn AuditLogger>,
    notifier: Arc<dyn EnrollmentNotifier>,
}

impl EnrollmentApi {
    /// 创建新的EnrollmentApi实例
    pub fn new(
        student_repo: Arc<StudentRepository>,
        course_repo: Arc<CourseRepository>,
        cart_repo: Arc<CartRepository>,
        enrollment_repo: Arc<EnrollmentRepository>,
        config: Arc<dyn PolicyConfigReader>,
        audit: Arc<dyn AuditLogger>,
        notifier: Arc<dyn EnrollmentNotifier>,
    ) -> Self {
        Self {
            student_repo,
            course_repo,
            cart_repo,
            enrollment_repo,
            config,
            audit,
            notifier,
        }
    }

    // ==========================================
    // 购物车
    // ==========================================

    /// 加入购物车
    ///
    /// # 返回
    /// - Ok(CartItem): 新增条目
    /// - Err(NotFound): 学生或教学班不存在
    /// - Err(ValidationError): 该教学班已在购物车中
    pub fn add_to_cart(&self, student_id: &str, section_id: &str) -> ApiResult<CartItem> {
        require_id("student_id", student_id)?;
        require_id("section_id", section_id)?;
        self.ensure_student(student_id)?;
        if self.course_repo.find_section(section_id)?.is_none() {
            return Err(RepositoryError::not_found("Section", section_id).into());
        }

        let item = CartItem {
            cart_item_id: uuid::Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            section_id: section_id.to_string(),
            added_at: Utc::now().naive_utc(),
        };

        self.cart_repo.insert(&item).map_err(|e| match e {
            RepositoryError::UniqueConstraintViolation(_) => ApiError::ValidationError(format!(
                "教学班已在购物车中: student_id={}, section_id={}",
                student_id, section_id
            )),
            other => other.into(),
        })?;

        debug!(student_id, section_id, "加入购物车");
        Ok(item)
    }

    /// 从购物车移除
    pub fn remove_from_cart(&self, student_id: &str, section_id: &str) -> ApiResult<()> {
        require_id("student_id", student_id)?;
        require_id("section_id", section_id)?;

        if !self.cart_repo.remove(student_id, section_id)? {
            return Err(ApiError::NotFound(format!(
                "购物车条目(student_id={}, section_id={})不存在",
                student_id, section_id
            )));
        }
        Ok(())
    }

    /// 查询购物车
    pub fn list_cart(&self, student_id: &str) -> ApiResult<Vec<CartItem>> {
        require_id("student_id", student_id)?;
        self.ensure_student(student_id)?;
        Ok(self.cart_repo.find_by_student(student_id)?)
    }

    // ==========================================
    // 选课
    // ==========================================

    /// 购物车结算
    ///
    /// 全部教学班在同一事务内选课并清空购物车；任一失败整体回滚，购物车不变。
    ///
    /// # 返回
    /// - Ok(Vec<Enrollment>): 新建选课记录（购物车顺序）
    /// - Err(EmptyCart / NotFound / DuplicateEnrollment / CapacityExceeded)
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub fn enroll_from_cart(&self, student_id: &str, actor: &Actor) -> ApiResult<Vec<Enrollment>> {
        require_id("student_id", student_id)?;
        self.ensure_student(student_id)?;

        let cart = self.cart_repo.find_by_student(student_id)?;
        if cart.is_empty() {
            return Err(ApiError::EmptyCart(student_id.to_string()));
        }
        let require_approval = self.approval_required()?;

        let section_ids: Vec<String> = cart.into_iter().map(|item| item.section_id).collect();
        let created = self.enrollment_repo.enroll_sections(
            student_id,
            &section_ids,
            Utc::now().naive_utc(),
            true,
        )?;

        info!(student_id, count = created.len(), "购物车结算完成");

        for enrollment in &created {
            audit::record(
                self.audit.as_ref(),
                actor,
                ActionType::Enroll,
                &enrollment.enrollment_id,
                json!({
                    "student_id": enrollment.student_id,
                    "section_id": enrollment.section_id,
                }),
            );
            if require_approval {
                self.notify("pending", self.notifier.notify_pending(enrollment));
            }
        }

        Ok(created)
    }

    /// 管理员强制选课
    ///
    /// 校验与普通选课一致（存在 / 重复 / 席位），只是不经过购物车
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub fn force_enroll(
        &self,
        student_id: &str,
        section_id: &str,
        actor: &Actor,
    ) -> ApiResult<Enrollment> {
        require_id("student_id", student_id)?;
        require_id("section_id", section_id)?;

        warn!(
            student_id,
            section_id,
            actor_email = %actor.email,
            "管理员强制选课"
        );

        let enrollment = self
            .enrollment_repo
            .enroll_one(student_id, section_id, Utc::now().naive_utc())?;

        audit::record(
            self.audit.as_ref(),
            actor,
            ActionType::ForceEnroll,
            &enrollment.enrollment_id,
            json!({ "student_id": student_id, "section_id": section_id }),
        );

        Ok(enrollment)
    }

    /// 查询学生选课（联表视图）
    pub fn get_student_enrollments(&self, student_id: &str) -> ApiResult<Vec<EnrollmentView>> {
        require_id("student_id", student_id)?;
        self.ensure_student(student_id)?;
        Ok(self.enrollment_repo.find_views_by_student(student_id)?)
    }

    // ==========================================
    // 状态变更
    // ==========================================

    /// 退课：ENROLLED → DROPPED，归还席位
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub fn drop_enrollment(&self, enrollment_id: &str, actor: &Actor) -> ApiResult<Enrollment> {
        require_id("enrollment_id", enrollment_id)?;

        let enrollment = self.enrollment_repo.release(enrollment_id, None)?;
        info!(enrollment_id, section_id = %enrollment.section_id, "退课完成");

        audit::record(
            self.audit.as_ref(),
            actor,
            ActionType::DropEnrollment,
            enrollment_id,
            json!({ "section_id": enrollment.section_id }),
        );
        Ok(enrollment)
    }

    /// 审批通过
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub fn approve_enrollment(&self, enrollment_id: &str, actor: &Actor) -> ApiResult<Enrollment> {
        require_id("enrollment_id", enrollment_id)?;

        let enrollment =
            self.enrollment_repo
                .approve(enrollment_id, &actor.user_id, Utc::now().naive_utc())?;
        info!(enrollment_id, "审批通过");

        audit::record(
            self.audit.as_ref(),
            actor,
            ActionType::ApproveEnrollment,
            enrollment_id,
            json!({ "approved_by": actor.user_id }),
        );
        self.notify("approved", self.notifier.notify_approved(&enrollment));
        Ok(enrollment)
    }

    /// 审批驳回：记录原因，ENROLLED → DROPPED，归还席位
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub fn decline_enrollment(
        &self,
        enrollment_id: &str,
        reason: &str,
        actor: &Actor,
    ) -> ApiResult<Enrollment> {
        require_id("enrollment_id", enrollment_id)?;
        if reason.trim().is_empty() {
            return Err(ApiError::ValidationError("驳回原因不能为空".to_string()));
        }

        let enrollment = self
            .enrollment_repo
            .release(enrollment_id, Some(reason.trim()))?;
        info!(enrollment_id, "审批驳回");

        audit::record(
            self.audit.as_ref(),
            actor,
            ActionType::DeclineEnrollment,
            enrollment_id,
            json!({ "reason": reason.trim() }),
        );
        self.notify(
            "declined",
            self.notifier.notify_declined(&enrollment, reason.trim()),
        );
        Ok(enrollment)
    }

    /// 管理员物理删除选课记录（在读记录归还席位）
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub fn delete_enrollment(&self, enrollment_id: &str, actor: &Actor) -> ApiResult<Enrollment> {
        require_id("enrollment_id", enrollment_id)?;

        let enrollment = self.enrollment_repo.delete(enrollment_id)?;
        warn!(
            enrollment_id,
            status = %enrollment.status,
            actor_email = %actor.email,
            "选课记录已物理删除"
        );

        audit::record(
            self.audit.as_ref(),
            actor,
            ActionType::DeleteEnrollment,
            enrollment_id,
            json!({
                "student_id": enrollment.student_id,
                "section_id": enrollment.section_id,
                "status": enrollment.status.to_db_str(),
            }),
        );
        Ok(enrollment)
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn ensure_student(&self, student_id: &str) -> ApiResult<()> {
        if self.student_repo.find_by_id(student_id)?.is_none() {
            return Err(RepositoryError::not_found("Student", student_id).into());
        }
        Ok(())
    }

    fn approval_required(&self) -> ApiResult<bool> {
        self.config
            .is_approval_required()
            .map_err(|e| ApiError::InternalError(format!("读取审批配置失败: {}", e)))
    }

    fn notify(&self, kind: &str, result: NotifyResult) {
        if let Err(e) = result {
            warn!(kind, error = %e, "选课通知发送失败（业务结果不受影响）");
        }
    }
}
