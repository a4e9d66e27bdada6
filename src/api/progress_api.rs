// ==========================================
// 选课与学业档案引擎 - 学业进度 API
// ==========================================
// 职责: 学业进度报告、培养方案分配
// 说明: 报告为只读快照（读已提交即可，允许轻微滞后）
// ==========================================

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde_json::json;
use tracing::{info, instrument};

use crate::api::error::{require_id, ApiError, ApiResult};
use crate::config::PolicyConfigReader;
use crate::domain::academic_plan::AcademicProgress;
use crate::domain::action_log::ActionType;
use crate::domain::student::{Actor, Student};
use crate::engine::audit::{self, AuditLogger};
use crate::engine::ProgressEngine;
use crate::repository::{
    AcademicPlanRepository, EnrollmentRepository, RepositoryError, StudentRepository,
    TranscriptRepository,
};

// ==========================================
// ProgressApi - 学业进度 API
// ==========================================
pub struct ProgressApi {
    student_repo: Arc<StudentRepository>,
    plan_repo: Arc<AcademicPlanRepository>,
    transcript_repo: Arc<TranscriptRepository>,
    enrollment_repo: Arc<EnrollmentRepository>,
    config: Arc<dyn PolicyConfigReader>,
    audit: Arc<dyn AuditLogger>,
}

impl ProgressApi {
    /// 创建新的ProgressApi实例
    pub fn new(
        student_repo: Arc<StudentRepository>,
        plan_repo: Arc<AcademicPlanRepository>,
        transcript_repo: Arc<TranscriptRepository>,
        enrollment_repo: Arc<EnrollmentRepository>,
        config: Arc<dyn PolicyConfigReader>,
        audit: Arc<dyn AuditLogger>,
    ) -> Self {
        Self {
            student_repo,
            plan_repo,
            transcript_repo,
            enrollment_repo,
            config,
            audit,
        }
    }

    /// 学业进度报告（以当前年份计算预计毕业年份）
    ///
    /// # 返回
    /// - Ok(AcademicProgress): 进度报告（无培养方案时为零值报告）
    /// - Err(NotFound): 学生不存在
    pub fn get_student_academic_progress(&self, student_id: &str) -> ApiResult<AcademicProgress> {
        self.get_student_academic_progress_at(student_id, Utc::now().year())
    }

    /// 学业进度报告（指定当前年份）
    #[instrument(skip(self))]
    pub fn get_student_academic_progress_at(
        &self,
        student_id: &str,
        current_year: i32,
    ) -> ApiResult<AcademicProgress> {
        let student = self.load_student(student_id)?;

        let plan = match student.academic_plan_id.as_deref() {
            Some(plan_id) => self.plan_repo.find_by_id(plan_id)?,
            None => None,
        };
        let transcripts = self.transcript_repo.find_by_student(student_id)?;
        let in_progress: HashSet<String> = self
            .enrollment_repo
            .find_active_course_ids(student_id)?
            .into_iter()
            .collect();

        let credits_per_year = self
            .config
            .get_credits_per_year()
            .map_err(|e| ApiError::InternalError(format!("读取进度配置失败: {}", e)))?;

        let engine = ProgressEngine::new(credits_per_year);
        Ok(engine.build_report(&student, plan.as_ref(), &transcripts, &in_progress, current_year))
    }

    /// 分配 / 取消培养方案
    ///
    /// # 参数
    /// - plan_id: None 表示取消分配
    ///
    /// # 返回
    /// - Ok(Student): 更新后的学生档案
    /// - Err(NotFound): 学生或培养方案不存在
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub fn assign_academic_plan(
        &self,
        student_id: &str,
        plan_id: Option<&str>,
        actor: &Actor,
    ) -> ApiResult<Student> {
        require_id("student_id", student_id)?;
        if let Some(plan_id) = plan_id {
            require_id("plan_id", plan_id)?;
            if !self.plan_repo.exists(plan_id)? {
                return Err(RepositoryError::not_found("AcademicPlan", plan_id).into());
            }
        }

        self.student_repo.assign_plan(student_id, plan_id)?;
        info!(student_id, plan_id = ?plan_id, "培养方案已分配");

        audit::record(
            self.audit.as_ref(),
            actor,
            ActionType::AssignPlan,
            student_id,
            json!({ "plan_id": plan_id }),
        );
        self.load_student(student_id)
    }

    fn load_student(&self, student_id: &str) -> ApiResult<Student> {
        require_id("student_id", student_id)?;
        Ok(self
            .student_repo
            .find_by_id(student_id)?
            .ok_or_else(|| RepositoryError::not_found("Student", student_id))?)
    }
}
