// ==========================================
// 选课与学业档案引擎 - 成绩台账 API
// ==========================================
// 职责: 成绩登记 / 修改 / 删除、GPA 重算、成绩单查询
// 红线: 所有成绩写入经由 TranscriptRepository::*_with_refresh，
//       GPA 与已获学分在同一事务内全量重算（recompute-on-write）
// 红线: 学分在登记时从课程快照，课程后续修改不回溯
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::api::error::{require_id, require_year, ApiError, ApiResult};
use crate::config::PolicyConfigReader;
use crate::domain::action_log::ActionType;
use crate::domain::student::{Actor, GpaSnapshot, Student};
use crate::domain::transcript::{FullTranscript, Transcript, TranscriptFilter};
use crate::domain::types::Semester;
use crate::engine::audit::{self, AuditLogger};
use crate::engine::{gpa, grade_policy};
use crate::repository::{
    AcademicPlanRepository, CourseRepository, RepositoryError, StudentRepository,
    TranscriptRepository,
};

// ==========================================
// TranscriptApi - 成绩台账 API
// ==========================================
pub struct TranscriptApi {
    student_repo: Arc<StudentRepository>,
    course_repo: Arc<CourseRepository>,
    plan_repo: Arc<AcademicPlanRepository>,
    transcript_repo: Arc<TranscriptRepository>,
    config: Arc<dyn PolicyConfigReader>,
    audit: Arc<dyn AuditLogger>,
}

impl TranscriptApi {
    /// 创建新的TranscriptApi实例
    pub fn new(
        student_repo: Arc<StudentRepository>,
        course_repo: Arc<CourseRepository>,
        plan_repo: Arc<AcademicPlanRepository>,
        transcript_repo: Arc<TranscriptRepository>,
        config: Arc<dyn PolicyConfigReader>,
        audit: Arc<dyn AuditLogger>,
    ) -> Self {
        Self {
            student_repo,
            course_repo,
            plan_repo,
            transcript_repo,
            config,
            audit,
        }
    }

    // ==========================================
    // 写入接口（均触发 GPA 重算）
    // ==========================================

    /// 登记成绩
    ///
    /// # 参数
    /// - student_id / course_id / section_id: 成绩三元组
    /// - grade: 字母成绩（仅 A..F 合法，大小写不敏感）
    /// - semester / year: 修读学期
    /// - actor: 操作人（教师 / 管理员）
    ///
    /// # 返回
    /// - Ok(Transcript): 新登记的成绩
    /// - Err(InvalidGrade / NotFound / DuplicateTranscript / ValidationError)
    #[allow(clippy::too_many_arguments)]
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub fn create_transcript(
        &self,
        student_id: &str,
        course_id: &str,
        section_id: &str,
        grade: &str,
        semester: Semester,
        year: i32,
        actor: &Actor,
    ) -> ApiResult<Transcript> {
        require_id("student_id", student_id)?;
        require_id("course_id", course_id)?;
        require_id("section_id", section_id)?;
        require_year(year)?;
        let grade = self.validate_grade(grade)?;

        if self.student_repo.find_by_id(student_id)?.is_none() {
            return Err(RepositoryError::not_found("Student", student_id).into());
        }
        let course = self
            .course_repo
            .find_course(course_id)?
            .ok_or_else(|| RepositoryError::not_found("Course", course_id))?;
        let section = self
            .course_repo
            .find_section(section_id)?
            .ok_or_else(|| RepositoryError::not_found("Section", section_id))?;
        if section.course_id != course.course_id {
            return Err(ApiError::ValidationError(format!(
                "教学班{}不属于课程{}",
                section_id, course_id
            )));
        }

        if self.transcript_repo.exists_for(student_id, course_id, section_id)? {
            return Err(ApiError::DuplicateTranscript {
                student_id: student_id.to_string(),
                course_id: course_id.to_string(),
                section_id: section_id.to_string(),
            });
        }

        let transcript = Transcript {
            transcript_id: uuid::Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            course_id: course_id.to_string(),
            section_id: section_id.to_string(),
            grade_points: grade_policy::grade_points(&grade),
            grade,
            credit_hours: course.credit_hours,
            semester,
            year,
            completed_at: Utc::now().naive_utc(),
        };

        let snapshot = self
            .transcript_repo
            .insert_with_refresh(&transcript, gpa::snapshot)?;
        info!(
            transcript_id = %transcript.transcript_id,
            grade = %transcript.grade,
            gpa = snapshot.gpa,
            completed_credits = snapshot.completed_credits,
            "成绩登记完成"
        );

        audit::record(
            self.audit.as_ref(),
            actor,
            ActionType::CreateTranscript,
            &transcript.transcript_id,
            json!({
                "student_id": student_id,
                "course_id": course_id,
                "section_id": section_id,
                "grade": transcript.grade,
                "gpa_after": snapshot.gpa,
            }),
        );
        Ok(transcript)
    }

    /// 修改成绩（原地替换成绩与绩点）
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub fn update_grade(
        &self,
        transcript_id: &str,
        new_grade: &str,
        actor: &Actor,
    ) -> ApiResult<Transcript> {
        require_id("transcript_id", transcript_id)?;
        let grade = self.validate_grade(new_grade)?;
        let points = grade_policy::grade_points(&grade);

        let (transcript, snapshot) =
            self.transcript_repo
                .update_grade_with_refresh(transcript_id, &grade, points, gpa::snapshot)?;
        info!(transcript_id, grade = %grade, gpa = snapshot.gpa, "成绩修改完成");

        audit::record(
            self.audit.as_ref(),
            actor,
            ActionType::UpdateGrade,
            transcript_id,
            json!({
                "student_id": transcript.student_id,
                "grade": grade,
                "gpa_after": snapshot.gpa,
            }),
        );
        Ok(transcript)
    }

    /// 删除成绩
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub fn delete_transcript(&self, transcript_id: &str, actor: &Actor) -> ApiResult<Transcript> {
        require_id("transcript_id", transcript_id)?;

        let (transcript, snapshot) = self
            .transcript_repo
            .delete_with_refresh(transcript_id, gpa::snapshot)?;
        info!(transcript_id, gpa = snapshot.gpa, "成绩删除完成");

        audit::record(
            self.audit.as_ref(),
            actor,
            ActionType::DeleteTranscript,
            transcript_id,
            json!({
                "student_id": transcript.student_id,
                "course_id": transcript.course_id,
                "grade": transcript.grade,
                "gpa_after": snapshot.gpa,
            }),
        );
        Ok(transcript)
    }

    /// 全量重算并回写学生 GPA / 已获学分
    ///
    /// 无成绩时 GPA=0.0、已获学分=0
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub fn recalculate_and_update_student_gpa(
        &self,
        student_id: &str,
        actor: &Actor,
    ) -> ApiResult<GpaSnapshot> {
        require_id("student_id", student_id)?;
        let snapshot = self.transcript_repo.refresh_student(student_id, gpa::snapshot)?;
        debug!(student_id, gpa = snapshot.gpa, "GPA 手动重算完成");

        audit::record(
            self.audit.as_ref(),
            actor,
            ActionType::RecalculateGpa,
            student_id,
            json!({
                "gpa": snapshot.gpa,
                "completed_credits": snapshot.completed_credits,
            }),
        );

        Ok(snapshot)
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 学期 GPA（无记录返回 0.0）
    pub fn calculate_semester_gpa(
        &self,
        student_id: &str,
        semester: Semester,
        year: i32,
    ) -> ApiResult<f64> {
        self.load_student(student_id)?;
        let rows = self.transcript_repo.find_by_semester(student_id, semester, year)?;
        Ok(gpa::semester_gpa(&rows, semester, year))
    }

    /// 查询学生全部成绩
    pub fn get_transcripts_by_student(&self, student_id: &str) -> ApiResult<Vec<Transcript>> {
        require_id("student_id", student_id)?;
        Ok(self.transcript_repo.find_by_student(student_id)?)
    }

    /// 查询学生某学期成绩
    pub fn get_transcripts_by_semester(
        &self,
        student_id: &str,
        semester: Semester,
        year: i32,
    ) -> ApiResult<Vec<Transcript>> {
        require_id("student_id", student_id)?;
        Ok(self.transcript_repo.find_by_semester(student_id, semester, year)?)
    }

    /// 按可选条件查询成绩
    pub fn get_all_transcripts(&self, filter: &TranscriptFilter) -> ApiResult<Vec<Transcript>> {
        Ok(self.transcript_repo.find_all(filter)?)
    }

    /// 完整成绩单：按学期分组（最近在前）+ 累计汇总
    #[instrument(skip(self))]
    pub fn get_student_full_transcript(&self, student_id: &str) -> ApiResult<FullTranscript> {
        let student = self.load_student(student_id)?;
        let rows = self.transcript_repo.find_by_student(student_id)?;

        let total_credits_required = match student.academic_plan_id.as_deref() {
            Some(plan_id) => self
                .plan_repo
                .find_by_id(plan_id)?
                .map(|p| p.total_credits_required)
                .unwrap_or(0),
            None => 0,
        };

        Ok(FullTranscript {
            student_id: student.student_id.clone(),
            student_name: student.full_name.clone(),
            cumulative_gpa: student.gpa,
            completed_credits: student.completed_credits,
            total_credits_required,
            completion_percentage: gpa::completion_percentage(
                student.completed_credits,
                total_credits_required,
            ),
            semesters: gpa::group_by_semester(&rows),
        })
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn load_student(&self, student_id: &str) -> ApiResult<Student> {
        require_id("student_id", student_id)?;
        Ok(self
            .student_repo
            .find_by_id(student_id)?
            .ok_or_else(|| RepositoryError::not_found("Student", student_id))?)
    }

    /// 成绩校验：长度上限 + 仅接受计入 GPA 的字母成绩
    ///
    /// # 返回
    /// - Ok(String): 规范化后的成绩（大写）
    fn validate_grade(&self, grade: &str) -> ApiResult<String> {
        let max_len = self
            .config
            .get_max_grade_len()
            .map_err(|e| ApiError::InternalError(format!("读取成绩配置失败: {}", e)))?;

        let canonical = grade_policy::canonical(grade);
        if canonical.is_empty() || canonical.chars().count() > max_len {
            return Err(ApiError::InvalidGrade(grade.to_string()));
        }
        if !grade_policy::is_valid_grade(&canonical) {
            return Err(ApiError::InvalidGrade(grade.to_string()));
        }
        Ok(canonical)
    }
}
