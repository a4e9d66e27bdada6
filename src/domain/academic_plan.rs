// ==========================================
// 选课与学业档案引擎 - 培养方案与学业进度
// ==========================================
// 职责: 培养方案（只读输入）+ 学业进度报告
// ==========================================

use crate::domain::types::CourseType;
use serde::{Deserialize, Serialize};

/// 未分配培养方案时报告中的专业名称
pub const MAJOR_NOT_ASSIGNED: &str = "Not Assigned";

// ==========================================
// AcademicPlan - 培养方案
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicPlan {
    pub plan_id: String,
    pub major_name: String,
    pub total_credits_required: i32,
    pub courses: Vec<AcademicPlanCourse>,
}

// ==========================================
// AcademicPlanCourse - 方案课程
// ==========================================
/// 方案内的一门推荐课程（已联表带出课程代码/名称/学分）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicPlanCourse {
    pub course_id: String,
    pub course_code: String,
    pub course_title: String,
    pub credit_hours: i32,
    pub is_required: bool,
    pub recommended_year: i32,
    pub recommended_semester: i32,
    pub course_type: CourseType,
}

// ==========================================
// 进度分桶
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressBucket {
    Completed,
    InProgress,
    Remaining,
}

/// 进度报告中的单门课程
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressCourse {
    pub course_id: String,
    pub course_code: String,
    pub course_title: String,
    pub credit_hours: i32,
    pub is_required: bool,
    pub recommended_year: i32,
    pub recommended_semester: i32,
    pub course_type: CourseType,
    pub grade: Option<String>, // 仅 Completed 分桶有值
}

// ==========================================
// AcademicProgress - 学业进度报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicProgress {
    pub student_id: String,
    pub student_name: String,
    pub major_name: String,
    pub total_credits_required: i32,
    pub credits_completed: i32,
    pub credits_remaining: i32,
    pub progress_percentage: f64,
    pub expected_graduation_year: i32,
    pub current_gpa: f64,
    pub completed_courses: Vec<ProgressCourse>,
    pub in_progress_courses: Vec<ProgressCourse>,
    pub remaining_courses: Vec<ProgressCourse>,
}
