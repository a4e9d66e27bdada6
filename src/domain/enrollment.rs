// ==========================================
// 选课与学业档案引擎 - 选课领域模型
// ==========================================
// 职责: 选课记录、购物车条目、选课展示视图
// 红线: 同一 (student_id, section_id) 至多一条 ENROLLED 记录
// 红线: 退课是状态变更，不是删除
// ==========================================

use crate::domain::types::{EnrollmentStatus, Semester};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Enrollment - 选课记录
// ==========================================
// 对齐: enrollment 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub enrollment_id: String,
    pub student_id: String,
    pub section_id: String,
    pub enrolled_at: NaiveDateTime,
    pub status: EnrollmentStatus,
    pub grade: Option<String>,

    // ===== 审批流（可选） =====
    pub approved_at: Option<NaiveDateTime>,
    pub approved_by: Option<String>,
    pub decline_reason: Option<String>,
}

impl Enrollment {
    /// 新建一条在读选课记录
    pub fn new(
        enrollment_id: String,
        student_id: &str,
        section_id: &str,
        enrolled_at: NaiveDateTime,
    ) -> Self {
        Self {
            enrollment_id,
            student_id: student_id.to_string(),
            section_id: section_id.to_string(),
            enrolled_at,
            status: EnrollmentStatus::Enrolled,
            grade: None,
            approved_at: None,
            approved_by: None,
            decline_reason: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

// ==========================================
// CartItem - 购物车条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub cart_item_id: String,
    pub student_id: String,
    pub section_id: String,
    pub added_at: NaiveDateTime,
}

// ==========================================
// EnrollmentView - 选课展示视图
// ==========================================
/// Enrollment → Section → Course → Instructor 联表投影
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentView {
    pub enrollment_id: String,
    pub section_id: String,
    pub course_id: String,
    pub course_code: String,
    pub course_title: String,
    pub credit_hours: i32,
    pub semester: Semester,
    pub year: i32,
    pub instructor_name: Option<String>,
    pub status: EnrollmentStatus,
    pub grade: Option<String>,
    pub enrolled_at: NaiveDateTime,
}
