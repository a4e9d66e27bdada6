// ==========================================
// 选课与学业档案引擎 - 成绩单领域模型
// ==========================================
// 职责: 成绩记录、查询过滤条件、完整成绩单视图
// 红线: 同一 (student_id, course_id, section_id) 至多一条成绩
// 红线: credit_hours 为登记时快照，课程学分后续变化不回溯
// ==========================================

use crate::domain::types::Semester;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Transcript - 成绩记录
// ==========================================
// 对齐: transcript 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub transcript_id: String,
    pub student_id: String,
    pub course_id: String,
    pub section_id: String,
    pub grade: String,      // 已校验的成绩字母
    pub grade_points: f64,  // 绩点（派生）
    pub credit_hours: i32,  // 学分快照
    pub semester: Semester,
    pub year: i32,
    pub completed_at: NaiveDateTime,
}

impl Transcript {
    /// 质量分 = 绩点 × 学分
    pub fn quality_points(&self) -> f64 {
        self.grade_points * f64::from(self.credit_hours)
    }
}

// ==========================================
// TranscriptFilter - 成绩查询过滤条件
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptFilter {
    pub student_id: Option<String>,
    pub course_id: Option<String>,
    pub semester: Option<Semester>,
    pub year: Option<i32>,
}

// ==========================================
// SemesterTranscript - 学期成绩分组
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemesterTranscript {
    pub semester: Semester,
    pub year: i32,
    pub semester_gpa: f64,
    pub credit_hours: i32,
    pub records: Vec<Transcript>,
}

// ==========================================
// FullTranscript - 完整成绩单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullTranscript {
    pub student_id: String,
    pub student_name: String,
    pub cumulative_gpa: f64,
    pub completed_credits: i32,
    pub total_credits_required: i32,
    pub completion_percentage: f64,
    pub semesters: Vec<SemesterTranscript>, // 最近学期在前
}
