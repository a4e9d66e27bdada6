// ==========================================
// 选课与学业档案引擎 - 课程/教学班领域模型
// ==========================================
// 职责: 课程、教师、教学班（Section）
// 说明: 三者的增删改由外部 CRUD 负责，本引擎只读，
//       唯一例外是 Section.available_seats 由选课引擎维护
// ==========================================

use crate::domain::types::Semester;
use serde::{Deserialize, Serialize};

// ==========================================
// Course - 课程
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub course_id: String,
    pub code: String,      // 课程代码，如 CS101
    pub title: String,     // 课程名称
    pub credit_hours: i32, // 学分
}

// ==========================================
// Instructor - 任课教师
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructor {
    pub instructor_id: String,
    pub full_name: String,
    pub email: Option<String>,
}

// ==========================================
// Section - 教学班
// ==========================================
// 红线: available_seats 永不为负
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub section_id: String,
    pub course_id: String,
    pub instructor_id: Option<String>,
    pub semester: Semester,
    pub year: i32,
    pub capacity: i32,        // 总容量
    pub available_seats: i32, // 剩余席位
}

impl Section {
    /// 是否还有剩余席位
    pub fn has_seats(&self) -> bool {
        self.available_seats > 0
    }
}
