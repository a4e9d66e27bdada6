// ==========================================
// 选课与学业档案引擎 - 学生档案领域模型
// ==========================================
// 职责: 学生聚合根（已修学分、GPA 缓存、培养方案引用）
// 红线: gpa / completed_credits 只允许由成绩台账重算写入
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Student - 学生档案
// ==========================================
// 对齐: student 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: String,               // 学号
    pub full_name: String,                // 姓名
    pub email: Option<String>,            // 邮箱
    pub completed_credits: i32,           // 已获学分（仅统计及格成绩）
    pub gpa: f64,                         // 累计 GPA（派生缓存）
    pub academic_plan_id: Option<String>, // 培养方案
}

impl Student {
    /// 创建新学生档案（GPA 与学分从零开始）
    pub fn new(student_id: &str, full_name: &str) -> Self {
        Self {
            student_id: student_id.to_string(),
            full_name: full_name.to_string(),
            email: None,
            completed_credits: 0,
            gpa: 0.0,
            academic_plan_id: None,
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    pub fn with_plan(mut self, plan_id: &str) -> Self {
        self.academic_plan_id = Some(plan_id.to_string());
        self
    }
}

// ==========================================
// GpaSnapshot - GPA 重算结果
// ==========================================
/// 一次全量重算得到的派生字段
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpaSnapshot {
    pub gpa: f64,
    pub completed_credits: i32,
}

impl GpaSnapshot {
    pub fn zero() -> Self {
        Self {
            gpa: 0.0,
            completed_credits: 0,
        }
    }
}

// ==========================================
// Actor - 操作人
// ==========================================
/// 所有写操作显式携带的操作人身份（审计用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub email: String,
}

impl Actor {
    pub fn new(user_id: &str, email: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: email.to_string(),
        }
    }

    /// 系统内部任务（如批量导入）使用的操作人
    pub fn system() -> Self {
        Self::new("system", "system@localhost")
    }
}
