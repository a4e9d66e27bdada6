// ==========================================
// 选课与学业档案引擎 - 操作日志领域模型
// ==========================================
// 红线: 所有写入必须记录（尽力而为，失败不回滚主操作）
// 对齐: action_log 表
// ==========================================

use crate::domain::student::Actor;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,         // 日志ID
    pub action_type: String,       // 操作类型 (存储为字符串)
    pub action_ts: NaiveDateTime,  // 操作时间戳
    pub actor_id: String,          // 操作人ID
    pub actor_email: String,       // 操作人邮箱
    pub entity_name: String,       // 实体名称 (Enrollment / Transcript / Student)
    pub entity_id: String,         // 实体ID

    pub payload_json: Option<JsonValue>, // 操作参数 (JSON)
    pub detail: Option<String>,          // 详细描述
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    Enroll,             // 购物车结算选课
    ForceEnroll,        // 管理员强制选课
    DropEnrollment,     // 退课
    ApproveEnrollment,  // 审批通过
    DeclineEnrollment,  // 审批驳回
    DeleteEnrollment,   // 管理员删除选课
    CreateTranscript,   // 登记成绩
    UpdateGrade,        // 修改成绩
    DeleteTranscript,   // 删除成绩
    RecalculateGpa,     // 手动重算 GPA
    AssignPlan,         // 分配培养方案
}

impl ActionType {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Enroll => "Enroll",
            ActionType::ForceEnroll => "ForceEnroll",
            ActionType::DropEnrollment => "DropEnrollment",
            ActionType::ApproveEnrollment => "ApproveEnrollment",
            ActionType::DeclineEnrollment => "DeclineEnrollment",
            ActionType::DeleteEnrollment => "DeleteEnrollment",
            ActionType::CreateTranscript => "CreateTranscript",
            ActionType::UpdateGrade => "UpdateGrade",
            ActionType::DeleteTranscript => "DeleteTranscript",
            ActionType::RecalculateGpa => "RecalculateGpa",
            ActionType::AssignPlan => "AssignPlan",
        }
    }

    /// 从字符串解析
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Enroll" => Some(ActionType::Enroll),
            "ForceEnroll" => Some(ActionType::ForceEnroll),
            "DropEnrollment" => Some(ActionType::DropEnrollment),
            "ApproveEnrollment" => Some(ActionType::ApproveEnrollment),
            "DeclineEnrollment" => Some(ActionType::DeclineEnrollment),
            "DeleteEnrollment" => Some(ActionType::DeleteEnrollment),
            "CreateTranscript" => Some(ActionType::CreateTranscript),
            "UpdateGrade" => Some(ActionType::UpdateGrade),
            "DeleteTranscript" => Some(ActionType::DeleteTranscript),
            "RecalculateGpa" => Some(ActionType::RecalculateGpa),
            "AssignPlan" => Some(ActionType::AssignPlan),
            _ => None,
        }
    }

    /// 操作对应的实体名称
    pub fn entity_name(&self) -> &'static str {
        match self {
            ActionType::Enroll
            | ActionType::ForceEnroll
            | ActionType::DropEnrollment
            | ActionType::ApproveEnrollment
            | ActionType::DeclineEnrollment
            | ActionType::DeleteEnrollment => "Enrollment",
            ActionType::CreateTranscript
            | ActionType::UpdateGrade
            | ActionType::DeleteTranscript => "Transcript",
            ActionType::RecalculateGpa | ActionType::AssignPlan => "Student",
        }
    }
}

// ==========================================
// ActionLog 辅助方法
// ==========================================
impl ActionLog {
    /// 创建新的操作日志
    pub fn new(action_type: ActionType, actor: &Actor, entity_id: &str) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type: action_type.as_str().to_string(),
            action_ts: chrono::Utc::now().naive_utc(),
            actor_id: actor.user_id.clone(),
            actor_email: actor.email.clone(),
            entity_name: action_type.entity_name().to_string(),
            entity_id: entity_id.to_string(),
            payload_json: None,
            detail: None,
        }
    }

    /// 设置操作负载 (转换为JSON)
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Self {
        self.payload_json = serde_json::to_value(payload).ok();
        self
    }

    /// 设置详细描述
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
