// ==========================================
// 选课与学业档案引擎 - 审计日志
// ==========================================
// 职责: 每次写操作后记录 操作人 / 操作类型 / 实体 / 参数
// 红线: 审计失败由调用方记录 warn，绝不回滚或掩盖业务结果
// ==========================================

use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::student::Actor;
use crate::repository::ActionLogRepository;
use serde_json::Value as JsonValue;
use std::error::Error;
use std::sync::Arc;

/// 审计结果
pub type AuditResult = Result<(), Box<dyn Error + Send + Sync>>;

/// 审计日志记录者
pub trait AuditLogger: Send + Sync {
    /// 记录一次写操作
    fn log(
        &self,
        actor: &Actor,
        action: ActionType,
        entity_id: &str,
        payload: JsonValue,
    ) -> AuditResult;
}

/// 基于 action_log 表的审计实现
pub struct ActionLogAuditLogger {
    repo: Arc<ActionLogRepository>,
}

impl ActionLogAuditLogger {
    pub fn new(repo: Arc<ActionLogRepository>) -> Self {
        Self { repo }
    }
}

impl AuditLogger for ActionLogAuditLogger {
    fn log(
        &self,
        actor: &Actor,
        action: ActionType,
        entity_id: &str,
        payload: JsonValue,
    ) -> AuditResult {
        let log = ActionLog::new(action, actor, entity_id).with_payload(&payload);
        self.repo.insert(&log)?;
        Ok(())
    }
}

/// 空操作审计（测试用）
#[derive(Debug, Clone, Default)]
pub struct NoOpAuditLogger;

impl AuditLogger for NoOpAuditLogger {
    fn log(
        &self,
        _actor: &Actor,
        action: ActionType,
        entity_id: &str,
        _payload: JsonValue,
    ) -> AuditResult {
        tracing::debug!(
            "NoOpAuditLogger: 跳过审计 - action={}, entity_id={}",
            action.as_str(),
            entity_id
        );
        Ok(())
    }
}

/// 记录审计，失败只告警
///
/// API 层统一经由此函数写审计
pub fn record(
    audit: &dyn AuditLogger,
    actor: &Actor,
    action: ActionType,
    entity_id: &str,
    payload: JsonValue,
) {
    if let Err(e) = audit.log(actor, action, entity_id, payload) {
        tracing::warn!(
            action = action.as_str(),
            entity_id,
            error = %e,
            "审计日志写入失败（业务结果不受影响）"
        );
    }
}
