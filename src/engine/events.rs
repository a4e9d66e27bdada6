// ==========================================
// 选课与学业档案引擎 - 选课审批通知
// ==========================================
// 职责: 定义审批通知 trait，实现依赖倒置
// 说明: Engine 层定义 trait，宿主应用注入实现（邮件 / 站内信）
// 红线: 通知失败只记录日志，不影响业务结果
// ==========================================

use crate::domain::enrollment::Enrollment;
use std::error::Error;

/// 通知结果
pub type NotifyResult = Result<(), Box<dyn Error + Send + Sync>>;

// ==========================================
// 通知 Trait
// ==========================================

/// 选课审批通知者
///
/// 启用审批流程时：新选课 → pending；审批通过 → approved；驳回 → declined
pub trait EnrollmentNotifier: Send + Sync {
    /// 新选课待审批
    fn notify_pending(&self, enrollment: &Enrollment) -> NotifyResult;

    /// 审批通过
    fn notify_approved(&self, enrollment: &Enrollment) -> NotifyResult;

    /// 审批驳回
    fn notify_declined(&self, enrollment: &Enrollment, reason: &str) -> NotifyResult;
}

/// 空操作通知者
///
/// 用于不需要通知的场景（如单元测试、命令行工具）
#[derive(Debug, Clone, Default)]
pub struct NoOpNotifier;

impl EnrollmentNotifier for NoOpNotifier {
    fn notify_pending(&self, enrollment: &Enrollment) -> NotifyResult {
        tracing::debug!(
            "NoOpNotifier: 跳过待审批通知 - enrollment_id={}",
            enrollment.enrollment_id
        );
        Ok(())
    }

    fn notify_approved(&self, enrollment: &Enrollment) -> NotifyResult {
        tracing::debug!(
            "NoOpNotifier: 跳过审批通过通知 - enrollment_id={}",
            enrollment.enrollment_id
        );
        Ok(())
    }

    fn notify_declined(&self, enrollment: &Enrollment, reason: &str) -> NotifyResult {
        tracing::debug!(
            "NoOpNotifier: 跳过驳回通知 - enrollment_id={}, reason={}",
            enrollment.enrollment_id,
            reason
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_noop_notifier() {
        let notifier = NoOpNotifier;
        let e = Enrollment::new("E1".to_string(), "S1", "SEC1", Utc::now().naive_utc());

        assert!(notifier.notify_pending(&e).is_ok());
        assert!(notifier.notify_approved(&e).is_ok());
        assert!(notifier.notify_declined(&e, "prerequisite missing").is_ok());
    }
}
