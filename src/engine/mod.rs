// ==========================================
// 选课与学业档案引擎 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎（成绩政策 / GPA / 学业进度）与协作方 trait
// 红线: Engine 不拼 SQL
// ==========================================

pub mod audit;
pub mod events;
pub mod gpa;
pub mod grade_policy;
pub mod progress;

// 重导出核心引擎
pub use audit::{ActionLogAuditLogger, AuditLogger, NoOpAuditLogger};
pub use events::{EnrollmentNotifier, NoOpNotifier};
pub use progress::{ProgressEngine, DEFAULT_CREDITS_PER_YEAR};
