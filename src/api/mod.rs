// ==========================================
// 选课与学业档案引擎 - API层
// ==========================================
// 职责: 编排 Repository 与 Engine，对外提供业务接口
// 红线: API 不拼 SQL；写操作后记录审计（失败只告警）
// ==========================================

pub mod enrollment_api;
pub mod error;
pub mod progress_api;
pub mod transcript_api;

// 重导出核心API
pub use enrollment_api::EnrollmentApi;
pub use error::{ApiError, ApiResult};
pub use progress_api::ProgressApi;
pub use transcript_api::TranscriptApi;
