// ==========================================
// 选课与学业档案引擎 - 应用层
// ==========================================
// 职责: 组装仓储 / 引擎 / API，供命令行入口与宿主应用使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
