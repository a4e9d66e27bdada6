// ==========================================
// 选课与学业档案引擎 - 操作日志数据仓储
// ==========================================
// 对齐: action_log 表
// 红线: 只追加，不修改不删除
// ==========================================

mod core;
mod queries;

#[cfg(test)]
mod tests;

pub use core::ActionLogRepository;
