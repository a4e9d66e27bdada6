// ==========================================
// 选课与学业档案引擎 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 选课 / 成绩台账 / 学业进度 后端引擎
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部成绩文件
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CourseType, EnrollmentStatus, Semester};

// 领域实体
pub use domain::{
    AcademicPlan, AcademicProgress, ActionLog, ActionType, Actor, CartItem, Course, Enrollment,
    EnrollmentView, FullTranscript, GpaSnapshot, Section, Student, Transcript, TranscriptFilter,
};

// 引擎
pub use engine::{EnrollmentNotifier, NoOpNotifier, ProgressEngine};

// API
pub use api::{ApiError, ApiResult, EnrollmentApi, ProgressApi, TranscriptApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "选课与学业档案引擎";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
