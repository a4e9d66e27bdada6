// ==========================================
// 选课与学业档案引擎 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: 席位扣减 / 成绩写入 + GPA 回写 必须在单个 IMMEDIATE 事务内完成
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod academic_plan_repo;
pub mod action_log_repo;
pub mod cart_repo;
pub mod course_repo;
pub mod db_utils;
pub mod enrollment_repo;
pub mod error;
pub mod student_repo;
pub mod transcript_repo;

// 重导出核心仓储
pub use academic_plan_repo::AcademicPlanRepository;
pub use action_log_repo::ActionLogRepository;
pub use cart_repo::CartRepository;
pub use course_repo::CourseRepository;
pub use enrollment_repo::EnrollmentRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use student_repo::StudentRepository;
pub use transcript_repo::TranscriptRepository;
