// ==========================================
// 选课与学业档案引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod academic_plan;
pub mod action_log;
pub mod course;
pub mod enrollment;
pub mod student;
pub mod transcript;
pub mod types;

// 重导出核心类型
pub use academic_plan::{
    AcademicPlan, AcademicPlanCourse, AcademicProgress, ProgressBucket, ProgressCourse,
    MAJOR_NOT_ASSIGNED,
};
pub use action_log::{ActionLog, ActionType};
pub use course::{Course, Instructor, Section};
pub use enrollment::{CartItem, Enrollment, EnrollmentView};
pub use student::{Actor, GpaSnapshot, Student};
pub use transcript::{FullTranscript, SemesterTranscript, Transcript, TranscriptFilter};
pub use types::{CourseType, EnrollmentStatus, Semester};
