// ==========================================
// 选课与学业档案引擎 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为调用方可分辨的业务错误
// 红线: 业务失败一律以类型化错误上抛，不吞掉
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("无效成绩: {0}")]
    InvalidGrade(String),

    #[error("重复选课: student_id={student_id}, section_id={section_id}")]
    DuplicateEnrollment {
        student_id: String,
        section_id: String,
    },

    #[error("成绩已存在: student_id={student_id}, course_id={course_id}, section_id={section_id}")]
    DuplicateTranscript {
        student_id: String,
        course_id: String,
        section_id: String,
    },

    #[error("席位已满: section_id={0}")]
    CapacityExceeded(String),

    #[error("购物车为空: student_id={0}")]
    EmptyCart(String),

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // 并发/约束冲突
            RepositoryError::CapacityExceeded { section_id } => {
                ApiError::CapacityExceeded(section_id)
            }
            RepositoryError::DuplicateEnrollment {
                student_id,
                section_id,
            } => ApiError::DuplicateEnrollment {
                student_id,
                section_id,
            },
            RepositoryError::DuplicateTranscript {
                student_id,
                course_id,
                section_id,
            } => ApiError::DuplicateTranscript {
                student_id,
                course_id,
                section_id,
            },

            // 数据库错误
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }

            // 业务规则错误
            RepositoryError::InvalidStateTransition { from, to } => {
                ApiError::InvalidStateTransition { from, to }
            }

            // 数据质量错误
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),

            // 通用错误
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 入参校验辅助函数
// ==========================================

/// 标识符不能为空
pub fn require_id(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::ValidationError(format!("{}不能为空", field)));
    }
    Ok(())
}

/// 学年范围校验
pub fn require_year(year: i32) -> ApiResult<()> {
    if !(1900..=2200).contains(&year) {
        return Err(ApiError::ValidationError(format!("学年超出范围: {}", year)));
    }
    Ok(())
}
