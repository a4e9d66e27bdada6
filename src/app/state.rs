// ==========================================
// 选课与学业档案引擎 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 所有仓储共享同一个 SQLite 连接
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{EnrollmentApi, ProgressApi, TranscriptApi};
use crate::config::{ConfigManager, PolicyConfigReader};
use crate::db::{init_schema, open_sqlite_connection};
use crate::engine::{ActionLogAuditLogger, AuditLogger, EnrollmentNotifier, NoOpNotifier};
use crate::importer::GradeImporter;
use crate::repository::{
    AcademicPlanRepository, ActionLogRepository, CartRepository, CourseRepository,
    EnrollmentRepository, StudentRepository, TranscriptRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 共享连接（供数据准备 / 运维工具使用）
    pub conn: Arc<Mutex<Connection>>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 选课API
    pub enrollment_api: Arc<EnrollmentApi>,

    /// 成绩台账API
    pub transcript_api: Arc<TranscriptApi>,

    /// 学业进度API
    pub progress_api: Arc<ProgressApi>,

    /// CSV 成绩导入器
    pub grade_importer: Arc<GradeImporter>,

    /// 学生仓储（数据准备）
    pub student_repo: Arc<StudentRepository>,

    /// 课程/教学班仓储（数据准备）
    pub course_repo: Arc<CourseRepository>,

    /// 培养方案仓储（数据准备）
    pub plan_repo: Arc<AcademicPlanRepository>,

    /// 操作日志仓储（用于审计追踪）
    pub action_log_repo: Arc<ActionLogRepository>,
}

impl AppState {
    /// 创建新的AppState实例（不发送审批通知）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        Self::with_notifier(db_path, Arc::new(NoOpNotifier))
    }

    /// 创建AppState并注入审批通知实现
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并幂等建表
    /// 2. 初始化所有Repository
    /// 3. 创建所有API实例
    pub fn with_notifier(
        db_path: String,
        notifier: Arc<dyn EnrollmentNotifier>,
    ) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let student_repo = Arc::new(StudentRepository::new(conn.clone()));
        let course_repo = Arc::new(CourseRepository::new(conn.clone()));
        let plan_repo = Arc::new(AcademicPlanRepository::new(conn.clone()));
        let cart_repo = Arc::new(CartRepository::new(conn.clone()));
        let enrollment_repo = Arc::new(EnrollmentRepository::new(conn.clone()));
        let transcript_repo = Arc::new(TranscriptRepository::new(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));

        // ==========================================
        // 初始化配置与协作方
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let policy: Arc<dyn PolicyConfigReader> = config_manager.clone();
        let audit: Arc<dyn AuditLogger> =
            Arc::new(ActionLogAuditLogger::new(action_log_repo.clone()));

        // ==========================================
        // 创建API实例
        // ==========================================
        let enrollment_api = Arc::new(EnrollmentApi::new(
            student_repo.clone(),
            course_repo.clone(),
            cart_repo,
            enrollment_repo.clone(),
            policy.clone(),
            audit.clone(),
            notifier,
        ));

        let transcript_api = Arc::new(TranscriptApi::new(
            student_repo.clone(),
            course_repo.clone(),
            plan_repo.clone(),
            transcript_repo.clone(),
            policy.clone(),
            audit.clone(),
        ));

        let progress_api = Arc::new(ProgressApi::new(
            student_repo.clone(),
            plan_repo.clone(),
            transcript_repo,
            enrollment_repo,
            policy,
            audit,
        ));

        let grade_importer = Arc::new(GradeImporter::new(transcript_api.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            conn,
            config_manager,
            enrollment_api,
            transcript_api,
            progress_api,
            grade_importer,
            student_repo,
            course_repo,
            plan_repo,
            action_log_repo,
        })
    }
}

/// 默认数据库路径
///
/// 优先级：环境变量 COURSE_REGISTRY_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("COURSE_REGISTRY_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./course_registry.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        let dir = if cfg!(debug_assertions) {
            data_dir.join("course-registry-dev")
        } else {
            data_dir.join("course-registry")
        };

        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join("course_registry.db"),
            Err(e) => tracing::warn!("数据目录创建失败，回退到当前目录: {}", e),
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_app_state_bootstraps_schema() {
        let temp = NamedTempFile::new().unwrap();
        let db_path = temp.path().to_string_lossy().to_string();

        let state = AppState::new(db_path.clone()).unwrap();
        assert_eq!(state.db_path, db_path);

        let version = crate::db::read_schema_version(&state.conn.lock().unwrap()).unwrap();
        assert_eq!(version, Some(crate::db::CURRENT_SCHEMA_VERSION));
        assert!(state.progress_api.get_student_academic_progress("nobody").is_err());
    }

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }
}
