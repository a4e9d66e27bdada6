// ==========================================
// 选课与学业档案引擎 - 日志系统初始化
// ==========================================
// 工具: tracing + tracing-subscriber
// 级别: RUST_LOG（默认 info）
// 格式: COURSE_REGISTRY_LOG_FORMAT=json 切换为 JSON 行（供日志采集）
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 日志格式环境变量
pub const LOG_FORMAT_ENV: &str = "COURSE_REGISTRY_LOG_FORMAT";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// 从环境变量解析，未设置或未知值回退 Pretty
    pub fn from_env() -> Self {
        match std::env::var(LOG_FORMAT_ENV) {
            Ok(v) if v.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 初始化日志系统（格式由环境变量决定）
///
/// # 示例
/// ```no_run
/// use course_registry::logging;
/// logging::init();
/// ```
pub fn init() {
    init_with(LogFormat::from_env());
}

/// 按指定格式初始化；重复初始化静默忽略
pub fn init_with(format: LogFormat) {
    let builder = fmt().with_env_filter(env_filter()).with_target(true);
    let _ = match format {
        LogFormat::Pretty => builder.with_line_number(true).try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
