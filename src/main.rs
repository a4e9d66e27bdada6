// ==========================================
// 选课与学业档案引擎 - 命令行主入口
// ==========================================
// 用法:
//   course-registry [db_path]                       打开/初始化数据库并输出概况
//   course-registry import-grades <csv> [db_path]   批量导入成绩并输出导入报告
// 环境变量: COURSE_REGISTRY_LOG_FORMAT=json 输出 JSON 日志
// ==========================================

use course_registry::app::{get_default_db_path, AppState};
use course_registry::domain::Actor;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    course_registry::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", course_registry::APP_NAME);
    tracing::info!("系统版本: {}", course_registry::VERSION);
    tracing::info!("==================================================");

    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("import-grades") => {
            let csv_path = args.get(1).ok_or("用法: course-registry import-grades <csv> [db_path]")?;
            let state = open_state(args.get(2))?;

            let report = state
                .grade_importer
                .import_file(Path::new(csv_path), &Actor::system())?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        other => {
            let state = open_state(other.map(str::to_string).as_ref())?;
            print_summary(&state)?;
        }
    }

    Ok(())
}

fn open_state(db_path: Option<&String>) -> Result<AppState, Box<dyn std::error::Error>> {
    let db_path = db_path.cloned().unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);
    Ok(AppState::new(db_path)?)
}

fn print_summary(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    let counts = {
        let conn = state.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let mut counts = Vec::new();
        for table in ["student", "course", "section", "enrollment", "transcript", "action_log"] {
            let sql = format!("SELECT COUNT(*) FROM {}", table);
            let n: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
            counts.push((table, n));
        }
        counts
    };

    println!("数据库: {}", state.db_path);
    for (table, n) in counts {
        println!("  {:<12} {}", table, n);
    }
    let snapshot = state
        .config_manager
        .get_config_snapshot()
        .map_err(|e| format!("读取配置失败: {}", e))?;
    println!("生效配置: {}", snapshot);
    Ok(())
}
