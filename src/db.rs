// ==========================================
// 选课与学业档案引擎 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免“部分模块外键开启/部分不开启”
// - 统一 busy_timeout，席位争用时写事务排队等待而不是直接报 busy
// - 提供幂等的建表入口
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 建表（幂等）
///
/// 唯一性约束直接落在库上：
/// - enrollment: 部分唯一索引，只约束 status='ENROLLED' 的行，退课记录不阻止重新选课
/// - transcript: (student_id, course_id, section_id) 唯一
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS academic_plan (
            plan_id TEXT PRIMARY KEY,
            major_name TEXT NOT NULL,
            total_credits_required INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS student (
            student_id TEXT PRIMARY KEY,
            full_name TEXT NOT NULL,
            email TEXT,
            completed_credits INTEGER NOT NULL DEFAULT 0,
            gpa REAL NOT NULL DEFAULT 0.0,
            academic_plan_id TEXT REFERENCES academic_plan(plan_id) ON DELETE SET NULL
        );

        CREATE TABLE IF NOT EXISTS course (
            course_id TEXT PRIMARY KEY,
            code TEXT NOT NULL,
            title TEXT NOT NULL,
            credit_hours INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS instructor (
            instructor_id TEXT PRIMARY KEY,
            full_name TEXT NOT NULL,
            email TEXT
        );

        CREATE TABLE IF NOT EXISTS section (
            section_id TEXT PRIMARY KEY,
            course_id TEXT NOT NULL REFERENCES course(course_id),
            instructor_id TEXT REFERENCES instructor(instructor_id),
            semester TEXT NOT NULL,
            year INTEGER NOT NULL,
            capacity INTEGER NOT NULL,
            available_seats INTEGER NOT NULL CHECK (available_seats >= 0)
        );

        CREATE TABLE IF NOT EXISTS academic_plan_course (
            plan_id TEXT NOT NULL REFERENCES academic_plan(plan_id) ON DELETE CASCADE,
            course_id TEXT NOT NULL REFERENCES course(course_id),
            is_required INTEGER NOT NULL DEFAULT 1,
            recommended_year INTEGER NOT NULL,
            recommended_semester INTEGER NOT NULL,
            course_type TEXT NOT NULL,
            PRIMARY KEY (plan_id, course_id)
        );

        CREATE TABLE IF NOT EXISTS cart_item (
            cart_item_id TEXT PRIMARY KEY,
            student_id TEXT NOT NULL REFERENCES student(student_id) ON DELETE CASCADE,
            section_id TEXT NOT NULL REFERENCES section(section_id),
            added_at TEXT NOT NULL,
            UNIQUE (student_id, section_id)
        );

        CREATE TABLE IF NOT EXISTS enrollment (
            enrollment_id TEXT PRIMARY KEY,
            student_id TEXT NOT NULL REFERENCES student(student_id) ON DELETE CASCADE,
            section_id TEXT NOT NULL REFERENCES section(section_id),
            enrolled_at TEXT NOT NULL,
            status TEXT NOT NULL,
            grade TEXT,
            approved_at TEXT,
            approved_by TEXT,
            decline_reason TEXT
        );

        CREATE UNIQUE INDEX IF NOT EXISTS ux_enrollment_active
            ON enrollment(student_id, section_id) WHERE status = 'ENROLLED';
        CREATE INDEX IF NOT EXISTS ix_enrollment_student ON enrollment(student_id);

        CREATE TABLE IF NOT EXISTS transcript (
            transcript_id TEXT PRIMARY KEY,
            student_id TEXT NOT NULL REFERENCES student(student_id) ON DELETE CASCADE,
            course_id TEXT NOT NULL REFERENCES course(course_id),
            section_id TEXT NOT NULL REFERENCES section(section_id),
            grade TEXT NOT NULL CHECK (length(grade) <= 10),
            grade_points REAL NOT NULL,
            credit_hours INTEGER NOT NULL,
            semester TEXT NOT NULL,
            year INTEGER NOT NULL,
            completed_at TEXT NOT NULL,
            UNIQUE (student_id, course_id, section_id)
        );

        CREATE INDEX IF NOT EXISTS ix_transcript_student ON transcript(student_id);

        CREATE TABLE IF NOT EXISTS action_log (
            action_id TEXT PRIMARY KEY,
            action_type TEXT NOT NULL,
            action_ts TEXT NOT NULL,
            actor_id TEXT NOT NULL,
            actor_email TEXT NOT NULL,
            entity_name TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            payload_json TEXT,
            detail TEXT
        );

        CREATE INDEX IF NOT EXISTS ix_action_log_entity ON action_log(entity_name, entity_id);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}
