// ==========================================
// 选课与学业档案引擎 - 仓储层公共工具
// ==========================================
// 职责: 时间戳/枚举列的读写格式统一，动态 WHERE 拼装，跨仓储共用的席位归还
// ==========================================

use crate::domain::types::{CourseType, EnrollmentStatus, Semester};
use crate::repository::error::RepositoryResult;
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection};

/// 时间戳存储格式
pub const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 时间戳 → 存储字符串
pub fn format_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

/// 存储字符串 → 时间戳
pub fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TS_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// 可空时间戳列
pub fn parse_opt_ts(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<NaiveDateTime>> {
    raw.map(|s| parse_ts(idx, &s)).transpose()
}

/// 学期列
pub fn parse_semester(idx: usize, raw: &str) -> rusqlite::Result<Semester> {
    Semester::from_str(raw).ok_or_else(|| invalid_column(idx, "semester", raw))
}

/// 选课状态列
pub fn parse_status(idx: usize, raw: &str) -> rusqlite::Result<EnrollmentStatus> {
    EnrollmentStatus::from_str(raw).ok_or_else(|| invalid_column(idx, "status", raw))
}

/// 课程类型列（未知值回退，不报错）
pub fn parse_course_type(raw: &str) -> CourseType {
    CourseType::from_str(raw)
}

fn invalid_column(idx: usize, column: &str, raw: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        format!("invalid {} value: {}", column, raw).into(),
    )
}

/// 学期时间顺序表达式（Spring < Summer < Fall）
///
/// # 参数
/// - `column`: 学期列名，可带表别名，如 "s.semester"
pub fn semester_order_sql(column: &str) -> String {
    format!(
        "CASE {} WHEN 'SPRING' THEN 1 WHEN 'SUMMER' THEN 2 WHEN 'FALL' THEN 3 ELSE 4 END",
        column
    )
}

/// 归还一个席位（不超过总容量），须在调用方事务内执行
pub fn restore_seat(conn: &Connection, section_id: &str) -> RepositoryResult<()> {
    conn.execute(
        r#"
        UPDATE section
        SET available_seats = available_seats + 1
        WHERE section_id = ?1 AND available_seats < capacity
        "#,
        params![section_id],
    )?;
    Ok(())
}

/// 按可选条件拼装 WHERE 子句
///
/// # 参数
/// - `conditions`: (列名, 是否启用) 列表，启用的列以 `col = ?` 形式拼接
///
/// # 返回
/// - 例如 " WHERE student_id = ? AND year = ?"；无条件时返回空串
pub fn build_where_clause(conditions: &[(&str, bool)]) -> String {
    let parts: Vec<String> = conditions
        .iter()
        .filter(|(_, enabled)| *enabled)
        .map(|(col, _)| format!("{} = ?", col))
        .collect();

    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_where_clause() {
        assert_eq!(build_where_clause(&[("a", false), ("b", false)]), "");
        assert_eq!(
            build_where_clause(&[("student_id", true), ("course_id", false), ("year", true)]),
            " WHERE student_id = ? AND year = ?"
        );
    }

    #[test]
    fn test_semester_order_sql_is_chronological() {
        let conn = Connection::open_in_memory().unwrap();
        let sql = format!(
            "SELECT s FROM (SELECT 'FALL' AS s UNION ALL SELECT 'SPRING' UNION ALL SELECT 'SUMMER') ORDER BY {}",
            semester_order_sql("s")
        );
        let mut stmt = conn.prepare(&sql).unwrap();
        let order: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(order, vec!["SPRING", "SUMMER", "FALL"]);
    }

    #[test]
    fn test_ts_round_trip() {
        let ts = NaiveDateTime::parse_from_str("2026-09-01 08:30:00", TS_FORMAT).unwrap();
        assert_eq!(parse_ts(0, &format_ts(&ts)).unwrap(), ts);
        assert!(parse_ts(0, "not a date").is_err());
    }
}
