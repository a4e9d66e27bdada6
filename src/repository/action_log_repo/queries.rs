use super::core::ActionLogRepository;
use crate::domain::action_log::ActionLog;
use crate::repository::db_utils::parse_ts;
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Result as SqliteResult, Row};

const ACTION_LOG_COLUMNS: &str = r#"
    action_id, action_type, action_ts, actor_id, actor_email,
    entity_name, entity_id, payload_json, detail
"#;

impl ActionLogRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 action_id 查询单个日志
    pub fn find_by_id(&self, action_id: &str) -> RepositoryResult<Option<ActionLog>> {
        let conn = self.get_conn()?;

        let sql = format!("SELECT {} FROM action_log WHERE action_id = ?", ACTION_LOG_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![action_id], map_row) {
            Ok(log) => Ok(Some(log)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询某个实体的全部操作日志（时间倒序）
    pub fn find_by_entity(
        &self,
        entity_name: &str,
        entity_id: &str,
    ) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "SELECT {} FROM action_log WHERE entity_name = ? AND entity_id = ? \
             ORDER BY action_ts DESC, rowid DESC",
            ACTION_LOG_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let logs = stmt
            .query_map(params![entity_name, entity_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 查询指定操作人的日志
    pub fn find_by_actor(&self, actor_id: &str, limit: i32) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "SELECT {} FROM action_log WHERE actor_id = ? ORDER BY action_ts DESC, rowid DESC LIMIT ?",
            ACTION_LOG_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let logs = stmt
            .query_map(params![actor_id, limit], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 查询最近的 N 条日志
    pub fn find_recent(&self, limit: i32) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "SELECT {} FROM action_log ORDER BY action_ts DESC, rowid DESC LIMIT ?",
            ACTION_LOG_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let logs = stmt
            .query_map(params![limit], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 统计指定操作类型的日志条数
    pub fn count_by_action_type(&self, action_type: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM action_log WHERE action_type = ?",
            params![action_type],
            |row| row.get(0),
        )?;

        Ok(count)
    }
}

/// 将数据库行映射为 ActionLog 实体
fn map_row(row: &Row) -> SqliteResult<ActionLog> {
    let action_ts_str: String = row.get(2)?;
    let payload_json_str: Option<String> = row.get(7)?;

    Ok(ActionLog {
        action_id: row.get(0)?,
        action_type: row.get(1)?,
        action_ts: parse_ts(2, &action_ts_str)?,
        actor_id: row.get(3)?,
        actor_email: row.get(4)?,
        entity_name: row.get(5)?,
        entity_id: row.get(6)?,
        // 损坏的 JSON 不阻断日志读取
        payload_json: payload_json_str.and_then(|s| serde_json::from_str(&s).ok()),
        detail: row.get(8)?,
    })
}
