// ==========================================
// 选课与学业档案引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::policy_config_trait::{ConfigResult, PolicyConfigReader};
use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(
        conn: Arc<Mutex<Connection>>,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
            ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')
            "#,
            params![GLOBAL_SCOPE, key, value],
        )?;
        tracing::info!(key, value, "配置已更新");
        Ok(())
    }

    /// 读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// 未写入 config_kv 的键以默认值填充，便于排查"当前生效配置"
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for (key, default) in config_keys::DEFAULTS {
            config_map.insert(key.to_string(), default.to_string());
        }

        {
            let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            let mut stmt =
                conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
            let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (key, value) = row?;
                config_map.insert(key, value);
            }
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    fn parse_or_warn<T: std::str::FromStr>(&self, key: &str, raw: &str, default: T) -> T {
        match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
                default
            }
        }
    }
}

// ==========================================
// PolicyConfigReader Trait 实现
// ==========================================
impl PolicyConfigReader for ConfigManager {
    fn get_credits_per_year(&self) -> ConfigResult<i32> {
        let value = self.get_config_or_default(config_keys::CREDITS_PER_YEAR, "30")?;
        let parsed = self.parse_or_warn(config_keys::CREDITS_PER_YEAR, &value, 30);
        Ok(if parsed > 0 { parsed } else { 30 })
    }

    fn get_max_grade_len(&self) -> ConfigResult<usize> {
        let value = self.get_config_or_default(config_keys::MAX_GRADE_LEN, "10")?;
        Ok(self.parse_or_warn(config_keys::MAX_GRADE_LEN, &value, 10))
    }

    fn is_approval_required(&self) -> ConfigResult<bool> {
        let value = self.get_config_or_default(config_keys::REQUIRE_APPROVAL, "false")?;
        Ok(matches!(
            value.trim().to_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        ))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 学业进度
    pub const CREDITS_PER_YEAR: &str = "progress.credits_per_year";

    // 成绩台账
    pub const MAX_GRADE_LEN: &str = "transcript.max_grade_len";

    // 选课审批
    pub const REQUIRE_APPROVAL: &str = "enrollment.require_approval";

    /// 全部键及默认值
    pub const DEFAULTS: [(&str, &str); 3] = [
        (CREDITS_PER_YEAR, "30"),
        (MAX_GRADE_LEN, "10"),
        (REQUIRE_APPROVAL, "false"),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = setup();
        assert_eq!(config.get_credits_per_year().unwrap(), 30);
        assert_eq!(config.get_max_grade_len().unwrap(), 10);
        assert!(!config.is_approval_required().unwrap());
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let config = setup();
        config.set_global_config_value(config_keys::CREDITS_PER_YEAR, "24").unwrap();
        config.set_global_config_value(config_keys::REQUIRE_APPROVAL, "TRUE").unwrap();
        assert_eq!(config.get_credits_per_year().unwrap(), 24);
        assert!(config.is_approval_required().unwrap());

        config.set_global_config_value(config_keys::CREDITS_PER_YEAR, "abc").unwrap();
        assert_eq!(config.get_credits_per_year().unwrap(), 30);
        config.set_global_config_value(config_keys::CREDITS_PER_YEAR, "-5").unwrap();
        assert_eq!(config.get_credits_per_year().unwrap(), 30);
    }

    #[test]
    fn test_snapshot_merges_defaults() {
        let config = setup();
        config.set_global_config_value(config_keys::MAX_GRADE_LEN, "4").unwrap();

        let snapshot: BTreeMap<String, String> =
            serde_json::from_str(&config.get_config_snapshot().unwrap()).unwrap();
        assert_eq!(snapshot[config_keys::MAX_GRADE_LEN], "4");
        assert_eq!(snapshot[config_keys::CREDITS_PER_YEAR], "30");
        assert_eq!(snapshot.len(), 3);
    }
}
