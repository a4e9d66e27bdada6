// ==========================================
// 选课与学业档案引擎 - 购物车仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 结算时的清空购物车在 EnrollmentRepository 的选课事务内完成
// ==========================================

use crate::domain::enrollment::CartItem;
use crate::repository::db_utils::{format_ts, parse_ts};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// CartRepository - 购物车仓储
// ==========================================
pub struct CartRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CartRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 加入购物车
    pub fn insert(&self, item: &CartItem) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO cart_item (cart_item_id, student_id, section_id, added_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                item.cart_item_id,
                item.student_id,
                item.section_id,
                format_ts(&item.added_at),
            ],
        )?;
        Ok(())
    }

    /// 从购物车移除
    ///
    /// # 返回
    /// - Ok(true): 已移除
    /// - Ok(false): 购物车内无此教学班
    pub fn remove(&self, student_id: &str, section_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM cart_item WHERE student_id = ?1 AND section_id = ?2",
            params![student_id, section_id],
        )?;
        Ok(rows > 0)
    }

    /// 查询学生购物车（按加入时间排序）
    pub fn find_by_student(&self, student_id: &str) -> RepositoryResult<Vec<CartItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT cart_item_id, student_id, section_id, added_at
            FROM cart_item
            WHERE student_id = ?1
            ORDER BY added_at ASC, cart_item_id ASC
            "#,
        )?;

        let items = stmt
            .query_map(params![student_id], |row| {
                Ok(CartItem {
                    cart_item_id: row.get(0)?,
                    student_id: row.get(1)?,
                    section_id: row.get(2)?,
                    added_at: parse_ts(3, &row.get::<_, String>(3)?)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(items)
    }
}
