// ==========================================
// 选课与学业档案引擎 - 策略配置读取 Trait
// ==========================================
// 职责: 定义选课/成绩/进度策略所需的配置读取接口
// 说明: API 层依赖此 trait，而不是直接依赖 ConfigManager 实现
// ==========================================

use std::error::Error;

/// 配置读取结果
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// 策略配置读取器
pub trait PolicyConfigReader: Send + Sync {
    // ===== 学业进度 =====

    /// 每学年可修学分（预计毕业年份计算用）
    /// 默认值: 30
    fn get_credits_per_year(&self) -> ConfigResult<i32>;

    // ===== 成绩台账 =====

    /// 成绩字符串最大长度
    /// 默认值: 10
    fn get_max_grade_len(&self) -> ConfigResult<usize>;

    // ===== 选课审批 =====

    /// 是否启用选课审批流程
    /// 默认值: false
    fn is_approval_required(&self) -> ConfigResult<bool>;
}
