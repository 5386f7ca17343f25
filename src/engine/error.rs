// ==========================================
// 广告投放节奏监控系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分级: Configuration 为构造期致命错误;
//       其余均为单次运行内可恢复, 不会从 run() 抛出
// ==========================================

use crate::sources::traits::SourceError;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 构造期致命错误 =====
    #[error("配置无效: {0}")]
    Configuration(String),

    // ===== 单次运行内可恢复错误 =====
    #[error("数据源获取失败: {0}")]
    DataSource(#[from] SourceError),

    #[error("动作执行失败: campaign_id={campaign_id}, action={action}")]
    Action {
        campaign_id: String,
        action: String,
    },

    #[error("通知发送失败: {0}")]
    Notification(String),

    #[error("审计写入失败: {0}")]
    Audit(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
