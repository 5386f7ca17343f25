// ==========================================
// 广告投放节奏监控系统 - 协作者接口定义
// ==========================================
// 职责: 决策引擎消费的外部协作者契约
// 说明: 具体实现 (真实平台客户端/通知渠道/审计存储) 不在核心范围内,
//       但此处的契约对实现方有约束力
// ==========================================

use crate::domain::spend::SpendObservation;
use crate::domain::types::{ActionTaken, Platform, Severity};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ==========================================
// SourceError - 数据源错误
// ==========================================

/// 数据源获取失败 (每次运行内可恢复: 降级为人工升级路径)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("活动未找到: campaign_id={0}")]
    NotFound(String),

    #[error("数据源不可用: {0}")]
    Unavailable(String),

    #[error("数据源调用超时: {0}")]
    Timeout(String),
}

// ==========================================
// TargetSource - 目标支出来源 (内部跟踪系统)
// ==========================================

#[async_trait]
pub trait TargetSource: Send + Sync {
    /// 拉取指定活动的目标支出观测值
    async fn fetch_target(&self, campaign_id: &str) -> Result<SpendObservation, SourceError>;
}

// ==========================================
// PlatformSource - 实际支出来源 (平台 API)
// ==========================================

#[async_trait]
pub trait PlatformSource: Send + Sync {
    /// 拉取指定活动的实际支出观测值
    async fn fetch_actual(&self, campaign_id: &str) -> Result<SpendObservation, SourceError>;

    /// 暂停活动, true 表示成功
    ///
    /// 平台不保证重复暂停幂等, 引擎每次运行至多调用一次。
    async fn pause_campaign(&self, campaign_id: &str) -> bool;
}

// ==========================================
// NotificationMessage / NotificationSink - 通知
// ==========================================

/// 通知载荷 (格式化与传输由实现方负责)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub campaign_id: String,
    pub campaign_name: String,
    pub platform: Option<Platform>,
    pub severity: Severity,
    pub variance_pct: f64,
    pub variance_amount: f64,
    pub confidence_score: f64,
    pub action_taken: ActionTaken,
    pub recommendation: String,
    pub root_cause: Option<String>,
    pub mitigation: Option<String>,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// 发送通知, true 表示成功
    ///
    /// 尽力而为: 失败不影响本次运行产生的 Alert。
    async fn send(&self, message: &NotificationMessage) -> bool;
}

// ==========================================
// AuditSink - 审计记录
// ==========================================

#[async_trait]
pub trait AuditSink: Send + Sync {
    /// 追加一条审计事件 (单条记录原子写入)
    ///
    /// 引擎视角 fire-and-forget: 失败会被记录日志后吞掉, 不影响运行。
    async fn record(&self, event: serde_json::Value) -> anyhow::Result<()>;
}
