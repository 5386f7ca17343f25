// ==========================================
// 广告投放节奏监控系统 - 支出领域实体
// ==========================================
// 职责: 支出观测值/对账对/偏差结果/预警记录
// 不变式: 所有评分 ∈ [0,1]; 零投放强制 critical 且偏差=100%
// ==========================================

use crate::domain::types::{ActionTaken, Platform, Severity, SourceKind, SpendDirection};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ==========================================
// SpendObservation - 支出观测值
// ==========================================

/// 单次支出观测值
///
/// 来自内部跟踪系统 (目标支出) 或平台 API (实际支出),
/// 每次拉取都创建新实例, 创建后不再修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendObservation {
    /// 活动 ID
    pub campaign_id: String,

    /// 活动名称
    pub campaign_name: String,

    /// 媒体平台
    pub platform: Platform,

    /// 数据源类型
    pub source: SourceKind,

    /// 支出金额 (美元, >= 0)
    pub amount_usd: f64,

    /// 观测时间戳
    pub timestamp: DateTime<Utc>,

    /// 预期刷新周期 (小时, API 通常 4h, 内部跟踪通常 24h)
    pub refresh_cycle_hours: i64,

    /// 活动元数据 (market/product/start_date/end_date 等)
    pub metadata: HashMap<String, String>,
}

impl SpendObservation {
    /// 距上次数据更新的小时数
    pub fn hours_since_update(&self) -> f64 {
        self.age_hours_at(Utc::now())
    }

    /// 在给定时刻距上次数据更新的小时数
    pub fn age_hours_at(&self, now: DateTime<Utc>) -> f64 {
        (now - self.timestamp).num_seconds() as f64 / 3600.0
    }

    /// 数据是否已过期 (超过预期刷新周期)
    pub fn is_stale(&self) -> bool {
        self.hours_since_update() > self.refresh_cycle_hours as f64
    }
}

// ==========================================
// ConfidenceBreakdown - 置信度评分分解
// ==========================================

/// 对账置信度的三个分量与加权总分
///
/// 总分是分量与配置权重的纯函数, 由 ConfidenceScorer 计算。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    /// 元数据匹配度 (0.0-1.0)
    pub metadata_match_score: f64,

    /// 活动名称相似度 (0.0-1.0)
    pub name_similarity_score: f64,

    /// 数据新鲜度 (0.2-1.0, 阶梯函数)
    pub freshness_score: f64,

    /// 加权总置信度 (0.0-1.0)
    pub confidence_score: f64,
}

// ==========================================
// ReconciledPair - 对账对
// ==========================================

/// 目标支出与实际支出的匹配结果, 含数据质量评分
///
/// 派生对象, 仅在单次运行内存活, 不单独持久化。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledPair {
    /// 活动 ID
    pub campaign_id: String,

    /// 活动名称 (取平台侧名称)
    pub campaign_name: String,

    /// 媒体平台
    pub platform: Platform,

    /// 目标支出 (内部跟踪系统)
    pub target_spend: f64,

    /// 实际支出 (平台 API)
    pub actual_spend: f64,

    /// 目标数据时间戳
    pub target_timestamp: DateTime<Utc>,

    /// 实际数据时间戳
    pub actual_timestamp: DateTime<Utc>,

    /// 元数据匹配度 (0.0-1.0)
    pub metadata_match_score: f64,

    /// 名称相似度 (0.0-1.0)
    pub name_similarity_score: f64,

    /// 数据新鲜度 (0.0-1.0)
    pub freshness_score: f64,

    /// 加权总置信度 (0.0-1.0)
    pub confidence_score: f64,
}

impl ReconciledPair {
    /// 由两个观测值和置信度分解构造对账对
    pub fn new(
        target: &SpendObservation,
        actual: &SpendObservation,
        breakdown: &ConfidenceBreakdown,
    ) -> Self {
        Self {
            campaign_id: actual.campaign_id.clone(),
            campaign_name: actual.campaign_name.clone(),
            platform: actual.platform,
            target_spend: target.amount_usd,
            actual_spend: actual.amount_usd,
            target_timestamp: target.timestamp,
            actual_timestamp: actual.timestamp,
            metadata_match_score: breakdown.metadata_match_score,
            name_similarity_score: breakdown.name_similarity_score,
            freshness_score: breakdown.freshness_score,
            confidence_score: breakdown.confidence_score,
        }
    }

    /// 节奏偏差百分比 (始终非负)
    ///
    /// 目标为零时: 实际为正返回 100, 否则返回 0。
    pub fn pacing_variance(&self) -> f64 {
        if self.target_spend == 0.0 {
            return if self.actual_spend > 0.0 { 100.0 } else { 0.0 };
        }
        (self.actual_spend - self.target_spend).abs() / self.target_spend * 100.0
    }

    /// 偏差金额 (美元, 绝对值)
    pub fn variance_amount(&self) -> f64 {
        (self.actual_spend - self.target_spend).abs()
    }

    /// 是否超支
    pub fn is_overspending(&self) -> bool {
        self.actual_spend > self.target_spend
    }

    /// 是否欠支 (实际支出为正但低于目标)
    pub fn is_underspending(&self) -> bool {
        self.actual_spend < self.target_spend && self.actual_spend > 0.0
    }

    /// 是否零投放 (目标为正而实际支出为零)
    pub fn is_zero_delivery(&self) -> bool {
        self.actual_spend == 0.0 && self.target_spend > 0.0
    }

    /// 支出方向
    pub fn spend_direction(&self) -> SpendDirection {
        if self.is_zero_delivery() {
            SpendDirection::ZeroDelivery
        } else if self.is_overspending() {
            SpendDirection::Overspending
        } else if self.is_underspending() {
            SpendDirection::Underspending
        } else {
            SpendDirection::OnTarget
        }
    }
}

// ==========================================
// VarianceResult - 偏差分类结果
// ==========================================

/// 偏差分类结果 (派生对象, 单次运行内存活)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceResult {
    /// 偏差百分比 (>= 0)
    pub variance_pct: f64,

    /// 偏差金额 (美元, >= 0)
    pub variance_amount: f64,

    /// 严重等级
    pub severity: Severity,

    /// 是否零投放 (为 true 时强制 severity=critical, variance_pct=100)
    pub is_zero_delivery: bool,

    /// 支出方向
    pub spend_direction: SpendDirection,

    /// 分类原因 (确定性文本)
    pub reason: String,
}

// ==========================================
// Alert - 预警记录
// ==========================================

/// 决策引擎的唯一外部可见产出
///
/// 每次活动运行创建一条, 所有权移交给调用方与审计协作者,
/// 引擎之后不再持有引用。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// 预警 ID
    pub alert_id: String,

    /// 活动 ID
    pub campaign_id: String,

    /// 严重等级
    pub severity: Severity,

    /// 偏差百分比
    pub variance_pct: f64,

    /// 对账置信度
    pub confidence_score: f64,

    /// 终态处置动作
    pub action_taken: ActionTaken,

    /// 处置建议 (确定性文本)
    pub recommendation: String,

    /// 是否需要人工介入
    pub requires_human: bool,

    /// 根因分析 (仅预警/临界路径)
    pub root_cause_analysis: Option<String>,

    /// 缓解计划 (仅预警/临界路径)
    pub mitigation_plan: Option<String>,

    /// 生成时间
    pub timestamp: DateTime<Utc>,

    /// 附加元数据 (活动名称/平台/目标与实际支出等)
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Alert {
    /// 是否为临界预警
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }

    /// 是否执行了自主动作 (而非仅通知/升级)
    pub fn is_autonomous_action(&self) -> bool {
        self.action_taken.is_autonomous()
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Alert(id={}, campaign={}, severity={}, variance={:.1}%, action={})",
            self.alert_id, self.campaign_id, self.severity, self.variance_pct, self.action_taken
        )
    }
}
