// ==========================================
// 广告投放节奏监控系统 - 领域类型定义
// ==========================================
// 职责: 核心枚举类型 (平台/数据源/严重等级/支出方向/处置动作)
// 序列化格式: snake_case (与审计日志和通知载荷一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 媒体平台 (Platform)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Google,
    Meta,
    Dv360,
    Youtube,
    Tiktok,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Google => "google",
            Platform::Meta => "meta",
            Platform::Dv360 => "dv360",
            Platform::Youtube => "youtube",
            Platform::Tiktok => "tiktok",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 数据源类型 (Source Kind)
// ==========================================
// 目标支出来自内部跟踪系统, 实际支出来自平台 API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    InternalTracker,
    PlatformApi,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::InternalTracker => write!(f, "internal_tracker"),
            SourceKind::PlatformApi => write!(f, "platform_api"),
        }
    }
}

// ==========================================
// 偏差严重等级 (Severity)
// ==========================================
// 红线: 等级制, 不是评分制
// 顺序: Healthy < Warning < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Healthy,  // 偏差在健康阈值内
    Warning,  // 偏差超过健康阈值但未达预警阈值
    Critical, // 偏差超过预警阈值, 或零投放
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Healthy => "healthy",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }

    /// 是否需要超出静默记录的处置 (预警或临界)
    pub fn is_actionable(&self) -> bool {
        matches!(self, Severity::Warning | Severity::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 支出方向 (Spend Direction)
// ==========================================
// 零投放与超支/欠支互斥: 单枚举保证不会同时成立
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendDirection {
    Overspending,  // 实际支出高于目标
    Underspending, // 实际支出低于目标 (但大于零)
    ZeroDelivery,  // 目标为正而实际支出为零
    OnTarget,      // 实际支出与目标一致
}

impl SpendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpendDirection::Overspending => "overspending",
            SpendDirection::Underspending => "underspending",
            SpendDirection::ZeroDelivery => "zero_delivery",
            SpendDirection::OnTarget => "on_target",
        }
    }
}

impl fmt::Display for SpendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 处置动作 (Action Taken)
// ==========================================
// 每次活动运行恰好产生一个终态动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionTaken {
    LoggedHealthy,          // 健康: 静默记录
    WarningAlertSent,       // 预警: 已发送通知
    AutonomousHaltExecuted, // 临界: 自主暂停成功
    AutonomousHaltFailed,   // 临界: 自主暂停失败 (按原样记录, 不改变路由)
    EscalatedToHuman,       // 置信度不足: 升级人工处理
}

impl ActionTaken {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionTaken::LoggedHealthy => "logged_healthy",
            ActionTaken::WarningAlertSent => "warning_alert_sent",
            ActionTaken::AutonomousHaltExecuted => "autonomous_halt_executed",
            ActionTaken::AutonomousHaltFailed => "autonomous_halt_failed",
            ActionTaken::EscalatedToHuman => "escalated_to_human",
        }
    }

    /// 是否为自主动作 (未经人工批准的暂停尝试)
    pub fn is_autonomous(&self) -> bool {
        matches!(
            self,
            ActionTaken::AutonomousHaltExecuted | ActionTaken::AutonomousHaltFailed
        )
    }
}

impl fmt::Display for ActionTaken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
