// ==========================================
// 广告投放节奏监控系统 - 核心库
// ==========================================
// 技术栈: Rust + Tokio
// 系统定位: 支出对账与自主决策引擎 (升级路径保留人工最终控制权)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 引擎配置
pub mod config;

// 引擎层 - 业务规则
pub mod engine;

// 数据源层 - 协作者契约与模拟实现
pub mod sources;

// 审计层 - 决策留痕
pub mod audit;

// 通知层 - 告警渠道
pub mod notify;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ActionTaken, Platform, Severity, SourceKind, SpendDirection};

// 领域实体
pub use domain::{Alert, ConfidenceBreakdown, ReconciledPair, SpendObservation, VarianceResult};

// 配置
pub use config::{ConfidenceWeights, EngineConfig};

// 引擎
pub use engine::{
    ConfidenceScorer, DecisionEngine, EngineError, EngineResult, RunSummary, VarianceClassifier,
};

// 协作者契约
pub use sources::{
    AuditSink, NotificationMessage, NotificationSink, PlatformSource, SourceError, TargetSource,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "广告投放节奏监控系统";

// ==========================================
// 预编译检查
// ==========================================
