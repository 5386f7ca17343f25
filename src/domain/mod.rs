// ==========================================
// 广告投放节奏监控系统 - 领域层
// ==========================================
// 职责: 值对象与核心枚举, 不依赖引擎/协作者
// ==========================================

pub mod spend;
pub mod types;

pub use spend::{Alert, ConfidenceBreakdown, ReconciledPair, SpendObservation, VarianceResult};
pub use types::{ActionTaken, Platform, Severity, SourceKind, SpendDirection};
