// ==========================================
// 广告投放节奏监控系统 - 引擎层
// ==========================================
// 组成: 置信度评分 / 偏差分类 / 根因缓解 / 决策工作流 / 批量汇总
// ==========================================

pub mod confidence;
pub mod decision;
pub mod error;
pub mod root_cause;
pub mod summary;
pub mod variance;

pub use confidence::{ConfidenceDiagnosis, ConfidenceIssue, ConfidenceScorer};
pub use decision::DecisionEngine;
pub use error::{EngineError, EngineResult};
pub use summary::RunSummary;
pub use variance::VarianceClassifier;
