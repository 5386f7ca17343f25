// ==========================================
// 广告投放节奏监控系统 - 配置层
// ==========================================

pub mod engine_config;

pub use engine_config::{ConfidenceWeights, EngineConfig, WEIGHT_SUM_TOLERANCE};
