// ==========================================
// 广告投放节奏监控系统 - 引擎配置
// ==========================================
// 职责: 置信度权重/必需元数据字段/各类阈值的集中配置
// 红线: 构造时快速失败, 非法配置不得进入运行期
// ==========================================

use crate::engine::error::EngineError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 权重和允许的浮点容差
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

// ==========================================
// ConfidenceWeights - 置信度权重
// ==========================================

/// 置信度三分量的权重, 必须和为 1.0 (±0.001)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    /// 元数据匹配权重 (默认 0.5)
    pub metadata: f64,

    /// 名称相似度权重 (默认 0.3)
    pub name_similarity: f64,

    /// 数据新鲜度权重 (默认 0.2)
    pub freshness: f64,
}

impl ConfidenceWeights {
    /// 权重总和
    pub fn sum(&self) -> f64 {
        self.metadata + self.name_similarity + self.freshness
    }

    /// 校验权重和为 1.0 (±0.001)
    pub fn validate(&self) -> Result<(), EngineError> {
        let total = self.sum();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(EngineError::Configuration(format!(
                "置信度权重之和必须为 1.0, 实际为 {:.4} (metadata={}, name_similarity={}, freshness={})",
                total, self.metadata, self.name_similarity, self.freshness
            )));
        }
        Ok(())
    }
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            metadata: 0.5,
            name_similarity: 0.3,
            freshness: 0.2,
        }
    }
}

// ==========================================
// EngineConfig - 决策引擎配置
// ==========================================

/// 决策引擎配置 (运行期只读, 跨活动共享)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 置信度权重
    pub weights: ConfidenceWeights,

    /// 元数据匹配检查的必需字段 (有序)
    pub required_metadata_fields: Vec<String>,

    /// 自主动作的最低置信度阈值 (默认 0.7)
    pub confidence_threshold: f64,

    /// 健康偏差上限百分比 (默认 10.0, 达到即为 warning)
    pub healthy_threshold_pct: f64,

    /// 预警偏差上限百分比 (默认 25.0, 达到即为 critical)
    pub warning_threshold_pct: f64,

    /// 批量运行的最大并发活动数 (默认 4)
    pub max_concurrency: usize,

    /// 协作者调用超时 (秒, 默认 10)
    pub collaborator_timeout_secs: u64,
}

impl EngineConfig {
    /// 校验配置, 非法时返回 ConfigurationError
    ///
    /// # 校验规则
    /// - 权重和为 1.0 (±0.001)
    /// - 偏差阈值严格递增且非负
    /// - 置信度阈值 ∈ [0,1]
    /// - 并发数 >= 1
    pub fn validate(&self) -> Result<(), EngineError> {
        self.weights.validate()?;

        if self.healthy_threshold_pct < 0.0 {
            return Err(EngineError::Configuration(format!(
                "健康阈值必须非负, 实际为 {}",
                self.healthy_threshold_pct
            )));
        }
        if self.healthy_threshold_pct >= self.warning_threshold_pct {
            return Err(EngineError::Configuration(format!(
                "偏差阈值必须严格递增: healthy={} warning={}",
                self.healthy_threshold_pct, self.warning_threshold_pct
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(EngineError::Configuration(format!(
                "置信度阈值必须在 [0,1] 内, 实际为 {}",
                self.confidence_threshold
            )));
        }
        if self.max_concurrency == 0 {
            return Err(EngineError::Configuration(
                "最大并发数必须 >= 1".to_string(),
            ));
        }
        if self.collaborator_timeout_secs == 0 {
            return Err(EngineError::Configuration(
                "协作者超时必须 >= 1 秒".to_string(),
            ));
        }
        Ok(())
    }

    /// 协作者调用超时时长
    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_secs(self.collaborator_timeout_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: ConfidenceWeights::default(),
            required_metadata_fields: vec![
                "market".to_string(),
                "product".to_string(),
                "start_date".to_string(),
                "end_date".to_string(),
            ],
            confidence_threshold: 0.7,
            healthy_threshold_pct: 10.0,
            warning_threshold_pct: 25.0,
            max_concurrency: 4,
            collaborator_timeout_secs: 10,
        }
    }
}
