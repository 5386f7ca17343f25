// ==========================================
// 广告投放节奏监控系统 - 置信度评分引擎
// ==========================================
// 职责: 在允许任何自主动作之前量化数据质量风险
// 输入: 两侧活动名称 + 元数据 + 实际数据时间戳
// 输出: 三分量评分与加权总置信度
// ==========================================
// 权重 (默认): 元数据匹配 50% / 名称相似度 30% / 数据新鲜度 20%
// ==========================================

use crate::config::engine_config::{ConfidenceWeights, EngineConfig};
use crate::domain::spend::ConfidenceBreakdown;
use crate::engine::error::EngineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ==========================================
// 分量子阈值 (仅用于诊断文本, 不参与路由)
// ==========================================

/// 元数据/名称相似度的可接受下限
const COMPONENT_ACCEPTABLE: f64 = 0.8;

/// 新鲜度低于此值视为严重过期
const FRESHNESS_STALE: f64 = 0.5;

// ==========================================
// ConfidenceScorer - 置信度评分引擎
// ==========================================

/// 无状态评分引擎, 配置在构造时校验并冻结
pub struct ConfidenceScorer {
    required_fields: Vec<String>,
    weights: ConfidenceWeights,
}

impl ConfidenceScorer {
    /// 构造函数, 权重和不为 1.0 (±0.001) 时快速失败
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        config.weights.validate()?;
        Ok(Self {
            required_fields: config.required_metadata_fields.clone(),
            weights: config.weights,
        })
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算对账置信度分解
    ///
    /// # 参数
    /// - `target_name` / `actual_name`: 两侧活动名称
    /// - `target_metadata` / `actual_metadata`: 两侧元数据
    /// - `actual_timestamp`: 实际支出数据的时间戳 (新鲜度依据)
    pub fn score(
        &self,
        target_name: &str,
        actual_name: &str,
        target_metadata: &HashMap<String, String>,
        actual_metadata: &HashMap<String, String>,
        actual_timestamp: DateTime<Utc>,
    ) -> ConfidenceBreakdown {
        self.score_at(
            target_name,
            actual_name,
            target_metadata,
            actual_metadata,
            actual_timestamp,
            Utc::now(),
        )
    }

    /// 在给定当前时刻下计算置信度分解 (时钟仅在此边界注入)
    pub fn score_at(
        &self,
        target_name: &str,
        actual_name: &str,
        target_metadata: &HashMap<String, String>,
        actual_metadata: &HashMap<String, String>,
        actual_timestamp: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> ConfidenceBreakdown {
        let metadata_match_score = self.metadata_match(target_metadata, actual_metadata);
        let name_similarity_score = Self::name_similarity(target_name, actual_name);
        let age_hours = (now - actual_timestamp).num_seconds() as f64 / 3600.0;
        let freshness_score = Self::freshness_from_age(age_hours);

        let confidence_score = metadata_match_score * self.weights.metadata
            + name_similarity_score * self.weights.name_similarity
            + freshness_score * self.weights.freshness;

        ConfidenceBreakdown {
            metadata_match_score,
            name_similarity_score,
            freshness_score,
            confidence_score,
        }
    }

    // ==========================================
    // 分量计算
    // ==========================================

    /// 元数据匹配度: 必需字段中两侧均存在且大小写不敏感相等的比例
    ///
    /// 任一侧缺失按不匹配计, 不做部分匹配。
    /// 必需字段集为空时按约定返回 1.0 (没有可分歧的字段)。
    pub fn metadata_match(
        &self,
        target_metadata: &HashMap<String, String>,
        actual_metadata: &HashMap<String, String>,
    ) -> f64 {
        if self.required_fields.is_empty() {
            return 1.0;
        }

        let matched = self
            .required_fields
            .iter()
            .filter(|field| {
                match (target_metadata.get(*field), actual_metadata.get(*field)) {
                    (Some(t), Some(a)) => t.to_lowercase() == a.to_lowercase(),
                    _ => false,
                }
            })
            .count();

        matched as f64 / self.required_fields.len() as f64
    }

    /// 活动名称相似度 (基于编辑距离)
    ///
    /// 归一化 (去空白 + 小写) 后:
    /// - 两侧均为空: 1.0
    /// - 仅一侧为空: 0.0
    /// - 完全一致: 1.0
    /// - 否则: max(0, 1 - 编辑距离 / 最大长度)
    pub fn name_similarity(target_name: &str, actual_name: &str) -> f64 {
        let target_norm = target_name.trim().to_lowercase();
        let actual_norm = actual_name.trim().to_lowercase();

        if target_norm.is_empty() && actual_norm.is_empty() {
            return 1.0;
        }
        if target_norm.is_empty() || actual_norm.is_empty() {
            return 0.0;
        }
        if target_norm == actual_norm {
            return 1.0;
        }

        let max_len = target_norm.chars().count().max(actual_norm.chars().count());
        let distance = levenshtein(&target_norm, &actual_norm);
        (1.0 - distance as f64 / max_len as f64).max(0.0)
    }

    /// 数据新鲜度: 数据年龄 (小时) 的纯阶梯函数
    ///
    /// 边界对下界半开: 恰好 4h 落入 0.8 档, 恰好 24h 落入 0.2 档。
    ///
    /// | 年龄        | 评分 |
    /// |-------------|------|
    /// | < 4h        | 1.0  |
    /// | [4h, 12h)   | 0.8  |
    /// | [12h, 24h)  | 0.5  |
    /// | >= 24h      | 0.2  |
    pub fn freshness_from_age(age_hours: f64) -> f64 {
        if age_hours < 4.0 {
            1.0
        } else if age_hours < 12.0 {
            0.8
        } else if age_hours < 24.0 {
            0.5
        } else {
            0.2
        }
    }

    // ==========================================
    // 低置信度诊断
    // ==========================================

    /// 诊断置信度不足的原因
    ///
    /// 仅用于生成人类可读的处置建议文本, 不参与路由决策。
    pub fn diagnose(&self, breakdown: &ConfidenceBreakdown, threshold: f64) -> ConfidenceDiagnosis {
        let mut issues = Vec::new();

        if breakdown.confidence_score >= threshold {
            return ConfidenceDiagnosis {
                confidence_score: breakdown.confidence_score,
                threshold,
                issues,
            };
        }

        if breakdown.metadata_match_score < COMPONENT_ACCEPTABLE {
            issues.push(ConfidenceIssue::MetadataMismatch {
                score: breakdown.metadata_match_score,
                fields: self.required_fields.clone(),
            });
        }
        if breakdown.name_similarity_score < COMPONENT_ACCEPTABLE {
            issues.push(ConfidenceIssue::NameDivergence {
                score: breakdown.name_similarity_score,
            });
        }
        if breakdown.freshness_score < COMPONENT_ACCEPTABLE {
            if breakdown.freshness_score < FRESHNESS_STALE {
                issues.push(ConfidenceIssue::StaleData {
                    score: breakdown.freshness_score,
                });
            } else {
                issues.push(ConfidenceIssue::ModeratelyStaleData {
                    score: breakdown.freshness_score,
                });
            }
        }

        ConfidenceDiagnosis {
            confidence_score: breakdown.confidence_score,
            threshold,
            issues,
        }
    }
}

// ==========================================
// ConfidenceDiagnosis - 诊断报告
// ==========================================

/// 低置信度的结构化诊断报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceDiagnosis {
    pub confidence_score: f64,
    pub threshold: f64,
    pub issues: Vec<ConfidenceIssue>,
}

impl ConfidenceDiagnosis {
    /// 置信度是否可接受 (达到阈值)
    pub fn is_acceptable(&self) -> bool {
        self.confidence_score >= self.threshold
    }
}

impl fmt::Display for ConfidenceDiagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_acceptable() {
            return write!(f, "置信度可接受, 未发现数据质量问题。");
        }

        writeln!(
            f,
            "置信度 {:.1}% 低于阈值 {:.1}%, 检测到以下问题:",
            self.confidence_score * 100.0,
            self.threshold * 100.0
        )?;
        if self.issues.is_empty() {
            write!(f, "- 置信度低于阈值但未定位到具体分量问题")?;
            return Ok(());
        }
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "- {}", issue)?;
        }
        Ok(())
    }
}

/// 单个置信度分量问题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ConfidenceIssue {
    /// 元数据匹配度低 (< 0.8)
    MetadataMismatch { score: f64, fields: Vec<String> },

    /// 名称相似度低 (< 0.8)
    NameDivergence { score: f64 },

    /// 数据中度过期 (新鲜度 [0.5, 0.8))
    ModeratelyStaleData { score: f64 },

    /// 数据严重过期 (新鲜度 < 0.5)
    StaleData { score: f64 },
}

impl fmt::Display for ConfidenceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceIssue::MetadataMismatch { score, fields } => write!(
                f,
                "元数据匹配度低 ({:.1}%), 请核对活动字段: {}",
                score * 100.0,
                fields.join(", ")
            ),
            ConfidenceIssue::NameDivergence { score } => write!(
                f,
                "名称相似度低 ({:.1}%), 跟踪系统与平台的活动命名差异显著, 请统一命名规范",
                score * 100.0
            ),
            ConfidenceIssue::ModeratelyStaleData { score } => write!(
                f,
                "数据中度过期 ({:.1}%), 数据年龄在 12-24 小时之间",
                score * 100.0
            ),
            ConfidenceIssue::StaleData { score } => write!(
                f,
                "数据严重过期 ({:.1}%), 数据已超过 24 小时未更新, 请提高刷新频率",
                score * 100.0
            ),
        }
    }
}

// ==========================================
// 编辑距离 (Levenshtein)
// ==========================================

/// 两行 DP 实现的编辑距离, 按 Unicode 字符计
pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr: Vec<usize> = vec![0; b_chars.len() + 1];

    for (i, ca) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}
