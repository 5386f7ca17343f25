// ==========================================
// 广告投放节奏监控系统 - 偏差分类引擎
// ==========================================
// 职责: 将目标/实际两个数字转化为严重等级
// 红线: 零投放无条件 critical, 在任何阈值比较之前判定
// 边界: 阈值比较用严格小于, 边界值归入更高一档
// ==========================================

use crate::config::engine_config::EngineConfig;
use crate::domain::spend::{ReconciledPair, VarianceResult};
use crate::domain::types::{Severity, SpendDirection};
use crate::engine::error::EngineError;

// ==========================================
// VarianceClassifier - 偏差分类引擎
// ==========================================

/// 无状态分类引擎, 阈值在构造时校验并冻结
pub struct VarianceClassifier {
    healthy_threshold: f64,
    warning_threshold: f64,
}

impl VarianceClassifier {
    /// 构造函数, 阈值非严格递增时快速失败
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        if config.healthy_threshold_pct < 0.0
            || config.healthy_threshold_pct >= config.warning_threshold_pct
        {
            return Err(EngineError::Configuration(format!(
                "偏差阈值必须非负且严格递增: healthy={} warning={}",
                config.healthy_threshold_pct, config.warning_threshold_pct
            )));
        }
        Ok(Self {
            healthy_threshold: config.healthy_threshold_pct,
            warning_threshold: config.warning_threshold_pct,
        })
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 分类偏差严重程度
    ///
    /// # 判定顺序
    /// 1. 零投放 (actual==0 且 target>0): 无条件 critical, 偏差=100%
    /// 2. 目标为零: 实际为正记 100%, 否则 0%, 按通用阈值规则定级
    /// 3. 通用规则: |actual-target|/target*100, 严格小于比较
    pub fn classify(&self, target_amount: f64, actual_amount: f64) -> VarianceResult {
        // 零投放优先于一切阈值比较
        if actual_amount == 0.0 && target_amount > 0.0 {
            return VarianceResult {
                variance_pct: 100.0,
                variance_amount: target_amount,
                severity: Severity::Critical,
                is_zero_delivery: true,
                spend_direction: SpendDirection::ZeroDelivery,
                reason: "目标支出为正但实际支出为零".to_string(),
            };
        }

        let (variance_pct, variance_amount) = if target_amount == 0.0 {
            let pct = if actual_amount > 0.0 { 100.0 } else { 0.0 };
            (pct, actual_amount)
        } else {
            (
                (actual_amount - target_amount).abs() / target_amount * 100.0,
                (actual_amount - target_amount).abs(),
            )
        };

        let severity = self.classify_severity(variance_pct, false);
        let spend_direction = if actual_amount > target_amount {
            SpendDirection::Overspending
        } else if actual_amount < target_amount && actual_amount > 0.0 {
            SpendDirection::Underspending
        } else {
            SpendDirection::OnTarget
        };

        VarianceResult {
            variance_pct,
            variance_amount,
            severity,
            is_zero_delivery: false,
            spend_direction,
            reason: Self::reason_for(severity).to_string(),
        }
    }

    /// 纯分级函数: 偏差百分比 -> 严重等级
    ///
    /// 边界值归入更高一档: variance_pct == healthy_threshold 即为 warning。
    pub fn classify_severity(&self, variance_pct: f64, is_zero_delivery: bool) -> Severity {
        if is_zero_delivery {
            return Severity::Critical;
        }
        if variance_pct < self.healthy_threshold {
            Severity::Healthy
        } else if variance_pct < self.warning_threshold {
            Severity::Warning
        } else {
            Severity::Critical
        }
    }

    fn reason_for(severity: Severity) -> &'static str {
        match severity {
            Severity::Healthy => "偏差在可接受范围内",
            Severity::Warning => "偏差超过健康阈值但未达临界阈值",
            Severity::Critical => "偏差超过临界阈值",
        }
    }

    // ==========================================
    // 处置建议文本 (确定性模板, 按严重等级+方向选择)
    // ==========================================

    /// 生成处置建议 (同样输入产生同样文本)
    pub fn recommendation(&self, result: &VarianceResult, pair: &ReconciledPair) -> String {
        if result.severity == Severity::Healthy {
            return format!(
                "投放节奏健康 (偏差 {:.1}%), 无需处理。",
                result.variance_pct
            );
        }

        if result.is_zero_delivery {
            return Self::zero_delivery_recommendation(pair);
        }

        let direction_text = match result.spend_direction {
            SpendDirection::Overspending => "超支",
            SpendDirection::Underspending => "欠支",
            SpendDirection::ZeroDelivery => "零投放",
            SpendDirection::OnTarget => "达标",
        };

        match result.severity {
            Severity::Warning => format!(
                "预警: 活动{} {:.1}% (${:.2})。\n建议措施: {}",
                direction_text,
                result.variance_pct,
                result.variance_amount,
                Self::warning_action(result),
            ),
            Severity::Critical => format!(
                "临界: 活动{} {:.1}% (${:.2})。\n需立即处理: {}",
                direction_text,
                result.variance_pct,
                result.variance_amount,
                Self::critical_action(result),
            ),
            Severity::Healthy => unreachable!("健康等级已提前返回"),
        }
    }

    /// 预警级处置建议
    fn warning_action(result: &VarianceResult) -> String {
        match result.spend_direction {
            SpendDirection::Overspending => format!(
                "检查定向参数并将日预算下调 ${:.2} 以对齐目标, 未来 24 小时密切监控。",
                result.variance_amount
            ),
            SpendDirection::Underspending => format!(
                "排查投放量不足的原因, 考虑提高出价或扩大受众定向, 目标支出缺口 ${:.2}。",
                result.variance_amount
            ),
            _ => "检查活动设置与节奏参数。".to_string(),
        }
    }

    /// 临界级处置建议
    fn critical_action(result: &VarianceResult) -> String {
        match result.spend_direction {
            SpendDirection::Overspending => format!(
                "立即暂停活动以阻止进一步超支, 将 ${:.2} 预算重新分配到其他活动, 恢复前先排查根因。",
                result.variance_amount
            ),
            SpendDirection::Underspending => format!(
                "活动严重欠投, 暂停并诊断: 受众规模/出价策略/素材审核状态/预算分配, 考虑将 ${:.2} 调拨至表现更好的活动。",
                result.variance_amount
            ),
            _ => "需要立即复核并采取纠正措施。".to_string(),
        }
    }

    /// 零投放处置建议 (固定清单)
    fn zero_delivery_recommendation(pair: &ReconciledPair) -> String {
        format!(
            "检测到零投放\n\n\
             活动: {}\n目标支出: ${:.2}\n实际支出: $0.00\n\n\
             可能原因:\n\
             - 活动或广告组已暂停\n\
             - 受众耗尽或定向过窄\n\
             - 出价过低无法竞得展示\n\
             - 预算已耗尽\n\
             - 素材待审核\n\
             - 版位限制阻断投放\n\n\
             立即行动:\n\
             1. 检查活动状态 (启用/暂停)\n\
             2. 复核受众规模与定向\n\
             3. 出价上调 20-30%\n\
             4. 核对预算分配\n\
             5. 检查素材审核状态",
            pair.campaign_name, pair.target_spend
        )
    }

    // ==========================================
    // 辅助判定
    // ==========================================

    /// 是否需要超出静默记录的处置
    pub fn is_actionable(severity: Severity) -> bool {
        severity.is_actionable()
    }

    /// 是否满足自主动作条件 (临界且置信度达标)
    pub fn requires_autonomous_action(
        severity: Severity,
        confidence_score: f64,
        confidence_threshold: f64,
    ) -> bool {
        severity == Severity::Critical && confidence_score >= confidence_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::spend::{ConfidenceBreakdown, SpendObservation};
    use crate::domain::types::{Platform, SourceKind};
    use chrono::Utc;
    use std::collections::HashMap;

    fn classifier() -> VarianceClassifier {
        VarianceClassifier::new(&EngineConfig::default()).unwrap()
    }

    fn pair(target: f64, actual: f64) -> ReconciledPair {
        let obs = |source, amount| SpendObservation {
            campaign_id: "meta_cmp_002".to_string(),
            campaign_name: "LEGO_Friends_NA_Q2".to_string(),
            platform: Platform::Meta,
            source,
            amount_usd: amount,
            timestamp: Utc::now(),
            refresh_cycle_hours: 4,
            metadata: HashMap::new(),
        };
        ReconciledPair::new(
            &obs(SourceKind::InternalTracker, target),
            &obs(SourceKind::PlatformApi, actual),
            &ConfidenceBreakdown {
                metadata_match_score: 1.0,
                name_similarity_score: 1.0,
                freshness_score: 1.0,
                confidence_score: 1.0,
            },
        )
    }

    #[test]
    fn test_zero_delivery_always_critical() {
        let result = classifier().classify(10000.0, 0.0);
        assert_eq!(result.severity, Severity::Critical);
        assert_eq!(result.variance_pct, 100.0);
        assert_eq!(result.variance_amount, 10000.0);
        assert!(result.is_zero_delivery);
        assert_eq!(result.spend_direction, SpendDirection::ZeroDelivery);
    }

    #[test]
    fn test_zero_delivery_overrides_lenient_thresholds() {
        // 即便阈值配置宽到让 100% 偏差按通用规则不算临界, 零投放仍强制 critical
        let mut config = EngineConfig::default();
        config.healthy_threshold_pct = 150.0;
        config.warning_threshold_pct = 200.0;
        let c = VarianceClassifier::new(&config).unwrap();

        let result = c.classify(10000.0, 0.0);
        assert_eq!(result.severity, Severity::Critical);
        assert_eq!(result.variance_pct, 100.0);

        // 对照: 非零投放的 100% 偏差在该配置下是 healthy
        let result = c.classify(10000.0, 20000.0);
        assert_eq!(result.severity, Severity::Healthy);
    }

    #[test]
    fn test_zero_target_cases() {
        let c = classifier();
        let result = c.classify(0.0, 0.0);
        assert_eq!(result.variance_pct, 0.0);
        assert_eq!(result.severity, Severity::Healthy);
        assert_eq!(result.spend_direction, SpendDirection::OnTarget);
        assert!(!result.is_zero_delivery);

        let result = c.classify(0.0, 100.0);
        assert_eq!(result.variance_pct, 100.0);
        assert_eq!(result.severity, Severity::Critical);
        assert_eq!(result.spend_direction, SpendDirection::Overspending);
    }

    #[test]
    fn test_threshold_boundaries_belong_to_next_tier() {
        let c = classifier();
        // 恰好等于健康阈值 (10%) => warning
        let result = c.classify(10000.0, 11000.0);
        assert_eq!(result.variance_pct, 10.0);
        assert_eq!(result.severity, Severity::Warning);

        // 恰好等于预警阈值 (25%) => critical
        let result = c.classify(10000.0, 12500.0);
        assert_eq!(result.variance_pct, 25.0);
        assert_eq!(result.severity, Severity::Critical);

        // 阈值之下保持本档
        assert_eq!(c.classify(10000.0, 10999.0).severity, Severity::Healthy);
        assert_eq!(c.classify(10000.0, 12499.0).severity, Severity::Warning);
    }

    #[test]
    fn test_classify_severity_pure_helper() {
        let c = classifier();
        assert_eq!(c.classify_severity(5.0, false), Severity::Healthy);
        assert_eq!(c.classify_severity(10.0, false), Severity::Warning);
        assert_eq!(c.classify_severity(25.0, false), Severity::Critical);
        // 零投放标志覆盖一切
        assert_eq!(c.classify_severity(0.0, true), Severity::Critical);
    }

    #[test]
    fn test_directions() {
        let c = classifier();
        assert_eq!(
            c.classify(10000.0, 12000.0).spend_direction,
            SpendDirection::Overspending
        );
        assert_eq!(
            c.classify(10000.0, 8000.0).spend_direction,
            SpendDirection::Underspending
        );
        assert_eq!(
            c.classify(10000.0, 10000.0).spend_direction,
            SpendDirection::OnTarget
        );
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let mut config = EngineConfig::default();
        config.healthy_threshold_pct = 25.0;
        config.warning_threshold_pct = 25.0;
        assert!(VarianceClassifier::new(&config).is_err());
    }

    #[test]
    fn test_recommendation_deterministic() {
        let c = classifier();
        let p = pair(10000.0, 12000.0);
        let result = c.classify(p.target_spend, p.actual_spend);
        assert_eq!(
            c.recommendation(&result, &p),
            c.recommendation(&result, &p)
        );
        assert!(c.recommendation(&result, &p).contains("预警"));
    }

    #[test]
    fn test_zero_delivery_recommendation_contains_checklist() {
        let c = classifier();
        let p = pair(10000.0, 0.0);
        let result = c.classify(p.target_spend, p.actual_spend);
        let text = c.recommendation(&result, &p);
        assert!(text.contains("零投放"));
        assert!(text.contains("LEGO_Friends_NA_Q2"));
        assert!(text.contains("$10000.00"));
    }

    #[test]
    fn test_requires_autonomous_action() {
        assert!(VarianceClassifier::requires_autonomous_action(
            Severity::Critical,
            0.85,
            0.7
        ));
        assert!(!VarianceClassifier::requires_autonomous_action(
            Severity::Critical,
            0.3,
            0.7
        ));
        assert!(!VarianceClassifier::requires_autonomous_action(
            Severity::Warning,
            0.9,
            0.7
        ));
    }
}
