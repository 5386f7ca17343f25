// ==========================================
// 广告投放节奏监控系统 - 根因分析与缓解计划
// ==========================================
// 职责: 预警/临界路径的后置分析 (升级路径不经过此处)
// 红线: 规则按固定优先级枚举, 同样输入产生同样文本
// ==========================================
// 根因优先级: 零投放 > 数据过期 > 元数据不匹配 > 超支/欠支金额
// ==========================================

use crate::domain::spend::{ReconciledPair, VarianceResult};
use crate::domain::types::SpendDirection;

/// 数据质量规则的子阈值 (与置信度诊断保持一致)
const METADATA_ACCEPTABLE: f64 = 0.8;
const FRESHNESS_ACCEPTABLE: f64 = 0.8;
const FRESHNESS_STALE: f64 = 0.5;

// ==========================================
// 根因分析
// ==========================================

/// 按固定优先级枚举适用的根因, 每条一个要点
///
/// 空列表合法 (所有原因都是可选的)。零投放场景不再叠加
/// 超支/欠支要点: 支出方向是单枚举, 零投放与超支互斥。
pub fn analyze_root_cause(pair: &ReconciledPair, result: &VarianceResult) -> String {
    let mut causes: Vec<String> = Vec::new();

    // 1. 零投放
    if result.is_zero_delivery {
        causes.push("活动目标支出为正但实际支出为零".to_string());
        causes.push("可能原因: 广告组被暂停/受众耗尽/出价过低".to_string());
    }

    // 2. 数据过期
    if pair.freshness_score < FRESHNESS_STALE {
        causes.push(format!(
            "数据过期: 最后更新于 {}",
            pair.actual_timestamp.format("%Y-%m-%d %H:%M UTC")
        ));
    }

    // 3. 元数据不匹配
    if pair.metadata_match_score < METADATA_ACCEPTABLE {
        causes.push("跟踪系统与平台之间的活动元数据不匹配".to_string());
    }

    // 4. 超支/欠支金额
    match result.spend_direction {
        SpendDirection::Overspending => causes.push(format!(
            "实际支出 (${:.2}) 超出目标 (${:.2}) ${:.2}",
            pair.actual_spend,
            pair.target_spend,
            pair.variance_amount()
        )),
        SpendDirection::Underspending => causes.push(format!(
            "实际支出 (${:.2}) 低于目标 (${:.2}) ${:.2}",
            pair.actual_spend,
            pair.target_spend,
            pair.variance_amount()
        )),
        SpendDirection::ZeroDelivery | SpendDirection::OnTarget => {}
    }

    causes
        .iter()
        .map(|c| format!("- {}", c))
        .collect::<Vec<_>>()
        .join("\n")
}

// ==========================================
// 缓解计划
// ==========================================

/// 按支出方向与数据质量弱项生成缓解计划
///
/// 末尾始终追加 3 条固定的通用建议。
pub fn generate_mitigation(pair: &ReconciledPair, result: &VarianceResult) -> String {
    let mut mitigations: Vec<&str> = Vec::new();

    // 零投放措施
    if result.is_zero_delivery {
        mitigations.extend([
            "复核活动定向参数 (受众规模/人群画像)",
            "出价上调 20-30% 以提升竞争力",
            "扩大受众定向条件或启用相似受众",
            "检查素材审核状态, 被拒后重新提交",
        ]);
    }

    // 超支/欠支措施
    match result.spend_direction {
        SpendDirection::Overspending => mitigations.extend([
            "下调日预算/总预算以阻止进一步超支",
            "在平台侧配置自动化节奏控制规则",
            "设置出价上限或成本控制",
            "收紧定向以降低消耗速度",
        ]),
        SpendDirection::Underspending => mitigations.extend([
            "排查投放量不足的原因 (竞价竞争力/出价策略)",
            "考虑将预算调拨至表现更好的活动",
            "测试不同的受众分组或版位",
            "提高出价或切换至最大化投放量出价",
        ]),
        SpendDirection::ZeroDelivery | SpendDirection::OnTarget => {}
    }

    // 数据质量措施
    if pair.metadata_match_score < METADATA_ACCEPTABLE {
        mitigations.push("在所有平台推行更严格的活动命名规范");
    }
    if pair.freshness_score < FRESHNESS_ACCEPTABLE {
        mitigations.push("提高数据刷新频率 (刷新周期从 4h 缩短到 2h)");
    }

    // 固定通用建议 (始终追加)
    mitigations.extend([
        "在平台侧配置自动化规则作为引擎的兜底",
        "安排每日投放节奏复盘",
        "将经验沉淀到活动复盘文档",
    ]);

    mitigations
        .iter()
        .map(|m| format!("- {}", m))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::spend::{ConfidenceBreakdown, SpendObservation};
    use crate::domain::types::{Platform, Severity, SourceKind};
    use chrono::Utc;
    use std::collections::HashMap;

    fn pair_with_scores(
        target: f64,
        actual: f64,
        metadata_match: f64,
        freshness: f64,
    ) -> ReconciledPair {
        let obs = |source, amount| SpendObservation {
            campaign_id: "google_cmp_003".to_string(),
            campaign_name: "LEGO_Technic_APAC_Q3".to_string(),
            platform: Platform::Google,
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
                metadata_match_score: metadata_match,
                name_similarity_score: 1.0,
                freshness_score: freshness,
                confidence_score: 0.9,
            },
        )
    }

    fn variance_result(
        severity: Severity,
        direction: SpendDirection,
        is_zero_delivery: bool,
        variance_pct: f64,
        variance_amount: f64,
    ) -> VarianceResult {
        VarianceResult {
            variance_pct,
            variance_amount,
            severity,
            is_zero_delivery,
            spend_direction: direction,
            reason: String::new(),
        }
    }

    #[test]
    fn test_root_cause_priority_order() {
        // 零投放 + 数据过期 + 元数据不匹配同时存在时, 按固定顺序出现
        let pair = pair_with_scores(10000.0, 0.0, 0.5, 0.2);
        let result = variance_result(
            Severity::Critical,
            SpendDirection::ZeroDelivery,
            true,
            100.0,
            10000.0,
        );
        let text = analyze_root_cause(&pair, &result);
        let zero_pos = text.find("实际支出为零").unwrap();
        let stale_pos = text.find("数据过期").unwrap();
        let meta_pos = text.find("元数据不匹配").unwrap();
        assert!(zero_pos < stale_pos);
        assert!(stale_pos < meta_pos);
        // 零投放不叠加超支/欠支要点
        assert!(!text.contains("超出目标"));
        assert!(!text.contains("低于目标"));
    }

    #[test]
    fn test_root_cause_overspend_magnitude() {
        let pair = pair_with_scores(10000.0, 14000.0, 1.0, 1.0);
        let result = variance_result(
            Severity::Critical,
            SpendDirection::Overspending,
            false,
            40.0,
            4000.0,
        );
        let text = analyze_root_cause(&pair, &result);
        assert!(text.contains("超出目标"));
        assert!(text.contains("$4000.00"));
    }

    #[test]
    fn test_root_cause_can_be_empty() {
        // 达标方向且数据质量良好: 空根因列表合法
        let pair = pair_with_scores(10000.0, 10000.0, 1.0, 1.0);
        let result = variance_result(
            Severity::Warning,
            SpendDirection::OnTarget,
            false,
            0.0,
            0.0,
        );
        assert_eq!(analyze_root_cause(&pair, &result), "");
    }

    #[test]
    fn test_mitigation_always_appends_general_items() {
        let pair = pair_with_scores(10000.0, 10000.0, 1.0, 1.0);
        let result = variance_result(
            Severity::Warning,
            SpendDirection::OnTarget,
            false,
            0.0,
            0.0,
        );
        let text = generate_mitigation(&pair, &result);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("兜底"));
        assert!(lines[1].contains("每日投放节奏复盘"));
        assert!(lines[2].contains("复盘文档"));
    }

    #[test]
    fn test_mitigation_underspend_and_data_quality() {
        let pair = pair_with_scores(10000.0, 6000.0, 0.5, 0.5);
        let result = variance_result(
            Severity::Critical,
            SpendDirection::Underspending,
            false,
            40.0,
            4000.0,
        );
        let text = generate_mitigation(&pair, &result);
        assert!(text.contains("投放量不足"));
        assert!(text.contains("命名规范"));
        assert!(text.contains("刷新频率"));
        // 确定性
        assert_eq!(text, generate_mitigation(&pair, &result));
    }
}
