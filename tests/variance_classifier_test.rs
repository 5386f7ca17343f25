// ==========================================
// VarianceClassifier 引擎集成测试
// ==========================================
// 测试目标: 验证偏差分级与处置建议生成
// 覆盖范围: 零投放优先规则/阈值边界/目标为零/自定义阈值
// ==========================================

use pacing_agent::domain::types::{Severity, SpendDirection};
use pacing_agent::engine::VarianceClassifier;
use pacing_agent::EngineConfig;

fn default_classifier() -> VarianceClassifier {
    VarianceClassifier::new(&EngineConfig::default()).unwrap()
}

// ==========================================
// 零投放优先规则
// ==========================================

#[test]
fn test_zero_delivery_is_unconditionally_critical() {
    let result = default_classifier().classify(8000.0, 0.0);
    assert_eq!(result.severity, Severity::Critical);
    assert!(result.is_zero_delivery);
    assert_eq!(result.variance_pct, 100.0);
    assert_eq!(result.variance_amount, 8000.0);
    assert_eq!(result.spend_direction, SpendDirection::ZeroDelivery);
}

#[test]
fn test_zero_delivery_checked_before_thresholds() {
    // 宽松阈值下 100% 偏差按通用规则只是 healthy, 零投放仍强制 critical
    let mut config = EngineConfig::default();
    config.healthy_threshold_pct = 150.0;
    config.warning_threshold_pct = 300.0;
    let classifier = VarianceClassifier::new(&config).unwrap();

    assert_eq!(classifier.classify(8000.0, 0.0).severity, Severity::Critical);
    assert_eq!(
        classifier.classify(8000.0, 16000.0).severity,
        Severity::Healthy
    );
}

// ==========================================
// 阈值边界
// ==========================================

#[test]
fn test_boundary_values_fall_into_higher_tier() {
    let classifier = default_classifier();

    // 9.99% => healthy, 10.00% => warning
    assert_eq!(
        classifier.classify(10000.0, 10999.0).severity,
        Severity::Healthy
    );
    assert_eq!(
        classifier.classify(10000.0, 11000.0).severity,
        Severity::Warning
    );

    // 24.99% => warning, 25.00% => critical
    assert_eq!(
        classifier.classify(10000.0, 12499.0).severity,
        Severity::Warning
    );
    assert_eq!(
        classifier.classify(10000.0, 12500.0).severity,
        Severity::Critical
    );
}

#[test]
fn test_underspend_and_overspend_symmetric_magnitude() {
    let classifier = default_classifier();

    let over = classifier.classify(10000.0, 12000.0);
    let under = classifier.classify(10000.0, 8000.0);
    assert_eq!(over.variance_pct, under.variance_pct);
    assert_eq!(over.variance_amount, under.variance_amount);
    assert_eq!(over.spend_direction, SpendDirection::Overspending);
    assert_eq!(under.spend_direction, SpendDirection::Underspending);
}

// ==========================================
// 目标为零
// ==========================================

#[test]
fn test_zero_target_with_zero_actual_is_healthy() {
    let result = default_classifier().classify(0.0, 0.0);
    assert_eq!(result.variance_pct, 0.0);
    assert_eq!(result.severity, Severity::Healthy);
    assert!(!result.is_zero_delivery);
}

#[test]
fn test_zero_target_with_positive_actual_is_full_variance() {
    let result = default_classifier().classify(0.0, 500.0);
    assert_eq!(result.variance_pct, 100.0);
    assert_eq!(result.severity, Severity::Critical);
    assert_eq!(result.spend_direction, SpendDirection::Overspending);
}

// ==========================================
// 自定义阈值
// ==========================================

#[test]
fn test_custom_thresholds_shift_tiers() {
    let mut config = EngineConfig::default();
    config.healthy_threshold_pct = 5.0;
    config.warning_threshold_pct = 15.0;
    let classifier = VarianceClassifier::new(&config).unwrap();

    assert_eq!(classifier.classify(10000.0, 10400.0).severity, Severity::Healthy);
    assert_eq!(classifier.classify(10000.0, 11000.0).severity, Severity::Warning);
    assert_eq!(classifier.classify(10000.0, 12000.0).severity, Severity::Critical);
}

#[test]
fn test_equal_thresholds_rejected() {
    let mut config = EngineConfig::default();
    config.healthy_threshold_pct = 20.0;
    config.warning_threshold_pct = 20.0;
    assert!(VarianceClassifier::new(&config).is_err());
}
