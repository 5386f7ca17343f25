// ==========================================
// 广告投放节奏监控系统 - 批量运行汇总
// ==========================================
// 职责: 对一批 Alert 做分级/动作统计并生成文本报告
// ==========================================

use crate::domain::spend::Alert;
use crate::domain::types::{ActionTaken, Severity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 批量运行汇总统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_campaigns: usize,
    pub healthy_count: usize,
    pub warning_count: usize,
    pub critical_count: usize,
    pub autonomous_action_count: usize,
    pub halt_failed_count: usize,
    pub escalated_count: usize,
    /// 需人工介入的活动 ID 列表 (保持批次顺序)
    pub requires_human_campaigns: Vec<String>,
}

impl RunSummary {
    /// 从一批 Alert 构建汇总
    pub fn from_alerts(alerts: &[Alert]) -> Self {
        let mut summary = Self {
            total_campaigns: alerts.len(),
            healthy_count: 0,
            warning_count: 0,
            critical_count: 0,
            autonomous_action_count: 0,
            halt_failed_count: 0,
            escalated_count: 0,
            requires_human_campaigns: Vec::new(),
        };

        for alert in alerts {
            match alert.severity {
                Severity::Healthy => summary.healthy_count += 1,
                Severity::Warning => summary.warning_count += 1,
                Severity::Critical => summary.critical_count += 1,
            }
            match alert.action_taken {
                ActionTaken::AutonomousHaltExecuted => summary.autonomous_action_count += 1,
                ActionTaken::AutonomousHaltFailed => summary.halt_failed_count += 1,
                ActionTaken::EscalatedToHuman => summary.escalated_count += 1,
                ActionTaken::LoggedHealthy | ActionTaken::WarningAlertSent => {}
            }
            if alert.requires_human {
                summary
                    .requires_human_campaigns
                    .push(alert.campaign_id.clone());
            }
        }

        summary
    }

    /// 是否存在需要人工介入的活动
    pub fn needs_attention(&self) -> bool {
        !self.requires_human_campaigns.is_empty()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "========== 节奏监控批量汇总 ==========")?;
        writeln!(f, "活动总数:     {}", self.total_campaigns)?;
        writeln!(f, "健康:         {}", self.healthy_count)?;
        writeln!(f, "预警:         {}", self.warning_count)?;
        writeln!(f, "临界:         {}", self.critical_count)?;
        writeln!(f, "自主暂停成功: {}", self.autonomous_action_count)?;
        writeln!(f, "自主暂停失败: {}", self.halt_failed_count)?;
        writeln!(f, "升级人工:     {}", self.escalated_count)?;
        if self.requires_human_campaigns.is_empty() {
            writeln!(f, "需人工介入:   无")?;
        } else {
            writeln!(
                f,
                "需人工介入:   {}",
                self.requires_human_campaigns.join(", ")
            )?;
        }
        write!(f, "======================================")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn alert(severity: Severity, action: ActionTaken, requires_human: bool) -> Alert {
        Alert {
            alert_id: "alert_test".to_string(),
            campaign_id: "google_cmp_001".to_string(),
            severity,
            variance_pct: 0.0,
            confidence_score: 0.9,
            action_taken: action,
            recommendation: String::new(),
            requires_human,
            root_cause_analysis: None,
            mitigation_plan: None,
            timestamp: Utc::now(),
            metadata: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_summary_counts() {
        let alerts = vec![
            alert(Severity::Healthy, ActionTaken::LoggedHealthy, false),
            alert(Severity::Warning, ActionTaken::WarningAlertSent, false),
            alert(
                Severity::Critical,
                ActionTaken::AutonomousHaltExecuted,
                false,
            ),
            alert(Severity::Critical, ActionTaken::AutonomousHaltFailed, false),
            alert(Severity::Critical, ActionTaken::EscalatedToHuman, true),
        ];
        let summary = RunSummary::from_alerts(&alerts);
        assert_eq!(summary.total_campaigns, 5);
        assert_eq!(summary.healthy_count, 1);
        assert_eq!(summary.warning_count, 1);
        assert_eq!(summary.critical_count, 3);
        assert_eq!(summary.autonomous_action_count, 1);
        assert_eq!(summary.halt_failed_count, 1);
        assert_eq!(summary.escalated_count, 1);
        assert!(summary.needs_attention());
        assert_eq!(summary.requires_human_campaigns.len(), 1);
    }

    #[test]
    fn test_summary_empty_batch() {
        let summary = RunSummary::from_alerts(&[]);
        assert_eq!(summary.total_campaigns, 0);
        assert!(!summary.needs_attention());
    }

    #[test]
    fn test_summary_display_contains_counts() {
        let alerts = vec![alert(Severity::Healthy, ActionTaken::LoggedHealthy, false)];
        let text = RunSummary::from_alerts(&alerts).to_string();
        assert!(text.contains("活动总数"));
        assert!(text.contains("需人工介入:   无"));
    }
}
