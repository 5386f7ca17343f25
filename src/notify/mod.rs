// ==========================================
// 广告投放节奏监控系统 - 通知层
// ==========================================
// 职责: 将引擎通知渲染到结构化日志 (真实渠道实现不在核心范围内)
// ==========================================

use crate::domain::types::Severity;
use crate::sources::traits::{NotificationMessage, NotificationSink};
use async_trait::async_trait;
use tracing::{info, warn};

/// 日志通知渠道 (按严重度选择日志级别)
#[derive(Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSink for TracingNotifier {
    async fn send(&self, message: &NotificationMessage) -> bool {
        match message.severity {
            Severity::Critical => warn!(
                campaign_id = %message.campaign_id,
                campaign_name = %message.campaign_name,
                severity = %message.severity,
                variance_pct = message.variance_pct,
                variance_amount = message.variance_amount,
                confidence_score = message.confidence_score,
                action = %message.action_taken,
                "临界节奏告警"
            ),
            Severity::Warning => warn!(
                campaign_id = %message.campaign_id,
                campaign_name = %message.campaign_name,
                severity = %message.severity,
                variance_pct = message.variance_pct,
                confidence_score = message.confidence_score,
                action = %message.action_taken,
                "预警节奏告警"
            ),
            Severity::Healthy => info!(
                campaign_id = %message.campaign_id,
                severity = %message.severity,
                "节奏通知"
            ),
        }
        true
    }
}
