// ==========================================
// 广告投放节奏监控系统 - 模拟内部跟踪系统
// ==========================================
// 职责: 提供目标支出观测值 (TargetSource 的演示/测试实现)
// ==========================================

use crate::domain::spend::SpendObservation;
use crate::domain::types::SourceKind;
use crate::sources::scenario::MockCampaign;
use crate::sources::traits::{SourceError, TargetSource};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};

/// 模拟内部跟踪系统 (媒体计划侧的目标支出)
///
/// 跟踪系统按日刷新, 观测时间戳视为刚刷新。
pub struct MockInternalTracker {
    campaigns: HashMap<String, MockCampaign>,
    fail_campaigns: HashSet<String>,
}

impl MockInternalTracker {
    pub fn new(fleet: Vec<MockCampaign>) -> Self {
        Self {
            campaigns: fleet
                .into_iter()
                .map(|c| (c.campaign_id.clone(), c))
                .collect(),
            fail_campaigns: HashSet::new(),
        }
    }

    /// 指定活动的拉取以不可用失败 (测试降级路径)
    pub fn fail_campaign(&mut self, campaign_id: &str) {
        self.fail_campaigns.insert(campaign_id.to_string());
    }

    /// 直接改写底稿 (测试构造名称/元数据分歧)
    pub fn campaign_mut(&mut self, campaign_id: &str) -> Option<&mut MockCampaign> {
        self.campaigns.get_mut(campaign_id)
    }
}

#[async_trait]
impl TargetSource for MockInternalTracker {
    async fn fetch_target(&self, campaign_id: &str) -> Result<SpendObservation, SourceError> {
        if self.fail_campaigns.contains(campaign_id) {
            return Err(SourceError::Unavailable(format!(
                "内部跟踪系统暂时不可用: {}",
                campaign_id
            )));
        }
        let campaign = self
            .campaigns
            .get(campaign_id)
            .ok_or_else(|| SourceError::NotFound(campaign_id.to_string()))?;

        Ok(SpendObservation {
            campaign_id: campaign.campaign_id.clone(),
            campaign_name: campaign.campaign_name.clone(),
            platform: campaign.platform,
            source: SourceKind::InternalTracker,
            amount_usd: campaign.target_spend,
            timestamp: Utc::now(),
            refresh_cycle_hours: 24,
            metadata: campaign.metadata.clone(),
        })
    }
}
