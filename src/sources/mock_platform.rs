// ==========================================
// 广告投放节奏监控系统 - 模拟平台 API
// ==========================================
// 职责: 提供实际支出观测值与暂停能力 (PlatformSource 的演示/测试实现)
// ==========================================

use crate::domain::spend::SpendObservation;
use crate::domain::types::SourceKind;
use crate::sources::scenario::MockCampaign;
use crate::sources::traits::{PlatformSource, SourceError};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// 模拟平台 API (4 小时刷新周期, 带滞后时间戳)
pub struct MockPlatformSource {
    campaigns: HashMap<String, MockCampaign>,
    fail_campaigns: HashSet<String>,
    pause_result: bool,
    pause_calls: Mutex<Vec<String>>,
}

impl MockPlatformSource {
    pub fn new(fleet: Vec<MockCampaign>) -> Self {
        Self {
            campaigns: fleet
                .into_iter()
                .map(|c| (c.campaign_id.clone(), c))
                .collect(),
            fail_campaigns: HashSet::new(),
            pause_result: true,
            pause_calls: Mutex::new(Vec::new()),
        }
    }

    /// 指定活动的拉取以不可用失败 (测试降级路径)
    pub fn fail_campaign(&mut self, campaign_id: &str) {
        self.fail_campaigns.insert(campaign_id.to_string());
    }

    /// 设置暂停调用的返回值 (测试暂停失败路径)
    pub fn set_pause_result(&mut self, success: bool) {
        self.pause_result = success;
    }

    /// 直接改写底稿 (测试构造名称/元数据分歧)
    pub fn campaign_mut(&mut self, campaign_id: &str) -> Option<&mut MockCampaign> {
        self.campaigns.get_mut(campaign_id)
    }

    /// 已发生的暂停调用 (按调用顺序)
    pub fn pause_calls(&self) -> Vec<String> {
        self.pause_calls.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PlatformSource for MockPlatformSource {
    async fn fetch_actual(&self, campaign_id: &str) -> Result<SpendObservation, SourceError> {
        if self.fail_campaigns.contains(campaign_id) {
            return Err(SourceError::Unavailable(format!(
                "平台 API 暂时不可用: {}",
                campaign_id
            )));
        }
        let campaign = self
            .campaigns
            .get(campaign_id)
            .ok_or_else(|| SourceError::NotFound(campaign_id.to_string()))?;

        let lag_minutes = (campaign.actual_age_hours * 60.0) as i64;
        Ok(SpendObservation {
            campaign_id: campaign.campaign_id.clone(),
            campaign_name: campaign.campaign_name.clone(),
            platform: campaign.platform,
            source: SourceKind::PlatformApi,
            amount_usd: campaign.actual_spend,
            timestamp: Utc::now() - Duration::minutes(lag_minutes),
            refresh_cycle_hours: 4,
            metadata: campaign.metadata.clone(),
        })
    }

    async fn pause_campaign(&self, campaign_id: &str) -> bool {
        if let Ok(mut calls) = self.pause_calls.lock() {
            calls.push(campaign_id.to_string());
        }
        self.pause_result
    }
}
