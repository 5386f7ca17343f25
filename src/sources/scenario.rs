// ==========================================
// 广告投放节奏监控系统 - 模拟场景生成
// ==========================================
// 职责: 为演示与测试生成可复现的模拟活动数据
// 红线: 随机源由调用方持有并显式传入, 不污染全局状态
// ==========================================

use crate::domain::types::Platform;
use chrono::{Duration, Utc};
use std::collections::HashMap;

// ==========================================
// SeededRng - 可复现随机源 (SplitMix64)
// ==========================================

/// 调用方持有的确定性随机源
///
/// 同一种子产生同一序列; 两个实例互不影响。
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// [0, 1) 均匀分布
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// [lo, hi) 均匀分布
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// 等概率选取一个元素 (切片不可为空)
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

// ==========================================
// SpendScenario - 支出偏差场景
// ==========================================

/// 模拟活动的支出偏差场景
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendScenario {
    Healthy,
    WarningUnder,
    WarningOver,
    CriticalUnder,
    CriticalOver,
    ZeroDelivery,
}

impl SpendScenario {
    /// 该场景下 实际/目标 比值的候选集
    pub fn variance_factors(&self) -> &'static [f64] {
        match self {
            // -8% 到 +8%
            SpendScenario::Healthy => &[0.92, 0.95, 0.97, 1.00, 1.03, 1.05, 1.08],
            // -25% 到 -18%
            SpendScenario::WarningUnder => &[0.75, 0.78, 0.82],
            // +18% 到 +25%
            SpendScenario::WarningOver => &[1.18, 1.22, 1.25],
            // -50% 到 -30%
            SpendScenario::CriticalUnder => &[0.50, 0.60, 0.70],
            // +35% 到 +80%
            SpendScenario::CriticalOver => &[1.35, 1.45, 1.60, 1.80],
            SpendScenario::ZeroDelivery => &[0.0],
        }
    }

    /// 抽样分布: 40% 健康 / 40% 预警 / 20% 临界+零投放
    pub fn distribution() -> &'static [SpendScenario] {
        &[
            SpendScenario::Healthy,
            SpendScenario::Healthy,
            SpendScenario::Healthy,
            SpendScenario::Healthy,
            SpendScenario::WarningUnder,
            SpendScenario::WarningOver,
            SpendScenario::WarningUnder,
            SpendScenario::WarningOver,
            SpendScenario::CriticalUnder,
            SpendScenario::CriticalOver,
            SpendScenario::ZeroDelivery,
        ]
    }
}

// ==========================================
// MockCampaign - 模拟活动
// ==========================================

/// 模拟活动数据 (跟踪系统与平台两侧的共享底稿)
#[derive(Debug, Clone)]
pub struct MockCampaign {
    pub campaign_id: String,
    pub campaign_name: String,
    pub platform: Platform,
    pub target_spend: f64,
    pub actual_spend: f64,
    pub scenario: SpendScenario,
    /// 平台侧数据的滞后小时数 (跟踪系统侧视为刚刷新)
    pub actual_age_hours: f64,
    pub metadata: HashMap<String, String>,
}

const MARKETS: [&str; 3] = ["EU", "NA", "APAC"];
const PRODUCTS: [&str; 5] = [
    "LEGO_City",
    "LEGO_Friends",
    "LEGO_Technic",
    "LEGO_StarWars",
    "LEGO_Harry_Potter",
];
const QUARTERS: [&str; 4] = ["Q1", "Q2", "Q3", "Q4"];

/// 生成一组模拟活动, 偏差场景按固定分布抽样
pub fn generate_fleet(platform: Platform, count: usize, rng: &mut SeededRng) -> Vec<MockCampaign> {
    let mut fleet = Vec::with_capacity(count);

    for i in 0..count {
        let scenario = *rng.pick(SpendScenario::distribution());
        let factor = *rng.pick(scenario.variance_factors());
        let target = rng.uniform(1000.0, 15000.0);

        let market = *rng.pick(&MARKETS);
        let product = *rng.pick(&PRODUCTS);
        let quarter = *rng.pick(&QUARTERS);

        let start = Utc::now() - Duration::days(7 + (rng.next_u64() % 24) as i64);
        let end = start + Duration::days(14 + (rng.next_u64() % 47) as i64);

        let mut metadata = HashMap::new();
        metadata.insert("market".to_string(), market.to_string());
        metadata.insert("product".to_string(), product.to_string());
        metadata.insert(
            "start_date".to_string(),
            start.format("%Y-%m-%d").to_string(),
        );
        metadata.insert("end_date".to_string(), end.format("%Y-%m-%d").to_string());

        fleet.push(MockCampaign {
            campaign_id: format!("{}_cmp_{:03}", platform.as_str(), i),
            campaign_name: format!("{}_{}_{}_{}", product, market, quarter, i),
            platform,
            target_spend: target,
            actual_spend: target * factor,
            scenario,
            // 模拟平台 4 小时刷新周期下的正常滞后
            actual_age_hours: rng.uniform(1.0, 8.0),
            metadata,
        });
    }

    fleet
}
