// ==========================================
// 广告投放节奏监控系统 - 演示主入口
// ==========================================
// 技术栈: Rust + Tokio
// 系统定位: 支出对账与自主决策引擎
// ==========================================
// 流程: 生成模拟活动 -> 逐平台批量决策 -> 输出汇总与审计文件
// ==========================================

use pacing_agent::audit::JsonlAuditSink;
use pacing_agent::domain::types::Platform;
use pacing_agent::engine::{DecisionEngine, RunSummary};
use pacing_agent::notify::TracingNotifier;
use pacing_agent::sources::scenario::{generate_fleet, SeededRng};
use pacing_agent::sources::{MockInternalTracker, MockPlatformSource};
use pacing_agent::EngineConfig;
use std::sync::Arc;

const AUDIT_PATH: &str = "pacing_audit.jsonl";
const CAMPAIGNS_PER_PLATFORM: usize = 10;
const DEMO_SEED: u64 = 20260830;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pacing_agent::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", pacing_agent::APP_NAME);
    tracing::info!("系统版本: {}", pacing_agent::VERSION);
    tracing::info!("==================================================");

    let config = EngineConfig::default();
    let audit = Arc::new(JsonlAuditSink::open(AUDIT_PATH)?);
    let notifier = Arc::new(TracingNotifier::new());

    // 随机源由调用方持有, 两个平台共享同一序列保证整体可复现
    let mut rng = SeededRng::new(DEMO_SEED);
    let mut all_alerts = Vec::new();

    for platform in [Platform::Google, Platform::Meta] {
        tracing::info!(platform = %platform, "生成模拟活动数据");
        let fleet = generate_fleet(platform, CAMPAIGNS_PER_PLATFORM, &mut rng);
        let campaign_ids: Vec<String> = fleet.iter().map(|c| c.campaign_id.clone()).collect();

        let tracker = Arc::new(MockInternalTracker::new(fleet.clone()));
        let platform_api = Arc::new(MockPlatformSource::new(fleet));

        let engine = DecisionEngine::new(
            config.clone(),
            tracker,
            platform_api,
            Some(notifier.clone()),
            audit.clone(),
        )?;

        let alerts = engine.run_batch(&campaign_ids).await;
        all_alerts.extend(alerts);
    }

    let summary = RunSummary::from_alerts(&all_alerts);
    println!("{}", summary);
    println!("审计事件已写入: {}", AUDIT_PATH);

    if summary.needs_attention() {
        tracing::warn!(
            campaigns = ?summary.requires_human_campaigns,
            "存在需人工介入的活动"
        );
    }

    Ok(())
}
