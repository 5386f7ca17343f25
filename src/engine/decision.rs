// ==========================================
// 广告投放节奏监控系统 - 决策引擎
// ==========================================
// 职责: 编排单个活动的完整决策工作流
// 流程: 拉取对账 -> 偏差分类 -> 置信度闸门 -> 严重度闸门
//       -> 执行动作 -> 根因/缓解 -> 产出 Alert
// 红线1: 置信度闸门无条件优先于严重度闸门
// 红线2: 数据源失败一律降级升级, 不抛出也不静默丢弃
// 红线3: 暂停动作每次运行至多调用一次, 失败按原样记录
// ==========================================

use crate::config::engine_config::EngineConfig;
use crate::domain::spend::{Alert, ReconciledPair, VarianceResult};
use crate::domain::types::{ActionTaken, Severity, SpendDirection};
use crate::engine::confidence::ConfidenceScorer;
use crate::engine::error::EngineError;
use crate::engine::root_cause;
use crate::engine::variance::VarianceClassifier;
use crate::sources::traits::{
    AuditSink, NotificationMessage, NotificationSink, PlatformSource, SourceError, TargetSource,
};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde_json::json;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

// ==========================================
// WorkflowState - 工作流状态
// ==========================================

/// 工作流状态 (显式标签联合, 每个状态对应一个纯转移函数)
///
/// 线性主干带两个分支点:
/// Fetching -> VarianceComputed -> ConfidenceGate
///   -> { Escalated | SeverityGate }
///   -> { LoggedHealthy | Warned | Halted }
///   -> PostAction -> Finalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkflowState {
    Fetching,
    VarianceComputed,
    ConfidenceGate,
    SeverityGate,
    Escalated,
    LoggedHealthy,
    Warned,
    Halted,
    PostAction,
    Finalized,
}

impl WorkflowState {
    fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Fetching => "fetching",
            WorkflowState::VarianceComputed => "variance_computed",
            WorkflowState::ConfidenceGate => "confidence_gate",
            WorkflowState::SeverityGate => "severity_gate",
            WorkflowState::Escalated => "escalated",
            WorkflowState::LoggedHealthy => "logged_healthy",
            WorkflowState::Warned => "warned",
            WorkflowState::Halted => "halted",
            WorkflowState::PostAction => "post_action",
            WorkflowState::Finalized => "finalized",
        }
    }
}

// ==========================================
// RunContext - 单次运行上下文
// ==========================================

/// 单次活动运行的上下文 (单一所有者, 顺序穿过各状态)
struct RunContext {
    campaign_id: String,
    pair: Option<ReconciledPair>,
    variance: Option<VarianceResult>,
    confidence_score: f64,
    action_taken: Option<ActionTaken>,
    recommendation: String,
    requires_human: bool,
    root_cause_analysis: Option<String>,
    mitigation_plan: Option<String>,
    fetch_error: Option<String>,
}

impl RunContext {
    fn new(campaign_id: &str) -> Self {
        Self {
            campaign_id: campaign_id.to_string(),
            pair: None,
            variance: None,
            confidence_score: 0.0,
            action_taken: None,
            recommendation: String::new(),
            requires_human: false,
            root_cause_analysis: None,
            mitigation_plan: None,
            fetch_error: None,
        }
    }

    fn severity(&self) -> Severity {
        self.variance
            .as_ref()
            .map(|v| v.severity)
            .unwrap_or(Severity::Critical)
    }

    fn variance_pct(&self) -> f64 {
        self.variance.as_ref().map(|v| v.variance_pct).unwrap_or(0.0)
    }

    fn variance_amount(&self) -> f64 {
        self.variance
            .as_ref()
            .map(|v| v.variance_amount)
            .unwrap_or(0.0)
    }
}

// ==========================================
// DecisionEngine - 决策引擎
// ==========================================

pub struct DecisionEngine {
    config: EngineConfig,
    scorer: ConfidenceScorer,
    classifier: VarianceClassifier,
    target_source: Arc<dyn TargetSource>,
    platform_source: Arc<dyn PlatformSource>,
    notifier: Option<Arc<dyn NotificationSink>>,
    audit: Arc<dyn AuditSink>,
}

impl DecisionEngine {
    /// 创建决策引擎, 配置非法时快速失败
    ///
    /// # 参数
    /// - `config`: 引擎配置 (权重/阈值/并发/超时)
    /// - `target_source`: 目标支出来源 (内部跟踪系统)
    /// - `platform_source`: 实际支出来源 (平台 API)
    /// - `notifier`: 可选通知渠道
    /// - `audit`: 审计记录
    pub fn new(
        config: EngineConfig,
        target_source: Arc<dyn TargetSource>,
        platform_source: Arc<dyn PlatformSource>,
        notifier: Option<Arc<dyn NotificationSink>>,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let scorer = ConfidenceScorer::new(&config)?;
        let classifier = VarianceClassifier::new(&config)?;
        Ok(Self {
            config,
            scorer,
            classifier,
            target_source,
            platform_source,
            notifier,
            audit,
        })
    }

    // ==========================================
    // 公共接口
    // ==========================================

    /// 执行单个活动的完整决策工作流
    ///
    /// 单活动问题永不抛出: 返回的 Alert 通过 requires_human 与
    /// action_taken 显式传达降级情况。
    pub async fn run(&self, campaign_id: &str) -> Alert {
        info!(campaign_id = %campaign_id, "开始活动节奏决策");

        let mut ctx = RunContext::new(campaign_id);
        let mut state = WorkflowState::Fetching;

        while state != WorkflowState::Finalized {
            debug!(campaign_id = %campaign_id, state = state.as_str(), "工作流状态转移");
            state = self.advance(state, &mut ctx).await;
        }

        self.finalize(ctx).await
    }

    /// 批量执行, 每个活动独立, 有界并发
    ///
    /// 单个活动的失败/降级不影响其他活动; 返回顺序与输入一致。
    pub async fn run_batch(&self, campaign_ids: &[String]) -> Vec<Alert> {
        info!(
            campaign_count = campaign_ids.len(),
            max_concurrency = self.config.max_concurrency,
            "开始批量节奏决策"
        );

        stream::iter(campaign_ids)
            .map(|id| self.run(id))
            .buffered(self.config.max_concurrency)
            .collect()
            .await
    }

    // ==========================================
    // 状态转移函数
    // ==========================================

    /// 单步状态转移 (Finalized 之前每个状态恰好推进一次)
    async fn advance(&self, state: WorkflowState, ctx: &mut RunContext) -> WorkflowState {
        match state {
            WorkflowState::Fetching => self.fetch_and_reconcile(ctx).await,
            WorkflowState::VarianceComputed => self.compute_variance(ctx),
            WorkflowState::ConfidenceGate => self.confidence_gate(ctx),
            WorkflowState::SeverityGate => self.severity_gate(ctx),
            WorkflowState::Escalated => self.escalate_to_human(ctx).await,
            WorkflowState::LoggedHealthy => self.log_healthy(ctx).await,
            WorkflowState::Warned => self.send_warning_alert(ctx).await,
            WorkflowState::Halted => self.autonomous_halt(ctx).await,
            WorkflowState::PostAction => self.post_action(ctx),
            WorkflowState::Finalized => WorkflowState::Finalized,
        }
    }

    // ==========================================
    // 步骤1: 拉取与对账
    // ==========================================

    async fn fetch_and_reconcile(&self, ctx: &mut RunContext) -> WorkflowState {
        match self.fetch_pair(&ctx.campaign_id).await {
            Ok((target, actual)) => {
                let breakdown = self.scorer.score(
                    &target.campaign_name,
                    &actual.campaign_name,
                    &target.metadata,
                    &actual.metadata,
                    actual.timestamp,
                );
                let pair = ReconciledPair::new(&target, &actual, &breakdown);

                self.audit_event(json!({
                    "event_type": "reconciliation",
                    "campaign_id": pair.campaign_id,
                    "target_spend": pair.target_spend,
                    "actual_spend": pair.actual_spend,
                    "variance_pct": pair.pacing_variance(),
                    "confidence_score": pair.confidence_score,
                    "metadata_match_score": pair.metadata_match_score,
                    "name_similarity_score": pair.name_similarity_score,
                    "freshness_score": pair.freshness_score,
                    "timestamp": Utc::now().to_rfc3339(),
                }))
                .await;

                ctx.confidence_score = pair.confidence_score;
                ctx.pair = Some(pair);
            }
            Err(err) => {
                // 唯一的错误恢复规则: 数据源失败降级为置信度 0 并升级人工
                warn!(
                    campaign_id = %ctx.campaign_id,
                    error = %err,
                    "数据源获取失败, 降级为升级路径"
                );
                self.audit_event(json!({
                    "event_type": "error",
                    "error_type": "reconciliation_error",
                    "error_message": err.to_string(),
                    "campaign_id": ctx.campaign_id,
                    "timestamp": Utc::now().to_rfc3339(),
                }))
                .await;

                ctx.confidence_score = 0.0;
                ctx.requires_human = true;
                ctx.fetch_error = Some(err.to_string());
            }
        }

        WorkflowState::VarianceComputed
    }

    /// 拉取目标与实际观测值, 均带超时
    async fn fetch_pair(
        &self,
        campaign_id: &str,
    ) -> Result<
        (
            crate::domain::spend::SpendObservation,
            crate::domain::spend::SpendObservation,
        ),
        SourceError,
    > {
        let limit = self.config.collaborator_timeout();

        let target = timeout(limit, self.target_source.fetch_target(campaign_id))
            .await
            .map_err(|_| SourceError::Timeout(format!("fetch_target: {}", campaign_id)))??;
        let actual = timeout(limit, self.platform_source.fetch_actual(campaign_id))
            .await
            .map_err(|_| SourceError::Timeout(format!("fetch_actual: {}", campaign_id)))??;

        Ok((target, actual))
    }

    // ==========================================
    // 步骤2: 偏差分类
    // ==========================================

    fn compute_variance(&self, ctx: &mut RunContext) -> WorkflowState {
        let result = match &ctx.pair {
            Some(pair) => self.classifier.classify(pair.target_spend, pair.actual_spend),
            // 降级运行: 无对账对, 占位结果只为完成记录
            None => VarianceResult {
                variance_pct: 0.0,
                variance_amount: 0.0,
                severity: Severity::Critical,
                is_zero_delivery: false,
                spend_direction: SpendDirection::OnTarget,
                reason: "数据源获取失败, 无法完成对账".to_string(),
            },
        };

        debug!(
            campaign_id = %ctx.campaign_id,
            variance_pct = result.variance_pct,
            severity = %result.severity,
            "偏差分类完成"
        );
        ctx.variance = Some(result);
        WorkflowState::ConfidenceGate
    }

    // ==========================================
    // 步骤3: 置信度闸门 (第一分支点)
    // ==========================================

    /// 置信度不足一律升级, 该检查无条件优先于严重度路由
    fn confidence_gate(&self, ctx: &RunContext) -> WorkflowState {
        if ctx.pair.is_none() || ctx.confidence_score < self.config.confidence_threshold {
            return WorkflowState::Escalated;
        }
        WorkflowState::SeverityGate
    }

    // ==========================================
    // 步骤4: 严重度闸门 (第二分支点, 仅置信度达标时)
    // ==========================================

    fn severity_gate(&self, ctx: &RunContext) -> WorkflowState {
        match ctx.severity() {
            Severity::Healthy => WorkflowState::LoggedHealthy,
            Severity::Warning => WorkflowState::Warned,
            Severity::Critical => WorkflowState::Halted,
        }
    }

    // ==========================================
    // 动作: 升级人工 (终态, 不经过根因/缓解)
    // ==========================================

    async fn escalate_to_human(&self, ctx: &mut RunContext) -> WorkflowState {
        ctx.requires_human = true;
        ctx.action_taken = Some(ActionTaken::EscalatedToHuman);

        ctx.recommendation = match &ctx.pair {
            Some(pair) => {
                let breakdown = crate::domain::spend::ConfidenceBreakdown {
                    metadata_match_score: pair.metadata_match_score,
                    name_similarity_score: pair.name_similarity_score,
                    freshness_score: pair.freshness_score,
                    confidence_score: pair.confidence_score,
                };
                let diagnosis = self
                    .scorer
                    .diagnose(&breakdown, self.config.confidence_threshold);
                format!(
                    "数据质量置信度不足, 无法执行自主动作 ({:.1}%)。\n\n{}\n\n需要人工复核活动 {}。",
                    ctx.confidence_score * 100.0,
                    diagnosis,
                    ctx.campaign_id
                )
            }
            None => format!(
                "对账过程出错: {}。需要人工复核活动 {}。",
                ctx.fetch_error.as_deref().unwrap_or("未知错误"),
                ctx.campaign_id
            ),
        };

        // 有对账对时才有足够上下文发通知
        if ctx.pair.is_some() {
            self.notify(ctx).await;
        }

        self.audit_event(json!({
            "event_type": "agent_decision",
            "campaign_id": ctx.campaign_id,
            "variance_pct": ctx.variance_pct(),
            "confidence_score": ctx.confidence_score,
            "severity": "escalated",
            "decision": "escalate_to_human",
            "reasoning": format!(
                "置信度 ({:.1}%) 低于阈值 ({:.1}%)",
                ctx.confidence_score * 100.0,
                self.config.confidence_threshold * 100.0
            ),
            "timestamp": Utc::now().to_rfc3339(),
        }))
        .await;

        WorkflowState::Finalized
    }

    // ==========================================
    // 动作: 健康静默记录 (终态, 无通知)
    // ==========================================

    async fn log_healthy(&self, ctx: &mut RunContext) -> WorkflowState {
        ctx.action_taken = Some(ActionTaken::LoggedHealthy);
        if let (Some(pair), Some(variance)) = (&ctx.pair, &ctx.variance) {
            ctx.recommendation = self.classifier.recommendation(variance, pair);
        }

        self.audit_event(json!({
            "event_type": "healthy_pacing",
            "campaign_id": ctx.campaign_id,
            "variance_pct": ctx.variance_pct(),
            "confidence_score": ctx.confidence_score,
            "timestamp": Utc::now().to_rfc3339(),
        }))
        .await;

        WorkflowState::Finalized
    }

    // ==========================================
    // 动作: 预警通知
    // ==========================================

    async fn send_warning_alert(&self, ctx: &mut RunContext) -> WorkflowState {
        ctx.action_taken = Some(ActionTaken::WarningAlertSent);
        if let (Some(pair), Some(variance)) = (&ctx.pair, &ctx.variance) {
            ctx.recommendation = self.classifier.recommendation(variance, pair);
        }

        self.notify(ctx).await;

        self.audit_event(json!({
            "event_type": "agent_decision",
            "campaign_id": ctx.campaign_id,
            "variance_pct": ctx.variance_pct(),
            "confidence_score": ctx.confidence_score,
            "severity": ctx.severity().as_str(),
            "decision": "send_alert",
            "reasoning": format!("偏差 {:.1}% 超过健康阈值", ctx.variance_pct()),
            "timestamp": Utc::now().to_rfc3339(),
        }))
        .await;

        WorkflowState::PostAction
    }

    // ==========================================
    // 动作: 自主暂停 (暂停失败不改变路由)
    // ==========================================

    async fn autonomous_halt(&self, ctx: &mut RunContext) -> WorkflowState {
        // 平台不保证暂停幂等, 每次运行至多调用一次, 超时视为失败不重试
        let limit = self.config.collaborator_timeout();
        let pause_success = match timeout(
            limit,
            self.platform_source.pause_campaign(&ctx.campaign_id),
        )
        .await
        {
            Ok(success) => success,
            Err(_) => {
                warn!(campaign_id = %ctx.campaign_id, "暂停调用超时, 按失败记录");
                false
            }
        };

        ctx.action_taken = Some(if pause_success {
            ActionTaken::AutonomousHaltExecuted
        } else {
            ActionTaken::AutonomousHaltFailed
        });
        if let (Some(pair), Some(variance)) = (&ctx.pair, &ctx.variance) {
            ctx.recommendation = self.classifier.recommendation(variance, pair);
        }

        if !pause_success {
            warn!(campaign_id = %ctx.campaign_id, "自主暂停失败, 按原样记录并继续");
        }

        self.audit_event(json!({
            "event_type": "agent_action",
            "campaign_id": ctx.campaign_id,
            "action_type": "pause_campaign",
            "success": pause_success,
            "details": {
                "variance_pct": ctx.variance_pct(),
                "variance_amount": ctx.variance_amount(),
                "confidence_score": ctx.confidence_score,
            },
            "timestamp": Utc::now().to_rfc3339(),
        }))
        .await;

        // 紧急通知 (无论暂停成败)
        self.notify(ctx).await;

        self.audit_event(json!({
            "event_type": "agent_decision",
            "campaign_id": ctx.campaign_id,
            "variance_pct": ctx.variance_pct(),
            "confidence_score": ctx.confidence_score,
            "severity": ctx.severity().as_str(),
            "decision": "autonomous_halt",
            "reasoning": format!(
                "偏差 {:.1}% 超过临界阈值或检测到零投放",
                ctx.variance_pct()
            ),
            "timestamp": Utc::now().to_rfc3339(),
        }))
        .await;

        WorkflowState::PostAction
    }

    // ==========================================
    // 步骤5/6: 根因分析与缓解计划 (仅预警/临界路径)
    // ==========================================

    fn post_action(&self, ctx: &mut RunContext) -> WorkflowState {
        if let (Some(pair), Some(variance)) = (&ctx.pair, &ctx.variance) {
            ctx.root_cause_analysis = Some(root_cause::analyze_root_cause(pair, variance));
            ctx.mitigation_plan = Some(root_cause::generate_mitigation(pair, variance));
        }
        WorkflowState::Finalized
    }

    // ==========================================
    // 步骤7: 产出 Alert
    // ==========================================

    async fn finalize(&self, ctx: RunContext) -> Alert {
        let mut metadata = serde_json::Map::new();
        match &ctx.pair {
            Some(pair) => {
                metadata.insert("campaign_name".to_string(), json!(pair.campaign_name));
                metadata.insert("platform".to_string(), json!(pair.platform.as_str()));
                metadata.insert("target_spend".to_string(), json!(pair.target_spend));
                metadata.insert("actual_spend".to_string(), json!(pair.actual_spend));
                metadata.insert(
                    "variance_amount".to_string(),
                    json!(pair.variance_amount()),
                );
            }
            None => {
                metadata.insert(
                    "fetch_error".to_string(),
                    json!(ctx.fetch_error.as_deref().unwrap_or("未知错误")),
                );
            }
        }

        let alert = Alert {
            alert_id: format!("alert_{}", Uuid::new_v4()),
            campaign_id: ctx.campaign_id.clone(),
            severity: ctx.severity(),
            variance_pct: ctx.variance_pct(),
            confidence_score: ctx.confidence_score,
            // 不变式: Finalized 之前必经某个动作状态
            action_taken: ctx.action_taken.unwrap_or(ActionTaken::EscalatedToHuman),
            recommendation: ctx.recommendation,
            requires_human: ctx.requires_human,
            root_cause_analysis: ctx.root_cause_analysis,
            mitigation_plan: ctx.mitigation_plan,
            timestamp: Utc::now(),
            metadata,
        };

        match serde_json::to_value(&alert) {
            Ok(mut event) => {
                if let Some(obj) = event.as_object_mut() {
                    obj.insert("event_type".to_string(), json!("pacing_alert"));
                }
                self.audit_event(event).await;
            }
            Err(e) => warn!(campaign_id = %alert.campaign_id, error = %e, "Alert 序列化失败"),
        }

        info!(
            campaign_id = %alert.campaign_id,
            severity = %alert.severity,
            variance_pct = alert.variance_pct,
            action = %alert.action_taken,
            requires_human = alert.requires_human,
            "活动节奏决策完成"
        );

        alert
    }

    // ==========================================
    // 协作者边界 (尽力而为)
    // ==========================================

    /// 发送通知, 失败/超时仅记日志
    async fn notify(&self, ctx: &RunContext) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        let Some(pair) = &ctx.pair else {
            return;
        };

        let message = NotificationMessage {
            campaign_id: ctx.campaign_id.clone(),
            campaign_name: pair.campaign_name.clone(),
            platform: Some(pair.platform),
            severity: ctx.severity(),
            variance_pct: ctx.variance_pct(),
            variance_amount: ctx.variance_amount(),
            confidence_score: ctx.confidence_score,
            action_taken: ctx.action_taken.unwrap_or(ActionTaken::EscalatedToHuman),
            recommendation: ctx.recommendation.clone(),
            root_cause: ctx.root_cause_analysis.clone(),
            mitigation: ctx.mitigation_plan.clone(),
        };

        match timeout(self.config.collaborator_timeout(), notifier.send(&message)).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(campaign_id = %ctx.campaign_id, "通知发送失败, 不影响本次运行")
            }
            Err(_) => warn!(campaign_id = %ctx.campaign_id, "通知发送超时, 不影响本次运行"),
        }
    }

    /// 写入审计事件, 失败/超时仅记日志
    async fn audit_event(&self, event: serde_json::Value) {
        match timeout(self.config.collaborator_timeout(), self.audit.record(event)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "审计写入失败, 不影响本次运行"),
            Err(_) => warn!("审计写入超时, 不影响本次运行"),
        }
    }
}
