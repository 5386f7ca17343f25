// ==========================================
// 广告投放节奏监控系统 - 内存审计存储
// ==========================================
// 职责: 测试/演示用的进程内审计实现
// ==========================================

use crate::sources::traits::AuditSink;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

/// 内存审计存储 (按写入顺序保留事件)
#[derive(Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<Value>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已记录事件的快照
    pub fn events(&self) -> Vec<Value> {
        self.events.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// 按 event_type 过滤的快照
    pub fn events_of_type(&self, event_type: &str) -> Vec<Value> {
        self.events()
            .into_iter()
            .filter(|e| e["event_type"] == event_type)
            .collect()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, event: Value) -> anyhow::Result<()> {
        self.events
            .lock()
            .map_err(|_| anyhow::anyhow!("审计缓冲锁中毒"))?
            .push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_sink_preserves_order_and_filters() {
        let sink = MemoryAuditSink::new();
        sink.record(json!({"event_type": "reconciliation", "n": 1}))
            .await
            .unwrap();
        sink.record(json!({"event_type": "pacing_alert", "n": 2}))
            .await
            .unwrap();
        sink.record(json!({"event_type": "reconciliation", "n": 3}))
            .await
            .unwrap();

        assert_eq!(sink.events().len(), 3);
        let recs = sink.events_of_type("reconciliation");
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0]["n"], 1);
        assert_eq!(recs[1]["n"], 3);
    }
}
