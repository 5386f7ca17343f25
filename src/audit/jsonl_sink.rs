// ==========================================
// 广告投放节奏监控系统 - JSONL 审计存储
// ==========================================
// 职责: 按行追加审计事件, 每行一条完整 JSON
// 红线: 单条记录以整行写入, 并发写不交错
// ==========================================

use crate::sources::traits::AuditSink;
use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// JSONL 审计存储 (追加写, 进程内互斥保证行原子性)
pub struct JsonlAuditSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlAuditSink {
    /// 打开或创建审计文件 (父目录须已存在)
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("打开审计文件失败: {}", path.display()))?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读回全部事件 (演示/测试用)
    pub fn read_events(&self) -> anyhow::Result<Vec<Value>> {
        let file = File::open(&self.path)
            .with_context(|| format!("读取审计文件失败: {}", self.path.display()))?;
        let mut events = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            events.push(
                serde_json::from_str(&line)
                    .with_context(|| format!("审计行不是合法 JSON: {}", line))?,
            );
        }
        Ok(events)
    }
}

#[async_trait]
impl AuditSink for JsonlAuditSink {
    async fn record(&self, mut event: Value) -> anyhow::Result<()> {
        if let Some(obj) = event.as_object_mut() {
            obj.entry("timestamp")
                .or_insert_with(|| json!(Utc::now().to_rfc3339()));
        }
        let line = serde_json::to_string(&event).context("审计事件序列化失败")?;

        let mut file = self
            .file
            .lock()
            .map_err(|_| anyhow::anyhow!("审计文件锁中毒"))?;
        writeln!(file, "{}", line)
            .with_context(|| format!("审计写入失败: {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_appends_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlAuditSink::open(dir.path().join("audit.jsonl")).unwrap();

        sink.record(json!({"event_type": "reconciliation", "campaign_id": "google_cmp_001"}))
            .await
            .unwrap();
        sink.record(json!({"event_type": "agent_decision", "campaign_id": "google_cmp_001"}))
            .await
            .unwrap();

        let events = sink.read_events().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["event_type"], "reconciliation");
        assert_eq!(events[1]["event_type"], "agent_decision");
    }

    #[tokio::test]
    async fn test_record_fills_missing_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlAuditSink::open(dir.path().join("audit.jsonl")).unwrap();

        sink.record(json!({"event_type": "healthy_pacing"}))
            .await
            .unwrap();
        sink.record(json!({"event_type": "error", "timestamp": "2026-01-01T00:00:00Z"}))
            .await
            .unwrap();

        let events = sink.read_events().unwrap();
        assert!(events[0]["timestamp"].is_string());
        assert_eq!(events[1]["timestamp"], "2026-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn test_reopen_appends_instead_of_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        let sink = JsonlAuditSink::open(&path).unwrap();
        sink.record(json!({"event_type": "first"})).await.unwrap();
        drop(sink);

        let sink = JsonlAuditSink::open(&path).unwrap();
        sink.record(json!({"event_type": "second"})).await.unwrap();

        let events = sink.read_events().unwrap();
        assert_eq!(events.len(), 2);
    }
}
