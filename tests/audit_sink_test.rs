// ==========================================
// JsonlAuditSink 审计存储集成测试
// ==========================================
// 测试目标: 验证 JSONL 追加写与并发写的行完整性
// 覆盖范围: 逐行 JSON/时间戳补全/并发写不交错
// ==========================================

use pacing_agent::audit::JsonlAuditSink;
use pacing_agent::sources::AuditSink;
use serde_json::json;
use std::fs;
use std::sync::Arc;

#[tokio::test]
async fn test_every_line_is_standalone_json() {
    let dir = tempfile::tempdir().unwrap();
    let sink = JsonlAuditSink::open(dir.path().join("audit.jsonl")).unwrap();

    for i in 0..5 {
        sink.record(json!({
            "event_type": "reconciliation",
            "campaign_id": format!("google_cmp_{:03}", i),
            "variance_pct": 12.5,
        }))
        .await
        .unwrap();
    }

    let content = fs::read_to_string(sink.path()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 5);
    for line in lines {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["event_type"], "reconciliation");
        assert!(value["timestamp"].is_string());
    }
}

#[tokio::test]
async fn test_existing_timestamp_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let sink = JsonlAuditSink::open(dir.path().join("audit.jsonl")).unwrap();

    sink.record(json!({
        "event_type": "agent_decision",
        "timestamp": "2026-08-01T12:00:00Z",
    }))
    .await
    .unwrap();

    let events = sink.read_events().unwrap();
    assert_eq!(events[0]["timestamp"], "2026-08-01T12:00:00Z");
}

#[tokio::test]
async fn test_concurrent_writers_do_not_interleave() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(JsonlAuditSink::open(dir.path().join("audit.jsonl")).unwrap());

    let mut handles = Vec::new();
    for worker in 0..8 {
        let sink = sink.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..25 {
                sink.record(json!({
                    "event_type": "agent_decision",
                    "worker": worker,
                    "seq": i,
                    // 较长的载荷提高交错写入的暴露概率
                    "payload": "x".repeat(256),
                }))
                .await
                .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // 每一行都必须是完整 JSON
    let events = sink.read_events().unwrap();
    assert_eq!(events.len(), 200);
    for event in &events {
        assert_eq!(event["event_type"], "agent_decision");
        assert_eq!(event["payload"].as_str().unwrap().len(), 256);
    }
}
