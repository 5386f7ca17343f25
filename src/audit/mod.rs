// ==========================================
// 广告投放节奏监控系统 - 审计层
// ==========================================

pub mod jsonl_sink;
pub mod memory;

pub use jsonl_sink::JsonlAuditSink;
pub use memory::MemoryAuditSink;
