// ==========================================
// 广告投放节奏监控系统 - 数据源层
// ==========================================
// 组成: 协作者契约 + 演示/测试用模拟实现
// ==========================================

pub mod mock_platform;
pub mod mock_tracker;
pub mod scenario;
pub mod traits;

pub use mock_platform::MockPlatformSource;
pub use mock_tracker::MockInternalTracker;
pub use scenario::{generate_fleet, MockCampaign, SeededRng, SpendScenario};
pub use traits::{
    AuditSink, NotificationMessage, NotificationSink, PlatformSource, SourceError, TargetSource,
};
