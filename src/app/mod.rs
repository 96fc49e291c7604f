pub mod analytics;
pub mod router;

pub use analytics::{Analytics, AnalyticsBridge, AnalyticsEvent, LogAnalytics, MemoryAnalytics, NoopAnalytics};
pub use router::Router;
