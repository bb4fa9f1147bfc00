//! # Event Handlers
//!
//! Bus subscribers that react to runtime events.

pub mod metrics;
pub mod session_events;

pub use metrics::MetricsRecorder;
pub use session_events::SessionEventHandler;
