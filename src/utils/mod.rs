//! # Utility Modules
//!
//! Supporting utilities for compression, logging, and metrics.
//!
//! ## Components
//! - **Compression**: raw DEFLATE with a decompressed-size limit
//! - **Logging**: Structured logging configuration
//! - **Metrics**: Thread-safe observability counters

pub mod compression;
pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::{global_metrics, MetricsSnapshot};
