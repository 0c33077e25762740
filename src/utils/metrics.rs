//! Observability and Metrics
//!
//! Process-wide counters for codec and mapper activity, collected with atomics
//! so every entry point can record without locking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Global metrics collector for tag operations
#[derive(Debug)]
pub struct Metrics {
    /// Trees encoded to bytes
    pub encodes_total: AtomicU64,
    /// Byte streams decoded to trees
    pub decodes_total: AtomicU64,
    /// Encoded bytes produced
    pub bytes_encoded: AtomicU64,
    /// Encoded bytes consumed
    pub bytes_decoded: AtomicU64,
    /// Total compression operations
    pub compression_total: AtomicU64,
    /// Successful compression operations
    pub compression_success: AtomicU64,
    /// Malformed or truncated inputs rejected
    pub format_errors: AtomicU64,
    /// Depth-limit violations
    pub recursion_errors: AtomicU64,
    /// Values mapped to tags
    pub values_mapped: AtomicU64,
    /// Tags mapped back to values
    pub values_unmapped: AtomicU64,
    /// Mapping failures, raised or suppressed
    pub mapping_errors: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            encodes_total: AtomicU64::new(0),
            decodes_total: AtomicU64::new(0),
            bytes_encoded: AtomicU64::new(0),
            bytes_decoded: AtomicU64::new(0),
            compression_total: AtomicU64::new(0),
            compression_success: AtomicU64::new(0),
            format_errors: AtomicU64::new(0),
            recursion_errors: AtomicU64::new(0),
            values_mapped: AtomicU64::new(0),
            values_unmapped: AtomicU64::new(0),
            mapping_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a completed encode
    pub fn tag_encoded(&self, byte_count: u64) {
        self.encodes_total.fetch_add(1, Ordering::Relaxed);
        self.bytes_encoded.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a completed decode
    pub fn tag_decoded(&self, byte_count: u64) {
        self.decodes_total.fetch_add(1, Ordering::Relaxed);
        self.bytes_decoded.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a compression attempt
    pub fn compression_attempt(&self) {
        self.compression_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful compression
    pub fn compression_success(&self) {
        self.compression_success.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected input
    pub fn format_error(&self) {
        self.format_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a depth-limit violation
    pub fn recursion_error(&self) {
        self.recursion_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a value converted to a tag
    pub fn value_mapped(&self) {
        self.values_mapped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a tag converted back to a value
    pub fn value_unmapped(&self) {
        self.values_unmapped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a mapping failure
    pub fn mapping_error(&self) {
        self.mapping_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            encodes_total: self.encodes_total.load(Ordering::Relaxed),
            decodes_total: self.decodes_total.load(Ordering::Relaxed),
            bytes_encoded: self.bytes_encoded.load(Ordering::Relaxed),
            bytes_decoded: self.bytes_decoded.load(Ordering::Relaxed),
            compression_total: self.compression_total.load(Ordering::Relaxed),
            compression_success: self.compression_success.load(Ordering::Relaxed),
            format_errors: self.format_errors.load(Ordering::Relaxed),
            recursion_errors: self.recursion_errors.load(Ordering::Relaxed),
            values_mapped: self.values_mapped.load(Ordering::Relaxed),
            values_unmapped: self.values_unmapped.load(Ordering::Relaxed),
            mapping_errors: self.mapping_errors.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            encodes_total = snapshot.encodes_total,
            decodes_total = snapshot.decodes_total,
            bytes_encoded = snapshot.bytes_encoded,
            bytes_decoded = snapshot.bytes_decoded,
            compression_total = snapshot.compression_total,
            compression_success = snapshot.compression_success,
            format_errors = snapshot.format_errors,
            recursion_errors = snapshot.recursion_errors,
            values_mapped = snapshot.values_mapped,
            values_unmapped = snapshot.values_unmapped,
            mapping_errors = snapshot.mapping_errors,
            uptime_seconds = snapshot.uptime_seconds,
            "Tag metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub encodes_total: u64,
    pub decodes_total: u64,
    pub bytes_encoded: u64,
    pub bytes_decoded: u64,
    pub compression_total: u64,
    pub compression_success: u64,
    pub format_errors: u64,
    pub recursion_errors: u64,
    pub values_mapped: u64,
    pub values_unmapped: u64,
    pub mapping_errors: u64,
    pub uptime_seconds: u64,
}

static METRICS: once_cell::sync::Lazy<Metrics> = once_cell::sync::Lazy::new(Metrics::new);

/// Get the global metrics instance
pub fn global_metrics() -> &'static Metrics {
    &METRICS
}

/// Initialize metrics collection (call once at startup)
pub fn init_metrics() {
    let _ = global_metrics();
    info!("Metrics collection initialized");
}

/// Timer for measuring operation duration
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Start timing an operation
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        debug!(
            operation = self.operation,
            duration_us = duration.as_micros() as u64,
            "Operation completed"
        );
    }
}
