//! Tracing and logging setup shared by the procurebot binaries.

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize with human-readable output instead of JSON.
pub fn init_pretty() {
    tracing::init_pretty();
}

/// Tracing configuration (filters, layers).
pub mod tracing;
