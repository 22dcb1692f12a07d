//! Prometheus metrics for monitoring arena server health and activity.
//!
//! Metrics are exposed in Prometheus text format on a separate listener
//! (`METRICS_BIND`). Without an installed exporter every call here is a no-op.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts, duration, status codes
//! - **WebSocket Metrics**: Active wallet feeds
//! - **Tournament Metrics**: Tournaments created, joins
//! - **Wallet Metrics**: Settled transactions by kind and status
//! - **Auth Metrics**: Sign-in attempts
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use arena_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/api/v1/auth/login", 200);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
///
/// # Arguments
///
/// - `addr`: Address to bind the metrics server to (e.g., `0.0.0.0:9090`)
///
/// # Returns
///
/// Result indicating success or error message
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// WebSocket Metrics
// ============================================================================

/// A wallet feed connected.
pub fn websocket_connected() {
    metrics::counter!("websocket_connections_total").increment(1);
    metrics::gauge!("websocket_connections_active").increment(1.0);
}

/// A wallet feed closed.
pub fn websocket_disconnected() {
    metrics::gauge!("websocket_connections_active").decrement(1.0);
}

/// Increment WebSocket messages sent counter.
pub fn websocket_messages_sent() {
    metrics::counter!("websocket_messages_sent").increment(1);
}

// ============================================================================
// Tournament Metrics
// ============================================================================

pub fn tournaments_created_total() {
    metrics::counter!("tournaments_created_total").increment(1);
}

pub fn tournament_joins_total(success: bool) {
    metrics::counter!("tournament_joins_total",
        "success" => success.to_string()
    )
    .increment(1);
}

// ============================================================================
// Wallet Metrics
// ============================================================================

/// Record a settled wallet transaction.
pub fn wallet_transactions_total(kind: &str, status: &str) {
    metrics::counter!("wallet_transactions_total",
        "kind" => kind.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Increment sign-in attempts counter.
pub fn login_attempts_total(method: &str, success: bool) {
    metrics::counter!("login_attempts_total",
        "method" => method.to_string(),
        "success" => success.to_string()
    )
    .increment(1);
}
