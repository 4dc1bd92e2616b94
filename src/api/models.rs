use serde::{Deserialize, Serialize};

use crate::observability::MetricsSnapshot;

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub conversions_succeeded: u64,
    pub conversions_failed: u64,
    pub uploads_rejected: u64,
}

impl HealthResponse {
    pub fn healthy(metrics: MetricsSnapshot) -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            conversions_succeeded: metrics.conversions_succeeded,
            conversions_failed: metrics.conversions_failed,
            uploads_rejected: metrics.uploads_rejected,
        }
    }
}
