//! Health probe response body
//!
//! Follows the `application/health+json` draft format, reduced to the
//! `status` member.

use serde::{Deserialize, Serialize};

/// Media type of health probe responses
pub const HEALTH_CONTENT_TYPE: &str = "application/health+json";

/// Overall health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Pass,
    Fail,
}

/// Health probe response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
}

impl HealthResponse {
    pub fn pass() -> Self {
        Self {
            status: HealthStatus::Pass,
        }
    }

    pub fn fail() -> Self {
        Self {
            status: HealthStatus::Fail,
        }
    }
}
