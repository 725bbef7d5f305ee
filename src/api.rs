//! Request and response bodies for the v2 admin API.
//!
//! Field names follow the server's JSON contract (camelCase, `orgID`),
//! mapped onto snake_case structs with serde renames.

use crate::config::Config;
use serde::{Deserialize, Serialize};

/// `GET /api/v2/setup` response: whether first-run onboarding may still run.
#[derive(Debug, Clone, Deserialize)]
pub struct SetupStatus {
    pub allowed: bool,
}

/// `POST /api/v2/setup` body: the initial user, organization, and bucket.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupRequest {
    pub username: String,
    pub password: String,
    pub org: String,
    pub bucket: String,
    /// Bucket retention in seconds; omitted means infinite retention.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_period_seconds: Option<u32>,
}

impl SetupRequest {
    /// Onboarding body for the configured user, org, and bucket.
    pub fn from_config(config: &Config) -> Self {
        Self {
            username: config.username.clone(),
            password: config.password.clone(),
            org: config.org.clone(),
            bucket: config.bucket.clone(),
            retention_period_seconds: None,
        }
    }

    /// Set the bucket retention period.
    pub fn with_retention(mut self, seconds: u32) -> Self {
        self.retention_period_seconds = Some(seconds);
        self
    }
}

/// One entry from `GET /api/v2/authorizations`, also the response shape of
/// `POST /api/v2/authorizations`.
#[derive(Debug, Clone, Deserialize)]
pub struct Authorization {
    pub id: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub description: String,
}

/// `GET /api/v2/authorizations` response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationList {
    #[serde(default)]
    pub authorizations: Vec<Authorization>,
}

/// `POST /api/v2/authorizations` body.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAuthorizationRequest {
    #[serde(rename = "orgID")]
    pub org_id: String,
    pub description: String,
    pub permissions: Vec<Permission>,
}

/// A single action grant on a resource type.
#[derive(Debug, Clone, Serialize)]
pub struct Permission {
    pub action: String,
    pub resource: PermissionResource,
}

/// The resource a [`Permission`] applies to, scoped to one organization.
#[derive(Debug, Clone, Serialize)]
pub struct PermissionResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(rename = "orgID")]
    pub org_id: String,
}

impl Permission {
    /// Read and write grants on buckets within one organization.
    pub fn bucket_read_write(org_id: &str) -> Vec<Permission> {
        ["read", "write"]
            .into_iter()
            .map(|action| Permission {
                action: action.to_string(),
                resource: PermissionResource {
                    resource_type: "buckets".to_string(),
                    org_id: org_id.to_string(),
                },
            })
            .collect()
    }
}

/// One organization record from `GET /api/v2/orgs`.
#[derive(Debug, Clone, Deserialize)]
pub struct Org {
    pub id: String,
    pub name: String,
}

/// `GET /api/v2/orgs` response.
#[derive(Debug, Clone, Deserialize)]
pub struct OrgList {
    #[serde(default)]
    pub orgs: Vec<Org>,
}
