//! Wire types of the platform API.
//!
//! Every platform resource arrives in an envelope of `metadata` and `entity`.
//! Create and update requests send a flat payload instead.

use super::record::{EnrichmentMap, ScopeKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Organization status of an enabled tenant.
pub const STATUS_ACTIVE: &str = "active";
/// Organization status of a disabled tenant.
pub const STATUS_SUSPENDED: &str = "suspended";

/// A platform resource with its metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope<E> {
    pub metadata: Metadata,
    pub entity: E,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub guid: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Organization as returned by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantEntity {
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub billing_enabled: Option<bool>,
    #[serde(default)]
    pub quota_definition_guid: Option<String>,
    #[serde(default)]
    pub default_isolation_segment_guid: Option<String>,
}

impl TenantEntity {
    /// Whether the organization is active.
    pub fn is_active(&self) -> Option<bool> {
        self.status.as_deref().map(|status| status == STATUS_ACTIVE)
    }
}

/// Space as returned by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceEntity {
    pub name: String,
    #[serde(default)]
    pub organization_guid: Option<String>,
    /// Path of the owning organization, e.g. `/v2/organizations/{guid}`
    #[serde(default)]
    pub organization_url: Option<String>,
    #[serde(default)]
    pub allow_ssh: Option<bool>,
    #[serde(default)]
    pub space_quota_definition_guid: Option<String>,
    #[serde(default)]
    pub isolation_segment_guid: Option<String>,
}

/// Create and update body of an organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota_definition_guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_isolation_segment_guid: Option<String>,
}

/// Create and update body of a space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpacePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_ssh: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_quota_definition_guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isolation_segment_guid: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain_guids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_group_guids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub manager_guids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auditor_guids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub developer_guids: Vec<String>,
}

/// Paged list response of the platform; carries no batch count.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformList<R> {
    #[serde(default)]
    pub total_results: usize,
    #[serde(default)]
    pub total_pages: usize,
    #[serde(default = "Vec::new")]
    pub resources: Vec<R>,
}

/// Keys of a user summary, with the scope and role each one reports.
pub const SUMMARY_ROLES: [(&str, ScopeKind, &str); 7] = [
    ("organizations", ScopeKind::Tenant, "users"),
    ("managed_organizations", ScopeKind::Tenant, "managers"),
    ("billing_managed_organizations", ScopeKind::Tenant, "billing_managers"),
    ("audited_organizations", ScopeKind::Tenant, "auditors"),
    ("spaces", ScopeKind::Space, "developers"),
    ("managed_spaces", ScopeKind::Space, "managers"),
    ("audited_spaces", ScopeKind::Space, "auditors"),
];

/// Response of `v2/users/{id}/summary`: role keyed arrays of scoped resources.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserSummary {
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub entity: serde_json::Map<String, Value>,
}

impl UserSummary {
    /// Scope guids listed under a summary key.
    pub fn guids(&self, key: &str) -> Vec<String> {
        self.entity
            .get(key)
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.pointer("/metadata/guid"))
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl UserSummary {
    /// Role assignments reported by the summary, per scope.
    pub fn enrichment(&self) -> EnrichmentMap {
        let mut map = EnrichmentMap::new();
        for (key, scope, role) in SUMMARY_ROLES {
            for guid in self.guids(key) {
                map.grant(scope, role, guid);
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_maps_keys_to_roles() {
        let summary: UserSummary = serde_json::from_value(json!({
            "metadata": {"guid": "u-1"},
            "entity": {
                "organizations": [{"metadata": {"guid": "org-1"}, "entity": {"name": "acme"}}],
                "managed_organizations": [{"metadata": {"guid": "org-1"}}],
                "spaces": [{"metadata": {"guid": "space-1"}}, {"metadata": {"guid": "space-2"}}],
                "audited_spaces": []
            }
        }))
        .unwrap();

        let map = summary.enrichment();
        let tenant = map.assignments(ScopeKind::Tenant);
        assert_eq!(tenant.len(), 2);
        assert_eq!(tenant[0].role, "users");
        assert_eq!(tenant[1].role, "managers");
        let space = map.assignments(ScopeKind::Space);
        assert_eq!(space.len(), 1);
        assert_eq!(space[0].members, vec!["space-1", "space-2"]);
    }

    #[test]
    fn test_list_tolerates_missing_fields() {
        let list: PlatformList<Envelope<TenantEntity>> =
            serde_json::from_value(json!({"total_results": 0})).unwrap();
        assert!(list.resources.is_empty());
        assert_eq!(list.total_pages, 0);
    }
}
