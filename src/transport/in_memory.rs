//! In-memory simulation of the directory and platform APIs.
//!
//! Resources are kept as JSON documents in insertion order. Every request is
//! recorded, so tests can assert on the exact calls the engine issued, and
//! faults can be injected per method and path.
//!
//! # Supported calls
//!
//! * `Users`, `Groups`: list with `startIndex`/`count`/`filter`, create, and
//!   get/patch/delete by id; users carry their computed `groups`
//! * `Schemas`: list of the schema documents added with [`InMemoryTransport::add_schema`]
//! * `v2/organizations`, `v2/spaces`: list with `page`/`results-per-page`/`q`,
//!   create, and get/put/delete by guid
//! * `v2/{organizations|spaces}/{guid}/{role}/{user}`: grant (PUT) and revoke (DELETE)
//! * `v2/users/{id}/summary`: role summary, `404` when the user holds no roles
//!
//! # Example Usage
//!
//! ```rust
//! use pcf_connector::transport::{InMemoryTransport, RestRequest, Service, Transport};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = InMemoryTransport::new();
//! let created = transport
//!     .execute(RestRequest::post(Service::Directory, "Users", json!({"userName": "bjensen"})))
//!     .await?
//!     .unwrap_or_default();
//! assert!(created["id"].is_string());
//! assert_eq!(transport.request_count().await, 1);
//! # Ok(())
//! # }
//! ```

use super::{Method, RestRequest, Service, Transport};
use crate::error::RemoteFault;
use crate::resource::ScopeKind;
use crate::resource::directory::DEFAULT_ORIGIN;
use crate::resource::platform::{STATUS_ACTIVE, SUMMARY_ROLES};
use chrono::{SecondsFormat, Utc};
use log::{debug, trace};
use serde_json::{Map, Value, json};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

type Reply = Result<Option<Value>, RemoteFault>;

const USERS: &str = "Users";
const GROUPS: &str = "Groups";
const DEFAULT_COUNT: usize = 100;
const DEFAULT_RESULTS_PER_PAGE: usize = 50;

/// Thread-safe simulation of both remote APIs.
#[derive(Clone, Default)]
pub struct InMemoryTransport {
    state: Arc<RwLock<State>>,
}

#[derive(Default)]
struct State {
    // collection name -> documents in insertion order
    collections: HashMap<String, Vec<Value>>,
    // (scope, scope guid, role, user)
    roles: BTreeSet<(ScopeKind, String, String, String)>,
    schemas: Vec<Value>,
    faults: Vec<(Method, String, RemoteFault)>,
    requests: Vec<RestRequest>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a schema document on the directory `Schemas` endpoint.
    pub async fn add_schema(&self, schema: Value) {
        self.state.write().await.schemas.push(schema);
    }

    /// Fail every request with the given method and path until cleared.
    pub async fn inject_fault(&self, method: Method, path: impl Into<String>, fault: RemoteFault) {
        let path = path.into();
        let path = path.trim_start_matches('/').to_string();
        self.state.write().await.faults.push((method, path, fault));
    }

    pub async fn clear_faults(&self) {
        self.state.write().await.faults.clear();
    }

    /// Requests received so far, in order.
    pub async fn requests(&self) -> Vec<RestRequest> {
        self.state.read().await.requests.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.state.read().await.requests.len()
    }

    /// Forget the recorded requests; stored resources are kept.
    pub async fn clear_requests(&self) {
        self.state.write().await.requests.clear();
    }
}

impl Transport for InMemoryTransport {
    async fn execute(&self, request: RestRequest) -> Result<Option<Value>, RemoteFault> {
        let mut state = self.state.write().await;
        trace!("In-memory transport received {}", request);
        state.requests.push(request.clone());

        if let Some(fault) = state.fault_for(&request) {
            debug!("Injected fault for {}: {}", request, fault);
            return Err(fault);
        }

        let segments: Vec<&str> = request
            .path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        match request.service {
            Service::Directory => state.directory(&request, &segments),
            Service::Platform => state.platform(&request, &segments),
        }
    }
}

impl State {
    fn fault_for(&self, request: &RestRequest) -> Option<RemoteFault> {
        self.faults
            .iter()
            .find(|(method, path, _)| *method == request.method && *path == request.path)
            .map(|(_, _, fault)| fault.clone())
    }

    fn items(&self, collection: &str) -> &[Value] {
        self.collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn items_mut(&mut self, collection: &str) -> &mut Vec<Value> {
        self.collections.entry(collection.to_string()).or_default()
    }

    fn directory(&mut self, request: &RestRequest, segments: &[&str]) -> Reply {
        match (request.method, segments) {
            (Method::Get, ["Schemas"]) => Ok(Some(json!({
                "totalResults": self.schemas.len(),
                "resources": self.schemas,
            }))),
            (Method::Get, [collection @ (USERS | GROUPS)]) => self.list_directory(collection, request),
            (Method::Post, [collection @ (USERS | GROUPS)]) => {
                self.create_directory(collection, request.body.as_ref())
            }
            (Method::Get, [collection @ (USERS | GROUPS), id]) => {
                let resource = self
                    .find(collection, id)
                    .ok_or_else(|| directory_not_found(collection, id))?;
                Ok(Some(self.present(collection, resource)))
            }
            (Method::Patch, [collection @ (USERS | GROUPS), id]) => {
                self.patch_directory(collection, id, request.body.as_ref())
            }
            (Method::Delete, [collection @ (USERS | GROUPS), id]) => {
                self.delete_directory(collection, id)
            }
            _ => Err(unsupported(request)),
        }
    }

    fn find(&self, collection: &str, id: &str) -> Option<&Value> {
        self.items(collection)
            .iter()
            .find(|resource| identifier(resource) == Some(id))
    }

    fn find_mut(&mut self, collection: &str, id: &str) -> Option<&mut Value> {
        self.items_mut(collection)
            .iter_mut()
            .find(|resource| identifier(resource) == Some(id))
    }

    fn list_directory(&self, collection: &str, request: &RestRequest) -> Reply {
        let start = number(request.query_value("startIndex"), 1).max(1);
        let count = number(request.query_value("count"), DEFAULT_COUNT);
        let matcher = request.query_value("filter").map(Matcher::parse);

        let matching: Vec<Value> = self
            .items(collection)
            .iter()
            .filter(|resource| matcher.as_ref().is_none_or(|m| m.matches(resource)))
            .map(|resource| self.present(collection, resource))
            .collect();
        let total = matching.len();
        let page: Vec<Value> = matching.into_iter().skip(start - 1).take(count).collect();

        Ok(Some(json!({
            "totalResults": total,
            "itemsPerPage": page.len(),
            "startIndex": start,
            "resources": page,
        })))
    }

    /// The document as the directory returns it.
    fn present(&self, collection: &str, resource: &Value) -> Value {
        let mut shown = resource.clone();
        if collection != USERS {
            return shown;
        }
        if let Some(object) = shown.as_object_mut() {
            object.remove("password");
        }
        let id = identifier(resource).unwrap_or_default();
        let groups: Vec<Value> = self
            .items(GROUPS)
            .iter()
            .filter(|group| has_member(group, id))
            .map(|group| json!({"value": group["id"], "display": group["displayName"], "type": "DIRECT"}))
            .collect();
        shown["groups"] = Value::Array(groups);
        shown
    }

    fn create_directory(&mut self, collection: &str, body: Option<&Value>) -> Reply {
        let mut resource = body
            .filter(|body| body.is_object())
            .cloned()
            .ok_or_else(|| invalid(Service::Directory, "scim_invalid_request", "body must be an object"))?;
        let name_field = if collection == USERS { "userName" } else { "displayName" };
        let name = resource
            .get(name_field)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                invalid(
                    Service::Directory,
                    "scim_invalid_request",
                    format!("{name_field} is required"),
                )
            })?
            .to_string();
        if self
            .items(collection)
            .iter()
            .any(|existing| existing[name_field] == name.as_str())
        {
            return Err(RemoteFault::new(
                Service::Directory,
                409,
                format!("{name_field} '{name}' already exists"),
            )
            .with_code("scim_resource_already_exists"));
        }

        let now = now();
        resource["id"] = json!(Uuid::new_v4().to_string());
        resource["meta"] = json!({"version": 0, "created": now, "lastModified": now});
        if collection == USERS && resource.get("origin").is_none() {
            resource["origin"] = json!(DEFAULT_ORIGIN);
        }
        debug!("In-memory {} created '{}'", collection, name);
        self.items_mut(collection).push(resource.clone());
        Ok(Some(self.present(collection, &resource)))
    }

    fn patch_directory(&mut self, collection: &str, id: &str, body: Option<&Value>) -> Reply {
        let operations = body
            .and_then(|body| body.get("Operations"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let resource = self
            .find_mut(collection, id)
            .ok_or_else(|| directory_not_found(collection, id))?;
        for operation in &operations {
            apply_patch(resource, operation)?;
        }
        let version = resource["meta"]["version"].as_i64().unwrap_or_default() + 1;
        resource["meta"]["version"] = json!(version);
        resource["meta"]["lastModified"] = json!(now());
        let snapshot = resource.clone();
        Ok(Some(self.present(collection, &snapshot)))
    }

    fn delete_directory(&mut self, collection: &str, id: &str) -> Reply {
        let items = self.items_mut(collection);
        let before = items.len();
        items.retain(|resource| identifier(resource) != Some(id));
        if items.len() == before {
            return Err(directory_not_found(collection, id));
        }
        if collection == USERS {
            for group in self.items_mut(GROUPS) {
                if let Some(members) = group.get_mut("members").and_then(Value::as_array_mut) {
                    members.retain(|member| member["value"] != id);
                }
            }
            self.roles.retain(|(_, _, _, user)| user != id);
        }
        Ok(None)
    }

    fn platform(&mut self, request: &RestRequest, segments: &[&str]) -> Reply {
        match (request.method, segments) {
            (Method::Get, ["v2", "users", user, "summary"]) => self.summary(user),
            (method, ["v2", scope, rest @ ..]) => {
                let scope = scope_of(scope).ok_or_else(|| unsupported(request))?;
                match (method, rest) {
                    (Method::Get, []) => self.list_platform(scope, request),
                    (Method::Post, []) => self.create_platform(scope, request.body.as_ref()),
                    (Method::Get, [guid]) => self
                        .find(collection_of(scope), guid)
                        .cloned()
                        .map(Some)
                        .ok_or_else(|| platform_not_found(scope, guid)),
                    (Method::Put, [guid]) => self.update_platform(scope, guid, request.body.as_ref()),
                    (Method::Delete, [guid]) => self.delete_platform(scope, guid),
                    (Method::Put, [guid, role, user]) => self.grant(scope, guid, role, user),
                    (Method::Delete, [guid, role, user]) => self.revoke(scope, guid, role, user),
                    _ => Err(unsupported(request)),
                }
            }
            _ => Err(unsupported(request)),
        }
    }

    fn list_platform(&self, scope: ScopeKind, request: &RestRequest) -> Reply {
        let page = number(request.query_value("page"), 1).max(1);
        let per_page = number(request.query_value("results-per-page"), DEFAULT_RESULTS_PER_PAGE).max(1);
        let matcher = request.query_value("q").map(Matcher::parse);

        let matching: Vec<&Value> = self
            .items(collection_of(scope))
            .iter()
            .filter(|resource| matcher.as_ref().is_none_or(|m| m.matches(&resource["entity"])))
            .collect();
        let total = matching.len();
        let resources: Vec<&Value> = matching
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .collect();

        Ok(Some(json!({
            "total_results": total,
            "total_pages": total.div_ceil(per_page),
            "resources": resources,
        })))
    }

    fn create_platform(&mut self, scope: ScopeKind, body: Option<&Value>) -> Reply {
        let mut entity = body
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| invalid(Service::Platform, "CF-MessageParseError", "body must be an object"))?;
        let name = entity
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| invalid(Service::Platform, "CF-InvalidRequest", "name is required"))?;

        let owner = match scope {
            ScopeKind::Tenant => None,
            ScopeKind::Space => {
                let organization = entity
                    .get("organization_guid")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| {
                        invalid(Service::Platform, "CF-InvalidRequest", "organization_guid is required")
                    })?;
                if self.find(collection_of(ScopeKind::Tenant), &organization).is_none() {
                    return Err(invalid(
                        Service::Platform,
                        "CF-InvalidRelation",
                        format!("organization '{organization}' does not exist"),
                    ));
                }
                Some(organization)
            }
        };
        let taken = self.items(collection_of(scope)).iter().any(|existing| {
            existing["entity"]["name"] == name.as_str()
                && owner
                    .as_deref()
                    .is_none_or(|org| existing["entity"]["organization_guid"] == org)
        });
        if taken {
            let code = match scope {
                ScopeKind::Tenant => "CF-OrganizationNameTaken",
                ScopeKind::Space => "CF-SpaceNameTaken",
            };
            return Err(invalid(Service::Platform, code, format!("name '{name}' is taken")));
        }

        let guid = Uuid::new_v4().to_string();
        match &owner {
            None => {
                entity.entry("status").or_insert_with(|| json!(STATUS_ACTIVE));
            }
            Some(organization) => {
                entity.insert(
                    "organization_url".into(),
                    json!(format!("/{}/{}", ScopeKind::Tenant.endpoint(), organization)),
                );
                for (field, role) in [
                    ("developer_guids", "developers"),
                    ("manager_guids", "managers"),
                    ("auditor_guids", "auditors"),
                ] {
                    for user in take_list(&mut entity, field) {
                        self.roles
                            .insert((scope, guid.clone(), role.to_string(), user));
                    }
                }
            }
        }
        let resource = json!({
            "metadata": {
                "guid": guid,
                "url": format!("/{}/{}", scope.endpoint(), guid),
                "created_at": now(),
                "updated_at": null,
            },
            "entity": entity,
        });
        debug!("In-memory {} created '{}'", scope.endpoint(), name);
        self.items_mut(collection_of(scope)).push(resource.clone());
        Ok(Some(resource))
    }

    fn update_platform(&mut self, scope: ScopeKind, guid: &str, body: Option<&Value>) -> Reply {
        let changes = body.and_then(Value::as_object).cloned().unwrap_or_default();
        let resource = self
            .find_mut(collection_of(scope), guid)
            .ok_or_else(|| platform_not_found(scope, guid))?;
        if let Some(entity) = resource["entity"].as_object_mut() {
            entity.extend(changes);
        }
        resource["metadata"]["updated_at"] = json!(now());
        Ok(Some(resource.clone()))
    }

    fn delete_platform(&mut self, scope: ScopeKind, guid: &str) -> Reply {
        let items = self.items_mut(collection_of(scope));
        let before = items.len();
        items.retain(|resource| identifier(resource) != Some(guid));
        if items.len() == before {
            return Err(platform_not_found(scope, guid));
        }
        if scope == ScopeKind::Tenant {
            self.items_mut(collection_of(ScopeKind::Space))
                .retain(|space| space["entity"]["organization_guid"] != guid);
        }
        self.roles.retain(|(_, scope_guid, _, _)| scope_guid != guid);
        Ok(None)
    }

    fn grant(&mut self, scope: ScopeKind, guid: &str, role: &str, user: &str) -> Reply {
        let resource = self
            .find(collection_of(scope), guid)
            .cloned()
            .ok_or_else(|| platform_not_found(scope, guid))?;
        if !scope.roles().contains(&role) {
            return Err(invalid(
                Service::Platform,
                "CF-InvalidRequest",
                format!("unknown role '{role}'"),
            ));
        }
        self.roles
            .insert((scope, guid.to_string(), role.to_string(), user.to_string()));
        Ok(Some(resource))
    }

    fn revoke(&mut self, scope: ScopeKind, guid: &str, role: &str, user: &str) -> Reply {
        if self.find(collection_of(scope), guid).is_none() {
            return Err(platform_not_found(scope, guid));
        }
        self.roles
            .remove(&(scope, guid.to_string(), role.to_string(), user.to_string()));
        Ok(None)
    }

    fn summary(&self, user: &str) -> Reply {
        if !self.roles.iter().any(|(_, _, _, holder)| holder == user) {
            return Err(RemoteFault::new(
                Service::Platform,
                404,
                format!("user '{user}' has no platform roles"),
            )
            .with_code("CF-UserNotFound"));
        }
        let mut entity = Map::new();
        for (key, scope, role) in SUMMARY_ROLES {
            let entries: Vec<Value> = self
                .roles
                .iter()
                .filter(|(s, _, r, holder)| *s == scope && r == role && holder == user)
                .map(|(_, guid, _, _)| {
                    let name = self
                        .find(collection_of(scope), guid)
                        .map(|resource| resource["entity"]["name"].clone())
                        .unwrap_or(Value::Null);
                    json!({"metadata": {"guid": guid}, "entity": {"name": name}})
                })
                .collect();
            entity.insert(key.to_string(), Value::Array(entries));
        }
        Ok(Some(json!({"metadata": {"guid": user}, "entity": entity})))
    }
}

/// `attr:value` or `not (attr:value)`, matched against string forms of fields.
struct Matcher {
    field: String,
    value: String,
    negate: bool,
}

impl Matcher {
    fn parse(expression: &str) -> Self {
        let trimmed = expression.trim();
        let (inner, negate) = match trimmed
            .strip_prefix("not (")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            Some(inner) => (inner, true),
            None => (trimmed, false),
        };
        let (field, value) = inner.split_once(':').unwrap_or((inner, ""));
        Self {
            field: field.trim().to_string(),
            value: value.trim().to_string(),
            negate,
        }
    }

    fn matches(&self, document: &Value) -> bool {
        let found = self
            .field
            .split('.')
            .try_fold(document, |current, segment| current.get(segment))
            .and_then(|value| match value {
                Value::String(text) => Some(text.clone()),
                Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
                _ => None,
            })
            .is_some_and(|text| text == self.value);
        found != self.negate
    }
}

fn apply_patch(resource: &mut Value, operation: &Value) -> Result<(), RemoteFault> {
    let path = operation
        .get("path")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(Service::Directory, "scim_invalid_request", "patch path missing"))?;
    let value = operation.get("value").cloned().unwrap_or(Value::Null);
    let slot = path
        .split('.')
        .fold(&mut *resource, |current, segment| &mut current[segment]);

    match operation.get("op").and_then(Value::as_str) {
        Some("replace") => *slot = value,
        Some("add") => match (slot, value) {
            (Value::Array(existing), Value::Array(added)) => {
                for item in added {
                    if !existing.iter().any(|e| e["value"] == item["value"]) {
                        existing.push(item);
                    }
                }
            }
            (slot, value) => *slot = value,
        },
        Some("remove") => match (slot, value) {
            (Value::Array(existing), Value::Array(removed)) => {
                existing.retain(|e| !removed.iter().any(|r| r["value"] == e["value"]));
            }
            (slot, _) => *slot = Value::Null,
        },
        other => {
            return Err(invalid(
                Service::Directory,
                "scim_invalid_request",
                format!("unsupported patch op {other:?}"),
            ));
        }
    }
    Ok(())
}

fn identifier(resource: &Value) -> Option<&str> {
    resource
        .get("id")
        .or_else(|| resource.pointer("/metadata/guid"))
        .and_then(Value::as_str)
}

fn has_member(group: &Value, id: &str) -> bool {
    group["members"]
        .as_array()
        .is_some_and(|members| members.iter().any(|member| member["value"] == id))
}

fn take_list(entity: &mut Map<String, Value>, field: &str) -> Vec<String> {
    entity
        .remove(field)
        .and_then(|value| value.as_array().cloned())
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| value.as_str().map(str::to_string))
        .collect()
}

fn scope_of(segment: &str) -> Option<ScopeKind> {
    [ScopeKind::Tenant, ScopeKind::Space]
        .into_iter()
        .find(|scope| scope.endpoint().strip_prefix("v2/") == Some(segment))
}

fn collection_of(scope: ScopeKind) -> &'static str {
    scope.endpoint()
}

fn number(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|raw| raw.parse().ok()).unwrap_or(default)
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn invalid(service: Service, code: &str, message: impl Into<String>) -> RemoteFault {
    RemoteFault::new(service, 400, message).with_code(code)
}

fn unsupported(request: &RestRequest) -> RemoteFault {
    RemoteFault::new(request.service, 404, format!("no route for {request}"))
}

fn directory_not_found(collection: &str, id: &str) -> RemoteFault {
    RemoteFault::new(Service::Directory, 404, format!("{collection} '{id}' not found"))
        .with_code("scim_resource_not_found")
}

fn platform_not_found(scope: ScopeKind, guid: &str) -> RemoteFault {
    let code = match scope {
        ScopeKind::Tenant => "CF-OrganizationNotFound",
        ScopeKind::Space => "CF-SpaceNotFound",
    };
    RemoteFault::new(Service::Platform, 404, format!("{} '{}' not found", scope.endpoint(), guid))
        .with_code(code)
}
