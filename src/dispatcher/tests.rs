use super::*;
use crate::config::ConnectorConfig;
use crate::error::{ConnectorError, RemoteFault, ValidationError};
use crate::filter::Comparison;
use crate::resource::{
    AttributeBag, AttributeValue, ENABLE, EmbeddedObject, IdentityRecord, NAME, ResourceKind,
    UID,
};
use crate::transport::{InMemoryTransport, Method, Service};
use serde_json::json;
use std::ops::ControlFlow;

fn config() -> ConnectorConfig {
    ConnectorConfig::builder()
        .directory_url("https://uaa.example.com")
        .platform_url("https://api.example.com")
        .build()
        .unwrap()
}

fn dispatcher() -> ResourceDispatcher<InMemoryTransport> {
    ResourceDispatcher::new(InMemoryTransport::new(), config()).unwrap()
}

fn embedded(kind: ResourceKind, uid: &str, name: &str) -> AttributeValue {
    EmbeddedObject::new(
        kind.object_class(),
        AttributeBag::new().with(UID, uid).with(NAME, name),
    )
    .into()
}

async fn collect(
    dispatcher: &ResourceDispatcher<InMemoryTransport>,
    kind: ResourceKind,
    options: &SearchOptions,
) -> Vec<IdentityRecord> {
    let mut records = Vec::new();
    dispatcher
        .search(kind, options, |record| {
            records.push(record);
            ControlFlow::Continue(())
        })
        .await
        .unwrap();
    records
}

async fn create_org(dispatcher: &ResourceDispatcher<InMemoryTransport>, name: &str) -> String {
    dispatcher
        .create(ResourceKind::Tenant, &AttributeBag::new().with(NAME, name))
        .await
        .unwrap()
}

#[test]
fn test_blank_urls_are_rejected() {
    let result = ResourceDispatcher::new(InMemoryTransport::new(), ConnectorConfig::default());
    assert!(matches!(result, Err(ConnectorError::Configuration { .. })));
}

#[tokio::test]
async fn test_create_account_returns_assigned_id() {
    let dispatcher = dispatcher();
    let bag = AttributeBag::new()
        .with(NAME, "bjensen")
        .with("name.givenName", "Barbara")
        .with("emails.value", "bjensen@example.com");

    let id = dispatcher.create(ResourceKind::Account, &bag).await.unwrap();

    let requests = dispatcher.transport().requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].path, "Users");
    let body = requests[0].body.as_ref().unwrap();
    assert_eq!(body["userName"], "bjensen");
    assert_eq!(body["name"]["givenName"], "Barbara");
    assert!(!id.is_empty());
}

#[tokio::test]
async fn test_create_without_name_sends_nothing() {
    let dispatcher = dispatcher();
    let bag = AttributeBag::new().with("description", "no name");

    let error = dispatcher.create(ResourceKind::Group, &bag).await.unwrap_err();

    assert!(matches!(
        error,
        ConnectorError::Validation(ValidationError::MissingName { kind: ResourceKind::Group, ref attribute })
            if attribute == "displayName"
    ));
    assert_eq!(dispatcher.transport().request_count().await, 0);
}

#[tokio::test]
async fn test_space_requires_organization() {
    let dispatcher = dispatcher();
    let bag = AttributeBag::new().with(NAME, "dev");

    let error = dispatcher.create(ResourceKind::Space, &bag).await.unwrap_err();

    assert!(matches!(
        error,
        ConnectorError::Validation(ValidationError::MissingName { ref attribute, .. })
            if attribute == "organization_guid"
    ));
    assert_eq!(dispatcher.transport().request_count().await, 0);
}

#[tokio::test]
async fn test_create_space_in_organization() {
    let dispatcher = dispatcher();
    let org = create_org(&dispatcher, "acme").await;
    let bag = AttributeBag::new()
        .with(NAME, "dev")
        .with("organization_guid", org.as_str())
        .with("allow_ssh", true);

    let space = dispatcher.create(ResourceKind::Space, &bag).await.unwrap();

    let records = collect(
        &dispatcher,
        ResourceKind::Space,
        &SearchOptions::new().attributes(["organization_name", "allow_ssh"]),
    )
    .await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, space);
    assert_eq!(records[0].bag.first_text("organization_name").as_deref(), Some("acme"));
    assert_eq!(records[0].bag.first("allow_ssh"), Some(&AttributeValue::from(true)));
}

#[tokio::test]
async fn test_account_create_assigns_references() {
    let dispatcher = dispatcher();
    let group = dispatcher
        .create(ResourceKind::Group, &AttributeBag::new().with(NAME, "admins"))
        .await
        .unwrap();
    let mut bag = AttributeBag::new().with(NAME, "bjensen");
    bag.add("__GROUP__", embedded(ResourceKind::Group, &group, "admins"));

    let id = dispatcher.create(ResourceKind::Account, &bag).await.unwrap();

    let records = collect(
        &dispatcher,
        ResourceKind::Account,
        &SearchOptions::new().attributes(["__GROUP__"]),
    )
    .await;
    assert_eq!(records[0].id, id);
    assert_eq!(
        records[0].bag.get("__GROUP__"),
        Some([embedded(ResourceKind::Group, &group, "admins")].as_slice())
    );
}

#[tokio::test]
async fn test_update_blank_id_is_rejected() {
    let dispatcher = dispatcher();
    let bag = AttributeBag::new().with("active", false);

    for kind in ResourceKind::ALL {
        let error = dispatcher.update(kind, "  ", &bag).await.unwrap_err();
        assert!(matches!(
            error,
            ConnectorError::Validation(ValidationError::MissingIdentifier { kind: k }) if k == kind
        ));
        assert!(dispatcher.delete(kind, "").await.is_err());
    }
    assert_eq!(dispatcher.transport().request_count().await, 0);
}

#[tokio::test]
async fn test_update_account_patches_present_attributes() {
    let dispatcher = dispatcher();
    let id = dispatcher
        .create(ResourceKind::Account, &AttributeBag::new().with(NAME, "bjensen"))
        .await
        .unwrap();
    dispatcher.transport().clear_requests().await;

    let bag = AttributeBag::new().with("__ENABLE__", false);
    dispatcher.update(ResourceKind::Account, &id, &bag).await.unwrap();

    let requests = dispatcher.transport().requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Patch);
    assert_eq!(requests[0].if_match.as_deref(), Some("*"));

    let records = collect(&dispatcher, ResourceKind::Account, &SearchOptions::new()).await;
    assert_eq!(records[0].bag.first("active"), Some(&AttributeValue::from(false)));
    assert_eq!(records[0].name, "bjensen");
}

#[tokio::test]
async fn test_update_without_changes_sends_nothing() {
    let dispatcher = dispatcher();
    let bag = AttributeBag::new().with("unknownAttribute", "x");

    let id = dispatcher.update(ResourceKind::Group, "g-1", &bag).await.unwrap();

    assert_eq!(id, "g-1");
    assert_eq!(dispatcher.transport().request_count().await, 0);
}

#[tokio::test]
async fn test_update_tenant_replaces_payload() {
    let dispatcher = dispatcher();
    let org = create_org(&dispatcher, "acme").await;

    let bag = AttributeBag::new().with("__ENABLE__", false);
    dispatcher.update(ResourceKind::Tenant, &org, &bag).await.unwrap();

    let requests = dispatcher.transport().requests().await;
    let last = requests.last().unwrap();
    assert_eq!(last.method, Method::Put);
    assert_eq!(last.path, format!("v2/organizations/{org}"));
    assert_eq!(last.body, Some(json!({"status": "suspended"})));

    let records = collect(&dispatcher, ResourceKind::Tenant, &SearchOptions::new()).await;
    assert_eq!(records[0].bag.first("status"), Some(&AttributeValue::from(false)));
}

#[tokio::test]
async fn test_delete_then_resolve_reports_absence() {
    let dispatcher = dispatcher();
    let id = dispatcher
        .create(ResourceKind::Group, &AttributeBag::new().with(NAME, "admins"))
        .await
        .unwrap();

    dispatcher.delete(ResourceKind::Group, &id).await.unwrap();

    assert_eq!(dispatcher.resolve(ResourceKind::Group, "admins").await.unwrap(), None);
    let error = dispatcher
        .resolve_by_name(ResourceKind::Group, "admins")
        .await
        .unwrap_err();
    assert!(matches!(error, ConnectorError::NotFound { kind: ResourceKind::Group, .. }));
}

#[tokio::test]
async fn test_delete_missing_resource_is_remote_fault() {
    let dispatcher = dispatcher();
    let error = dispatcher.delete(ResourceKind::Tenant, "nope").await.unwrap_err();
    assert_eq!(error.remote_fault().map(|fault| fault.status), Some(404));
}

#[tokio::test]
async fn test_resolve_single_match() {
    let dispatcher = dispatcher();
    let id = dispatcher
        .create(ResourceKind::Account, &AttributeBag::new().with(NAME, "bjensen"))
        .await
        .unwrap();
    dispatcher.transport().clear_requests().await;

    let resolved = dispatcher.resolve(ResourceKind::Account, "bjensen").await.unwrap();

    assert_eq!(resolved, Some(id));
    let requests = dispatcher.transport().requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query_value("filter"), Some("userName:bjensen"));
    assert_eq!(requests[0].query_value("count"), Some("2"));
}

#[tokio::test]
async fn test_resolve_ambiguous_name() {
    let dispatcher = dispatcher();
    for org_name in ["acme", "globex"] {
        let org = create_org(&dispatcher, org_name).await;
        let bag = AttributeBag::new()
            .with(NAME, "dev")
            .with("organization_guid", org.as_str());
        dispatcher.create(ResourceKind::Space, &bag).await.unwrap();
    }

    let error = dispatcher.resolve(ResourceKind::Space, "dev").await.unwrap_err();

    assert!(matches!(
        error,
        ConnectorError::Ambiguous { kind: ResourceKind::Space, matches: 2, .. }
    ));
}

#[tokio::test]
async fn test_add_requires_values() {
    let dispatcher = dispatcher();
    let error = dispatcher
        .add_attribute_values(ResourceKind::Account, "u-1", &AttributeBag::new())
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        ConnectorError::Validation(ValidationError::MissingValues)
    ));
    assert_eq!(dispatcher.transport().request_count().await, 0);
}

#[tokio::test]
async fn test_role_assignment_round_trip() {
    let dispatcher = dispatcher();
    let org = create_org(&dispatcher, "acme").await;
    let user = dispatcher
        .create(ResourceKind::Account, &AttributeBag::new().with(NAME, "bjensen"))
        .await
        .unwrap();

    let mut bag = AttributeBag::new();
    bag.add("__TENANT__", embedded(ResourceKind::Tenant, &org, "managers"));
    dispatcher
        .add_attribute_values(ResourceKind::Account, &user, &bag)
        .await
        .unwrap();

    let requests = dispatcher.transport().requests().await;
    let grant = requests.last().unwrap();
    assert_eq!(grant.method, Method::Put);
    assert_eq!(grant.path, format!("v2/organizations/{org}/managers/{user}"));

    let options = SearchOptions::new().attributes(["__TENANT__"]);
    let records = collect(&dispatcher, ResourceKind::Account, &options).await;
    assert_eq!(
        records[0].bag.get("__TENANT__"),
        Some([embedded(ResourceKind::Tenant, &org, "managers")].as_slice())
    );

    dispatcher
        .remove_attribute_values(ResourceKind::Account, &user, &bag)
        .await
        .unwrap();
    let records = collect(&dispatcher, ResourceKind::Account, &options).await;
    assert_eq!(records.len(), 1);
    assert!(!records[0].bag.contains("__TENANT__"));
}

#[tokio::test]
async fn test_remove_accepts_one_value_per_attribute() {
    let dispatcher = dispatcher();
    let mut bag = AttributeBag::new();
    bag.append(
        "__SPACE__",
        [
            embedded(ResourceKind::Space, "s-1", "developers"),
            embedded(ResourceKind::Space, "s-2", "developers"),
        ],
    );

    let error = dispatcher
        .remove_attribute_values(ResourceKind::Account, "u-1", &bag)
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        ConnectorError::Validation(ValidationError::TooManyValues { count: 2, .. })
    ));
    assert_eq!(dispatcher.transport().request_count().await, 0);
}

#[tokio::test]
async fn test_reference_of_wrong_class_is_rejected() {
    let dispatcher = dispatcher();
    let mut bag = AttributeBag::new();
    bag.add("__GROUP__", embedded(ResourceKind::Tenant, "org-1", "users"));

    let error = dispatcher
        .add_attribute_values(ResourceKind::Account, "u-1", &bag)
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        ConnectorError::Validation(ValidationError::UnexpectedObjectClass { ref expected, .. })
            if expected == "__GROUP__"
    ));
}

#[tokio::test]
async fn test_unknown_role_is_rejected() {
    let dispatcher = dispatcher();
    let mut bag = AttributeBag::new();
    bag.add("__SPACE__", embedded(ResourceKind::Space, "s-1", "billing_managers"));

    let error = dispatcher
        .add_attribute_values(ResourceKind::Account, "u-1", &bag)
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        ConnectorError::Validation(ValidationError::InvalidValue { ref value, .. })
            if value == "billing_managers"
    ));
}

#[tokio::test]
async fn test_group_member_add_and_remove() {
    let dispatcher = dispatcher();
    let user = dispatcher
        .create(ResourceKind::Account, &AttributeBag::new().with(NAME, "bjensen"))
        .await
        .unwrap();
    let group = dispatcher
        .create(ResourceKind::Group, &AttributeBag::new().with(NAME, "admins"))
        .await
        .unwrap();
    let bag = AttributeBag::new().with("members", user.as_str());

    dispatcher
        .add_attribute_values(ResourceKind::Group, &group, &bag)
        .await
        .unwrap();
    let patch = dispatcher.transport().requests().await.pop().unwrap();
    assert_eq!(patch.body.unwrap()["Operations"][0]["op"], "add");

    let options = SearchOptions::new().attributes(["__GROUP__"]);
    let records = collect(&dispatcher, ResourceKind::Account, &options).await;
    assert!(records[0].bag.contains("__GROUP__"));

    dispatcher
        .remove_attribute_values(ResourceKind::Group, &group, &bag)
        .await
        .unwrap();
    let records = collect(&dispatcher, ResourceKind::Account, &options).await;
    assert!(!records[0].bag.contains("__GROUP__"));
}

#[tokio::test]
async fn test_platform_kinds_have_no_value_updates() {
    let dispatcher = dispatcher();
    let bag = AttributeBag::new().with("name", "acme");
    for kind in [ResourceKind::Tenant, ResourceKind::Space] {
        let error = dispatcher
            .add_attribute_values(kind, "org-1", &bag)
            .await
            .unwrap_err();
        assert!(matches!(error, ConnectorError::UnsupportedOperation { .. }));
    }
}

#[tokio::test]
async fn test_enrichment_without_roles_still_delivers_account() {
    let dispatcher = dispatcher();
    dispatcher
        .create(ResourceKind::Account, &AttributeBag::new().with(NAME, "bjensen"))
        .await
        .unwrap();

    let options = SearchOptions::new().attributes(["__TENANT__", "__SPACE__"]);
    let records = collect(&dispatcher, ResourceKind::Account, &options).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "bjensen");
    assert!(!records[0].bag.contains("__TENANT__"));
    assert!(!records[0].bag.contains("__SPACE__"));
}

#[tokio::test]
async fn test_enrichment_fault_policy() {
    let fault = RemoteFault::new(Service::Platform, 503, "unavailable");

    let strict = dispatcher();
    let user = strict
        .create(ResourceKind::Account, &AttributeBag::new().with(NAME, "bjensen"))
        .await
        .unwrap();
    let path = format!("v2/users/{user}/summary");
    strict
        .transport()
        .inject_fault(Method::Get, path.as_str(), fault.clone())
        .await;
    let options = SearchOptions::new().attributes(["__TENANT__"]);
    let error = strict
        .search(ResourceKind::Account, &options, |_| ControlFlow::Continue(()))
        .await
        .unwrap_err();
    assert!(matches!(error, ConnectorError::Processing { ref identifier, .. } if *identifier == user));

    let tolerant_config = ConnectorConfig::builder()
        .directory_url("https://uaa.example.com")
        .platform_url("https://api.example.com")
        .degrade_status(503)
        .build()
        .unwrap();
    let tolerant = ResourceDispatcher::new(strict.transport().clone(), tolerant_config).unwrap();
    let records = collect(&tolerant, ResourceKind::Account, &options).await;
    assert_eq!(records.len(), 1);
    assert!(!records[0].bag.contains("__TENANT__"));
}

#[tokio::test]
async fn test_search_pages_with_configured_size() {
    let dispatcher = dispatcher();
    for index in 0..5 {
        create_org(&dispatcher, &format!("org{index}")).await;
    }
    dispatcher.transport().clear_requests().await;

    let records = collect(
        &dispatcher,
        ResourceKind::Tenant,
        &SearchOptions::new().page_size(2),
    )
    .await;

    assert_eq!(records.len(), 5);
    let pages: Vec<Option<String>> = dispatcher
        .transport()
        .requests()
        .await
        .iter()
        .map(|request| request.query_value("page").map(str::to_string))
        .collect();
    assert_eq!(
        pages,
        vec![Some("1".into()), Some("2".into()), Some("3".into())]
    );
}

#[tokio::test]
async fn test_search_with_native_filter() {
    let dispatcher = dispatcher();
    for name in ["admins", "auditors"] {
        dispatcher
            .create(ResourceKind::Group, &AttributeBag::new().with(NAME, name))
            .await
            .unwrap();
    }

    let options = SearchOptions::new().filter(Comparison::equal(NAME, "auditors"));
    let records = collect(&dispatcher, ResourceKind::Group, &options).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "auditors");
}

#[tokio::test]
async fn test_tenant_enabled_filter_uses_status_names() {
    let dispatcher = dispatcher();
    let mut ids = Vec::new();
    for name in ["acme", "globex"] {
        ids.push(
            dispatcher
                .create(ResourceKind::Tenant, &AttributeBag::new().with(NAME, name))
                .await
                .unwrap(),
        );
    }
    dispatcher
        .update(ResourceKind::Tenant, &ids[1], &AttributeBag::new().with(ENABLE, false))
        .await
        .unwrap();
    dispatcher.transport().clear_requests().await;

    let options = SearchOptions::new().filter(Comparison::equal(ENABLE, "false"));
    let records = collect(&dispatcher, ResourceKind::Tenant, &options).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "globex");
    let requests = dispatcher.transport().requests().await;
    assert_eq!(requests[0].query_value("q"), Some("status:suspended"));

    dispatcher.transport().clear_requests().await;
    let options = SearchOptions::new().filter(Comparison::equal(UID, ids[0].as_str()));
    collect(&dispatcher, ResourceKind::Tenant, &options).await;
    let requests = dispatcher.transport().requests().await;
    assert_eq!(requests[0].query_value("q"), None);
}

#[tokio::test]
async fn test_load_schema_merges_directory_schemas() {
    let mut dispatcher = dispatcher();
    let account = |dispatcher: &ResourceDispatcher<InMemoryTransport>| {
        dispatcher
            .schema()
            .object_class("__ACCOUNT__")
            .and_then(|class| class.attribute("badgeSerial"))
            .is_some()
    };
    assert!(!account(&dispatcher));
    dispatcher
        .transport()
        .add_schema(json!({
            "id": "urn:example:schemas:User",
            "name": "User",
            "attributes": [
                {"name": "badgeSerial", "type": "string", "multiValued": false}
            ]
        }))
        .await;

    let loaded = dispatcher.load_schema().await.unwrap();

    assert_eq!(loaded, 1);
    assert!(account(&dispatcher));
    assert!(
        dispatcher
            .schema()
            .object_class("__ACCOUNT__")
            .and_then(|class| class.attribute("userName"))
            .is_some()
    );
}
