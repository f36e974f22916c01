//! References delivered with accounts.

use crate::common::{collect, config, dispatcher, dispatcher_with, reference, seed};
use pcf_connector::transport::{InMemoryTransport, Method};
use pcf_connector::{
    AttributeBag, ConnectorConfig, ConnectorError, RemoteFault, ResourceKind, SearchOptions,
    Service,
};
use std::ops::ControlFlow;

#[tokio::test]
async fn test_account_without_roles_is_delivered() {
    let dispatcher = dispatcher();
    let landscape = seed(&dispatcher).await;

    let options = SearchOptions::new().attributes(["__TENANT__", "__SPACE__"]);
    let records = collect(&dispatcher, ResourceKind::Account, &options).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, landscape.user);
    assert!(!records[0].bag.contains("__TENANT__"));
    assert!(!records[0].bag.contains("__SPACE__"));
    let summary_path = format!("v2/users/{}/summary", landscape.user);
    assert!(
        dispatcher
            .transport()
            .requests()
            .await
            .iter()
            .any(|request| request.path == summary_path)
    );
}

#[tokio::test]
async fn test_summary_is_fetched_only_when_requested() {
    let dispatcher = dispatcher();
    seed(&dispatcher).await;

    collect(
        &dispatcher,
        ResourceKind::Account,
        &SearchOptions::new().attributes(["__GROUP__", "userName"]),
    )
    .await;

    let requests = dispatcher.transport().requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "Users");
}

#[tokio::test]
async fn test_every_reference_kind_is_delivered() {
    let dispatcher = dispatcher();
    let landscape = seed(&dispatcher).await;
    let mut bag = AttributeBag::new();
    bag.add("__GROUP__", reference(ResourceKind::Group, &landscape.group, "admins"));
    bag.append(
        "__TENANT__",
        [
            reference(ResourceKind::Tenant, &landscape.org, "users"),
            reference(ResourceKind::Tenant, &landscape.org, "auditors"),
        ],
    );
    bag.add("__SPACE__", reference(ResourceKind::Space, &landscape.space, "managers"));
    dispatcher
        .add_attribute_values(ResourceKind::Account, &landscape.user, &bag)
        .await
        .unwrap();

    let options = SearchOptions::new().attributes(["__group__", "__TENANT__", "__SPACE__"]);
    let records = collect(&dispatcher, ResourceKind::Account, &options).await;
    let record = &records[0];

    assert_eq!(
        record.bag.get("__GROUP__"),
        Some([reference(ResourceKind::Group, &landscape.group, "admins")].as_slice())
    );
    let tenants = record.bag.get("__TENANT__").unwrap();
    assert_eq!(tenants.len(), 2);
    assert!(tenants.contains(&reference(ResourceKind::Tenant, &landscape.org, "users")));
    assert!(tenants.contains(&reference(ResourceKind::Tenant, &landscape.org, "auditors")));
    assert_eq!(
        record.bag.get("__SPACE__"),
        Some([reference(ResourceKind::Space, &landscape.space, "managers")].as_slice())
    );
}

#[tokio::test]
async fn test_lookup_fault_aborts_unless_degraded() {
    let transport = InMemoryTransport::new();
    let strict = dispatcher_with(config(), transport.clone());
    let landscape = seed(&strict).await;
    transport
        .inject_fault(
            Method::Get,
            format!("v2/users/{}/summary", landscape.user),
            RemoteFault::new(Service::Platform, 500, "database unavailable")
                .with_code("CF-ServerError"),
        )
        .await;
    let options = SearchOptions::new().attributes(["__SPACE__"]);

    let mut delivered = 0;
    let error = strict
        .search(ResourceKind::Account, &options, |_| {
            delivered += 1;
            ControlFlow::Continue(())
        })
        .await
        .unwrap_err();
    assert_eq!(delivered, 0);
    assert!(matches!(error, ConnectorError::Processing { .. }));
    assert_eq!(
        error.remote_fault().and_then(|fault| fault.code.as_deref()),
        Some("CF-ServerError")
    );

    let tolerant = dispatcher_with(
        ConnectorConfig::builder()
            .directory_url("https://uaa.example.com")
            .platform_url("https://api.example.com")
            .degrade_status(500)
            .build()
            .unwrap(),
        transport,
    );
    let records = collect(&tolerant, ResourceKind::Account, &options).await;
    assert_eq!(records.len(), 1);
    assert!(!records[0].bag.contains("__SPACE__"));
}

#[tokio::test]
async fn test_space_carries_organization_name() {
    let dispatcher = dispatcher();
    seed(&dispatcher).await;

    let records = collect(
        &dispatcher,
        ResourceKind::Space,
        &SearchOptions::new().attributes(["organization_name"]),
    )
    .await;

    assert_eq!(records[0].name, "dev");
    assert_eq!(
        records[0].bag.first_text("organization_name").as_deref(),
        Some("acme")
    );
}
