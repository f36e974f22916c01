//! Shared helpers for the integration tests.

use pcf_connector::resource::{NAME, UID};
use pcf_connector::{
    AttributeBag, AttributeValue, ConnectorConfig, EmbeddedObject, IdentityRecord,
    InMemoryTransport, ResourceDispatcher, ResourceKind, SearchOptions,
};
use std::ops::ControlFlow;

pub type Dispatcher = ResourceDispatcher<InMemoryTransport>;

/// Route `log` output through the test harness; safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn config() -> ConnectorConfig {
    ConnectorConfig::builder()
        .directory_url("https://uaa.example.com")
        .platform_url("https://api.example.com")
        .build()
        .expect("test configuration is valid")
}

pub fn dispatcher() -> Dispatcher {
    init_logging();
    ResourceDispatcher::new(InMemoryTransport::new(), config()).expect("dispatcher builds")
}

pub fn dispatcher_with(config: ConnectorConfig, transport: InMemoryTransport) -> Dispatcher {
    init_logging();
    ResourceDispatcher::new(transport, config).expect("dispatcher builds")
}

/// Embedded reference value as the framework hands it over.
pub fn reference(kind: ResourceKind, uid: &str, name: &str) -> AttributeValue {
    EmbeddedObject::new(
        kind.object_class(),
        AttributeBag::new().with(UID, uid).with(NAME, name),
    )
    .into()
}

pub fn named(name: &str) -> AttributeBag {
    AttributeBag::new().with(NAME, name)
}

/// Every record a search delivers, in delivery order.
pub async fn collect(
    dispatcher: &Dispatcher,
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
        .expect("search succeeds");
    records
}

/// Identifiers of a small organization with one space, one group and one user.
#[derive(Debug, Clone)]
pub struct Landscape {
    pub org: String,
    pub space: String,
    pub group: String,
    pub user: String,
}

pub async fn seed(dispatcher: &Dispatcher) -> Landscape {
    let org = dispatcher
        .create(ResourceKind::Tenant, &named("acme"))
        .await
        .expect("organization created");
    let space = dispatcher
        .create(
            ResourceKind::Space,
            &named("dev").with("organization_guid", org.as_str()),
        )
        .await
        .expect("space created");
    let group = dispatcher
        .create(ResourceKind::Group, &named("admins"))
        .await
        .expect("group created");
    let user = dispatcher
        .create(
            ResourceKind::Account,
            &named("bjensen").with("emails.value", "bjensen@example.com"),
        )
        .await
        .expect("account created");
    dispatcher.transport().clear_requests().await;
    Landscape {
        org,
        space,
        group,
        user,
    }
}
