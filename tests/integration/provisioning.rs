//! Provisioning workflows across the directory and the platform.

use crate::common::{collect, dispatcher, named, reference, seed};
use pcf_connector::transport::Method;
use pcf_connector::{AttributeBag, AttributeValue, ConnectorError, ResourceKind, SearchOptions};

#[tokio::test]
async fn test_role_lifecycle_on_organization_and_space() {
    let dispatcher = dispatcher();
    let landscape = seed(&dispatcher).await;

    let mut roles = AttributeBag::new();
    roles.add("__TENANT__", reference(ResourceKind::Tenant, &landscape.org, "users"));
    roles.add("__SPACE__", reference(ResourceKind::Space, &landscape.space, "developers"));
    dispatcher
        .add_attribute_values(ResourceKind::Account, &landscape.user, &roles)
        .await
        .unwrap();

    let grants: Vec<(Method, String)> = dispatcher
        .transport()
        .requests()
        .await
        .into_iter()
        .map(|request| (request.method, request.path))
        .collect();
    assert_eq!(
        grants,
        vec![
            (
                Method::Put,
                format!("v2/spaces/{}/developers/{}", landscape.space, landscape.user)
            ),
            (
                Method::Put,
                format!("v2/organizations/{}/users/{}", landscape.org, landscape.user)
            ),
        ]
    );

    let mut revoke = AttributeBag::new();
    revoke.add("__SPACE__", reference(ResourceKind::Space, &landscape.space, "developers"));
    dispatcher
        .remove_attribute_values(ResourceKind::Account, &landscape.user, &revoke)
        .await
        .unwrap();

    let options = SearchOptions::new().attributes(["__TENANT__", "__SPACE__"]);
    let records = collect(&dispatcher, ResourceKind::Account, &options).await;
    assert_eq!(
        records[0].bag.get("__TENANT__"),
        Some([reference(ResourceKind::Tenant, &landscape.org, "users")].as_slice())
    );
    assert!(!records[0].bag.contains("__SPACE__"));
}

#[tokio::test]
async fn test_duplicate_account_surfaces_provider_code() {
    let dispatcher = dispatcher();
    dispatcher
        .create(ResourceKind::Account, &named("bjensen"))
        .await
        .unwrap();

    let error = dispatcher
        .create(ResourceKind::Account, &named("bjensen"))
        .await
        .unwrap_err();

    let fault = error.remote_fault().expect("remote fault");
    assert_eq!(fault.status, 409);
    assert_eq!(fault.code.as_deref(), Some("scim_resource_already_exists"));
}

#[tokio::test]
async fn test_independent_creates_run_concurrently() {
    let dispatcher = dispatcher();

    let acme_attrs = named("acme");
    let globex_attrs = named("globex");
    let (acme, globex) = futures::join!(
        dispatcher.create(ResourceKind::Tenant, &acme_attrs),
        dispatcher.create(ResourceKind::Tenant, &globex_attrs),
    );

    let (acme, globex) = (acme.unwrap(), globex.unwrap());
    assert_ne!(acme, globex);
    let records = collect(&dispatcher, ResourceKind::Tenant, &SearchOptions::new()).await;
    let mut names: Vec<String> = records.into_iter().map(|record| record.name).collect();
    names.sort();
    assert_eq!(names, vec!["acme", "globex"]);
}

#[tokio::test]
async fn test_group_update_replaces_members() {
    let dispatcher = dispatcher();
    let landscape = seed(&dispatcher).await;
    let other = dispatcher
        .create(ResourceKind::Account, &named("jsmith"))
        .await
        .unwrap();
    dispatcher
        .add_attribute_values(
            ResourceKind::Group,
            &landscape.group,
            &AttributeBag::new().with("members", landscape.user.as_str()),
        )
        .await
        .unwrap();

    let bag = AttributeBag::new()
        .with("members.value", other.as_str())
        .with("description", "Administrators");
    dispatcher
        .update(ResourceKind::Group, &landscape.group, &bag)
        .await
        .unwrap();

    let patch = dispatcher.transport().requests().await.pop().unwrap();
    let operations = patch.body.unwrap()["Operations"].clone();
    assert!(
        operations
            .as_array()
            .unwrap()
            .iter()
            .any(|operation| operation["op"] == "replace" && operation["path"] == "members")
    );

    let options = SearchOptions::new().attributes(["__GROUP__"]);
    let records = collect(&dispatcher, ResourceKind::Account, &options).await;
    let member_of = |id: &str| {
        records
            .iter()
            .find(|record| record.id == id)
            .is_some_and(|record| record.bag.contains("__GROUP__"))
    };
    assert!(!member_of(&landscape.user));
    assert!(member_of(&other));
}

#[tokio::test]
async fn test_space_update_and_delete() {
    let dispatcher = dispatcher();
    let landscape = seed(&dispatcher).await;

    dispatcher
        .update(
            ResourceKind::Space,
            &landscape.space,
            &AttributeBag::new().with("allow_ssh", false),
        )
        .await
        .unwrap();
    let records = collect(&dispatcher, ResourceKind::Space, &SearchOptions::new()).await;
    assert_eq!(records[0].bag.first("allow_ssh"), Some(&AttributeValue::from(false)));

    dispatcher
        .delete(ResourceKind::Space, &landscape.space)
        .await
        .unwrap();
    assert_eq!(
        dispatcher.resolve(ResourceKind::Space, "dev").await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_resolve_every_kind() {
    let dispatcher = dispatcher();
    let landscape = seed(&dispatcher).await;

    let cases = [
        (ResourceKind::Account, "bjensen", &landscape.user),
        (ResourceKind::Group, "admins", &landscape.group),
        (ResourceKind::Tenant, "acme", &landscape.org),
        (ResourceKind::Space, "dev", &landscape.space),
    ];
    for (kind, name, expected) in cases {
        assert_eq!(&dispatcher.resolve_by_name(kind, name).await.unwrap(), expected);
    }

    let error = dispatcher
        .resolve_by_name(ResourceKind::Tenant, "initech")
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        ConnectorError::NotFound { kind: ResourceKind::Tenant, ref value, .. } if value == "initech"
    ));
}

#[tokio::test]
async fn test_deleted_account_loses_memberships() {
    let dispatcher = dispatcher();
    let landscape = seed(&dispatcher).await;
    let mut bag = AttributeBag::new();
    bag.add("__GROUP__", reference(ResourceKind::Group, &landscape.group, "admins"));
    dispatcher
        .add_attribute_values(ResourceKind::Account, &landscape.user, &bag)
        .await
        .unwrap();

    dispatcher
        .delete(ResourceKind::Account, &landscape.user)
        .await
        .unwrap();

    assert!(
        collect(&dispatcher, ResourceKind::Account, &SearchOptions::new())
            .await
            .is_empty()
    );
    let recreated = dispatcher
        .create(ResourceKind::Account, &named("bjensen"))
        .await
        .unwrap();
    let options = SearchOptions::new().attributes(["__GROUP__"]);
    let records = collect(&dispatcher, ResourceKind::Account, &options).await;
    assert_eq!(records[0].id, recreated);
    assert!(!records[0].bag.contains("__GROUP__"));
}

#[tokio::test]
async fn test_membership_in_missing_group_is_remote_fault() {
    let dispatcher = dispatcher();
    let bag = AttributeBag::new().with("members", "u-1");

    let error = dispatcher
        .add_attribute_values(ResourceKind::Group, "missing-group", &bag)
        .await
        .unwrap_err();

    let fault = error.remote_fault().expect("remote fault");
    assert_eq!(fault.status, 404);
    assert_eq!(fault.code.as_deref(), Some("scim_resource_not_found"));
}
