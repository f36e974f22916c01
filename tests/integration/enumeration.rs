//! Paging through both APIs.

use crate::common::{collect, dispatcher, named, seed};
use pcf_connector::{AttributeValue, ResourceKind, SearchOptions};
use proptest::prelude::*;
use std::ops::ControlFlow;

async fn create_accounts(dispatcher: &crate::common::Dispatcher, count: usize) {
    for index in 1..=count {
        dispatcher
            .create(ResourceKind::Account, &named(&format!("user{index:02}")))
            .await
            .unwrap();
    }
    dispatcher.transport().clear_requests().await;
}

async fn query(dispatcher: &crate::common::Dispatcher, name: &str) -> Vec<String> {
    dispatcher
        .transport()
        .requests()
        .await
        .iter()
        .filter_map(|request| request.query_value(name).map(str::to_string))
        .collect()
}

#[tokio::test]
async fn test_directory_stops_on_short_batch() {
    let dispatcher = dispatcher();
    create_accounts(&dispatcher, 27).await;

    let records = collect(
        &dispatcher,
        ResourceKind::Account,
        &SearchOptions::new().page_size(10),
    )
    .await;

    assert_eq!(records.len(), 27);
    assert_eq!(query(&dispatcher, "startIndex").await, vec!["1", "11", "21"]);
    assert_eq!(query(&dispatcher, "count").await, vec!["10", "10", "10"]);
    let names: Vec<&str> = records.iter().map(|record| record.name.as_str()).collect();
    assert_eq!(names.first(), Some(&"user01"));
    assert_eq!(names.last(), Some(&"user27"));
}

#[tokio::test]
async fn test_platform_stops_at_total() {
    let dispatcher = dispatcher();
    for index in 1..=25 {
        dispatcher
            .create(ResourceKind::Tenant, &named(&format!("org{index:02}")))
            .await
            .unwrap();
    }
    dispatcher.transport().clear_requests().await;

    let records = collect(
        &dispatcher,
        ResourceKind::Tenant,
        &SearchOptions::new().page_size(10),
    )
    .await;

    assert_eq!(records.len(), 25);
    assert_eq!(query(&dispatcher, "page").await, vec!["1", "2", "3"]);
    assert_eq!(query(&dispatcher, "results-per-page").await, vec!["10", "10", "10"]);
}

#[tokio::test]
async fn test_handler_stop_prevents_further_pages() {
    let dispatcher = dispatcher();
    create_accounts(&dispatcher, 27).await;

    let mut seen = Vec::new();
    let summary = dispatcher
        .search(
            ResourceKind::Account,
            &SearchOptions::new().page_size(10),
            |record| {
                seen.push(record.name);
                if seen.len() == 5 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        )
        .await
        .unwrap();

    assert!(summary.stopped);
    assert_eq!(summary.pages, 1);
    assert_eq!(seen.len(), 5);
    assert_eq!(dispatcher.transport().request_count().await, 1);
}

#[tokio::test]
async fn test_empty_directory_issues_one_request() {
    let dispatcher = dispatcher();

    let summary = dispatcher
        .search(ResourceKind::Group, &SearchOptions::new(), |_| {
            ControlFlow::Continue(())
        })
        .await
        .unwrap();

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.delivered, 0);
}

#[tokio::test]
async fn test_projection_limits_requested_attributes() {
    let dispatcher = dispatcher();
    create_accounts(&dispatcher, 1).await;

    let records = collect(
        &dispatcher,
        ResourceKind::Account,
        &SearchOptions::new().attributes(["emails.value"]),
    )
    .await;

    assert_eq!(query(&dispatcher, "attributes").await, vec!["active,emails,id,userName"]);
    assert_eq!(records.len(), 1);
    assert!(!records[0].bag.contains("origin"));
}

#[tokio::test]
async fn test_requested_emails_are_delivered_whole() {
    let dispatcher = dispatcher();
    seed(&dispatcher).await;

    let records = collect(
        &dispatcher,
        ResourceKind::Account,
        &SearchOptions::new().attributes(["emails"]),
    )
    .await;

    let emails = records[0].bag.get("emails").expect("emails delivered");
    assert_eq!(emails.len(), 1);
    let email = emails[0].as_embedded().expect("embedded email");
    assert_eq!(email.object_class, "__ACCOUNT__.emails");
    assert_eq!(
        email.attributes.first_text("value").as_deref(),
        Some("bjensen@example.com")
    );
    assert_eq!(email.attributes.first("primary"), Some(&AttributeValue::from(true)));
    assert!(!records[0].bag.contains("origin"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_groups_delivered_once_in_order(count in 0usize..30, size in 1usize..8) {
        let (names, requests) = tokio_test::block_on(async {
            let dispatcher = dispatcher();
            for index in 0..count {
                dispatcher
                    .create(ResourceKind::Group, &named(&format!("group{index:02}")))
                    .await
                    .unwrap();
            }
            dispatcher.transport().clear_requests().await;
            let records = collect(
                &dispatcher,
                ResourceKind::Group,
                &SearchOptions::new().page_size(size),
            )
            .await;
            let names: Vec<String> = records.into_iter().map(|record| record.name).collect();
            (names, dispatcher.transport().request_count().await)
        });

        let expected: Vec<String> = (0..count).map(|index| format!("group{index:02}")).collect();
        prop_assert_eq!(names, expected);
        let pages = if count == 0 { 1 } else { count / size + 1 };
        prop_assert_eq!(requests, pages);
    }
}
