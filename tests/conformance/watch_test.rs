use d_kv::Version;
use d_kv::VersionMatch;

use crate::common::*;

async fn watch_exists(
    h: Harness,
    check_useful: bool,
) {
    let client = h.client().await;

    client.create("/key", value(VALUE1), false).await.unwrap();

    let (ver, watch) = client.exists("/key", true).await.unwrap();
    assert!(ver.exists());

    wait_signal(
        watch.unwrap(),
        || async { client.erase("/key", VersionMatch::Any).await.unwrap() },
        check_useful,
    )
    .await;

    let (ver, _) = client.exists("/key", false).await.unwrap();
    assert_eq!(ver, Version::Absent);
}

#[tokio::test]
async fn test_watch_exists() {
    for_each_prefix(|h| watch_exists(h, false)).await;
}

#[tokio::test]
async fn test_watch_exists_useful() {
    for_each_prefix(|h| watch_exists(h, true)).await;
}

async fn watch_get(
    h: Harness,
    check_useful: bool,
) {
    let client = h.client().await;

    client.create("/key", value(VALUE1), false).await.unwrap();
    let (_, watch) = client.get("/key", true).await.unwrap();

    wait_signal(
        watch.unwrap(),
        || async {
            client.set("/key", value(VALUE2)).await.unwrap();
        },
        check_useful,
    )
    .await;

    let (entry, _) = client.get("/key", false).await.unwrap();
    assert_eq!(entry.value, value(VALUE2));
}

#[tokio::test]
async fn test_watch_get() {
    for_each_prefix(|h| watch_get(h, false)).await;
}

#[tokio::test]
async fn test_watch_get_useful() {
    for_each_prefix(|h| watch_get(h, true)).await;
}

async fn watch_children(
    h: Harness,
    check_useful: bool,
) {
    let client = h.client().await;

    for key in ["/key", "/key/child", "/key/child/grandchild", "/key/hi"] {
        client.create(key, value(VALUE1), false).await.unwrap();
    }

    let (result, watch) = client.children("/key", true).await.unwrap();
    assert_eq!(sorted(result), vec!["/key/child".to_string(), "/key/hi".to_string()]);

    wait_signal(
        watch.unwrap(),
        || async { client.erase("/key/hi", VersionMatch::Any).await.unwrap() },
        check_useful,
    )
    .await;

    let (result, _) = client.children("/key", false).await.unwrap();
    assert_eq!(result, vec!["/key/child".to_string()]);
}

#[tokio::test]
async fn test_watch_children() {
    for_each_prefix(|h| watch_children(h, false)).await;
}

#[tokio::test]
async fn test_watch_children_useful() {
    for_each_prefix(|h| watch_children(h, true)).await;
}

async fn watch_children_ignores_value_changes(h: Harness) {
    let client = h.client().await;

    client.create("/key", value(VALUE1), false).await.unwrap();
    client.create("/key/child", value(VALUE1), false).await.unwrap();

    let (_, watch) = client.children("/key", true).await.unwrap();
    let watch = watch.unwrap();

    client.set("/key/child", value(VALUE2)).await.unwrap();
    client.set("/key", value(VALUE2)).await.unwrap();
    client.create("/key/child/grandchild", value(VALUE1), false).await.unwrap();
    assert!(!watch.is_fired());

    client.create("/key/other", value(VALUE1), false).await.unwrap();
    assert!(watch.is_fired());
}

#[tokio::test]
async fn test_watch_children_ignores_value_changes() {
    for_each_prefix(watch_children_ignores_value_changes).await;
}

async fn watch_fires_across_sessions(h: Harness) {
    let watcher = h.client().await;
    let writer = h.client().await;

    let (ver, watch) = watcher.exists("/key", true).await.unwrap();
    assert_eq!(ver, Version::Absent);

    wait_signal(
        watch.unwrap(),
        || async {
            writer.create("/key", value(VALUE1), false).await.unwrap();
        },
        true,
    )
    .await;
}

#[tokio::test]
async fn test_watch_fires_across_sessions() {
    for_each_prefix(watch_fires_across_sessions).await;
}

async fn watch_children_sees_structural_child_vanish(h: Harness) {
    let client = h.client().await;

    for key in ["/x", "/x/a", "/x/a/b"] {
        client.create(key, value(VALUE1), false).await.unwrap();
    }
    client.erase("/x/a", VersionMatch::Any).await.unwrap();

    let (result, watch) = client.children("/x", true).await.unwrap();
    assert_eq!(result, vec!["/x/a".to_string()]);

    wait_signal(
        watch.unwrap(),
        || async { client.erase("/x/a/b", VersionMatch::Any).await.unwrap() },
        true,
    )
    .await;

    let (result, _) = client.children("/x", false).await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_watch_children_sees_structural_child_vanish() {
    for_each_prefix(watch_children_sees_structural_child_vanish).await;
}

async fn watch_children_sees_nested_prefix_appear(h: Harness) {
    let outer = h.client().await;
    outer.create("/p", value(VALUE1), false).await.unwrap();

    let (result, watch) = outer.children("/p", true).await.unwrap();
    assert!(result.is_empty());

    let nested_prefix = format!("{}/p/q", h.prefix());
    let inner = h.client_under(&nested_prefix).await;

    wait_signal(
        watch.unwrap(),
        || async { inner.create("/x", value(VALUE2), false).await.unwrap(); },
        true,
    )
    .await;

    let (result, _) = outer.children("/p", false).await.unwrap();
    assert_eq!(result, vec!["/p/q".to_string()]);
}

#[tokio::test]
async fn test_watch_children_sees_nested_prefix_appear() {
    for_each_prefix(watch_children_sees_nested_prefix_appear).await;
}
