use std::time::Duration;

use d_kv::KvConfig;
use d_kv::OpError;
use d_kv::Version;
use d_kv::VersionMatch;

use crate::common::*;

async fn create_exists(h: Harness) {
    let client = h.client().await;

    let (ver, watch) = client.exists("/test", false).await.unwrap();
    assert!(watch.is_none());
    assert_eq!(ver, Version::Absent);

    let ver = client.create("/test", value(VALUE1), false).await.unwrap();

    let (ver2, watch) = client.exists("/test", false).await.unwrap();
    assert!(watch.is_none());
    assert_eq!(ver2, ver, "prefix {:?}", h.prefix());
}

#[tokio::test]
async fn test_create_exists() {
    for_each_prefix(create_exists).await;
}

async fn create_get(h: Harness) {
    let client = h.client().await;

    let err = client.get("/test", false).await.unwrap_err();
    assert_eq!(err.op(), Some(OpError::NoEntry));

    let ver = client.create("/test", value(VALUE1), false).await.unwrap();

    let (entry, watch) = client.get("/test", false).await.unwrap();
    assert!(watch.is_none());
    assert_eq!(entry.version, ver);
    assert_eq!(entry.value, value(VALUE1));
}

#[tokio::test]
async fn test_create_get() {
    for_each_prefix(create_get).await;
}

async fn create(h: Harness) {
    let client = h.client().await;

    client.create("/key", value(VALUE1), false).await.unwrap();

    let err = client.create("/key", value(VALUE1), false).await.unwrap_err();
    assert_eq!(err.op(), Some(OpError::EntryExists));

    let err = client
        .create("/key/child/grandchild", value(VALUE1), false)
        .await
        .unwrap_err();
    assert_eq!(err.op(), Some(OpError::NoEntry));

    client.create("/key/child", value(VALUE1), false).await.unwrap();
}

#[tokio::test]
async fn test_create() {
    for_each_prefix(create).await;
}

async fn create_under_leased_parent(h: Harness) {
    let client = h.client().await;

    client.create("/eph", value(VALUE1), true).await.unwrap();
    let err = client.create("/eph/child", value(VALUE1), false).await.unwrap_err();
    assert_eq!(err.op(), Some(OpError::EphemeralParent));
}

#[tokio::test]
async fn test_create_under_leased_parent() {
    for_each_prefix(create_under_leased_parent).await;
}

async fn erase_no_key(h: Harness) {
    let client = h.client().await;

    let err = client.erase("/key", VersionMatch::Any).await.unwrap_err();
    assert_eq!(err.op(), Some(OpError::NoEntry));
}

#[tokio::test]
async fn test_erase_no_key() {
    for_each_prefix(erase_no_key).await;
}

async fn erase_exists(h: Harness) {
    let client = h.client().await;

    client.create("/key", value(VALUE1), false).await.unwrap();
    let child = client.create("/key/child", value(VALUE1), false).await.unwrap();

    client.erase("/key", VersionMatch::Any).await.unwrap();

    let (ver, watch) = client.exists("/key", false).await.unwrap();
    assert!(watch.is_none());
    assert_eq!(ver, Version::Absent);

    // Descendants survive and stay listable under the erased key
    let (ver, _) = client.exists("/key/child", false).await.unwrap();
    assert_eq!(ver, child);
    let (children, _) = client.children("/key", false).await.unwrap();
    assert_eq!(children, vec!["/key/child".to_string()]);
}

#[tokio::test]
async fn test_erase_exists() {
    for_each_prefix(erase_exists).await;
}

async fn erase_versioned(h: Harness) {
    let client = h.client().await;

    let ver = client.create("/key", value(VALUE1), false).await.unwrap();

    client
        .erase("/key", VersionMatch::from_raw(ver.raw() + 1))
        .await
        .unwrap();
    let (ver2, _) = client.exists("/key", false).await.unwrap();
    assert_eq!(ver2, ver);

    client.erase("/key", VersionMatch::from(ver)).await.unwrap();
    let (ver2, _) = client.exists("/key", false).await.unwrap();
    assert_eq!(ver2, Version::Absent);
}

#[tokio::test]
async fn test_erase_versioned() {
    for_each_prefix(erase_versioned).await;
}

async fn set_get(h: Harness) {
    let client = h.client().await;

    let ver1 = client.create("/key", value(VALUE1), false).await.unwrap();
    let ver2 = client.set("/key", value(VALUE2)).await.unwrap();
    assert!(ver2.raw() > ver1.raw(), "new version {ver2} is not greater than old {ver1}");

    let (entry, watch) = client.get("/key", false).await.unwrap();
    assert!(watch.is_none());
    assert_eq!(entry.version, ver2);
    assert_eq!(entry.value, value(VALUE2));
}

#[tokio::test]
async fn test_set_get() {
    for_each_prefix(set_get).await;
}

async fn set_requires_entry(h: Harness) {
    let client = h.client().await;

    for key in ["/key", "/key/child", "/key/child/grandchild"] {
        let err = client.set(key, value(VALUE1)).await.unwrap_err();
        assert_eq!(err.op(), Some(OpError::NoEntry), "set {key}");
    }
    assert_eq!(client.exists("/key", false).await.unwrap().0, Version::Absent);
}

#[tokio::test]
async fn test_set_requires_entry() {
    for_each_prefix(set_requires_entry).await;
}

async fn children_no_key(h: Harness) {
    let client = h.client().await;

    let err = client.children("/key", false).await.unwrap_err();
    assert_eq!(err.op(), Some(OpError::NoEntry));
}

#[tokio::test]
async fn test_children_no_key() {
    for_each_prefix(children_no_key).await;
}

async fn children(h: Harness) {
    let client = h.client().await;

    for key in ["/key", "/key/child", "/key/child/grandchild", "/key/hi"] {
        client.create(key, value(VALUE1), false).await.unwrap();
    }

    let (result, watch) = client.children("/key", false).await.unwrap();
    assert!(watch.is_none());
    assert_eq!(sorted(result), vec!["/key/child".to_string(), "/key/hi".to_string()]);

    let (result, _) = client.children("/key/child", false).await.unwrap();
    assert_eq!(result, vec!["/key/child/grandchild".to_string()]);

    let (result, _) = client.children("/key/hi", false).await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_children() {
    for_each_prefix(children).await;
}

async fn cas_no_key(h: Harness) {
    let client = h.client().await;

    let err = client
        .cas("/key", value(VALUE1), Version::from_raw(42))
        .await
        .unwrap_err();
    assert_eq!(err.op(), Some(OpError::NoEntry));
}

#[tokio::test]
async fn test_cas_no_key() {
    for_each_prefix(cas_no_key).await;
}

async fn cas(h: Harness) {
    let client = h.client().await;

    let ver = client.create("/key", value(VALUE1), false).await.unwrap();

    let ver2 = client
        .cas("/key", value(VALUE2), Version::from_raw(ver.raw() + 1))
        .await
        .unwrap();
    assert_eq!(ver2, Version::Absent);

    let (entry, _) = client.get("/key", false).await.unwrap();
    assert_eq!(entry.version, ver);
    assert_eq!(entry.value, value(VALUE1));

    let ver4 = client.cas("/key", value(VALUE2), ver).await.unwrap();
    assert!(ver4.raw() > ver.raw());

    let (entry, _) = client.get("/key", false).await.unwrap();
    assert_eq!(entry.version, ver4);
    assert_eq!(entry.value, value(VALUE2));
}

#[tokio::test]
async fn test_cas() {
    for_each_prefix(cas).await;
}

async fn cas_zero_version(h: Harness) {
    let client = h.client().await;

    let ver1 = client.cas("/key", value(VALUE1), Version::Absent).await.unwrap();
    assert!(ver1.exists());

    let (entry, _) = client.get("/key", false).await.unwrap();
    assert_eq!(entry.version, ver1);
    assert_eq!(entry.value, value(VALUE1));

    let ver4 = client.cas("/key", value(VALUE2), Version::Absent).await.unwrap();
    assert_eq!(ver4, Version::Absent);

    let (entry, _) = client.get("/key", false).await.unwrap();
    assert_eq!(entry.version, ver1);
    assert_eq!(entry.value, value(VALUE1));
}

#[tokio::test]
async fn test_cas_zero_version() {
    for_each_prefix(cas_zero_version).await;
}

async fn malformed_keys_are_usage_errors(h: Harness) {
    let client = h.client().await;

    for key in ["", "key", "/key/", "/a//b", "/.", "/..", "/zookeeper", "/te\u{7f}st"] {
        let err = client.exists(key, false).await.unwrap_err();
        assert!(err.is_usage(), "exists {key:?}: {err}");
        let err = client.create(key, value(VALUE1), false).await.unwrap_err();
        assert!(err.is_usage(), "create {key:?}: {err}");
    }
}

#[tokio::test]
async fn test_malformed_keys_are_usage_errors() {
    for_each_prefix(malformed_keys_are_usage_errors).await;
}

async fn create_leased(h: Harness) {
    let client = h.client().await;
    let client2 = h.client().await;

    client2.create("/key", value(VALUE1), true).await.unwrap();

    let (ver, _) = client.exists("/key", false).await.unwrap();
    assert!(ver.exists());

    client2.close().await;

    let (ver, _) = client.exists("/key", false).await.unwrap();
    assert_eq!(ver, Version::Absent);
}

#[tokio::test]
async fn test_create_leased() {
    for_each_prefix(create_leased).await;
}

#[tokio::test(start_paused = true)]
async fn test_create_leased_with_expiry_delay() {
    let mut config = KvConfig::default();
    config.session.expiry_delay_ms = 10_000;

    for prefix in PREFIXES {
        let h = Harness::with_config(prefix, &config);
        let client = h.client().await;
        let client2 = h.client().await;

        client2.create("/key", value(VALUE1), true).await.unwrap();
        client2.close().await;

        let (ver, _) = client.exists("/key", false).await.unwrap();
        assert!(ver.exists(), "lease expired early under {prefix:?}");

        tokio::time::sleep(Duration::from_secs(10) + MAX_LAG).await;
        let (ver, _) = client.exists("/key", false).await.unwrap();
        assert_eq!(ver, Version::Absent);
    }
}
