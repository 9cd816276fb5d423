//! End-to-end reconciliation behaviour against a scripted collection service.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use colsync_core::{Artifact, ArtifactName, RemoteId, RemoteSummary};
use colsync_remote::mock::{Call, MockCollectionClient};
use colsync_remote::{RemoteError, RemoteErrorKind};
use colsync_sync::{IdentityCache, Resolution, ResolvedBy, SyncEngine, SyncOutcome};
use rstest::rstest;
use serde_json::{json, Value};
use tempfile::TempDir;

fn billing() -> Artifact {
    Artifact::from_collection(json!({"info": {"name": "Billing API"}, "item": []}))
        .expect("artifact")
}

fn summary(uid: &str, name: &str, hour: u32) -> RemoteSummary {
    RemoteSummary {
        uid: RemoteId::from(uid),
        name: name.to_string(),
        updated_at: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
    }
}

fn cache_path(root: &TempDir) -> PathBuf {
    IdentityCache::path_at(root.path())
}

fn seed_cache(path: &Path, raw: Value) {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, raw.to_string()).expect("write cache");
}

fn read_cache(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).expect("read cache")).expect("cache json")
}

#[test]
fn scenario_a_empty_cache_and_remote_creates_and_caches() {
    let root = TempDir::new().unwrap();
    let client = MockCollectionClient::new();
    client.push_create(Ok(RemoteId::from("new-uid")));
    let engine = SyncEngine::new(&client, cache_path(&root));

    let report = engine.sync(&billing(), &Resolution::Lookup).unwrap();

    assert_eq!(
        report.outcome,
        SyncOutcome::Created {
            uid: RemoteId::from("new-uid")
        }
    );
    assert_eq!(report.resolved_by, Some(ResolvedBy::NewResource));
    assert_eq!(client.calls(), vec![Call::List, Call::Create]);
    assert_eq!(
        read_cache(&cache_path(&root)),
        json!({"Billing API": {"name": "Billing API", "uid": "new-uid"}})
    );
}

#[test]
fn scenario_b_stale_cache_heals_through_listing() {
    let root = TempDir::new().unwrap();
    let path = cache_path(&root);
    seed_cache(&path, json!({"Billing API": {"uid": "abc"}}));

    let client = MockCollectionClient::new();
    client
        .push_update(Err(RemoteError::not_found("collection abc not found")))
        .push_listing(Ok(vec![summary("def", "Billing API", 9)]));
    let engine = SyncEngine::new(&client, &path);

    let report = engine.sync(&billing(), &Resolution::Lookup).unwrap();

    assert_eq!(
        report.outcome,
        SyncOutcome::Updated {
            uid: RemoteId::from("def")
        }
    );
    assert!(report.retried);
    assert_eq!(client.list_calls(), 1);
    assert_eq!(
        client.updated_uids(),
        vec![RemoteId::from("abc"), RemoteId::from("def")]
    );
    assert_eq!(
        read_cache(&path),
        json!({"Billing API": {"name": "Billing API", "uid": "def"}})
    );
}

#[test]
fn warm_cache_syncs_are_single_updates_without_listing() {
    let root = TempDir::new().unwrap();
    let client = MockCollectionClient::new();
    client.push_listing(Ok(vec![summary("u-1", "Billing API", 1)]));
    let engine = SyncEngine::new(&client, cache_path(&root));

    engine.sync(&billing(), &Resolution::Lookup).unwrap();
    let after_first = client.calls().len();

    let second = engine.sync(&billing(), &Resolution::Lookup).unwrap();
    let third = engine.sync(&billing(), &Resolution::Lookup).unwrap();

    let later_calls = client.calls()[after_first..].to_vec();
    assert_eq!(
        later_calls,
        vec![
            Call::Update(RemoteId::from("u-1")),
            Call::Update(RemoteId::from("u-1")),
        ]
    );
    assert_eq!(second.resolved_by, Some(ResolvedBy::Cache));
    assert_eq!(third.resolved_by, Some(ResolvedBy::Cache));
}

#[test]
fn created_collection_is_a_cache_hit_next_time() {
    let root = TempDir::new().unwrap();
    let client = MockCollectionClient::new();
    let engine = SyncEngine::new(&client, cache_path(&root));

    let first = engine.sync(&billing(), &Resolution::Lookup).unwrap();
    let created = first.outcome.uid().cloned().expect("created uid");

    let second = engine.sync(&billing(), &Resolution::Lookup).unwrap();
    assert_eq!(second.outcome, SyncOutcome::Updated { uid: created.clone() });
    assert_eq!(
        client.calls(),
        vec![Call::List, Call::Create, Call::Update(created)]
    );
}

#[rstest]
#[case::no_match_after_heal(vec![], Call::Create)]
#[case::match_after_heal(
    vec![summary("fresh", "billing api", 3)],
    Call::Update(RemoteId::from("fresh"))
)]
fn stale_uid_triggers_exactly_one_listing(
    #[case] listing: Vec<RemoteSummary>,
    #[case] final_call: Call,
) {
    let root = TempDir::new().unwrap();
    let path = cache_path(&root);
    seed_cache(&path, json!({"Billing API": {"name": "Billing API", "uid": "gone"}}));

    let client = MockCollectionClient::new();
    client
        .push_update(Err(RemoteError::not_found("gone")))
        .push_listing(Ok(listing));
    let engine = SyncEngine::new(&client, &path);

    let report = engine.sync(&billing(), &Resolution::Lookup).unwrap();

    assert!(!report.outcome.is_failed());
    assert_eq!(
        client.calls(),
        vec![Call::Update(RemoteId::from("gone")), Call::List, final_call]
    );
}

#[test]
fn retry_is_bounded_when_service_keeps_reporting_not_found() {
    let root = TempDir::new().unwrap();
    let path = cache_path(&root);
    seed_cache(&path, json!({"Billing API": {"name": "Billing API", "uid": "gone"}}));

    let client = MockCollectionClient::new();
    client
        .push_update(Err(RemoteError::not_found("gone")))
        .push_listing(Ok(vec![summary("also-gone", "Billing API", 1)]))
        .push_update(Err(RemoteError::not_found("also gone")))
        .push_update(Err(RemoteError::not_found("never reached")));
    let engine = SyncEngine::new(&client, &path);

    let report = engine.sync(&billing(), &Resolution::Lookup).unwrap();

    assert!(report.outcome.is_failed());
    assert_eq!(client.list_calls(), 1);
    assert_eq!(client.updated_uids().len(), 2);
}

#[test]
fn failed_relisting_after_stale_uid_is_final() {
    let root = TempDir::new().unwrap();
    let path = cache_path(&root);
    seed_cache(&path, json!({"Billing API": {"name": "Billing API", "uid": "abc"}}));

    let client = MockCollectionClient::new();
    client
        .push_update(Err(RemoteError::not_found("collection abc not found")))
        .push_listing(Err(RemoteError::new(
            RemoteErrorKind::Rejected { status: 401 },
            "Invalid API Key.",
            json!({"name": "AuthenticationError", "message": "Invalid API Key."}),
        )));
    let engine = SyncEngine::new(&client, &path);

    let report = engine.sync(&billing(), &Resolution::Lookup).unwrap();

    assert!(report.outcome.is_failed());
    assert!(report.retried);
    assert_eq!(report.resolved_by, None);
    assert_eq!(
        client.calls(),
        vec![Call::Update(RemoteId::from("abc")), Call::List]
    );
    assert_eq!(client.create_calls(), 0);
    assert_eq!(read_cache(&path), json!({}));
}

#[test]
fn unwritable_cache_does_not_change_outcome() {
    let root = TempDir::new().unwrap();
    let blocker = root.path().join("blocker");
    fs::write(&blocker, "a regular file, not a directory").unwrap();
    let path = blocker.join("ids.json");

    let client = MockCollectionClient::new();
    client.push_create(Ok(RemoteId::from("x")));
    let engine = SyncEngine::new(&client, &path);

    let report = engine.sync(&billing(), &Resolution::Lookup).unwrap();

    assert_eq!(
        report.outcome,
        SyncOutcome::Created {
            uid: RemoteId::from("x")
        }
    );
    assert_eq!(report.resolved_by, Some(ResolvedBy::NewResource));
    assert_eq!(client.calls(), vec![Call::List, Call::Create]);
    assert!(!path.exists());
    assert!(blocker.is_file());
}

#[test]
fn ambiguous_names_resolve_to_most_recently_updated() {
    let root = TempDir::new().unwrap();
    let client = MockCollectionClient::new();
    client.push_listing(Ok(vec![
        summary("t2", "billing API", 14),
        summary("t1", "Billing API", 9),
        summary("other", "Orders API", 23),
    ]));
    let engine = SyncEngine::new(&client, cache_path(&root));

    let report = engine.sync(&billing(), &Resolution::Lookup).unwrap();

    assert_eq!(
        report.outcome,
        SyncOutcome::Updated {
            uid: RemoteId::from("t2")
        }
    );
    assert_eq!(report.ambiguous_candidates, 2);
    assert_eq!(client.updated_uids(), vec![RemoteId::from("t2")]);
}

#[rstest]
#[case::garbage("not json at all")]
#[case::truncated("{\"Billing API\": {\"name\": \"Billing API\", \"ui")]
#[case::wrong_shape("[\"Billing API\", \"abc\"]")]
#[case::empty("")]
fn corrupt_cache_behaves_like_empty_cache(#[case] contents: &str) {
    let root = TempDir::new().unwrap();
    let path = cache_path(&root);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();

    let client = MockCollectionClient::new();
    client.push_create(Ok(RemoteId::from("fresh")));
    let engine = SyncEngine::new(&client, &path);

    let report = engine.sync(&billing(), &Resolution::Lookup).unwrap();

    assert_eq!(
        report.outcome,
        SyncOutcome::Created {
            uid: RemoteId::from("fresh")
        }
    );
    assert_eq!(client.calls(), vec![Call::List, Call::Create]);
    assert_eq!(
        read_cache(&path),
        json!({"Billing API": {"name": "Billing API", "uid": "fresh"}})
    );
}

#[test]
fn pinned_uid_updates_once_and_leaves_cache_file_alone() {
    let root = TempDir::new().unwrap();
    let path = cache_path(&root);
    let original = json!({"Billing API": {"name": "Billing API", "uid": "cached"}});
    seed_cache(&path, original.clone());
    let before = fs::read_to_string(&path).unwrap();

    let client = MockCollectionClient::new();
    let engine = SyncEngine::new(&client, &path);

    let report = engine
        .sync(&billing(), &Resolution::Pinned(RemoteId::from("pinned")))
        .unwrap();

    assert_eq!(
        report.outcome,
        SyncOutcome::Updated {
            uid: RemoteId::from("pinned")
        }
    );
    assert_eq!(client.calls(), vec![Call::Update(RemoteId::from("pinned"))]);
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn pinned_uid_never_creates_cache_file() {
    let root = TempDir::new().unwrap();
    let path = cache_path(&root);
    let client = MockCollectionClient::new();
    client.push_update(Err(RemoteError::not_found("no such collection")));
    let engine = SyncEngine::new(&client, &path);

    let report = engine
        .sync(&billing(), &Resolution::Pinned(RemoteId::from("pinned")))
        .unwrap();

    assert!(report.outcome.is_failed());
    assert_eq!(client.calls().len(), 1);
    assert!(!path.exists());
}

#[test]
fn cache_keys_are_exact_so_renamed_artifacts_resolve_remotely() {
    let root = TempDir::new().unwrap();
    let path = cache_path(&root);
    seed_cache(&path, json!({"billing api": {"name": "billing api", "uid": "lower"}}));

    let client = MockCollectionClient::new();
    client.push_listing(Ok(vec![summary("remote", "billing api", 1)]));
    let engine = SyncEngine::new(&client, &path);

    let report = engine.sync(&billing(), &Resolution::Lookup).unwrap();

    assert_eq!(report.resolved_by, Some(ResolvedBy::Listing));
    let cache = IdentityCache::load(&path);
    assert_eq!(cache.len(), 2);
    assert_eq!(
        cache.lookup(&ArtifactName::from("Billing API")).unwrap().uid,
        RemoteId::from("remote")
    );
}
