use super::*;

use std::sync::Mutex;

use serde_json::json;

use crate::storage::{MemoryStorage, StorageError};

/// Storage wrapper that records the order of mutating calls.
#[derive(Default)]
struct RecordingStorage {
    inner: MemoryStorage,
    ops: Mutex<Vec<String>>,
}

impl RecordingStorage {
    fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }
}

impl Storage for RecordingStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.ops.lock().unwrap().push(format!("set:{key}"));
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.ops.lock().unwrap().push(format!("remove:{key}"));
        self.inner.remove_item(key)
    }
}

fn store() -> (TokenStore, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    (TokenStore::new(storage.clone()), storage)
}

fn user() -> UserRecord {
    UserRecord::new(json!({ "_id": "u1", "name": "Ada", "email": "ada@example.com" }))
}

// =============================================================================
// get / set
// =============================================================================

#[test]
fn empty_store_has_no_token() {
    let (store, _) = store();
    assert!(store.get().is_none());
    assert!(store.user().is_none());
}

#[test]
fn set_then_get_returns_token_and_user() {
    let (store, _) = store();
    store.set(&BearerToken::new("abc"), &user());
    assert_eq!(store.get().unwrap().as_str(), "abc");
    assert_eq!(store.user().unwrap(), user());
}

#[test]
fn set_writes_user_id_key() {
    let (store, storage) = store();
    store.set(&BearerToken::new("abc"), &user());
    assert_eq!(storage.get_item(USER_ID_KEY).unwrap().as_deref(), Some("u1"));
}

#[test]
fn set_without_id_removes_stale_user_id() {
    let (store, storage) = store();
    storage.set_item(USER_ID_KEY, "old").unwrap();
    store.set(&BearerToken::new("abc"), &UserRecord::new(json!({ "name": "Anon" })));
    assert_eq!(storage.get_item(USER_ID_KEY).unwrap(), None);
}

#[test]
fn empty_token_reads_as_absent() {
    let (store, storage) = store();
    storage.set_item(AUTH_TOKEN_KEY, "").unwrap();
    assert!(store.get().is_none());
}

#[test]
fn malformed_user_reads_as_none() {
    let (store, storage) = store();
    storage.set_item(USER_KEY, "{not json").unwrap();
    assert!(store.user().is_none());
}

#[test]
fn non_object_user_passes_through() {
    let (store, storage) = store();
    storage.set_item(USER_KEY, "[1,2,3]").unwrap();
    assert_eq!(store.user().unwrap().as_value(), &json!([1, 2, 3]));
}

// =============================================================================
// write ordering
// =============================================================================

#[test]
fn set_reports_failed_token_write() {
    let (store, storage) = store();
    storage.set_unavailable(true);
    assert!(!store.set(&BearerToken::new("abc"), &user()));

    storage.set_unavailable(false);
    assert!(store.get().is_none());
    assert!(store.set(&BearerToken::new("abc"), &user()));
}

#[test]
fn set_writes_token_last() {
    let storage = Arc::new(RecordingStorage::default());
    let store = TokenStore::new(storage.clone());
    store.set(&BearerToken::new("abc"), &user());
    assert_eq!(storage.ops().last().map(String::as_str), Some("set:authToken"));
}

#[test]
fn clear_removes_token_first() {
    let storage = Arc::new(RecordingStorage::default());
    let store = TokenStore::new(storage.clone());
    store.clear();
    let ops = storage.ops();
    assert_eq!(ops.first().map(String::as_str), Some("remove:authToken"));
    assert_eq!(ops.len(), 5);
}

// =============================================================================
// clear / clear_credentials
// =============================================================================

#[test]
fn clear_removes_every_session_key() {
    let (store, storage) = store();
    store.set(&BearerToken::new("abc"), &user());
    store.set_startup_id("s1");
    storage.set_item(NOTIFICATION_SETTINGS_KEY, "{}").unwrap();
    storage.set_item("theme", "dark").unwrap();

    store.clear();

    assert!(store.get().is_none());
    assert!(store.user().is_none());
    assert!(store.startup_id().is_none());
    assert_eq!(storage.keys(), vec!["theme".to_owned()]);
}

#[test]
fn clear_credentials_keeps_startup_id() {
    let (store, _) = store();
    store.set(&BearerToken::new("abc"), &user());
    store.set_startup_id("s1");

    store.clear_credentials();

    assert!(store.get().is_none());
    assert!(store.user().is_none());
    assert_eq!(store.startup_id().as_deref(), Some("s1"));
}

// =============================================================================
// unavailable medium
// =============================================================================

#[test]
fn unavailable_storage_reads_as_absent() {
    let (store, storage) = store();
    store.set(&BearerToken::new("abc"), &user());
    storage.set_unavailable(true);
    assert!(store.get().is_none());
    assert!(store.user().is_none());
}

#[test]
fn unavailable_storage_writes_do_not_panic() {
    let (store, storage) = store();
    storage.set_unavailable(true);
    store.set(&BearerToken::new("abc"), &user());
    store.clear();
    storage.set_unavailable(false);
    assert!(store.get().is_none());
}
