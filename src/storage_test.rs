use super::*;

use std::sync::atomic::AtomicUsize;

fn temp_path(name: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir()
        .join(format!("launchpad-storage-{}-{n}", std::process::id()))
        .join(format!("{name}.json"))
}

// =============================================================================
// MemoryStorage
// =============================================================================

#[test]
fn memory_get_missing_is_none() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.get_item("authToken").unwrap(), None);
}

#[test]
fn memory_set_then_get() {
    let storage = MemoryStorage::new();
    storage.set_item("authToken", "abc").unwrap();
    assert_eq!(storage.get_item("authToken").unwrap().as_deref(), Some("abc"));
}

#[test]
fn memory_remove_deletes_key() {
    let storage = MemoryStorage::new();
    storage.set_item("user", "{}").unwrap();
    storage.remove_item("user").unwrap();
    assert_eq!(storage.get_item("user").unwrap(), None);
    assert!(storage.keys().is_empty());
}

#[test]
fn memory_remove_missing_is_ok() {
    let storage = MemoryStorage::new();
    assert!(storage.remove_item("nope").is_ok());
}

#[test]
fn memory_unavailable_fails_every_call() {
    let storage = MemoryStorage::new();
    storage.set_item("authToken", "abc").unwrap();
    storage.set_unavailable(true);
    assert!(matches!(storage.get_item("authToken"), Err(StorageError::Unavailable(_))));
    assert!(matches!(storage.set_item("a", "b"), Err(StorageError::Unavailable(_))));
    assert!(matches!(storage.remove_item("a"), Err(StorageError::Unavailable(_))));

    storage.set_unavailable(false);
    assert_eq!(storage.get_item("authToken").unwrap().as_deref(), Some("abc"));
}

// =============================================================================
// FileStorage
// =============================================================================

#[test]
fn file_missing_reads_as_empty() {
    let storage = FileStorage::new(temp_path("missing"));
    assert_eq!(storage.get_item("authToken").unwrap(), None);
}

#[test]
fn file_persists_across_instances() {
    let path = temp_path("persist");
    FileStorage::new(&path).set_item("authToken", "abc").unwrap();

    let reopened = FileStorage::new(&path);
    assert_eq!(reopened.get_item("authToken").unwrap().as_deref(), Some("abc"));

    reopened.remove_item("authToken").unwrap();
    assert_eq!(FileStorage::new(&path).get_item("authToken").unwrap(), None);
}

#[test]
fn file_keeps_other_keys_on_write() {
    let storage = FileStorage::new(temp_path("multi"));
    storage.set_item("a", "1").unwrap();
    storage.set_item("b", "2").unwrap();
    storage.remove_item("a").unwrap();
    assert_eq!(storage.get_item("a").unwrap(), None);
    assert_eq!(storage.get_item("b").unwrap().as_deref(), Some("2"));
}

#[test]
fn file_corrupt_contents_is_error() {
    let path = temp_path("corrupt");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "not json").unwrap();

    let storage = FileStorage::new(&path);
    assert!(matches!(storage.get_item("authToken"), Err(StorageError::Corrupt(_))));
}

#[test]
fn file_write_replaces_corrupt_contents() {
    let path = temp_path("corrupt-write");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "not json").unwrap();

    let storage = FileStorage::new(&path);
    storage.set_item("authToken", "t").unwrap();

    assert_eq!(storage.get_item("authToken").unwrap().as_deref(), Some("t"));
}

#[test]
fn file_remove_replaces_corrupt_contents() {
    let path = temp_path("corrupt-remove");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ truncated").unwrap();

    let storage = FileStorage::new(&path);
    storage.remove_item("authToken").unwrap();

    assert_eq!(storage.get_item("authToken").unwrap(), None);
}
