mod support;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tempfile::TempDir;

use pkgcat_core::cache::{CacheLock, CacheManager, RefreshObserver};
use pkgcat_core::error::PackageError;
use pkgcat_core::registry::Registry;
use pkgcat_core::source::{Source, SourceResolver};

use support::{TreeBuilder, file_uri, reject_marked};

fn source_tree(base: &Path, name: &str, generation: &str) -> PathBuf {
    TreeBuilder::new(base.join(name))
        .package(name, &["0"], &format!("{name} package"), &[])
        .file("generation", generation)
        .build()
}

fn source_for(path: &Path) -> Source {
    SourceResolver::parse(&file_uri(path)).unwrap()
}

fn committed_generation(cache_root: &Path, source: &Source) -> Option<String> {
    fs::read_to_string(source.cache_dir(cache_root).join("generation")).ok()
}

/// Seed a committed cache directory directly, as a previous refresh would have.
fn seed_cache(cache_root: &Path, source: &Source, generation: &str) {
    let scratch = TempDir::new().unwrap();
    let tree = source_tree(scratch.path(), "seed", generation);
    let target = source.cache_dir(cache_root);
    fs::create_dir_all(cache_root).unwrap();
    pkgcat_core::fs::copy_tree(&tree, &target).unwrap();
}

#[test]
fn refresh_populates_cache_layout() {
    let temp = TempDir::new().unwrap();
    let cache_root = temp.path().join("cache");
    let src = source_tree(temp.path(), "spark", "new");
    let source = source_for(&src);

    let report = CacheManager::new(&cache_root)
        .with_validator(reject_marked)
        .refresh(std::slice::from_ref(&source))
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.updated, vec![source.clone()]);

    let cache_dir = cache_root.join(source.cache_key());
    assert!(cache_dir.join("repo/meta/index.json").is_file());
    assert!(cache_dir.join("repo/packages/S/spark/0/package.json").is_file());
    assert!(cache_dir.join("repo/packages/S/spark/0/marathon.json").is_file());
}

#[test]
fn middle_source_failing_validation_is_isolated() {
    let temp = TempDir::new().unwrap();
    let cache_root = temp.path().join("cache");

    let first = source_for(&source_tree(temp.path(), "alpha", "new"));
    let second_path = source_tree(temp.path(), "bravo", "new");
    fs::write(second_path.join("INVALID"), "").unwrap();
    let second = source_for(&second_path);
    let third = source_for(&source_tree(temp.path(), "charlie", "new"));

    seed_cache(&cache_root, &first, "old");
    seed_cache(&cache_root, &second, "old");

    let report = CacheManager::new(&cache_root)
        .with_validator(reject_marked)
        .refresh(&[first.clone(), second.clone(), third.clone()])
        .unwrap();

    assert_eq!(report.errors.len(), 1);
    assert!(matches!(report.errors[0], PackageError::Validation { .. }));
    assert_eq!(report.updated, vec![first.clone(), third.clone()]);

    assert_eq!(committed_generation(&cache_root, &first).as_deref(), Some("new"));
    assert_eq!(committed_generation(&cache_root, &third).as_deref(), Some("new"));
    assert_eq!(committed_generation(&cache_root, &second).as_deref(), Some("old"));

    // Fully replaced, not merged: the seeded package is gone from source #1.
    let first_cache = first.cache_dir(&cache_root);
    assert!(!first_cache.join("repo/packages/S/seed").exists());
    assert!(first_cache.join("repo/packages/A/alpha/0").is_dir());

    // Source #2 still holds exactly its previous tree.
    let second_cache = second.cache_dir(&cache_root);
    assert!(second_cache.join("repo/packages/S/seed/0").is_dir());
    assert!(!second_cache.join("INVALID").exists());
}

#[test]
fn fetch_failure_keeps_previous_cache_and_continues() {
    let temp = TempDir::new().unwrap();
    let cache_root = temp.path().join("cache");

    let gone = source_for(&temp.path().join("does-not-exist"));
    let http = SourceResolver::parse("https://my.org/registry").unwrap();
    let good = source_for(&source_tree(temp.path(), "delta", "new"));
    seed_cache(&cache_root, &gone, "old");

    let report = CacheManager::new(&cache_root)
        .with_validator(reject_marked)
        .refresh(&[gone.clone(), http, good.clone()])
        .unwrap();

    assert_eq!(report.errors.len(), 2);
    assert!(matches!(report.errors[0], PackageError::Fetch { .. }));
    assert!(matches!(report.errors[1], PackageError::NotImplemented { .. }));
    assert_eq!(committed_generation(&cache_root, &gone).as_deref(), Some("old"));
    assert_eq!(committed_generation(&cache_root, &good).as_deref(), Some("new"));
}

#[test]
fn refresh_while_locked_fails_fast() {
    let temp = TempDir::new().unwrap();
    let cache_root = temp.path().join("cache");
    fs::create_dir_all(&cache_root).unwrap();
    let source = source_for(&source_tree(temp.path(), "echo", "new"));

    let _held = CacheLock::try_acquire(&cache_root).unwrap();

    let started = Instant::now();
    let err = CacheManager::new(&cache_root)
        .with_validator(reject_marked)
        .refresh(&[source.clone()])
        .unwrap_err();

    assert!(matches!(err, PackageError::LockBusy { .. }));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!source.cache_dir(&cache_root).exists());
}

#[test]
fn lock_is_released_after_refresh() {
    let temp = TempDir::new().unwrap();
    let cache_root = temp.path().join("cache");
    let manager = CacheManager::new(&cache_root).with_validator(reject_marked);

    manager.refresh(&[]).unwrap();
    manager.refresh(&[]).unwrap();

    assert!(CacheLock::try_acquire(&cache_root).is_ok());
}

#[test]
fn committed_tree_is_whole_while_new_content_is_staged() {
    let temp = TempDir::new().unwrap();
    let cache_root = temp.path().join("cache");
    let source = source_for(&source_tree(temp.path(), "foxtrot", "new"));
    seed_cache(&cache_root, &source, "old");

    let committed = source.cache_dir(&cache_root);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in_hook = Arc::clone(&seen);
    let observing_validator = move |staged: &Path| -> Result<(), Vec<String>> {
        let generation = fs::read_to_string(committed.join("generation")).unwrap_or_default();
        let has_old_package = committed.join("repo/packages/S/seed/0/package.json").is_file();
        let staged_generation = fs::read_to_string(staged.join("generation")).unwrap_or_default();
        seen_in_hook
            .lock()
            .unwrap()
            .push((generation, has_old_package, staged_generation));
        Ok(())
    };

    CacheManager::new(&cache_root)
        .with_validator(observing_validator)
        .refresh(&[source.clone()])
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], ("old".to_string(), true, "new".to_string()));
    assert_eq!(committed_generation(&cache_root, &source).as_deref(), Some("new"));
}

#[test]
fn interrupted_refresh_leaves_committed_tree_readable() {
    let temp = TempDir::new().unwrap();
    let cache_root = temp.path().join("cache");
    let source = source_for(&source_tree(temp.path(), "golf", "new"));
    seed_cache(&cache_root, &source, "old");

    // A refresh that died mid-fetch leaves only a partial staging directory.
    let partial = cache_root.join(".staging-crashed").join(source.cache_key());
    fs::create_dir_all(partial.join("repo/meta")).unwrap();
    fs::write(partial.join("repo/meta/index.json"), "{\"packa").unwrap();

    let registry = Registry::cached(source.clone(), &cache_root);
    let index = registry.index().unwrap();
    assert_eq!(index.packages[0].name, "seed");
    assert_eq!(committed_generation(&cache_root, &source).as_deref(), Some("old"));

    // The next refresh clears the leftovers and commits the new tree.
    CacheManager::new(&cache_root)
        .with_validator(reject_marked)
        .refresh(&[source.clone()])
        .unwrap();

    assert!(!cache_root.join(".staging-crashed").exists());
    let index = Registry::cached(source.clone(), &cache_root).index().unwrap();
    assert_eq!(index.packages[0].name, "golf");
}

#[derive(Default)]
struct RecordingObserver {
    events: Arc<Mutex<Vec<String>>>,
}

impl RefreshObserver for RecordingObserver {
    fn source_started(&self, source: &Source) {
        self.events.lock().unwrap().push(format!("start {}", source));
    }

    fn source_updated(&self, source: &Source, _cache_dir: &Path) {
        self.events.lock().unwrap().push(format!("updated {}", source));
    }

    fn source_failed(&self, source: &Source, _error: &PackageError) {
        self.events.lock().unwrap().push(format!("failed {}", source));
    }
}

#[test]
fn observer_sees_every_source_in_order() {
    let temp = TempDir::new().unwrap();
    let cache_root = temp.path().join("cache");
    let good = source_for(&source_tree(temp.path(), "hotel", "new"));
    let bad = SourceResolver::parse("http://my.org/registry").unwrap();

    let observer = RecordingObserver::default();
    let events = Arc::clone(&observer.events);

    CacheManager::new(&cache_root)
        .with_validator(reject_marked)
        .with_observer(observer)
        .refresh(&[bad.clone(), good.clone()])
        .unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            format!("start {}", bad),
            format!("failed {}", bad),
            format!("start {}", good),
            format!("updated {}", good),
        ]
    );
}
