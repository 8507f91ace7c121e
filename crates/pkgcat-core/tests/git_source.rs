mod support;

use std::path::Path;
use std::process::Command;

use git2::{Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

use pkgcat_core::cache::CacheManager;
use pkgcat_core::error::PackageError;
use pkgcat_core::git::{GitFetcher, GitSpec};
use pkgcat_core::registry::{LayoutValidator, Registry};
use pkgcat_core::source::{Source, SourceResolver};

use support::{TreeBuilder, file_uri};

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

/// Commit every file under `root` to a fresh repository on `master`.
fn commit_tree(root: &Path) -> Repository {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("master");
    let repo = Repository::init_opts(root, &opts).unwrap();

    let tree_id = {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        index.write_tree().unwrap()
    };
    {
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Packager", "packager@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "Initial registry", &tree, &[])
            .unwrap();
    }
    repo
}

fn registry_repo(root: &Path) {
    TreeBuilder::new(root)
        .package("marathon", &["0"], "Init system", &["paas"])
        .build();
    commit_tree(root);
}

#[test]
fn clone_drops_git_metadata() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let temp = TempDir::new().unwrap();
    let upstream = temp.path().join("upstream");
    registry_repo(&upstream);
    let target = temp.path().join("stage");

    GitFetcher::new()
        .clone_shallow(&GitSpec::new(file_uri(&upstream)), &target)
        .unwrap();

    assert!(target.join("repo/meta/index.json").is_file());
    assert!(target.join("repo/packages/M/marathon/0/marathon.json").is_file());
    assert!(!target.join(".git").exists());
}

#[test]
fn missing_branch_is_fetch_error() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let temp = TempDir::new().unwrap();
    let upstream = temp.path().join("upstream");
    registry_repo(&upstream);
    let target = temp.path().join("stage");

    let spec = GitSpec::new(file_uri(&upstream)).with_branch("no-such-branch");
    let err = GitFetcher::new().clone_shallow(&spec, &target).unwrap_err();

    assert!(matches!(err, PackageError::Fetch { .. }));
}

#[test]
fn git_source_refreshes_into_cache() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let temp = TempDir::new().unwrap();
    let upstream = temp.path().join("upstream");
    registry_repo(&upstream);
    let cache_root = temp.path().join("cache");

    let source = Source::Git(GitSpec::new(file_uri(&upstream)));
    let report = CacheManager::new(&cache_root)
        .with_validator(LayoutValidator)
        .refresh(std::slice::from_ref(&source))
        .unwrap();

    assert!(report.is_success(), "{:?}", report.errors);
    let package = Registry::cached(source.clone(), &cache_root)
        .package("marathon")
        .unwrap();
    assert_eq!(package.versions().unwrap(), vec!["0"]);
    assert!(!source.cache_dir(&cache_root).join(".git").exists());
}

#[test]
fn git_scheme_resolves_to_master() {
    let source = SourceResolver::parse("git://github.com/mesosphere/universe.git").unwrap();

    let spec = source.as_git().unwrap();
    assert_eq!(spec.branch, "master");
    assert_eq!(source.uri(), "git://github.com/mesosphere/universe.git");
}
