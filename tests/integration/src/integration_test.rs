//! End-to-end integration test for a sync run on the local filesystem
//!
//! This exercises the complete flow: config loading -> engine -> disk state.

use std::fs;

use drivesync_core::{Action, SyncConfig, SyncEngine, SyncOptions, SyncReport};
use drivesync_fs::{LocalFs, MemoryFs};
use drivesync_test_utils::{DiskTree, epoch};
use filetime::FileTime;
use pretty_assertions::assert_eq;

/// Source tree with nested directories and distinct mtimes, plus an empty destination
fn setup_tree() -> DiskTree {
    DiskTree::new()
        .dir("src", 100)
        .file("src/a.txt", "alpha", 100)
        .dir("src/sub", 50)
        .file("src/sub/b.txt", "beta", 50)
        .dir("src/sub/deep", 40)
        .file("src/sub/deep/c.txt", "gamma", 30)
        .file("src/scratch.tmp", "junk", 60)
        .dir("dest", 1)
        .stamp()
}

fn run(tree: &DiskTree, source_rel: &str, options: &SyncOptions) -> SyncReport {
    let fs = LocalFs::new();
    SyncEngine::new(&fs, &fs, options)
        .unwrap()
        .sync(source_rel, &tree.vfs_path("dest"))
        .unwrap()
}

fn contents(tree: &DiskTree, rel: &str) -> String {
    format!("{}/", tree.vfs_path(rel))
}

#[test]
fn test_config_to_disk_flow() {
    let tree = setup_tree();
    let config_path = tree.path().join("drivesync.toml");
    fs::write(&config_path, "exclude = [\"*.tmp\"]\nin_place = true\n").unwrap();

    let config = SyncConfig::load(&config_path).unwrap();
    let options = SyncOptions::from(config);
    assert!(options.write_in_place);

    let report = run(&tree, &contents(&tree, "src"), &options);

    assert_eq!(tree.read("dest/a.txt"), "alpha");
    assert_eq!(tree.read("dest/sub/b.txt"), "beta");
    assert_eq!(tree.read("dest/sub/deep/c.txt"), "gamma");
    assert!(!tree.path().join("dest/scratch.tmp").exists());

    let summary = report.summary();
    assert_eq!(summary.copied, 3);
    assert_eq!(summary.created, 2);
    assert_eq!(summary.excluded, 1);
    assert_eq!(summary.bytes_copied, 14);
}

#[test]
fn test_mtimes_are_mirrored_for_files_and_directories() {
    let tree = setup_tree();

    run(&tree, &contents(&tree, "src"), &SyncOptions::default());

    assert_eq!(tree.mtime("dest/a.txt"), epoch(100));
    assert_eq!(tree.mtime("dest/sub/b.txt"), epoch(50));
    assert_eq!(tree.mtime("dest/sub/deep/c.txt"), epoch(30));
    // Directories were written into after creation; their mtimes must still match
    assert_eq!(tree.mtime("dest/sub/deep"), epoch(40));
    assert_eq!(tree.mtime("dest/sub"), epoch(50));
    assert_eq!(tree.mtime("dest"), epoch(100));
}

#[test]
fn test_directory_itself_lands_under_destination() {
    let tree = setup_tree();

    let report = run(&tree, &tree.vfs_path("src/sub"), &SyncOptions::default());

    assert_eq!(tree.read("dest/sub/b.txt"), "beta");
    assert_eq!(tree.mtime("dest/sub"), epoch(50));
    // The destination root is not a restored directory here
    assert_eq!(
        report.restored,
        vec![tree.vfs_path("dest/sub/deep"), tree.vfs_path("dest/sub")]
    );
}

#[test]
fn test_second_run_is_a_no_op() {
    let tree = setup_tree();
    let options = SyncOptions::default();

    run(&tree, &contents(&tree, "src"), &options);
    let second = run(&tree, &contents(&tree, "src"), &options);

    assert_eq!(second.summary().copied, 0);
    assert_eq!(second.summary().created, 0);
    assert!(second.entries.iter().all(|entry| entry.action == Action::Unchanged));
    assert_eq!(tree.mtime("dest/sub"), epoch(50));
}

#[test]
fn test_newer_source_is_recopied() {
    let tree = setup_tree();
    let options = SyncOptions::default();
    run(&tree, &contents(&tree, "src"), &options);

    let source = tree.path().join("src/a.txt");
    fs::write(&source, "alpha, revised").unwrap();
    filetime::set_file_mtime(&source, FileTime::from_unix_time(200, 0)).unwrap();

    let report = run(&tree, &contents(&tree, "src"), &options);

    let copied: Vec<_> = report.with_action("copied").map(|e| e.source.clone()).collect();
    assert_eq!(copied, vec![tree.vfs_path("src/a.txt")]);
    assert_eq!(tree.read("dest/a.txt"), "alpha, revised");
    assert_eq!(tree.mtime("dest/a.txt"), epoch(200));
}

#[test]
fn test_subsecond_change_is_not_detected() {
    let tree = setup_tree();
    let options = SyncOptions::default();
    run(&tree, &contents(&tree, "src"), &options);

    let source = tree.path().join("src/a.txt");
    fs::write(&source, "ALPHA").unwrap();
    filetime::set_file_mtime(&source, FileTime::from_unix_time(100, 900_000_000)).unwrap();

    let report = run(&tree, &contents(&tree, "src"), &options);

    assert_eq!(report.summary().copied, 0);
    assert_eq!(tree.read("dest/a.txt"), "alpha");
}

#[test]
fn test_memory_source_into_disk_destination() {
    let tree = DiskTree::new().dir("dest", 1).stamp();
    let source = MemoryFs::new();
    source
        .add_dir("mem", epoch(30))
        .add_file("mem/x.txt", "from memory", epoch(40));
    let dest = LocalFs::new();

    let options = SyncOptions::default();
    let report = SyncEngine::new(&source, &dest, &options)
        .unwrap()
        .sync("mem/", &tree.vfs_path("dest"))
        .unwrap();

    assert_eq!(report.summary().copied, 1);
    assert_eq!(tree.read("dest/x.txt"), "from memory");
    assert_eq!(tree.mtime("dest/x.txt"), epoch(40));
    assert_eq!(tree.mtime("dest"), epoch(30));
}
