use std::fs::{self, File};
use std::path::{Path, PathBuf};

use super::model::{CatalogError, TrackCatalog};
use super::scan::ScanControl;

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap();
}

fn catalog_over(files: &[&str]) -> (tempfile::TempDir, TrackCatalog) {
    let dir = tempfile::tempdir().unwrap();
    for f in files {
        touch(&dir.path().join(f));
    }
    let mut catalog = TrackCatalog::new();
    catalog.set_root(dir.path()).unwrap();
    (dir, catalog)
}

#[test]
fn set_root_rejects_non_directories() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("song.mp3");
    touch(&file);

    let mut catalog = TrackCatalog::new();
    assert!(matches!(
        catalog.set_root(&file),
        Err(CatalogError::NotADirectory(_))
    ));
    assert!(matches!(
        catalog.set_root(&dir.path().join("missing")),
        Err(CatalogError::NotADirectory(_))
    ));
    assert!(catalog.root().is_none());
    assert!(catalog.is_empty());
}

#[test]
fn scan_finds_supported_extensions_recursively() {
    let (_dir, catalog) = catalog_over(&[
        "one.mp3",
        "two.FLAC",
        "sub/three.ogg",
        "sub/deeper/four.wav",
        "notes.txt",
        "cover.jpg",
    ]);

    assert_eq!(catalog.len(), 4);
    // Extension matching is case-insensitive; paths stay relative.
    assert!(catalog.tracks().contains(&PathBuf::from("two.FLAC")));
    assert!(
        catalog
            .tracks()
            .contains(&PathBuf::from("sub/deeper/four.wav"))
    );
    assert!(!catalog.tracks().iter().any(|t| t.ends_with("notes.txt")));
}

#[test]
fn rescan_replaces_track_list() {
    let (dir, mut catalog) = catalog_over(&["a.mp3", "b.mp3"]);
    assert_eq!(catalog.len(), 2);

    fs::remove_file(dir.path().join("b.mp3")).unwrap();
    touch(&dir.path().join("c.ogg"));
    catalog.rescan();

    assert_eq!(catalog.len(), 2);
    assert!(!catalog.tracks().contains(&PathBuf::from("b.mp3")));
    assert!(catalog.tracks().contains(&PathBuf::from("c.ogg")));
}

#[test]
fn progress_reports_running_count_and_total() {
    let (_dir, mut catalog) = catalog_over(&["a.mp3", "b.mp3", "c.mp3", "skip.txt"]);

    let mut reports = Vec::new();
    catalog.rescan_with_progress(|found, total| {
        reports.push((found, total));
        ScanControl::Continue
    });

    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|&(_, total)| total == 3));
    let found: Vec<usize> = reports.iter().map(|&(f, _)| f).collect();
    assert_eq!(found, vec![1, 2, 3]);
}

#[test]
fn cancel_keeps_partial_results() {
    let (_dir, mut catalog) = catalog_over(&["a.mp3", "b.mp3", "c.mp3"]);

    catalog.rescan_with_progress(|found, _| {
        if found >= 2 {
            ScanControl::Cancel
        } else {
            ScanControl::Continue
        }
    });

    assert_eq!(catalog.len(), 2);
}

#[test]
fn filter_is_case_insensitive_substring() {
    let (_dir, catalog) = catalog_over(&["Morning Song.mp3", "evening.ogg", "Night Drive.wav"]);

    let marks = catalog.filter("NIGHT");
    let visible: Vec<&Path> = marks
        .iter()
        .filter(|(_, v)| *v)
        .map(|(p, _)| *p)
        .collect();
    assert_eq!(visible, vec![Path::new("Night Drive.wav")]);

    // Empty needle marks everything visible.
    assert!(catalog.filter("").iter().all(|(_, v)| *v));
}

#[test]
fn resolve_joins_against_root() {
    let (dir, catalog) = catalog_over(&["sub/tune.mp3"]);

    let abs = catalog.resolve(Path::new("sub/tune.mp3")).unwrap();
    assert_eq!(abs, dir.path().join("sub/tune.mp3"));

    let empty = TrackCatalog::new();
    assert!(matches!(
        empty.resolve(Path::new("x.mp3")),
        Err(CatalogError::NoActiveFolder)
    ));
}
