use pdf_engine::LopdfEngine;
use std::fs;
use std::path::PathBuf;
use viewer_core::{
    Command, RecordingSurface, SurfaceContent, ViewerConfig, ViewerController, ViewerError,
    OPEN_FAILURE_MESSAGE,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures").join(name)
}

fn library() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    fs::create_dir(dir.path().join("archive")).unwrap();
    fs::copy(fixture("three-pages.pdf"), dir.path().join("Quarterly Report.pdf")).unwrap();
    fs::copy(fixture("small.pdf"), dir.path().join("archive").join("old.PDF")).unwrap();
    fs::copy(fixture("invalid.pdf"), dir.path().join("broken.pdf")).unwrap();
    fs::write(dir.path().join("readme.txt"), b"not a pdf").unwrap();
    dir
}

fn viewer(root: &std::path::Path) -> ViewerController<LopdfEngine, RecordingSurface> {
    ViewerController::new(
        LopdfEngine::new(),
        RecordingSurface::default(),
        ViewerConfig::default().with_root(root),
    )
}

#[test]
fn browse_select_and_page_through() {
    let dir = library();
    let mut viewer = viewer(dir.path());

    let entries = viewer.browser().children(dir.path()).expect("root listing").to_vec();
    let names: Vec<_> = entries.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(names, vec!["archive", "broken.pdf", "Quarterly Report.pdf"]);

    let report = entries[2].path.clone();
    viewer.dispatch(Command::SelectFile(report.clone())).expect("report should open");
    assert_eq!(viewer.surface().page_label, "Page 1 / 3");

    viewer.dispatch(Command::NextPage).unwrap();
    viewer.dispatch(Command::NextPage).unwrap();
    viewer.dispatch(Command::NextPage).unwrap();
    assert_eq!(viewer.surface().page_label, "Page 3 / 3");
    assert!(!viewer.surface().next_enabled);

    assert_eq!(viewer.current_path(), Some(report.as_path()));
}

#[test]
fn expanded_folder_contents_can_be_opened() {
    let dir = library();
    let mut viewer = viewer(dir.path());
    let archive = dir.path().join("archive");

    viewer.dispatch(Command::ExpandDir(archive.clone())).unwrap();
    let old = viewer.browser().children(&archive).expect("archive listing")[0].path.clone();

    viewer.dispatch(Command::SelectFile(old)).expect("upper-case extension opens");
    assert_eq!(viewer.surface().page_label, "Page 1 / 1");
    assert!(!viewer.surface().prev_enabled);
    assert!(!viewer.surface().next_enabled);

    viewer.dispatch(Command::CollapseDir(archive.clone())).unwrap();
    assert!(!viewer.browser().is_expanded(&archive));
}

#[test]
fn broken_file_replaces_open_document_with_error() {
    let dir = library();
    let mut viewer = viewer(dir.path());

    viewer.dispatch(Command::SelectFile(dir.path().join("Quarterly Report.pdf"))).unwrap();
    let err = viewer
        .dispatch(Command::SelectFile(dir.path().join("broken.pdf")))
        .expect_err("garbage should not open");

    assert!(matches!(err, ViewerError::OpenFailure { .. }));
    assert!(!viewer.has_document());
    assert_eq!(viewer.engine().open_count(), 0);
    assert_eq!(
        viewer.surface().content,
        SurfaceContent::Message(OPEN_FAILURE_MESSAGE.to_owned())
    );
}

#[test]
fn search_text_narrows_the_tree() {
    let dir = library();
    let mut viewer = viewer(dir.path());

    viewer.dispatch(Command::FilterChanged("readme".to_owned())).unwrap();
    let names: Vec<_> = viewer
        .browser()
        .children(dir.path())
        .unwrap()
        .iter()
        .map(|entry| entry.name.clone())
        .collect();
    assert_eq!(names, vec!["archive", "readme.txt"]);

    viewer.dispatch(Command::FilterChanged("  ".to_owned())).unwrap();
    assert!(viewer.browser().filter().is_default());
}

#[test]
fn long_paths_are_shortened_in_the_status_bar() {
    let dir = library();
    let mut nested = dir.path().to_path_buf();
    for segment in ["a-rather-long-folder-name", "and-another-long-folder-name"] {
        nested.push(segment);
    }
    fs::create_dir_all(&nested).unwrap();
    let path = nested.join("deeply-nested-document.pdf");
    fs::copy(fixture("small.pdf"), &path).unwrap();
    let mut viewer = viewer(dir.path());

    viewer.select_file(&path).unwrap();

    let status = &viewer.surface().status;
    let full = path.to_str().unwrap();
    assert_eq!(status.chars().count(), 63);
    assert!(status.contains("..."));
    assert!(full.starts_with(&status[..36]));
    assert!(full.ends_with(&status[39..]));
}
