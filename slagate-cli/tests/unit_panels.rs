use slagate_cli::config::{EXIT_PANELS_USAGE, EXIT_PANELS_WRONG_KIND};
use slagate_cli::panels::{collect_pngs, resolve, title_for, PanelPathError, PanelSource};
use std::path::Path;

#[test]
fn test_collect_pngs_sorted_and_filtered() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["b_latency.png", "a_errors.png", "notes.txt", "c_cpu.PNG"] {
        std::fs::write(dir.path().join(name), b"x").unwrap();
    }
    std::fs::create_dir(dir.path().join("nested.png")).unwrap();

    let files = collect_pngs(dir.path()).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a_errors.png", "b_latency.png"]);
}

#[test]
fn test_resolve_folder_and_zip() {
    let dir = tempfile::tempdir().unwrap();
    let zip = dir.path().join("panels.zip");
    std::fs::write(&zip, b"PK").unwrap();
    std::fs::write(dir.path().join("p95.png"), b"x").unwrap();

    assert_eq!(resolve(&zip, true).unwrap(), PanelSource::Zip(zip.clone()));
    assert_eq!(
        resolve(dir.path(), false).unwrap(),
        PanelSource::Folder(vec![dir.path().join("p95.png")])
    );
}

#[test]
fn test_resolve_errors_map_to_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let zip = dir.path().join("panels.zip");
    std::fs::write(&zip, b"PK").unwrap();

    let missing = resolve(&dir.path().join("gone"), false).unwrap_err();
    assert!(matches!(missing, PanelPathError::NotFound(_)));
    assert_eq!(missing.exit_code(), EXIT_PANELS_USAGE);

    let folder_with_zip_flag = resolve(dir.path(), true).unwrap_err();
    assert!(matches!(folder_with_zip_flag, PanelPathError::ExpectedFile(_)));
    assert_eq!(folder_with_zip_flag.exit_code(), EXIT_PANELS_WRONG_KIND);

    let file_without_zip_flag = resolve(&zip, false).unwrap_err();
    assert!(matches!(file_without_zip_flag, PanelPathError::ExpectedFolder(_)));
    assert_eq!(file_without_zip_flag.exit_code(), EXIT_PANELS_WRONG_KIND);
}

#[test]
fn test_title_is_file_stem() {
    assert_eq!(title_for(Path::new("/tmp/panels/p95_latency.png")), "p95_latency");
    assert_eq!(title_for(Path::new("panels_30m.zip")), "panels_30m");
}
