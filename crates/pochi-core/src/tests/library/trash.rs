use crate::library::{SystemTrash, Trash};

use std::io;

use tempfile::TempDir;

/// WHAT: Trashing a missing file reports NotFound
/// WHY: The library maps NotFound to the tool's not-found error
#[test]
#[allow(clippy::unwrap_used)]
fn given_missing_file_when_trashing_then_not_found() {
    // Given: A path that does not exist
    let dir = TempDir::new().unwrap();

    // When: Trashing it
    let err = SystemTrash.trash(&dir.path().join("gone.m4a")).unwrap_err();

    // Then
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
}

/// WHAT: Directories are refused before reaching the platform trash
/// WHY: Only recordings are ever deleted
#[test]
#[allow(clippy::unwrap_used)]
fn given_directory_when_trashing_then_invalid_input_and_kept() {
    // Given: A directory named like a recording
    let dir = TempDir::new().unwrap();
    let folder = dir.path().join("folder.m4a");
    std::fs::create_dir(&folder).unwrap();

    // When: Trashing it
    let err = SystemTrash.trash(&folder).unwrap_err();

    // Then: Refused and left in place
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    assert!(folder.is_dir());
}
