use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Every `.jpg` file below `test_dir`, in a stable order.
pub fn test_files(test_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(test_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().map_or(false, |ext| ext.eq_ignore_ascii_case("jpg")))
        .collect();

    files.sort();
    files
}
