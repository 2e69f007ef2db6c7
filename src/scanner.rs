use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively list the regular files under `root`.
///
/// Symlinks are followed (a looping tree is the caller's problem), entries
/// are visited in file-name order per directory so the result is stable for
/// a given filesystem state. A missing or unreadable root yields an empty
/// list rather than an error.
pub fn list_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

/// Keep the paths whose textual form ends with `suffix` (case-sensitive).
pub fn filter_by_suffix(paths: Vec<PathBuf>, suffix: &str) -> Vec<PathBuf> {
    paths
        .into_iter()
        .filter(|path| path.to_string_lossy().ends_with(suffix))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::write(path, "").unwrap();
    }

    #[test]
    fn lists_files_at_any_depth() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a.desktop"));
        fs::create_dir_all(dir.path().join("one/two")).unwrap();
        touch(&dir.path().join("one/b.desktop"));
        touch(&dir.path().join("one/two/c.txt"));

        let files = list_files(dir.path());
        assert_eq!(files.len(), 3);
        assert!(files.iter().all(|p| p.is_file()));
    }

    #[test]
    fn missing_root_yields_empty_list() {
        assert!(list_files(Path::new("/nonexistent/deskview-test-root")).is_empty());
    }

    #[test]
    fn suffix_filter_counts_only_matches() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("nested/deeper")).unwrap();
        touch(&dir.path().join("a.desktop"));
        touch(&dir.path().join("nested/b.desktop"));
        touch(&dir.path().join("nested/deeper/c.desktop"));
        touch(&dir.path().join("readme.md"));
        touch(&dir.path().join("nested/notes.txt"));

        let matches = filter_by_suffix(list_files(dir.path()), ".desktop");
        assert_eq!(matches.len(), 3);
    }

    #[test]
    fn suffix_filter_is_case_sensitive() {
        let paths = vec![PathBuf::from("/x/App.Desktop"), PathBuf::from("/x/app.desktop")];
        let matches = filter_by_suffix(paths, ".desktop");
        assert_eq!(matches, vec![PathBuf::from("/x/app.desktop")]);
    }

    #[test]
    fn scan_order_is_stable() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("zz.desktop"));
        touch(&dir.path().join("aa.desktop"));
        touch(&dir.path().join("mm.desktop"));

        let names: Vec<_> = list_files(dir.path())
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["aa.desktop", "mm.desktop", "zz.desktop"]);
    }
}
