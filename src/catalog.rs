use crate::config::PathsConfig;
use crate::desktop::parse_desktop_file;
use crate::model::GroupedEntries;
use crate::scanner::{filter_by_suffix, list_files};
use log::info;

pub const DESKTOP_SUFFIX: &str = ".desktop";

/// Scan every configured root and group the parsed entries by root.
///
/// The whole result is rebuilt on every call; roots that yield nothing are
/// left out. Files that fail to parse are dropped silently, so the worst a
/// broken directory can do is produce an empty group.
pub fn build_catalog(paths: &PathsConfig) -> GroupedEntries {
    let mut groups = GroupedEntries::new();

    for root in &paths.application_dirs {
        let files = filter_by_suffix(list_files(root), DESKTOP_SUFFIX);
        let scanned = files.len();
        let entries: Vec<_> = files.iter().filter_map(|path| parse_desktop_file(path)).collect();
        info!(
            "{}: {} entries from {} desktop files",
            root.display(),
            entries.len(),
            scanned
        );
        if !entries.is_empty() {
            groups.push((root.clone(), entries));
        }
    }

    info!(
        "catalog: {} groups, {} entries total",
        groups.len(),
        groups.iter().map(|(_, entries)| entries.len()).sum::<usize>()
    );
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn paths_for(roots: Vec<PathBuf>) -> PathsConfig {
        PathsConfig {
            application_dirs: roots,
            icon_dirs: Vec::new(),
            theme_root: PathBuf::from("/nonexistent"),
        }
    }

    #[test]
    fn invalid_files_are_dropped_and_order_is_scan_order() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("alpha.desktop"),
            "[Desktop Entry]\nName=Alpha\nIcon=alpha\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("broken.desktop"),
            "[Desktop Entry]\nName=Broken\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("zeta.desktop"),
            "[Desktop Entry]\nName=Zeta\nIcon=zeta\n",
        )
        .unwrap();

        let groups = build_catalog(&paths_for(vec![dir.path().to_path_buf()]));
        assert_eq!(groups.len(), 1);
        let (root, entries) = &groups[0];
        assert_eq!(root, dir.path());
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn missing_and_empty_roots_are_omitted() {
        let dir = TempDir::new().unwrap();
        let empty = TempDir::new().unwrap();
        fs::write(
            dir.path().join("only.desktop"),
            "[Desktop Entry]\nName=Only\nIcon=only\n",
        )
        .unwrap();

        let groups = build_catalog(&paths_for(vec![
            PathBuf::from("/nonexistent/applications"),
            empty.path().to_path_buf(),
            dir.path().to_path_buf(),
        ]));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, dir.path());
    }

    #[test]
    fn roots_keep_configured_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        for (dir, name) in [(&first, "One"), (&second, "Two")] {
            fs::write(
                dir.path().join("app.desktop"),
                format!("[Desktop Entry]\nName={}\nIcon=i\n", name),
            )
            .unwrap();
        }

        let groups = build_catalog(&paths_for(vec![
            second.path().to_path_buf(),
            first.path().to_path_buf(),
        ]));
        let roots: Vec<_> = groups.iter().map(|(root, _)| root.clone()).collect();
        assert_eq!(roots, vec![second.path().to_path_buf(), first.path().to_path_buf()]);
    }

    #[test]
    fn non_desktop_files_are_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("real.desktop"),
            "[Desktop Entry]\nName=Real\nIcon=r\n",
        )
        .unwrap();
        fs::write(dir.path().join("fake.desktop.bak"), "[Desktop Entry]\nName=F\nIcon=f\n")
            .unwrap();

        let groups = build_catalog(&paths_for(vec![dir.path().to_path_buf()]));
        assert_eq!(groups[0].1.len(), 1);
        assert_eq!(groups[0].1[0].name, "Real");
    }
}
