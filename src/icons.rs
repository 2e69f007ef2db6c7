use crate::config::PathsConfig;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Formats the rendering layer can decode, in resolution priority order.
pub const ICON_EXTENSIONS: [&str; 2] = ["svg", "png"];

/// Maps an icon reference (absolute path or bare theme-icon name) to an icon
/// file on disk. Stateless: the answer only depends on the reference string
/// and the filesystem.
pub struct IconResolver {
    search_dirs: Vec<PathBuf>,
    theme_root: PathBuf,
}

impl IconResolver {
    pub fn new(paths: &PathsConfig) -> Self {
        Self {
            search_dirs: paths.icon_dirs.clone(),
            theme_root: paths.theme_root.clone(),
        }
    }

    /// Find the icon file for `icon_ref`. `None` means "render the
    /// placeholder"; which file a path points at is this type's whole
    /// contract, decoding it is the caller's.
    pub fn resolve(&self, icon_ref: &str) -> Option<PathBuf> {
        let as_path = Path::new(icon_ref);
        if as_path.is_absolute() {
            if as_path.exists() && supported_extension(as_path) {
                return Some(as_path.to_path_buf());
            }
            debug!("icon path {} missing or unsupported", icon_ref);
            return None;
        }

        for dir in &self.search_dirs {
            for ext in ICON_EXTENSIONS {
                let candidate = dir.join(format!("{}.{}", icon_ref, ext));
                if candidate.exists() {
                    return Some(candidate);
                }
            }
        }

        // Last resort: every size bucket of the theme root, in name order so
        // the answer does not depend on readdir order.
        for bucket in self.theme_buckets() {
            let apps = bucket.join("apps");
            for ext in ICON_EXTENSIONS {
                let candidate = apps.join(format!("{}.{}", icon_ref, ext));
                if candidate.exists() {
                    return Some(candidate);
                }
            }
        }

        None
    }

    fn theme_buckets(&self) -> Vec<PathBuf> {
        let Ok(read_dir) = fs::read_dir(&self.theme_root) else {
            return Vec::new();
        };
        let mut buckets: Vec<PathBuf> = read_dir
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        buckets.sort_by_key(|path| path.file_name().map(|name| name.to_os_string()));
        buckets
    }
}

fn supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ICON_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Synthetic icon layout:
    ///   icons/hicolor/scalable/apps, icons/hicolor/48x48/apps, pixmaps
    /// wired up as the configured priority list, with the hicolor root as
    /// the fallback walk target.
    fn synthetic_paths(dir: &TempDir) -> PathsConfig {
        let hicolor = dir.path().join("icons/hicolor");
        let scalable = hicolor.join("scalable/apps");
        let fixed = hicolor.join("48x48/apps");
        let pixmaps = dir.path().join("pixmaps");
        for d in [&scalable, &fixed, &pixmaps] {
            fs::create_dir_all(d).unwrap();
        }
        PathsConfig {
            application_dirs: Vec::new(),
            icon_dirs: vec![scalable, fixed, pixmaps],
            theme_root: hicolor,
        }
    }

    fn touch(path: &Path) {
        fs::write(path, "").unwrap();
    }

    #[test]
    fn absolute_path_resolves_to_itself() {
        let dir = TempDir::new().unwrap();
        let paths = synthetic_paths(&dir);
        let file = dir.path().join("custom.png");
        touch(&file);

        let resolver = IconResolver::new(&paths);
        assert_eq!(resolver.resolve(file.to_str().unwrap()), Some(file));
    }

    #[test]
    fn absolute_path_with_unsupported_extension_falls_back() {
        let dir = TempDir::new().unwrap();
        let paths = synthetic_paths(&dir);
        let file = dir.path().join("legacy.xpm");
        touch(&file);

        let resolver = IconResolver::new(&paths);
        assert_eq!(resolver.resolve(file.to_str().unwrap()), None);
    }

    #[test]
    fn directory_priority_beats_extension_priority() {
        let dir = TempDir::new().unwrap();
        let paths = synthetic_paths(&dir);
        // svg high in priority, png with the same stem further down
        let svg = paths.icon_dirs[0].join("foo.svg");
        touch(&svg);
        touch(&paths.icon_dirs[2].join("foo.png"));

        let resolver = IconResolver::new(&paths);
        assert_eq!(resolver.resolve("foo"), Some(svg));
    }

    #[test]
    fn svg_wins_over_png_in_the_same_directory() {
        let dir = TempDir::new().unwrap();
        let paths = synthetic_paths(&dir);
        let svg = paths.icon_dirs[1].join("bar.svg");
        touch(&svg);
        touch(&paths.icon_dirs[1].join("bar.png"));

        let resolver = IconResolver::new(&paths);
        assert_eq!(resolver.resolve("bar"), Some(svg));
    }

    #[test]
    fn theme_walk_visits_buckets_in_name_order() {
        let dir = TempDir::new().unwrap();
        let paths = synthetic_paths(&dir);
        let first = paths.theme_root.join("128x128/apps");
        let second = paths.theme_root.join("64x64/apps");
        fs::create_dir_all(&first).unwrap();
        fs::create_dir_all(&second).unwrap();
        // "128x128" sorts before "64x64" lexicographically
        let expected = first.join("odd.png");
        touch(&expected);
        touch(&second.join("odd.png"));

        let resolver = IconResolver::new(&paths);
        assert_eq!(resolver.resolve("odd"), Some(expected));
    }

    #[test]
    fn unknown_name_is_fallback() {
        let dir = TempDir::new().unwrap();
        let paths = synthetic_paths(&dir);

        let resolver = IconResolver::new(&paths);
        assert_eq!(resolver.resolve("no-such-icon"), None);
    }

    #[test]
    fn missing_theme_root_is_tolerated() {
        let dir = TempDir::new().unwrap();
        let mut paths = synthetic_paths(&dir);
        paths.theme_root = dir.path().join("gone");

        let resolver = IconResolver::new(&paths);
        assert_eq!(resolver.resolve("anything"), None);
    }
}
