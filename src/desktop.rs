use crate::model::DesktopEntry;
use log::debug;
use std::fs;
use std::path::Path;

/// Parse one `.desktop` file.
///
/// Only the `[Desktop Entry]` section is read; collection stops for good at
/// the next section header, so keys in `[Desktop Action ...]` blocks can
/// never override earlier ones. An entry needs both `Name` and `Icon`;
/// anything else about the file being wrong (unreadable, no section, missing
/// keys) comes back as `None` so one bad file never aborts a batch.
pub fn parse_desktop_file(path: &Path) -> Option<DesktopEntry> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!("skipping {}: {}", path.display(), e);
            return None;
        }
    };

    let mut properties: Vec<(String, String)> = Vec::new();
    let mut in_entry = false;

    for raw in content.lines() {
        let line = raw.trim();
        if !in_entry {
            if line == "[Desktop Entry]" {
                in_entry = true;
            }
            continue;
        }
        if line.starts_with('[') {
            break;
        }
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        // Last occurrence wins, but the key keeps its original position.
        if let Some(slot) = properties.iter_mut().find(|(k, _)| k.as_str() == key) {
            slot.1 = value.to_string();
        } else {
            properties.push((key.to_string(), value.to_string()));
        }
    }

    let name = take(&mut properties, "Name")?;
    let icon = take(&mut properties, "Icon")?;

    Some(DesktopEntry {
        name,
        icon,
        source_path: path.to_path_buf(),
        properties,
    })
}

fn take(properties: &mut Vec<(String, String)>, key: &str) -> Option<String> {
    let pos = properties.iter().position(|(k, _)| k.as_str() == key)?;
    Some(properties.remove(pos).1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_desktop(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn minimal_entry_parses() {
        let dir = TempDir::new().unwrap();
        let path = write_desktop(&dir, "x.desktop", "[Desktop Entry]\nName=X\nIcon=Y\n");

        let entry = parse_desktop_file(&path).unwrap();
        assert_eq!(entry.name, "X");
        assert_eq!(entry.icon, "Y");
        assert_eq!(entry.source_path, path);
        assert!(entry.properties.is_empty());
    }

    #[test]
    fn missing_name_or_icon_is_none() {
        let dir = TempDir::new().unwrap();
        let no_icon = write_desktop(
            &dir,
            "a.desktop",
            "[Desktop Entry]\nName=A\nExec=a\nComment=no icon here\n",
        );
        let no_name = write_desktop(&dir, "b.desktop", "[Desktop Entry]\nIcon=b\n");

        assert!(parse_desktop_file(&no_icon).is_none());
        assert!(parse_desktop_file(&no_name).is_none());
    }

    #[test]
    fn later_sections_are_ignored() {
        let dir = TempDir::new().unwrap();
        let path = write_desktop(
            &dir,
            "x.desktop",
            "[Desktop Entry]\nName=Real\nIcon=real\n\
             [Desktop Action New]\nName=Shadow\nIcon=shadow\nExec=x --new\n",
        );

        let entry = parse_desktop_file(&path).unwrap();
        assert_eq!(entry.name, "Real");
        assert_eq!(entry.icon, "real");
        assert!(entry.properties.is_empty());
    }

    #[test]
    fn keys_before_the_section_are_ignored() {
        let dir = TempDir::new().unwrap();
        let path = write_desktop(
            &dir,
            "x.desktop",
            "Name=Outside\n[Desktop Entry]\nName=Inside\nIcon=i\n",
        );

        assert_eq!(parse_desktop_file(&path).unwrap().name, "Inside");
    }

    #[test]
    fn duplicate_key_keeps_last_value() {
        let dir = TempDir::new().unwrap();
        let path = write_desktop(
            &dir,
            "x.desktop",
            "[Desktop Entry]\nName=First\nIcon=i\nName=Second\n",
        );

        assert_eq!(parse_desktop_file(&path).unwrap().name, "Second");
    }

    #[test]
    fn extra_keys_become_ordered_properties() {
        let dir = TempDir::new().unwrap();
        let path = write_desktop(
            &dir,
            "x.desktop",
            "[Desktop Entry]\n# a comment\nExec=run --flag\nName=X\n\nTerminal=false\nIcon=Y\nExec=run --again\n",
        );

        let entry = parse_desktop_file(&path).unwrap();
        assert_eq!(
            entry.properties,
            vec![
                ("Exec".to_string(), "run --again".to_string()),
                ("Terminal".to_string(), "false".to_string()),
            ]
        );
    }

    #[test]
    fn values_may_contain_equals_signs() {
        let dir = TempDir::new().unwrap();
        let path = write_desktop(
            &dir,
            "x.desktop",
            "[Desktop Entry]\nName=X\nIcon=Y\nExec=env FOO=bar run\n",
        );

        let entry = parse_desktop_file(&path).unwrap();
        assert_eq!(entry.properties[0].1, "env FOO=bar run");
    }

    #[test]
    fn empty_key_is_preserved() {
        let dir = TempDir::new().unwrap();
        let path = write_desktop(&dir, "x.desktop", "[Desktop Entry]\nName=X\nIcon=Y\n=orphan\n");

        let entry = parse_desktop_file(&path).unwrap();
        assert_eq!(entry.properties, vec![("".to_string(), "orphan".to_string())]);
    }

    #[test]
    fn unreadable_file_is_none() {
        assert!(parse_desktop_file(Path::new("/nonexistent/x.desktop")).is_none());
    }
}
