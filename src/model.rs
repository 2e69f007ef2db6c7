use std::path::PathBuf;

/// One successfully parsed `.desktop` file.
#[derive(Debug, Clone)]
pub struct DesktopEntry {
    /// Display name (the `Name` key).
    pub name: String,
    /// Icon reference (the `Icon` key): a theme icon name or an absolute path.
    pub icon: String,
    /// The `.desktop` file this entry came from.
    pub source_path: PathBuf,
    /// Remaining keys of the `[Desktop Entry]` section, in file order.
    pub properties: Vec<(String, String)>,
}

/// Scan result: one (root directory, entries) pair per configured root that
/// produced at least one entry. Roots keep their configured order, entries
/// keep scan order.
pub type GroupedEntries = Vec<(PathBuf, Vec<DesktopEntry>)>;
