use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tiny_skia::Color;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GeneralConfig {
    /// Command used for the "open source file" action.
    #[serde(default = "default_opener")]
    pub opener: String,
}

fn default_opener() -> String {
    "xdg-open".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            opener: default_opener(),
        }
    }
}

/// Where to look for `.desktop` files and for icons. Everything the scanner
/// and the icon resolver touch on disk flows through here, so tests can point
/// them at synthetic directories.
#[derive(Deserialize, Debug, Clone)]
pub struct PathsConfig {
    /// Roots scanned for `.desktop` files, in display order.
    #[serde(default = "default_application_dirs")]
    pub application_dirs: Vec<PathBuf>,
    /// Icon directories probed in priority order before the theme-wide walk.
    #[serde(default = "default_icon_dirs")]
    pub icon_dirs: Vec<PathBuf>,
    /// Theme root whose size buckets are walked as a last resort.
    #[serde(default = "default_theme_root")]
    pub theme_root: PathBuf,
}

fn default_application_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from("/usr/share/applications")];
    if let Some(base) = BaseDirs::new() {
        dirs.push(base.data_dir().join("applications"));
    }
    dirs
}

fn default_icon_dirs() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/share/icons/hicolor/scalable/apps"),
        PathBuf::from("/usr/share/icons/hicolor/48x48/apps"),
        PathBuf::from("/usr/share/pixmaps"),
        PathBuf::from("/usr/share/icons"),
    ]
}

fn default_theme_root() -> PathBuf {
    PathBuf::from("/usr/share/icons/hicolor")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            application_dirs: default_application_dirs(),
            icon_dirs: default_icon_dirs(),
            theme_root: default_theme_root(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ThemeConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_padding")]
    pub padding: f32,
    #[serde(default = "default_spacing")]
    pub spacing: f32,
    #[serde(default = "default_border_radius")]
    pub border_radius: f32,
    #[serde(default = "default_cell_width")]
    pub cell_width: f32,
    #[serde(default = "default_cell_height")]
    pub cell_height: f32,
    #[serde(default = "default_icon_size")]
    pub icon_size: u32,
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_border_color")]
    pub border_color: String,
    #[serde(default = "default_text")]
    pub text: String,
    #[serde(default = "default_muted_text")]
    pub muted_text: String,
    #[serde(default = "default_selection_background")]
    pub selection_background: String,
    #[serde(default = "default_selection_text")]
    pub selection_text: String,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

fn default_width() -> u32 { 760 }
fn default_height() -> u32 { 560 }
fn default_padding() -> f32 { 20.0 }
fn default_spacing() -> f32 { 10.0 }
fn default_border_radius() -> f32 { 12.0 }
fn default_cell_width() -> f32 { 132.0 }
fn default_cell_height() -> f32 { 104.0 }
fn default_icon_size() -> u32 { 48 }
fn default_background() -> String { "1e1e1eff".to_string() }
fn default_border_color() -> String { "3c3c50ff".to_string() }
fn default_text() -> String { "c8c8c8ff".to_string() }
fn default_muted_text() -> String { "8c8c8cff".to_string() }
fn default_selection_background() -> String { "3c3c50ff".to_string() }
fn default_selection_text() -> String { "ffffffff".to_string() }
fn default_placeholder() -> String { "ffffffff".to_string() }

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            padding: default_padding(),
            spacing: default_spacing(),
            border_radius: default_border_radius(),
            cell_width: default_cell_width(),
            cell_height: default_cell_height(),
            icon_size: default_icon_size(),
            background: default_background(),
            border_color: default_border_color(),
            text: default_text(),
            muted_text: default_muted_text(),
            selection_background: default_selection_background(),
            selection_text: default_selection_text(),
            placeholder: default_placeholder(),
        }
    }
}

impl ThemeConfig {
    /// Parse an 8-digit RGBA hex string. Anything else falls back to black.
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 8 {
            return Color::BLACK;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
        let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
        let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
        let a = u8::from_str_radix(&hex[6..8], 16).unwrap_or(255);

        Color::from_rgba8(r, g, b, a)
    }
}

/// Load configuration from the given file, or from the default location.
///
/// An explicitly requested file must exist; the default file is optional and
/// its absence yields the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let proj_dirs = ProjectDirs::from("org", "deskview", "deskview");
            let default_path = match &proj_dirs {
                Some(dirs) => dirs.config_dir().join("config.toml"),
                None => PathBuf::from("config.toml"),
            };
            if !default_path.exists() {
                return Ok(Config::default());
            }
            default_path
        }
    };

    let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
        path: config_path.clone(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: config_path,
        source,
    })
}
