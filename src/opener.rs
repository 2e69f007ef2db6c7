use crate::config::Config;
use log::{info, warn};
use std::path::Path;
use std::process::{Command, Stdio};

/// Hand a `.desktop` source file to the configured opener (default
/// `xdg-open`), detached from our stdio. Failure is logged and otherwise
/// ignored; the UI keeps running either way.
pub fn open_source(path: &Path, config: &Config) {
    let mut parts = config.general.opener.split_whitespace();
    let Some(program) = parts.next() else {
        warn!("opener command is empty, cannot open {}", path.display());
        return;
    };

    let mut command = Command::new(program);
    command
        .args(parts)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    match command.spawn() {
        Ok(_) => info!("opened {}", path.display()),
        Err(e) => warn!("failed to open {}: {}", path.display(), e),
    }
}
