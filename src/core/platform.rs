use std::{
    path::Path,
    process::{Command, Stdio},
    thread,
};

use crate::core::error::{DatavizErrorKind, Result};

/// The command used to hand a file to the desktop's default application
pub fn get_opener_command(path: &Path) -> Command {
    let mut command = if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };
    command.arg(path);
    command
}

/// Open a file in the default application without waiting for it to exit.
/// The opener is reaped on a background thread.
pub fn open_in_default_app(path: &Path) -> Result<()> {
    let mut command = get_opener_command(path);
    tracing::debug!("Opening {} with {:?}", path.display(), command.get_program());

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| DatavizErrorKind::PresentError {
            reason: format!("{e}"),
        })?;

    thread::spawn(move || match child.wait() {
        Ok(status) if !status.success() => tracing::debug!("Opener exited with {status}"),
        Ok(_) => {}
        Err(e) => tracing::debug!("Could not wait for opener: {e}"),
    });

    Ok(())
}

pub fn get_os_info() -> String {
    format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
}
