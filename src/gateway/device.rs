//! Overlay manager of a real Android device, driven through `cmd overlay`.

use std::process::Command;

use tracing::{debug, trace};

use crate::error::{OverlayError, Result};
use crate::gateway::OverlayGateway;
use crate::overlay::{OverlayId, OverlayInfo, UserId};

/// How to reach the device shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    /// Running on the device itself.
    Local,
    /// Through `adb shell`, optionally pinned to one serial.
    Adb { serial: Option<String> },
}

#[derive(Debug, Clone)]
pub struct DeviceGateway {
    transport: Transport,
}

impl DeviceGateway {
    pub const fn new(transport: Transport) -> Self {
        Self { transport }
    }

    fn overlay(&self, args: &[String]) -> Result<String> {
        let (program, argv) = overlay_command(&self.transport, args);
        let mut command = Command::new(program);
        command.args(&argv);
        trace!(?command, "Running overlay command");

        let output = command
            .output()
            .map_err(|err| OverlayError::Remote(format!("failed to spawn overlay command: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OverlayError::Remote(format!(
                "`cmd overlay {}` exited with {}: {}",
                args.join(" "),
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn list(&self, target: Option<&str>, user: UserId) -> Result<Vec<OverlayInfo>> {
        let listing = parse_overlay_list(&self.overlay(&list_args(target, user))?);
        debug!(count = listing.len(), filter = ?target, "Listed overlays");
        Ok(listing)
    }
}

impl OverlayGateway for DeviceGateway {
    fn set_enabled(&self, id: &OverlayId, enabled: bool, user: UserId) -> Result<()> {
        self.overlay(&set_enabled_args(id, enabled, user))?;
        Ok(())
    }

    fn overlay_info(&self, id: &OverlayId, user: UserId) -> Result<Option<OverlayInfo>> {
        Ok(self.list(None, user)?.into_iter().find(|info| &info.id == id))
    }

    fn overlays_for_target(&self, target: &str, user: UserId) -> Result<Vec<OverlayInfo>> {
        Ok(self
            .list(Some(target), user)?
            .into_iter()
            .filter(|info| info.target == target)
            .collect())
    }
}

/// Program and arguments running `cmd overlay <args>` over `transport`.
pub fn overlay_command(transport: &Transport, args: &[String]) -> (&'static str, Vec<String>) {
    let mut argv = Vec::new();
    let program = match transport {
        Transport::Local => "cmd",
        Transport::Adb { serial } => {
            if let Some(serial) = serial {
                argv.extend(["-s".to_string(), serial.clone()]);
            }
            argv.extend(["shell".to_string(), "cmd".to_string()]);
            "adb"
        }
    };
    argv.push("overlay".to_string());
    argv.extend(args.iter().cloned());
    (program, argv)
}

fn set_enabled_args(id: &OverlayId, enabled: bool, user: UserId) -> Vec<String> {
    let verb = if enabled { "enable" } else { "disable" };
    vec![
        verb.to_string(),
        "--user".to_string(),
        user.to_string(),
        id.to_string(),
    ]
}

fn list_args(target: Option<&str>, user: UserId) -> Vec<String> {
    let mut args = vec!["list".to_string(), "--user".to_string(), user.to_string()];
    args.extend(target.map(str::to_string));
    args
}

/// Parse the output of `cmd overlay list`.
///
/// Target packages appear on their own line, followed by one line per overlay
/// prefixed with `[x]` (enabled), `[ ]` (disabled) or `---` (not applicable).
pub fn parse_overlay_list(output: &str) -> Vec<OverlayInfo> {
    let mut overlays = Vec::new();
    let mut target: Option<&str> = None;

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let entry = line
            .strip_prefix("[x]")
            .map(|rest| (rest, true))
            .or_else(|| line.strip_prefix("[ ]").map(|rest| (rest, false)))
            .or_else(|| line.strip_prefix("---").map(|rest| (rest, false)));

        match entry {
            Some((rest, enabled)) => {
                let Some(target) = target else {
                    continue;
                };
                let id = rest.trim();
                if !id.is_empty() {
                    overlays.push(OverlayInfo::new(id, target, enabled));
                }
            }
            None => target = Some(line),
        }
    }

    overlays
}
