//! Location permission: ask once, remember the answer.
//!
//! The answer lives in a one-word file under the storage root (`granted` or
//! `denied`). A missing file means the user has not been asked. Grants and
//! revocations made outside a collection run (the `permission` command) are
//! picked up on the next request, because the file is re-read every time.

use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::model::PermissionState;

/// Obtains and checks authorization to use location services.
pub trait PermissionGate {
    /// Resolves the permission, prompting only when it is still unknown.
    ///
    /// Never returns `Unknown`.
    fn request_access(&mut self) -> PermissionState;
}

/// Something that can ask the user for location access.
pub trait Prompt {
    /// Returns the user's answer, or an error when no prompt can be shown.
    fn ask(&mut self) -> io::Result<bool>;
}

impl<F> Prompt for F
where
    F: FnMut() -> io::Result<bool>,
{
    fn ask(&mut self) -> io::Result<bool> {
        self()
    }
}

/// Asks on the controlling terminal. Fails when stdin is not interactive.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&mut self) -> io::Result<bool> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return Err(io::Error::other("stdin is not a terminal"));
        }
        eprint!("Allow sitelog to use your location and Wi-Fi state? [y/N] ");
        io::stderr().flush()?;
        let mut answer = String::new();
        stdin.lock().read_line(&mut answer)?;
        Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
    }
}

/// Permission gate that persists the user's answer to a file.
pub struct ConsentGate<P> {
    path: PathBuf,
    prompt: P,
}

impl<P: Prompt> ConsentGate<P> {
    pub fn new(path: impl Into<PathBuf>, prompt: P) -> Self {
        Self {
            path: path.into(),
            prompt,
        }
    }
}

impl<P: Prompt> PermissionGate for ConsentGate<P> {
    fn request_access(&mut self) -> PermissionState {
        let state = match read_state(&self.path) {
            Ok(state) => state,
            Err(e) => {
                warn!("cannot read {}: {e}; treating as denied", self.path.display());
                return PermissionState::Denied;
            }
        };
        if state != PermissionState::Unknown {
            debug!("permission already resolved: {state:?}");
            return state;
        }

        let state = match self.prompt.ask() {
            Ok(true) => PermissionState::Granted,
            Ok(false) => PermissionState::Denied,
            Err(e) => {
                // Not recorded: the next interactive run asks again.
                warn!("cannot show permission prompt: {e}; treating as denied");
                return PermissionState::Denied;
            }
        };
        if let Err(e) = write_state(&self.path, state) {
            warn!("failed to record permission in {}: {e}", self.path.display());
        }
        state
    }
}

/// Reads the recorded permission. A missing file is `Unknown`.
pub fn read_state(path: &Path) -> io::Result<PermissionState> {
    let contents = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(PermissionState::Unknown),
        Err(e) => return Err(e),
    };
    match contents.trim() {
        "granted" => Ok(PermissionState::Granted),
        "denied" => Ok(PermissionState::Denied),
        other => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unrecognized permission '{other}'"),
        )),
    }
}

/// Records a permission. Writing `Unknown` removes the file.
pub fn write_state(path: &Path, state: PermissionState) -> io::Result<()> {
    let word = match state {
        PermissionState::Granted => "granted",
        PermissionState::Denied => "denied",
        PermissionState::Unknown => {
            return match fs::remove_file(path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            };
        }
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format!("{word}\n"))
}
