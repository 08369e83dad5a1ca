//! Shared-password gate and the two "already authenticated" flags.
//!
//! # Responsibility
//! - Compare submitted text against one configured secret.
//! - Remember a successful login per process or durably on disk.
//!
//! # Invariants
//! - No token, no expiry, no attempt counting.
//! - Either flag alone is enough to skip the gate.

use log::{info, warn};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// File name of the durable flag inside the data directory.
pub const AUTH_MARKER_FILE_NAME: &str = "auth";
const MARKER_VALUE: &str = "1";

/// Result of one password submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Granted,
    Rejected,
}

/// Session-scoped and durable authentication flags.
#[derive(Debug, Clone)]
pub struct AuthFlags {
    session: bool,
    marker_path: PathBuf,
}

impl AuthFlags {
    pub fn new(marker_path: impl Into<PathBuf>) -> Self {
        Self {
            session: false,
            marker_path: marker_path.into(),
        }
    }

    /// Flags whose durable marker lives under `data_dir`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(AUTH_MARKER_FILE_NAME))
    }

    pub fn session(&self) -> bool {
        self.session
    }

    /// True when the durable marker exists and holds the expected value.
    pub fn durable(&self) -> bool {
        fs::read_to_string(&self.marker_path)
            .map(|value| value.trim() == MARKER_VALUE)
            .unwrap_or(false)
    }

    pub fn is_authed(&self) -> bool {
        self.session || self.durable()
    }

    /// Records a successful login. `remember` selects the durable flag.
    pub fn grant(&mut self, remember: bool) -> io::Result<()> {
        if remember {
            if let Some(parent) = self.marker_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&self.marker_path, MARKER_VALUE)?;
        } else {
            self.session = true;
        }
        Ok(())
    }

    /// Clears both flags.
    pub fn revoke(&mut self) -> io::Result<()> {
        self.session = false;
        match fs::remove_file(&self.marker_path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

/// Compares input against one static secret.
#[derive(Debug, Clone)]
pub struct PasswordGate {
    secret: String,
}

impl PasswordGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn check(&self, input: &str) -> bool {
        input == self.secret
    }

    /// Checks `input` and, on match, sets the flag chosen by `remember`.
    pub fn submit(
        &self,
        input: &str,
        remember: bool,
        flags: &mut AuthFlags,
    ) -> io::Result<AuthOutcome> {
        if !self.check(input) {
            warn!("event=auth_submit module=auth status=rejected");
            return Ok(AuthOutcome::Rejected);
        }

        flags.grant(remember)?;
        info!("event=auth_submit module=auth status=granted remember={remember}");
        Ok(AuthOutcome::Granted)
    }
}
