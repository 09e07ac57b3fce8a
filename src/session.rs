//! The console session: which product version the support views work on.
//!
//! The selection survives between invocations in `.psa/session.json`. Every
//! change is written to disk while the lock is held, so the in-memory value
//! and the file agree for the lifetime of the process.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PsaError, Result};
use crate::types::{PSA_DIR, Version};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selected_version: Option<Version>,
}

#[derive(Debug)]
pub struct SessionContext {
    path: PathBuf,
    state: RwLock<SessionState>,
}

impl SessionContext {
    pub fn default_path() -> PathBuf {
        PathBuf::from(PSA_DIR).join("session.json")
    }

    /// Open the session stored at `path`.
    ///
    /// A missing file is an empty session. An unreadable one is discarded
    /// with a warning so a corrupt cache never blocks the console.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<SessionState>(&content) {
                Ok(state) => state,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring unreadable session file");
                    SessionState::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SessionState::default(),
            Err(e) => return Err(PsaError::Io(e)),
        };

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn selected(&self) -> Option<Version> {
        self.state.read().selected_version.clone()
    }

    /// The selected version, or a precondition error naming the fix.
    pub fn require_version(&self) -> Result<Version> {
        self.selected().ok_or_else(|| {
            PsaError::MissingPrecondition(
                "no version selected; run `psa version select <id>` first".to_string(),
            )
        })
    }

    pub fn select(&self, version: Version) -> Result<()> {
        let mut state = self.state.write();
        let next = SessionState {
            selected_version: Some(version),
        };
        self.write(&next)?;
        debug!(version = ?next.selected_version.as_ref().map(|v| v.id), "version selected");
        *state = next;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        let mut state = self.state.write();
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(PsaError::Io(e)),
        }
        *state = SessionState::default();
        debug!("version selection cleared");
        Ok(())
    }

    fn write(&self, state: &SessionState) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(state)?)?;
        Ok(())
    }
}
