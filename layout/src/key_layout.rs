//! Key schemes selected by the layout version.
//!
//! The legacy layout keeps every stack directly under the bookkeeping
//! directory. The project layout (version 1) adds a project segment:
//!
//! ```text
//! legacy:   .blobstate/stacks/<stack>.json
//! project:  .blobstate/stacks/<project>/<stack>.json
//! ```
//!
//! History and backups follow the same pattern.

use crate::{LayoutError, BOOKKEEPING_DIR, CURRENT_LAYOUT_VERSION};

const STACKS_DIR: &str = "stacks";
const HISTORY_DIR: &str = "history";
const BACKUPS_DIR: &str = "backups";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyLayout {
    /// Version 0: stacks are not scoped by project.
    Legacy,
    /// Version 1: stacks live under their project.
    Project,
}

impl KeyLayout {
    /// The key scheme for a layout version. Versions newer than this build
    /// understands are refused rather than guessed at.
    pub fn for_version(version: u64) -> Result<Self, LayoutError> {
        match version {
            0 => Ok(KeyLayout::Legacy),
            CURRENT_LAYOUT_VERSION => Ok(KeyLayout::Project),
            v => Err(LayoutError::UnsupportedVersion(v)),
        }
    }

    pub fn version(&self) -> u64 {
        match self {
            KeyLayout::Legacy => 0,
            KeyLayout::Project => CURRENT_LAYOUT_VERSION,
        }
    }

    /// Prefix under which all stack checkpoints live.
    pub fn stacks_prefix(&self) -> String {
        format!("{BOOKKEEPING_DIR}/{STACKS_DIR}/")
    }

    /// Key of a stack's checkpoint.
    pub fn checkpoint_key(&self, project: &str, stack: &str) -> Result<String, LayoutError> {
        Ok(format!("{}.json", self.scoped(STACKS_DIR, project, stack)?))
    }

    /// Prefix of a stack's update history.
    pub fn history_prefix(&self, project: &str, stack: &str) -> Result<String, LayoutError> {
        Ok(format!("{}/", self.scoped(HISTORY_DIR, project, stack)?))
    }

    /// Prefix of a stack's checkpoint backups.
    pub fn backup_prefix(&self, project: &str, stack: &str) -> Result<String, LayoutError> {
        Ok(format!("{}/", self.scoped(BACKUPS_DIR, project, stack)?))
    }

    fn scoped(&self, dir: &str, project: &str, stack: &str) -> Result<String, LayoutError> {
        validate_name("stack", stack)?;
        match self {
            KeyLayout::Legacy => Ok(format!("{BOOKKEEPING_DIR}/{dir}/{stack}")),
            KeyLayout::Project => {
                validate_name("project", project)?;
                Ok(format!("{BOOKKEEPING_DIR}/{dir}/{project}/{stack}"))
            }
        }
    }
}

fn validate_name(kind: &'static str, name: &str) -> Result<(), LayoutError> {
    let reason = if name.is_empty() {
        "must not be empty"
    } else if name.contains('/') {
        "must not contain '/'"
    } else if name == "." || name == ".." {
        "must not be '.' or '..'"
    } else {
        return Ok(());
    };
    Err(LayoutError::InvalidName {
        kind,
        name: name.to_string(),
        reason,
    })
}
