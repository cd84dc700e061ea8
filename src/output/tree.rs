//! Output directory tree materialization.
//!
//! ```text
//! <out_dir>/
//!   <prefix><basename>/          parent: created, or kept after confirmation
//!     metadata.json
//!     Channel1/                  channel: created, or wiped after confirmation
//!       <prefix><basename>c1z0.png
//!       ...
//!     Channel2/
//! ```
//!
//! An existing parent directory is never cleaned, only confirmed. An existing
//! channel directory is deleted and recreated empty once confirmed. Declining
//! either aborts the run without rolling back channels already written.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{ExtractError, OutputError};
use crate::slice::{channel_dir_name, output_base_name};

/// File name of the persisted metadata record.
pub const METADATA_FILE_NAME: &str = "metadata.json";

// =============================================================================
// Overwrite Policy
// =============================================================================

/// What happens to an existing directory once the policy agrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwriteScope {
    /// Kept as is; files written later may replace same-named ones
    Reuse,
    /// Deleted with all its contents and recreated empty
    Replace,
}

/// Decides whether an existing output directory may be reused or replaced.
pub trait OverwritePolicy {
    /// Return `true` to proceed with the existing `path`.
    fn confirm_overwrite(&mut self, path: &Path, scope: OverwriteScope) -> bool;
}

impl<P: OverwritePolicy + ?Sized> OverwritePolicy for &mut P {
    fn confirm_overwrite(&mut self, path: &Path, scope: OverwriteScope) -> bool {
        (**self).confirm_overwrite(path, scope)
    }
}

impl<P: OverwritePolicy + ?Sized> OverwritePolicy for Box<P> {
    fn confirm_overwrite(&mut self, path: &Path, scope: OverwriteScope) -> bool {
        (**self).confirm_overwrite(path, scope)
    }
}

/// Always proceed. For unattended runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOverwrite;

impl OverwritePolicy for AlwaysOverwrite {
    fn confirm_overwrite(&mut self, _path: &Path, _scope: OverwriteScope) -> bool {
        true
    }
}

/// Never touch existing output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverOverwrite;

impl OverwritePolicy for NeverOverwrite {
    fn confirm_overwrite(&mut self, _path: &Path, _scope: OverwriteScope) -> bool {
        false
    }
}

/// Ask a yes/no question on a terminal (or any reader/writer pair).
///
/// `y` and `yes` in any case accept; anything else, end of input or a read
/// error declines.
#[derive(Debug)]
pub struct InteractivePrompt<R, W> {
    input: R,
    output: W,
}

impl InteractivePrompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on stdout and read the answer from stdin.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> InteractivePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl<R: BufRead, W: Write> OverwritePolicy for InteractivePrompt<R, W> {
    fn confirm_overwrite(&mut self, path: &Path, scope: OverwriteScope) -> bool {
        let question = match scope {
            OverwriteScope::Reuse => "Potentially overwrite contents?",
            OverwriteScope::Replace => "Overwrite contents?",
        };
        let asked = write!(
            self.output,
            "WARNING: {} already exists. {} [y/N] ",
            path.display(),
            question
        )
        .and_then(|_| self.output.flush());
        if asked.is_err() {
            return false;
        }

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => is_affirmative(&answer),
        }
    }
}

/// `y`/`yes`, case-insensitive, surrounding whitespace ignored.
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

// =============================================================================
// Output Tree
// =============================================================================

/// Paths of the output tree for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTree {
    base_name: String,
    parent: PathBuf,
}

impl OutputTree {
    /// Tree for `source` under `out_dir`, named `<prefix><source stem>`.
    pub fn new(out_dir: &Path, prefix: &str, source: &Path) -> Self {
        let base_name = output_base_name(prefix, source);
        let parent = out_dir.join(&base_name);
        Self { base_name, parent }
    }

    /// `<prefix><basename>`, shared by the parent directory and slice files.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn parent(&self) -> &Path {
        &self.parent
    }

    /// Directory of a 1-based channel.
    pub fn channel_dir(&self, channel: usize) -> PathBuf {
        self.parent.join(channel_dir_name(channel))
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.parent.join(METADATA_FILE_NAME)
    }

    /// Create the parent directory, or confirm reuse of an existing one.
    ///
    /// Existing contents are left in place.
    pub fn ensure_parent<P: OverwritePolicy + ?Sized>(
        &self,
        policy: &mut P,
    ) -> Result<(), ExtractError> {
        if !self.parent.exists() {
            create_dir_all(&self.parent)?;
            info!(dir = %self.parent.display(), "Created output directory");
            return Ok(());
        }

        if !policy.confirm_overwrite(&self.parent, OverwriteScope::Reuse) {
            return Err(ExtractError::Declined {
                path: self.parent.clone(),
            });
        }

        warn!(dir = %self.parent.display(), "Reusing existing output directory");
        Ok(())
    }

    /// Create an empty directory for a 1-based channel.
    ///
    /// An existing directory is deleted with all its contents once the policy
    /// confirms.
    pub fn ensure_channel<P: OverwritePolicy + ?Sized>(
        &self,
        channel: usize,
        policy: &mut P,
    ) -> Result<PathBuf, ExtractError> {
        let dir = self.channel_dir(channel);

        if dir.exists() {
            if !policy.confirm_overwrite(&dir, OverwriteScope::Replace) {
                return Err(ExtractError::Declined { path: dir });
            }
            fs::remove_dir_all(&dir).map_err(|e| OutputError::io(&dir, e))?;
            warn!(dir = %dir.display(), "Removed existing channel directory");
        }

        create_dir_all(&dir)?;
        Ok(dir)
    }
}

fn create_dir_all(path: &Path) -> Result<(), OutputError> {
    fs::create_dir_all(path).map_err(|e| OutputError::io(path, e))
}
