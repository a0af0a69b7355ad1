//! The external-tool interface and the job collaborators it works through
//!
//! A [`Tool`] turns its settings into a [`ToolSetup`]: the command line that
//! launches the external program plus the script it reads. Everything the
//! tool touches outside of its own settings goes through a job context:
//!
//! - [`PathResolver`] maps a file reference from the settings to a path
//! - [`IdGenerator`] hands out unique ids for generated file names
//! - [`FileWriter`] persists generated files in the job directory
//!
//! [`crate::JobDirectory`] implements all three for a directory on disk.

use crate::Result;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;

/// Resolves file references from job settings to usable paths
pub trait PathResolver {
    /// Resolve a file reference, or `None` if it cannot be resolved
    fn resolve_path(&self, file: &str) -> Option<PathBuf>;
}

/// Generates identifiers for collision-free file names
pub trait IdGenerator {
    /// Return a fresh identifier
    fn unique_id(&self) -> String;
}

/// Persists generated files relative to the job's working directory
pub trait FileWriter {
    /// Write `content` to the file `name`
    fn write_file(
        &self,
        name: &str,
        content: &str,
    ) -> impl Future<Output = std::io::Result<()>> + Send;
}

/// Everything a tool needs from the job it runs in
pub trait JobContext: PathResolver + IdGenerator + FileWriter + Sync {}

impl<T> JobContext for T where T: PathResolver + IdGenerator + FileWriter + Sync {}

/// An external program driven through generated scripts
pub trait Tool {
    /// Settings accepted by this tool
    type Settings: Sync;

    /// Display name of the tool
    fn name(&self) -> &'static str;

    /// Validate the settings, write the tool's script into the job and
    /// return the invocation for it
    fn setup_instance<J: JobContext>(
        &self,
        settings: &Self::Settings,
        job: &J,
    ) -> impl Future<Output = Result<ToolSetup>> + Send;
}

/// A staged tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSetup {
    /// Shell command line that runs the tool against the script
    pub command: String,

    /// Executable the command line launches
    pub executable: PathBuf,

    /// Arguments the command line passes, without shell quoting
    pub args: Vec<String>,

    /// Generated script file name, relative to the job directory
    pub script_file: String,

    /// Resolved path of the generated script
    pub script_path: PathBuf,

    /// Full script content
    pub script: String,

    /// Files the script asks the tool to save
    pub outputs: Vec<PathBuf>,
}

impl fmt::Display for ToolSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)
    }
}
