//! # rizom-stage core
//!
//! Stages batch UV-unwrapping jobs for RizomUV.
//!
//! RizomUV does the actual seam cutting, unfolding and packing. This crate
//! prepares a job for it: it resolves the input and output meshes, decides
//! which formats to save, renders the unwrap script, writes it into the job
//! directory under a unique name and builds the command line that runs it.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rizom_stage_core::prelude::*;
//!
//! let job = JobDirectory::new("/jobs/42");
//! let tool = RizomUvTool::new("/opt/rizomuv/rizomuv");
//! let settings = RizomUvSettings::new("scan.obj", "scan-unwrapped.fbx").with_save_obj(true);
//!
//! let setup = tool.setup_instance(&settings, &job).await?;
//! println!("{}", setup.command);
//! // "/opt/rizomuv/rizomuv" -cfi "/jobs/42/_rizomuv_<id>.lua"
//!
//! let report = run_setup(&ToolConfig::load()?, &setup, job.root()).await?;
//! ```

pub mod config;
pub mod job;
pub mod rizomuv;
pub mod runner;
pub mod save;
pub mod script;
pub mod settings;
pub mod tool;

mod error;

pub use config::ToolConfig;
pub use error::{Error, Result};
pub use job::JobDirectory;
pub use rizomuv::RizomUvTool;
pub use runner::{ToolReport, run_setup};
pub use save::{SaveFormat, SaveOperation};
pub use settings::RizomUvSettings;
pub use tool::{FileWriter, IdGenerator, JobContext, PathResolver, Tool, ToolSetup};

/// Prelude module for convenient imports
pub mod prelude {
    // Tools
    pub use crate::rizomuv::RizomUvTool;
    pub use crate::settings::RizomUvSettings;
    pub use crate::tool::{Tool, ToolSetup};

    // Jobs
    pub use crate::job::JobDirectory;
    pub use crate::runner::{ToolReport, run_setup};

    // Configuration
    pub use crate::config::ToolConfig;

    // Error handling
    pub use crate::{Error, Result};
}
