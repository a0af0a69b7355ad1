//! Output formats and the save directives that request them

use crate::script::{Bindings, ScriptTemplate};
use crate::settings::RizomUvSettings;
use crate::{Error, Result};
use std::path::Path;

const SAVE_TEMPLATE: ScriptTemplate = ScriptTemplate::new(&[
    r#"ZomSave({File={Path=$path, UVWProps=true}, __UpdateUIObjFileName=true})"#,
]);

/// Mesh formats RizomUV can save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveFormat {
    /// Wavefront OBJ
    Obj,
    /// Autodesk FBX
    Fbx,
    /// COLLADA
    Collada,
}

impl SaveFormat {
    /// All formats, in the order their save directives are emitted
    pub const ALL: [SaveFormat; 3] = [Self::Obj, Self::Fbx, Self::Collada];

    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Obj => "obj",
            Self::Fbx => "fbx",
            Self::Collada => "dae",
        }
    }

    /// Parse format from a file extension (case-insensitive, no dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "obj" => Some(Self::Obj),
            "fbx" => Some(Self::Fbx),
            "dae" => Some(Self::Collada),
            _ => None,
        }
    }

    /// Infer format from a file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Whether the settings explicitly request this format
    pub fn is_flagged(&self, settings: &RizomUvSettings) -> bool {
        match self {
            Self::Obj => settings.save_obj,
            Self::Fbx => settings.save_fbx,
            Self::Collada => settings.save_collada,
        }
    }

    /// Get a human-readable name for this format
    pub fn name(&self) -> &'static str {
        match self {
            Self::Obj => "OBJ",
            Self::Fbx => "FBX",
            Self::Collada => "COLLADA",
        }
    }
}

/// One format to save and the file it goes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOperation {
    /// Format to save
    pub format: SaveFormat,
    /// Target path: output base name plus the format's extension
    pub path: String,
}

impl SaveOperation {
    /// Render the `ZomSave` directive for this operation
    pub fn directive(&self) -> Result<String> {
        SAVE_TEMPLATE.render(&Bindings::new().bind("path", self.path.as_str()))
    }
}

/// Output path with its extension removed
///
/// `/jobs/mesh.v2.fbx` becomes `/jobs/mesh.v2`; paths without an extension
/// are returned unchanged.
pub fn output_base(output_path: &Path) -> String {
    output_path.with_extension("").to_string_lossy().into_owned()
}

/// Decide which formats to save for the given output path and settings
///
/// A format is saved when the output path carries its extension or when its
/// flag is set. Fails with [`Error::NoSaveOperation`] when nothing is
/// selected, so a job can never unwrap without saving.
pub fn save_operations(
    output_path: &Path,
    settings: &RizomUvSettings,
) -> Result<Vec<SaveOperation>> {
    let output_format = SaveFormat::from_path(output_path);
    let base = output_base(output_path);

    let operations: Vec<SaveOperation> = SaveFormat::ALL
        .into_iter()
        .filter(|format| output_format == Some(*format) || format.is_flagged(settings))
        .map(|format| SaveOperation {
            format,
            path: format!("{}.{}", base, format.extension()),
        })
        .collect();

    if operations.is_empty() {
        return Err(Error::NoSaveOperation);
    }

    Ok(operations)
}
