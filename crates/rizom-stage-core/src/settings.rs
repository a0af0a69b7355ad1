//! Job settings for a RizomUV unwrap-and-pack run
//!
//! Settings are read from JSON using the camelCase keys job files use
//! (`inputMeshFile`, `packResolution`, ...). Every key except the two mesh
//! references is optional; omitted keys take the defaults below.

use crate::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Settings for one unwrap-and-pack job
#[allow(clippy::struct_excessive_bools)] // Config structs naturally have many bool fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RizomUvSettings {
    // Files
    /// Input mesh reference, resolved against the job directory
    #[serde(deserialize_with = "null_as_empty")]
    pub input_mesh_file: String,
    /// Output mesh reference; its extension selects the default save format
    #[serde(deserialize_with = "null_as_empty")]
    pub output_mesh_file: String,

    // Extra save formats
    /// Also save a Wavefront OBJ next to the output
    pub save_obj: bool,
    /// Also save an FBX next to the output
    pub save_fbx: bool,
    /// Also save a COLLADA (.dae) next to the output
    pub save_collada: bool,

    // Seam detection
    /// Developability threshold for automatic seam selection (0..1)
    pub cut_segmentation_strength: f64,
    /// Cut handles (topological loops) open during seam selection
    pub cut_handles: bool,

    // Unfold
    /// Optimization iterations for the unfold pass
    pub rizom_iterations: f64,
    /// Prevent flipped triangles while unfolding
    pub rizom_no_triangle_flips: bool,
    /// Prevent island borders from self-intersecting while unfolding
    pub rizom_no_border_intersections: bool,

    // Packing
    /// Packing quality grid resolution
    pub pack_resolution: f64,
    /// Number of packing mutations to try
    pub pack_mutations: f64,
    /// Margin to the tile border, in UV units
    pub pack_margin: f64,
    /// Spacing between islands, in UV units
    pub pack_spacing: f64,
    /// Smallest island rotation in degrees
    pub pack_rotate_min: f64,
    /// Largest island rotation in degrees
    pub pack_rotate_max: f64,
    /// Rotation step in degrees
    pub pack_rotate_step: f64,
}

impl Default for RizomUvSettings {
    fn default() -> Self {
        Self {
            input_mesh_file: String::new(),
            output_mesh_file: String::new(),

            save_obj: false,
            save_fbx: false,
            save_collada: false,

            cut_segmentation_strength: 0.65,
            cut_handles: true,

            rizom_iterations: 5.0,
            rizom_no_triangle_flips: true,
            rizom_no_border_intersections: true,

            pack_resolution: 500.0,
            pack_mutations: 1.0,
            pack_margin: 2.0 / 1024.0,
            pack_spacing: 4.0 / 1024.0,
            pack_rotate_min: 0.0,
            pack_rotate_max: 180.0,
            pack_rotate_step: 30.0,
        }
    }
}

impl RizomUvSettings {
    /// Create settings for the given input and output mesh with all defaults
    pub fn new(input_mesh_file: impl Into<String>, output_mesh_file: impl Into<String>) -> Self {
        Self {
            input_mesh_file: input_mesh_file.into(),
            output_mesh_file: output_mesh_file.into(),
            ..Self::default()
        }
    }

    /// Parse settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file
    pub async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    /// Request an OBJ save regardless of the output extension
    pub fn with_save_obj(mut self, save: bool) -> Self {
        self.save_obj = save;
        self
    }

    /// Request an FBX save regardless of the output extension
    pub fn with_save_fbx(mut self, save: bool) -> Self {
        self.save_fbx = save;
        self
    }

    /// Request a COLLADA save regardless of the output extension
    pub fn with_save_collada(mut self, save: bool) -> Self {
        self.save_collada = save;
        self
    }

    /// Set the seam segmentation strength
    pub fn with_segmentation_strength(mut self, strength: f64) -> Self {
        self.cut_segmentation_strength = strength;
        self
    }

    /// Set the packing resolution
    pub fn with_pack_resolution(mut self, resolution: f64) -> Self {
        self.pack_resolution = resolution;
        self
    }
}

/// Treat an explicit `null` file reference like a missing one
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn test_defaults() {
        let settings = RizomUvSettings::default();
        assert!((settings.cut_segmentation_strength - 0.65).abs() < f64::EPSILON);
        assert!(settings.cut_handles);
        assert!((settings.rizom_iterations - 5.0).abs() < f64::EPSILON);
        assert!((settings.pack_resolution - 500.0).abs() < f64::EPSILON);
        assert!((settings.pack_rotate_max - 180.0).abs() < f64::EPSILON);
        assert!((settings.pack_rotate_step - 30.0).abs() < f64::EPSILON);
        assert!((settings.pack_margin - 0.001_953_125).abs() < f64::EPSILON);
        assert!((settings.pack_spacing - 0.003_906_25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_json_applies_defaults() {
        let settings = RizomUvSettings::from_json(
            r#"{ "inputMeshFile": "raw.obj", "outputMeshFile": "unwrapped.fbx", "saveCollada": true }"#,
        )
        .expect("valid settings");

        assert_eq!(settings.input_mesh_file, "raw.obj");
        assert_eq!(settings.output_mesh_file, "unwrapped.fbx");
        assert!(settings.save_collada);
        assert!(!settings.save_obj);
        assert!((settings.pack_mutations - 1.0).abs() < f64::EPSILON);
        assert!(settings.rizom_no_border_intersections);
    }

    #[test]
    fn test_from_json_overrides() {
        let settings = RizomUvSettings::from_json(
            r#"{
                "inputMeshFile": "a.obj",
                "outputMeshFile": "b.obj",
                "cutSegmentationStrength": 0.4,
                "cutHandles": false,
                "rizomIterations": 12,
                "packRotateMin": -90,
                "packRotateStep": 90
            }"#,
        )
        .expect("valid settings");

        assert!((settings.cut_segmentation_strength - 0.4).abs() < f64::EPSILON);
        assert!(!settings.cut_handles);
        assert!((settings.rizom_iterations - 12.0).abs() < f64::EPSILON);
        assert!((settings.pack_rotate_min + 90.0).abs() < f64::EPSILON);
        assert!((settings.pack_rotate_step - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_files_default_to_empty() {
        let settings = RizomUvSettings::from_json("{}").expect("empty object is valid");
        assert!(settings.input_mesh_file.is_empty());
        assert!(settings.output_mesh_file.is_empty());
    }

    #[test]
    fn test_builder() {
        let settings = RizomUvSettings::new("in.obj", "out.stl")
            .with_save_fbx(true)
            .with_segmentation_strength(0.8)
            .with_pack_resolution(1000.0);

        assert!(settings.save_fbx);
        assert!((settings.cut_segmentation_strength - 0.8).abs() < f64::EPSILON);
        assert!((settings.pack_resolution - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fractional_numbers_are_accepted() {
        let settings = RizomUvSettings::from_json(
            r#"{
                "inputMeshFile": "a.obj",
                "outputMeshFile": "b.obj",
                "packRotateStep": 22.5,
                "packResolution": 500.0,
                "rizomIterations": 7.5
            }"#,
        )
        .expect("fractional values are trusted as supplied");

        assert!((settings.pack_rotate_step - 22.5).abs() < f64::EPSILON);
        assert!((settings.pack_resolution - 500.0).abs() < f64::EPSILON);
        assert!((settings.rizom_iterations - 7.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_null_files_become_empty() {
        let settings = RizomUvSettings::from_json(
            r#"{ "inputMeshFile": null, "outputMeshFile": null }"#,
        )
        .expect("null file references are allowed");

        assert!(settings.input_mesh_file.is_empty());
        assert!(settings.output_mesh_file.is_empty());
    }
}
