//! RizomUV unwrap-and-pack tool
//!
//! Stages a batch job that loads a mesh, cuts seams automatically, unfolds
//! the islands, packs them into the 0-1 tile and saves the result in every
//! requested format. RizomUV runs the generated script with
//! `rizomuv -cfi <script>` and quits when it is done.

use crate::save::{SaveOperation, save_operations};
use crate::script::{Bindings, Literal, ScriptTemplate};
use crate::settings::RizomUvSettings;
use crate::tool::{JobContext, Tool, ToolSetup};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Prefix of generated script file names
pub const SCRIPT_PREFIX: &str = "_rizomuv_";

/// Extension of generated script file names
pub const SCRIPT_EXTENSION: &str = "lua";

/// Command-line switch that runs a script file and quits
pub const SCRIPT_SWITCH: &str = "-cfi";

/// The unwrap-and-pack script
///
/// Directive order and option names are what RizomUV's interpreter expects;
/// only the `$` placeholders vary between jobs.
pub const UNWRAP_TEMPLATE: ScriptTemplate = ScriptTemplate::new(&[
    // Start from factory preferences
    r#"ZomResetPrefs()"#,
    r#"ZomLoad({File={Path=$input_path, ImportGroups=true, XYZUVW=true, UVWProps=true}})"#,
    // Seams
    r#"ZomSelect({PrimType="Edge", Select=true, ResetBefore=true, WorkingSetPath="Island.Visible&UnLocked", ProtectMapName="Protect", FilterIslandVisible=true, Auto={QuasiDevelopable={Developability=$cut_segmentation_strength, IslandPolyNBMin=1, FitCones=false, Straighten=true}, HandleCutter=$cut_handles, StoreCoordsUVW=true, FlatteningMode=0, FlatteningUnfoldParams={BorderIntersections=true, TriangleFlips=true}}})"#,
    r#"ZomCut({PrimType="Edge", WorkingSet="Visible&UnLocked"})"#,
    // Unfold
    r#"ZomUnfold({PrimType="Edge", MinAngle=1e-005, Mix=1, Iterations=$rizom_iterations, PreIterations=5, StopIfOutOFDomain=false, RoomSpace=0, PinMapName="Pin", ProcessNonFlats=true, ProcessSelection=true, ProcessAllIfNoneSelected=true, ProcessJustCut=true, BorderIntersections=$rizom_no_border_intersections, TriangleFlips=$rizom_no_triangle_flips})"#,
    // Packing
    r#"ZomIslandGroups({Mode="SetGroupsProperties", WorkingSet="Visible", MergingPolicy=8322, GroupPaths={"RootGroup"}, Properties={Pack={Rotate={Min=$pack_rotate_min, Max=$pack_rotate_max, Step=$pack_rotate_step}, SpacingSize=$pack_spacing, MarginSize=$pack_margin}}})"#,
    r#"ZomIslandGroups({Mode="DistributeInTilesEvenly", WorkingSet="Visible&UnLocked", MergingPolicy=8322, GroupPath="RootGroup", UseTileLocks=true, UseIslandLocks=true})"#,
    r#"ZomPack({ProcessTileSelection=false, RecursionDepth=1, RootGroup="RootGroup", WorkingSet="Visible&UnLocked", Scaling={Mode=2}, Rotate={Min=$pack_rotate_min, Max=$pack_rotate_max, Step=$pack_rotate_step}, Translate=true, LayoutScalingMode=2, Resolution=$pack_resolution, MaxMutations=$pack_mutations, MarginSize=$pack_margin, SpacingSize=$pack_spacing})"#,
    r#"ZomIslandGroups({Mode="DistributeInTilesByBBox", WorkingSet="Visible&UnLocked", MergingPolicy=8322, GroupPath="RootGroup", UseTileLocks=true, UseIslandLocks=true})"#,
    r#"ZomPack({ProcessTileSelection=false, RecursionDepth=1, RootGroup="RootGroup", WorkingSet="Visible&UnLocked", Scaling={Mode=2}, Rotate={Min=$pack_rotate_min, Max=$pack_rotate_max, Step=$pack_rotate_step}, Translate=true, LayoutScalingMode=2, FillTiles=true, Resolution=$pack_resolution, MaxMutations=$pack_mutations, MarginSize=$pack_margin, SpacingSize=$pack_spacing})"#,
    // Output
    "$save_operations",
    r#"ZomQuit()"#,
]);

/// Stages RizomUV batch jobs
#[derive(Debug, Clone)]
pub struct RizomUvTool {
    executable: PathBuf,
}

impl RizomUvTool {
    /// Display name
    pub const NAME: &'static str = "RizomUV";

    /// Create a tool that launches the given RizomUV executable
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Path of the RizomUV executable
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Command line that runs RizomUV against a script
    pub fn command_line(&self, script_path: &Path) -> String {
        format!(
            "\"{}\" {} \"{}\"",
            self.executable.display(),
            SCRIPT_SWITCH,
            script_path.display()
        )
    }

    /// Render the script for already resolved input and output paths
    ///
    /// This does everything [`Tool::setup_instance`] does except touching
    /// the job: no id is drawn and nothing is written.
    pub fn render_script(
        settings: &RizomUvSettings,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<String> {
        let operations = save_operations(output_path, settings)?;
        render_with_operations(settings, input_path, &operations)
    }
}

impl Tool for RizomUvTool {
    type Settings = RizomUvSettings;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn setup_instance<J: JobContext>(
        &self,
        settings: &RizomUvSettings,
        job: &J,
    ) -> Result<ToolSetup> {
        let input_path = job
            .resolve_path(&settings.input_mesh_file)
            .ok_or(Error::MissingInputMesh)?;
        let output_path = job
            .resolve_path(&settings.output_mesh_file)
            .ok_or(Error::MissingOutputMesh)?;

        let operations = save_operations(&output_path, settings)?;
        let script = render_with_operations(settings, &input_path, &operations)?;

        let script_file = format!("{}{}.{}", SCRIPT_PREFIX, job.unique_id(), SCRIPT_EXTENSION);
        let script_path = job
            .resolve_path(&script_file)
            .unwrap_or_else(|| PathBuf::from(&script_file));
        debug!("Writing {} script to {}", Self::NAME, script_path.display());

        job.write_file(&script_file, &script).await?;

        let outputs: Vec<PathBuf> = operations.iter().map(|op| PathBuf::from(&op.path)).collect();
        let formats: Vec<&str> = operations.iter().map(|op| op.format.name()).collect();
        info!(
            "Staged {} job: {} -> {} ({})",
            Self::NAME,
            input_path.display(),
            output_path.display(),
            formats.join(", ")
        );

        Ok(ToolSetup {
            command: self.command_line(&script_path),
            executable: self.executable().to_path_buf(),
            args: vec![
                SCRIPT_SWITCH.to_string(),
                script_path.to_string_lossy().into_owned(),
            ],
            script_file,
            script_path,
            script,
            outputs,
        })
    }
}

fn render_with_operations(
    settings: &RizomUvSettings,
    input_path: &Path,
    operations: &[SaveOperation],
) -> Result<String> {
    let saves = operations
        .iter()
        .map(SaveOperation::directive)
        .collect::<Result<Vec<_>>>()?
        .join("\n");

    let bindings = Bindings::new()
        .bind("input_path", input_path.to_string_lossy().into_owned())
        .bind("cut_segmentation_strength", settings.cut_segmentation_strength)
        .bind("cut_handles", settings.cut_handles)
        .bind("rizom_iterations", settings.rizom_iterations)
        .bind("rizom_no_triangle_flips", settings.rizom_no_triangle_flips)
        .bind(
            "rizom_no_border_intersections",
            settings.rizom_no_border_intersections,
        )
        .bind("pack_resolution", settings.pack_resolution)
        .bind("pack_mutations", settings.pack_mutations)
        .bind("pack_margin", settings.pack_margin)
        .bind("pack_spacing", settings.pack_spacing)
        .bind("pack_rotate_min", settings.pack_rotate_min)
        .bind("pack_rotate_max", settings.pack_rotate_max)
        .bind("pack_rotate_step", settings.pack_rotate_step)
        .bind("save_operations", Literal::Raw(saves));

    UNWRAP_TEMPLATE.render(&bindings)
}
