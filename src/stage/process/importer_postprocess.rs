use std::io::Write as _;

use tempfile::NamedTempFile;

use crate::error::{PipelineError, PipelineResult};
use crate::importer::{ImportOptions, MeshImporter, ObjMeshImporter};
use crate::model::ModelData;
use crate::stage::output::ObjOutput;
use crate::stage::{OutputStage, ProcessingStage, RunContext};

const NAME: &str = "ImporterPostprocessStage";

/// Round-trips each model through the OBJ importer: serializes it to a
/// scratch file via the same `ObjOutput::emit` code path a standalone OBJ
/// export would use, then re-imports it through the same post-processing
/// path a freshly-loaded mesh would take. Corresponds to the original's
/// `SaveToNewTemporaryFile` / re-import / `DeleteTemporaryFile` sequence in
/// `PipelineStageAssimpTransform`; `tempfile::NamedTempFile`'s RAII drop
/// takes the place of the explicit delete call.
#[derive(Default)]
pub struct ImporterPostprocessStage;

impl ProcessingStage for ImporterPostprocessStage {
    fn name(&self) -> &'static str {
        NAME
    }

    fn process(&self, model: &mut ModelData, _ctx: &RunContext) -> PipelineResult<()> {
        let obj_bytes = ObjOutput::new().emit(model)?;

        let mut tmp = NamedTempFile::new().map_err(|source| PipelineError::IoFailure { stage: NAME, source })?;
        tmp.write_all(&obj_bytes)
            .map_err(|source| PipelineError::IoFailure { stage: NAME, source })?;
        tmp.flush().map_err(|source| PipelineError::IoFailure { stage: NAME, source })?;

        let bytes = std::fs::read(tmp.path()).map_err(|source| PipelineError::IoFailure { stage: NAME, source })?;
        let mut outcome = ObjMeshImporter.import(bytes.as_slice(), ImportOptions::default())?;
        for err in &outcome.skipped {
            log::error!("{NAME}: {err}");
        }
        let material_index = model.material_index;
        *model = outcome.meshes.remove(0).model;
        model.material_index = material_index;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    fn triangle_model() -> ModelData {
        let mut m = ModelData::new();
        m.allocate_vertices(3).unwrap();
        m.vertices[0].position = Vec3::new(0.0, 0.0, 0.0);
        m.vertices[1].position = Vec3::new(1.0, 0.0, 0.0);
        m.vertices[2].position = Vec3::new(0.0, 1.0, 0.0);
        m.allocate_indices(3).unwrap();
        m.indices.copy_from_slice(&[0, 1, 2]);
        m.material_index = 7;
        m
    }

    #[test]
    fn round_trip_preserves_vertex_positions_and_material_index() {
        let mut m = triangle_model();
        let ctx = RunContext {
            metadata: crate::stage::AggregateMetadata::default(),
            aggregate: crate::size::SizeProperties::from_models(std::slice::from_ref(&m), false),
        };
        ImporterPostprocessStage.process(&mut m, &ctx).unwrap();
        assert_eq!(m.vertex_count(), 3);
        assert_eq!(m.material_index, 7);
        assert_eq!(m.vertices[1].position, Vec3::new(1.0, 0.0, 0.0));
    }
}
