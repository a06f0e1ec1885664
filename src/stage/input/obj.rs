use crate::error::{PipelineError, PipelineResult};
use crate::importer::{ImportOptions, MeshImporter, ObjMeshImporter};
use crate::model::ModelData;
use crate::stage::{AggregateMetadata, InputSource, InputStage};

const STAGE: &str = "ObjImporterInput";

/// Reads a foreign mesh format through a [`MeshImporter`]. Corresponds to
/// `InputTransformerAssimp` in the original pipeline, generalized from a
/// hard-coded Assimp call to any importer behind the trait.
pub struct ObjImporterInput<I: MeshImporter = ObjMeshImporter> {
    importer: I,
    options: ImportOptions,
}

impl Default for ObjImporterInput<ObjMeshImporter> {
    fn default() -> Self {
        Self {
            importer: ObjMeshImporter,
            options: ImportOptions::default(),
        }
    }
}

impl ObjImporterInput<ObjMeshImporter> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<I: MeshImporter> ObjImporterInput<I> {
    pub fn with_importer(importer: I, options: ImportOptions) -> Self {
        Self { importer, options }
    }
}

impl<I: MeshImporter> InputStage for ObjImporterInput<I> {
    fn produce(&self, source: InputSource, metadata: &mut AggregateMetadata) -> PipelineResult<Vec<ModelData>> {
        let bytes = source.read(STAGE)?;
        let outcome = self.importer.import(&bytes, self.options)?;
        log::info!(
            "{STAGE}: imported {} mesh(es), {} skipped",
            outcome.meshes.len(),
            outcome.skipped.len()
        );
        for err in &outcome.skipped {
            log::error!("{STAGE}: {err}");
        }

        metadata.source_identifier = outcome.meshes.first().map(|m| m.name.clone());

        let models: Vec<ModelData> = outcome.meshes.into_iter().map(|m| m.model).collect();
        if models.is_empty() {
            return Err(PipelineError::NoModels { stage: STAGE });
        }
        Ok(models)
    }

    fn name(&self) -> &'static str {
        STAGE
    }
}
