use crate::error::PipelineResult;
use crate::model::ModelData;
use crate::stage::{ProcessingStage, RunContext};

const NAME: &str = "OutputModelInfoStage";

/// Read-only diagnostic stage: logs a one-line summary for a model and
/// leaves it untouched. Corresponds to `PipelineStageOutputModelInfo`.
#[derive(Default)]
pub struct OutputModelInfoStage;

impl ProcessingStage for OutputModelInfoStage {
    fn name(&self) -> &'static str {
        NAME
    }

    fn process(&self, model: &mut ModelData, ctx: &RunContext) -> PipelineResult<()> {
        if let Some(id) = &ctx.metadata.source_identifier {
            log::debug!("{NAME}: source = {id}");
        }
        log::info!("{NAME}: {}", model.to_summary_string());
        Ok(())
    }
}
