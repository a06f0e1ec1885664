use crate::error::{PipelineError, PipelineResult};
use crate::model::ModelData;
use crate::stage::{ProcessingStage, RunContext};

const NAME: &str = "UnitScaleStage";
const EPSILON: f32 = 1e-6;

/// Uniformly scales a model so `ctx.aggregate.size`'s largest extent
/// becomes `1.0`. Corresponds to `PipelineStageUnitScaleModel`; uses the
/// run's joint aggregate size for the same reason [`super::CentreStage`]
/// uses the joint centre.
///
/// Preserves the original's early-out quirk: a run is treated as already
/// unit-scaled, and left untouched, whenever its largest extent is no
/// bigger than `1.0` *and* at least one axis already sits within
/// [`EPSILON`] of exactly `1.0` — not simply "largest extent is 1". A
/// non-cubic model whose largest axis is, say, `0.4` is scaled up even
/// though it already fits within a unit cube, because no axis is near
/// `1.0`.
#[derive(Default)]
pub struct UnitScaleStage;

impl ProcessingStage for UnitScaleStage {
    fn name(&self) -> &'static str {
        NAME
    }

    fn process(&self, model: &mut ModelData, ctx: &RunContext) -> PipelineResult<()> {
        let size = ctx.aggregate.size;
        let max_extent = size.max_component();

        if max_extent <= 1.0 && size.any_near(1.0, EPSILON) {
            log::debug!("{NAME}: already unit scale, skipping");
            return Ok(());
        }

        if max_extent <= 0.0 {
            return Err(PipelineError::DegenerateSize { stage: NAME });
        }

        let scale = 1.0 / max_extent;
        for v in model.vertices.iter_mut() {
            v.position = v.position * scale;
        }
        model.recalculate_bounds();

        log::info!("{NAME}: scaled by {scale}");
        Ok(())
    }
}
