use crate::error::PipelineResult;
use crate::model::ModelData;
use crate::stage::{ProcessingStage, RunContext};

const NAME: &str = "CentreStage";
const EPSILON: f32 = 1e-6;

/// Translates a model so it sits at the origin. Corresponds to
/// `PipelineStageCentreModel`.
///
/// Uses `ctx.aggregate.centre` rather than recomputing the model's own
/// centre, so a multi-mesh run is centred as one joint object: `ctx`'s
/// aggregate bounds are fixed for the whole run (computed once, over every
/// mesh, before any processing stage touches them), so every sibling mesh
/// is translated by the same offset. For a single-mesh run the aggregate
/// is numerically identical to that mesh's own centre.
///
/// A run whose aggregate centre is already within [`EPSILON`] of zero on
/// every axis is treated as already centred and left untouched, matching
/// the original's idempotence check.
#[derive(Default)]
pub struct CentreStage;

impl ProcessingStage for CentreStage {
    fn name(&self) -> &'static str {
        NAME
    }

    fn process(&self, model: &mut ModelData, ctx: &RunContext) -> PipelineResult<()> {
        let centre = ctx.aggregate.centre;
        if centre.all_near_zero(EPSILON) {
            log::debug!("{NAME}: already centred, skipping");
            return Ok(());
        }

        for v in model.vertices.iter_mut() {
            v.position = v.position - centre;
        }
        model.recalculate_bounds();

        log::info!("{NAME}: translated by {centre:?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use crate::size::SizeProperties;
    use crate::stage::AggregateMetadata;

    fn model_with_positions(positions: &[Vec3]) -> ModelData {
        let mut m = ModelData::new();
        m.allocate_vertices(positions.len() as u32).unwrap();
        for (v, p) in m.vertices.iter_mut().zip(positions) {
            v.position = *p;
        }
        m.recalculate_bounds();
        m
    }

    fn ctx_for(models: &[ModelData]) -> RunContext {
        RunContext {
            metadata: AggregateMetadata::default(),
            aggregate: SizeProperties::from_models(models, false),
        }
    }

    #[test]
    fn centres_a_single_off_origin_model() {
        let mut m = model_with_positions(&[Vec3::new(8.0, 8.0, 8.0), Vec3::new(10.0, 10.0, 10.0)]);
        let ctx = ctx_for(std::slice::from_ref(&m));
        CentreStage.process(&mut m, &ctx).unwrap();
        assert_eq!(m.centre, Vec3::ZERO);
        assert_eq!(m.min_bounds, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(m.max_bounds, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn already_centred_model_is_left_untouched() {
        let mut m = model_with_positions(&[Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0)]);
        let ctx = ctx_for(std::slice::from_ref(&m));
        let before = m.vertices.clone();
        CentreStage.process(&mut m, &ctx).unwrap();
        assert_eq!(m.vertices, before);
    }

    #[test]
    fn joint_centre_leaves_already_balanced_pair_untouched() {
        let mut left = model_with_positions(&[Vec3::new(-6.0, 0.0, 0.0), Vec3::new(-4.0, 0.0, 0.0)]);
        let mut right = model_with_positions(&[Vec3::new(4.0, 0.0, 0.0), Vec3::new(6.0, 0.0, 0.0)]);
        let ctx = ctx_for(&[left.clone(), right.clone()]);

        CentreStage.process(&mut left, &ctx).unwrap();
        CentreStage.process(&mut right, &ctx).unwrap();

        assert_eq!(left.vertices[0].position, Vec3::new(-6.0, 0.0, 0.0));
        assert_eq!(right.vertices[1].position, Vec3::new(6.0, 0.0, 0.0));
    }
}
