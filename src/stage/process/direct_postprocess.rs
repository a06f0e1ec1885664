use std::ops::BitOr;
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::math::Mat4;
use crate::model::ModelData;
use crate::stage::{ProcessingStage, RunContext};

const NAME: &str = "DirectPostprocessStage";

/// Bitmask of simple, in-place vertex transforms, matching the flag
/// bitmask `PipelineStageDirectPostprocess` takes in the original pipeline.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectPostprocessFlags(u8);

impl DirectPostprocessFlags {
    pub const NONE: Self = Self(0);
    pub const INVERT_U: Self = Self(1 << 0);
    pub const INVERT_V: Self = Self(1 << 1);
    pub const CUSTOM_TRANSFORM: Self = Self(1 << 2);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for DirectPostprocessFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Applies UV inversion and/or a caller-supplied custom vertex transform.
/// Corresponds to `PipelineStageDirectPostprocess`. Operations apply in
/// the order InvertU, InvertV, CustomTransform, each as its own loop over
/// the vertex array; the stage is a no-op when no flag bit is set.
pub struct DirectPostprocessStage {
    flags: DirectPostprocessFlags,
    transform: Option<Mat4>,
}

impl DirectPostprocessStage {
    pub fn new(flags: DirectPostprocessFlags) -> Self {
        Self { flags, transform: None }
    }

    /// Reads and parses the `.transform` sidecar immediately, so a
    /// malformed or missing file is reported at build time rather than on
    /// the first `execute()` call.
    pub fn with_transform_file(mut self, path: impl AsRef<Path>) -> PipelineResult<Self> {
        self.transform = Some(load_transform(path.as_ref())?);
        Ok(self)
    }
}

fn load_transform(path: &Path) -> PipelineResult<Mat4> {
    let text = std::fs::read_to_string(path).map_err(|_| PipelineError::TransformFileMissing {
        stage: NAME,
        path: path.display().to_string(),
    })?;

    let values: Result<Vec<f32>, _> = text
        .replace(',', " ")
        .split_whitespace()
        .map(|s| s.parse::<f32>())
        .collect();
    let values = values.map_err(|_| PipelineError::TransformFileMalformed {
        stage: NAME,
        path: path.display().to_string(),
        reason: "expected 16 comma-separated floating point values".to_string(),
    })?;

    if values.len() != 16 {
        return Err(PipelineError::TransformFileMalformed {
            stage: NAME,
            path: path.display().to_string(),
            reason: format!("expected 16 values, found {}", values.len()),
        });
    }

    let mut rows = [0f32; 16];
    rows.copy_from_slice(&values);
    Ok(Mat4::from_row_major(rows))
}

impl ProcessingStage for DirectPostprocessStage {
    fn name(&self) -> &'static str {
        NAME
    }

    fn process(&self, model: &mut ModelData, _ctx: &RunContext) -> PipelineResult<()> {
        if self.flags.contains(DirectPostprocessFlags::INVERT_U) {
            for v in model.vertices.iter_mut() {
                v.tex.x = 1.0 - v.tex.x;
            }
        }
        if self.flags.contains(DirectPostprocessFlags::INVERT_V) {
            for v in model.vertices.iter_mut() {
                v.tex.y = 1.0 - v.tex.y;
            }
        }
        if let Some(m) = &self.transform {
            for v in model.vertices.iter_mut() {
                v.position = m.transform_point(v.position);
                v.normal = m.transform_direction(v.normal).normalize_or_zero();
                v.tangent = m.transform_direction(v.tangent).normalize_or_zero();
                v.binormal = m.transform_direction(v.binormal).normalize_or_zero();
            }
            model.recalculate_bounds();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::size::SizeProperties;
    use crate::stage::AggregateMetadata;

    fn model_with_uv(u: f32, v: f32) -> ModelData {
        let mut m = ModelData::new();
        m.allocate_vertices(1).unwrap();
        m.vertices[0].tex = Vec2::new(u, v);
        m
    }

    fn ctx_for(models: &[ModelData]) -> RunContext {
        RunContext {
            metadata: AggregateMetadata::default(),
            aggregate: SizeProperties::from_models(models, false),
        }
    }

    #[test]
    fn invert_u_flips_u_only() {
        let mut m = model_with_uv(0.25, 0.75);
        let ctx = ctx_for(std::slice::from_ref(&m));
        DirectPostprocessStage::new(DirectPostprocessFlags::INVERT_U)
            .process(&mut m, &ctx)
            .unwrap();
        assert_eq!(m.vertices[0].tex, Vec2::new(0.75, 0.75));
    }

    #[test]
    fn invert_both_flips_both() {
        let mut m = model_with_uv(0.25, 0.75);
        let ctx = ctx_for(std::slice::from_ref(&m));
        let flags = DirectPostprocessFlags::INVERT_U | DirectPostprocessFlags::INVERT_V;
        DirectPostprocessStage::new(flags).process(&mut m, &ctx).unwrap();
        assert_eq!(m.vertices[0].tex, Vec2::new(0.75, 0.25));
    }

    #[test]
    fn double_invert_u_is_involution() {
        let mut m = model_with_uv(0.25, 0.75);
        let ctx = ctx_for(std::slice::from_ref(&m));
        let stage = DirectPostprocessStage::new(DirectPostprocessFlags::INVERT_U);
        stage.process(&mut m, &ctx).unwrap();
        stage.process(&mut m, &ctx).unwrap();
        assert_eq!(m.vertices[0].tex, Vec2::new(0.25, 0.75));
    }

    #[test]
    fn missing_transform_file_is_reported() {
        let result = DirectPostprocessStage::new(DirectPostprocessFlags::CUSTOM_TRANSFORM)
            .with_transform_file("/nonexistent/path.transform");
        assert!(matches!(result, Err(PipelineError::TransformFileMissing { .. })));
    }

    #[test]
    fn malformed_transform_file_is_reported() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "1,2,3\n").unwrap();
        let result =
            DirectPostprocessStage::new(DirectPostprocessFlags::CUSTOM_TRANSFORM).with_transform_file(tmp.path());
        assert!(matches!(result, Err(PipelineError::TransformFileMalformed { .. })));
    }

    #[test]
    fn comma_separated_identity_transform_is_a_noop_on_positions() {
        use crate::math::Vec3;
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "1,0,0,0,\n0,1,0,0,\n0,0,1,0,\n0,0,0,1",
        )
        .unwrap();

        let mut m = ModelData::new();
        m.allocate_vertices(1).unwrap();
        m.vertices[0].position = Vec3::new(2.0, 3.0, 4.0);
        let ctx = ctx_for(std::slice::from_ref(&m));

        let stage = DirectPostprocessStage::new(DirectPostprocessFlags::CUSTOM_TRANSFORM)
            .with_transform_file(tmp.path())
            .unwrap();
        stage.process(&mut m, &ctx).unwrap();
        assert_eq!(m.vertices[0].position, Vec3::new(2.0, 3.0, 4.0));
    }
}
