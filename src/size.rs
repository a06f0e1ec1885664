use crate::math::Vec3;
use crate::model::ModelData;

/// Axis-aligned bounding box plus derived size/centre, computable from a
/// single mesh, a set of already-computed `SizeProperties`, or a set of
/// meshes (optionally recomputing each child from its vertices first).
///
/// Mirrors `ModelSizeProperties` in the original pipeline, including its
/// sentinel min/max values (`+1e6`/`-1e6`, not `+inf`/`-inf`) and its
/// sanity clamp against inverted bounds.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SizeProperties {
    pub min_bounds: Vec3,
    pub max_bounds: Vec3,
    pub size: Vec3,
    pub centre: Vec3,
}

impl SizeProperties {
    fn from_bounds(min_bounds: Vec3, max_bounds: Vec3) -> Self {
        let (min_bounds, max_bounds) = if min_bounds.le(max_bounds) {
            (min_bounds, max_bounds)
        } else {
            (Vec3::ZERO, Vec3::ZERO)
        };

        let size = max_bounds - min_bounds;
        let centre = min_bounds + size * 0.5;

        Self {
            min_bounds,
            max_bounds,
            size,
            centre,
        }
    }

    /// Min/max over all vertex positions of a single mesh. An empty mesh
    /// yields all-zero properties.
    pub fn from_model(model: &ModelData) -> Self {
        if model.vertices.is_empty() {
            return Self::default();
        }

        let mut min = Vec3::splat(1e6);
        let mut max = Vec3::splat(-1e6);
        for v in &model.vertices {
            min = min.min(v.position);
            max = max.max(v.position);
        }

        Self::from_bounds(min, max)
    }

    /// Componentwise min of mins / max of maxes across a set of properties.
    /// Always yields the enclosing AABB.
    pub fn from_properties(properties: &[SizeProperties]) -> Self {
        let mut min = Vec3::splat(1e6);
        let mut max = Vec3::splat(-1e6);
        for p in properties {
            min = min.min(p.min_bounds);
            max = max.max(p.max_bounds);
        }
        Self::from_bounds(min, max)
    }

    /// Aggregate across a set of meshes. When `recompute_children` is set,
    /// each mesh's own bounds are recomputed from its vertex data first;
    /// otherwise each mesh's existing bounds fields are trusted as-is.
    pub fn from_models(models: &[ModelData], recompute_children: bool) -> Self {
        let properties: Vec<SizeProperties> = models
            .iter()
            .map(|m| {
                if recompute_children {
                    SizeProperties::from_model(m)
                } else {
                    SizeProperties {
                        min_bounds: m.min_bounds,
                        max_bounds: m.max_bounds,
                        size: m.size,
                        centre: m.centre,
                    }
                }
            })
            .collect();

        Self::from_properties(&properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with_positions(positions: &[Vec3]) -> ModelData {
        let mut m = ModelData::new();
        m.allocate_vertices(positions.len() as u32).unwrap();
        for (v, p) in m.vertices.iter_mut().zip(positions) {
            v.position = *p;
        }
        m
    }

    #[test]
    fn empty_model_has_zero_properties() {
        let m = ModelData::new();
        let p = SizeProperties::from_model(&m);
        assert_eq!(p.min_bounds, Vec3::ZERO);
        assert_eq!(p.max_bounds, Vec3::ZERO);
        assert_eq!(p.size, Vec3::ZERO);
        assert_eq!(p.centre, Vec3::ZERO);
    }

    #[test]
    fn aggregate_bounds_enclose_children() {
        let a = model_with_positions(&[Vec3::new(-5.0, -1.0, -1.0), Vec3::new(-3.0, 1.0, 1.0)]);
        let b = model_with_positions(&[Vec3::new(3.0, -1.0, -1.0), Vec3::new(5.0, 1.0, 1.0)]);

        let pa = SizeProperties::from_model(&a);
        let pb = SizeProperties::from_model(&b);
        let agg = SizeProperties::from_properties(&[pa, pb]);

        assert!(agg.min_bounds.le(pa.min_bounds));
        assert!(agg.min_bounds.le(pb.min_bounds));
        assert!(pa.max_bounds.le(agg.max_bounds));
        assert!(pb.max_bounds.le(agg.max_bounds));
        assert_eq!(agg.centre, Vec3::ZERO);
    }

    #[test]
    fn from_models_respects_recompute_flag() {
        let mut a = model_with_positions(&[Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 2.0, 2.0)]);
        // Stale stored bounds that don't match vertex data.
        a.min_bounds = Vec3::ZERO;
        a.max_bounds = Vec3::ZERO;

        let trusted = SizeProperties::from_models(std::slice::from_ref(&a), false);
        assert_eq!(trusted.max_bounds, Vec3::ZERO);

        let recomputed = SizeProperties::from_models(std::slice::from_ref(&a), true);
        assert_eq!(recomputed.max_bounds, Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn inverted_bounds_are_clamped_to_zero() {
        let p = SizeProperties::from_bounds(Vec3::new(1.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(p.min_bounds, Vec3::ZERO);
        assert_eq!(p.max_bounds, Vec3::ZERO);
    }
}
