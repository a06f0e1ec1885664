use crate::error::{PipelineError, PipelineResult};
use crate::math::{Vec2, Vec3};

/// Vertex and index counts are capped well below anything a single
/// allocation could overflow on a 32-bit length.
pub const COUNT_LIMIT: u32 = 10_000_000;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tangent: Vec3,
    pub binormal: Vec3,
    pub tex: Vec2,
}

/// The attribute kinds whose presence can be derived from vertex data,
/// rather than stored as a separate flag (spec: `VertexAttributePresence`).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AttributeKind {
    Normal,
    Tangent,
    Binormal,
    TexCoord,
}

/// A single mesh: vertices, an index buffer arranged as a triangle list,
/// a bounding box, and an opaque material reference.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelData {
    pub material_index: u32,

    pub min_bounds: Vec3,
    pub max_bounds: Vec3,
    pub size: Vec3,
    pub centre: Vec3,

    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl ModelData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Zero-initialized vertex allocation; previous contents discarded.
    pub fn allocate_vertices(&mut self, n: u32) -> PipelineResult<()> {
        if n > COUNT_LIMIT {
            return Err(PipelineError::CountExceedsLimit {
                stage: "ModelData::allocate_vertices",
                count: n as u64,
                limit: COUNT_LIMIT as u64,
            });
        }
        self.vertices = vec![Vertex::default(); n as usize];
        Ok(())
    }

    /// Zero-initialized index allocation; previous contents discarded.
    pub fn allocate_indices(&mut self, n: u32) -> PipelineResult<()> {
        if n > COUNT_LIMIT {
            return Err(PipelineError::CountExceedsLimit {
                stage: "ModelData::allocate_indices",
                count: n as u64,
                limit: COUNT_LIMIT as u64,
            });
        }
        self.indices = vec![0u32; n as usize];
        Ok(())
    }

    /// Walks vertex positions and recomputes `min_bounds`/`max_bounds`/
    /// `size`/`centre`. A mesh with no vertices collapses all four to the
    /// zero vector.
    pub fn recalculate_bounds(&mut self) {
        if self.vertices.is_empty() {
            self.min_bounds = Vec3::ZERO;
            self.max_bounds = Vec3::ZERO;
            self.size = Vec3::ZERO;
            self.centre = Vec3::ZERO;
            return;
        }

        let mut min = Vec3::splat(1e6);
        let mut max = Vec3::splat(-1e6);
        for v in &self.vertices {
            min = min.min(v.position);
            max = max.max(v.position);
        }

        self.min_bounds = min;
        self.max_bounds = max;
        self.size = max - min;
        self.centre = min + self.size * 0.5;
    }

    /// Same as [`recalculate_bounds`](Self::recalculate_bounds), but fails
    /// instead of silently zeroing when the mesh has no vertices.
    pub fn recalculate_bounds_checked(&mut self) -> PipelineResult<()> {
        if self.vertices.is_empty() {
            return Err(PipelineError::EmptyMesh {
                stage: "ModelData::recalculate_bounds",
            });
        }
        self.recalculate_bounds();
        Ok(())
    }

    /// Fills `indices` with `[0, 1, …, vertex_count - 1]`, the fallback the
    /// pipeline uses whenever a source format carries no face data of its
    /// own (the RJM binary format, or an importer scene with no faces).
    pub fn synthesize_sequential_indices(&mut self) {
        self.indices = (0..self.vertex_count()).collect();
    }

    /// True if any vertex has a non-zero value for the given attribute.
    pub fn attribute_present(&self, kind: AttributeKind) -> bool {
        self.vertices.iter().any(|v| match kind {
            AttributeKind::Normal => v.normal != Vec3::ZERO,
            AttributeKind::Tangent => v.tangent != Vec3::ZERO,
            AttributeKind::Binormal => v.binormal != Vec3::ZERO,
            AttributeKind::TexCoord => v.tex != Vec2::ZERO,
        })
    }

    /// Short one-line summary used by logging call sites.
    pub fn to_summary_string(&self) -> String {
        format!(
            "vertices={} indices={} bounds=[{:?} .. {:?}] size={:?} centre={:?}",
            self.vertex_count(),
            self.index_count(),
            self.min_bounds,
            self.max_bounds,
            self.size,
            self.centre
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mesh_has_zero_bounds() {
        let mut m = ModelData::new();
        m.recalculate_bounds();
        assert_eq!(m.min_bounds, Vec3::ZERO);
        assert_eq!(m.max_bounds, Vec3::ZERO);
        assert_eq!(m.size, Vec3::ZERO);
        assert_eq!(m.centre, Vec3::ZERO);
    }

    #[test]
    fn recalculate_bounds_checked_fails_on_empty() {
        let mut m = ModelData::new();
        assert!(matches!(
            m.recalculate_bounds_checked(),
            Err(PipelineError::EmptyMesh { .. })
        ));
    }

    #[test]
    fn allocate_rejects_counts_over_limit() {
        let mut m = ModelData::new();
        assert!(matches!(
            m.allocate_vertices(COUNT_LIMIT + 1),
            Err(PipelineError::CountExceedsLimit { .. })
        ));
        assert!(matches!(
            m.allocate_indices(COUNT_LIMIT + 1),
            Err(PipelineError::CountExceedsLimit { .. })
        ));
        // No partial allocation should have happened.
        assert!(m.vertices.is_empty());
        assert!(m.indices.is_empty());
    }

    #[test]
    fn bounds_match_cube() {
        let mut m = ModelData::new();
        m.allocate_vertices(2).unwrap();
        m.vertices[0].position = Vec3::new(-0.5, -0.5, -0.5);
        m.vertices[1].position = Vec3::new(0.5, 0.5, 0.5);
        m.recalculate_bounds();
        assert_eq!(m.min_bounds, Vec3::new(-0.5, -0.5, -0.5));
        assert_eq!(m.max_bounds, Vec3::new(0.5, 0.5, 0.5));
        assert_eq!(m.size, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(m.centre, Vec3::ZERO);
    }

    #[test]
    fn synthesize_sequential_indices_covers_every_vertex() {
        let mut m = ModelData::new();
        m.allocate_vertices(4).unwrap();
        m.synthesize_sequential_indices();
        assert_eq!(m.indices, vec![0, 1, 2, 3]);
        assert_eq!(m.index_count(), m.vertex_count());
    }

    #[test]
    fn attribute_presence_is_derived() {
        let mut m = ModelData::new();
        m.allocate_vertices(1).unwrap();
        assert!(!m.attribute_present(AttributeKind::Normal));
        m.vertices[0].normal = Vec3::new(0.0, 0.0, 1.0);
        assert!(m.attribute_present(AttributeKind::Normal));
        assert!(!m.attribute_present(AttributeKind::Tangent));
    }
}
