//! The RJM binary wire format: little-endian, tightly packed, no padding.
//!
//! ```text
//! HEADER:
//!   material_index : u32
//!   min_bounds     : vec3<f32>   (12 bytes)
//!   max_bounds     : vec3<f32>
//!   size           : vec3<f32>
//!   centre         : vec3<f32>
//!   vertex_count   : u32
//! BODY:
//!   vertices       : vertex_count x Vertex
//!                    { position, normal, tangent, binormal : vec3<f32> ;
//!                      tex : vec2<f32> }  (56 bytes each)
//! ```
//!
//! The format carries no magic bytes of its own; an optional caller-supplied
//! identifier may be checked ahead of the header. Declarative layout is
//! expressed with `binrw`, matching the teacher crate's own binary formats;
//! domain validation that isn't expressible declaratively (count caps,
//! NaN/inverted bounds) is performed around the generated read/write calls.

use std::io::Cursor;

use binrw::{binrw, BinRead, BinWrite};

use crate::error::{PipelineError, PipelineResult};
use crate::math::{Vec2, Vec3};
use crate::model::{ModelData, Vertex, COUNT_LIMIT};

const STAGE: &str = "BinaryCodec";
pub const HEADER_SIZE: usize = 4 + 12 * 4 + 4;
pub const VERTEX_SIZE: usize = 12 * 4 + 8;

#[binrw]
#[brw(little)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct RawVec3 {
    x: f32,
    y: f32,
    z: f32,
}

impl From<Vec3> for RawVec3 {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

impl From<RawVec3> for Vec3 {
    fn from(v: RawVec3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

#[binrw]
#[brw(little)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct RawVec2 {
    x: f32,
    y: f32,
}

impl From<Vec2> for RawVec2 {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<RawVec2> for Vec2 {
    fn from(v: RawVec2) -> Self {
        Vec2::new(v.x, v.y)
    }
}

#[binrw]
#[brw(little)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct RawVertex {
    position: RawVec3,
    normal: RawVec3,
    tangent: RawVec3,
    binormal: RawVec3,
    tex: RawVec2,
}

impl From<Vertex> for RawVertex {
    fn from(v: Vertex) -> Self {
        Self {
            position: v.position.into(),
            normal: v.normal.into(),
            tangent: v.tangent.into(),
            binormal: v.binormal.into(),
            tex: v.tex.into(),
        }
    }
}

impl From<RawVertex> for Vertex {
    fn from(v: RawVertex) -> Self {
        Vertex {
            position: v.position.into(),
            normal: v.normal.into(),
            tangent: v.tangent.into(),
            binormal: v.binormal.into(),
            tex: v.tex.into(),
        }
    }
}

#[binrw]
#[brw(little)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct RawHeader {
    material_index: u32,
    min_bounds: RawVec3,
    max_bounds: RawVec3,
    size: RawVec3,
    centre: RawVec3,
    vertex_count: u32,
}

/// Encoder/decoder for the RJM binary mesh format.
pub struct BinaryCodec;

impl BinaryCodec {
    /// Writes exactly `HEADER_SIZE + vertex_count * VERTEX_SIZE` bytes.
    /// Never fails for a well-formed `ModelData` (vertex count within the
    /// 10^7 cap, which every in-memory `ModelData` already respects since
    /// it can only be built via the count-checked allocators).
    pub fn encode(model: &ModelData) -> Vec<u8> {
        Self::encode_with_identifier(model, None)
    }

    pub fn encode_with_identifier(model: &ModelData, identifier: Option<&[u8]>) -> Vec<u8> {
        let header = RawHeader {
            material_index: model.material_index,
            min_bounds: model.min_bounds.into(),
            max_bounds: model.max_bounds.into(),
            size: model.size.into(),
            centre: model.centre.into(),
            vertex_count: model.vertex_count(),
        };

        let mut out = Vec::with_capacity(
            identifier.map_or(0, |i| i.len()) + HEADER_SIZE + model.vertices.len() * VERTEX_SIZE,
        );
        if let Some(id) = identifier {
            out.extend_from_slice(id);
        }

        let mut cursor = Cursor::new(&mut out);
        cursor.set_position(cursor.get_ref().len() as u64);
        header
            .write(&mut cursor)
            .expect("writing to an in-memory buffer cannot fail");
        for v in &model.vertices {
            RawVertex::from(*v)
                .write(&mut cursor)
                .expect("writing to an in-memory buffer cannot fail");
        }

        out
    }

    /// Reads the header, allocates vertex storage, reads vertices.
    pub fn decode(data: &[u8]) -> PipelineResult<ModelData> {
        Self::decode_with_identifier(data, None)
    }

    pub fn decode_with_identifier(
        data: &[u8],
        expected_identifier: Option<&[u8]>,
    ) -> PipelineResult<ModelData> {
        let mut offset = 0usize;
        if let Some(expected) = expected_identifier {
            if data.len() < expected.len() || &data[..expected.len()] != expected {
                return Err(PipelineError::WrongFormat { stage: STAGE });
            }
            offset = expected.len();
        }

        if data.len() < offset + HEADER_SIZE {
            return Err(PipelineError::Truncated { stage: STAGE });
        }

        let mut cursor = Cursor::new(&data[offset..offset + HEADER_SIZE]);
        let header = RawHeader::read(&mut cursor).map_err(|_| PipelineError::Truncated { stage: STAGE })?;

        if header.vertex_count > COUNT_LIMIT {
            return Err(PipelineError::CountExceedsLimit {
                stage: STAGE,
                count: header.vertex_count as u64,
                limit: COUNT_LIMIT as u64,
            });
        }

        let min_bounds: Vec3 = header.min_bounds.into();
        let max_bounds: Vec3 = header.max_bounds.into();
        if min_bounds.is_nan() || max_bounds.is_nan() || !min_bounds.le(max_bounds) {
            return Err(PipelineError::InvalidBounds { stage: STAGE });
        }

        let body_start = offset + HEADER_SIZE;
        let body_len = header.vertex_count as usize * VERTEX_SIZE;
        if data.len() < body_start + body_len {
            return Err(PipelineError::Truncated { stage: STAGE });
        }

        let mut body_cursor = Cursor::new(&data[body_start..body_start + body_len]);
        let mut vertices = Vec::with_capacity(header.vertex_count as usize);
        for _ in 0..header.vertex_count {
            let raw = RawVertex::read(&mut body_cursor)
                .map_err(|_| PipelineError::Truncated { stage: STAGE })?;
            vertices.push(Vertex::from(raw));
        }

        let mut model = ModelData {
            material_index: header.material_index,
            min_bounds,
            max_bounds,
            size: header.size.into(),
            centre: header.centre.into(),
            vertices,
            indices: Vec::new(),
        };
        // The format carries only vertex data, never faces; a sequential
        // index buffer is synthesized at load time (open question in
        // spec.md §9, preserved as-is here).
        model.synthesize_sequential_indices();
        Ok(model)
    }
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;
    use proptest::prop_assert_eq;
    use test_strategy::proptest;

    use super::*;

    fn finite_vec3() -> impl Strategy<Value = Vec3> {
        (-1000.0f32..1000.0, -1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    fn finite_vec2() -> impl Strategy<Value = Vec2> {
        (-1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(|(x, y)| Vec2::new(x, y))
    }

    fn vertex() -> impl Strategy<Value = Vertex> {
        (finite_vec3(), finite_vec3(), finite_vec3(), finite_vec3(), finite_vec2()).prop_map(
            |(position, normal, tangent, binormal, tex)| Vertex {
                position,
                normal,
                tangent,
                binormal,
                tex,
            },
        )
    }

    /// Testable property 1 (spec.md §8): `decode(encode(m))` is bit-exact
    /// for every `ModelData` with valid bounds and a vertex count within
    /// the 10^7 cap, across arbitrary finite vertex data.
    #[proptest]
    fn round_trip_is_bit_exact_for_arbitrary_finite_meshes(
        #[strategy(any::<u32>())] material_index: u32,
        #[strategy(proptest::collection::vec(vertex(), 0..12))] verts: Vec<Vertex>,
    ) {
        let mut m = ModelData::new();
        m.material_index = material_index;
        m.allocate_vertices(verts.len() as u32).unwrap();
        m.vertices.copy_from_slice(&verts);
        m.recalculate_bounds();

        let encoded = BinaryCodec::encode(&m);
        let decoded = BinaryCodec::decode(&encoded).unwrap();

        prop_assert_eq!(decoded.material_index, m.material_index);
        prop_assert_eq!(decoded.min_bounds, m.min_bounds);
        prop_assert_eq!(decoded.max_bounds, m.max_bounds);
        prop_assert_eq!(decoded.size, m.size);
        prop_assert_eq!(decoded.centre, m.centre);
        prop_assert_eq!(decoded.vertices, m.vertices);
    }
}
