//! Loading meshes from foreign formats via an external mesh-importer
//! collaborator, and deriving missing tangent-space attributes afterwards.
//!
//! The original pipeline delegated this job to Assimp. The teacher crate
//! has no analogue of its own (its formats are all native), so this module
//! is grounded in the pack's other examples: `tobj` appears as the
//! importer-library choice across several of them, and is used here behind
//! a narrow [`MeshImporter`] seam so the rest of the pipeline never speaks
//! `tobj` types directly.

use std::collections::HashMap;
use std::io::BufReader;

use crate::error::{PipelineError, PipelineResult};
use crate::math::Vec3;
use crate::model::ModelData;

const STAGE: &str = "MeshImporter";

#[derive(Copy, Clone, Debug)]
pub struct ImportOptions {
    pub triangulate: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self { triangulate: true }
    }
}

/// One mesh as it came out of the importer, before any pipeline stage has
/// touched it.
pub struct RawMesh {
    pub name: String,
    pub model: ModelData,
}

/// The result of importing a whole scene: the meshes that made it through,
/// plus the per-mesh errors that dropped their sibling meshes (a face with
/// the wrong arity, a mesh missing positions/normals). Each dropped mesh
/// does not abort the scene; its error is surfaced here so the caller can
/// fold it into the pipeline's error state instead of it vanishing into a
/// log line.
pub struct ImportOutcome {
    pub meshes: Vec<RawMesh>,
    pub skipped: Vec<PipelineError>,
}

/// Seam between the pipeline and whatever mesh-importing library is linked
/// in. `tobj` is the concrete choice below, but stages only ever see this
/// trait.
pub trait MeshImporter {
    fn import(&self, bytes: &[u8], options: ImportOptions) -> PipelineResult<ImportOutcome>;
}

/// `tobj`-backed Wavefront OBJ importer.
pub struct ObjMeshImporter;

impl MeshImporter for ObjMeshImporter {
    fn import(&self, bytes: &[u8], options: ImportOptions) -> PipelineResult<ImportOutcome> {
        let mut reader = BufReader::new(bytes);
        let load_options = tobj::LoadOptions {
            triangulate: options.triangulate,
            single_index: true,
            ignore_points: true,
            ignore_lines: true,
        };

        let (models, _materials) = tobj::load_obj_buf(&mut reader, &load_options, |_| {
            Ok((Vec::new(), HashMap::new()))
        })
        .map_err(|_| PipelineError::WrongFormat { stage: STAGE })?;

        if models.is_empty() {
            return Err(PipelineError::NoModels { stage: STAGE });
        }

        // A malformed mesh (non-triangulated faces, missing positions or
        // normals) only drops that one mesh from the scene; its siblings
        // are still emitted. Each drop's error is kept, not just logged,
        // so the pipeline's error state reflects it.
        let mut meshes = Vec::with_capacity(models.len());
        let mut skipped = Vec::new();
        for (index, tobj_model) in models.into_iter().enumerate() {
            let mesh = tobj_model.mesh;

            if !options.triangulate {
                if let Some(&bad_arity) = mesh.face_arities.iter().find(|&&arity| arity != 3) {
                    let err = PipelineError::NonTriangulatedMesh {
                        stage: STAGE,
                        mesh_index: index,
                        face_indices: bad_arity as usize,
                    };
                    log::error!("{STAGE}: mesh {index} ({}): {err}, skipping", tobj_model.name);
                    skipped.push(err);
                    continue;
                }
            }

            if mesh.positions.is_empty() {
                let err = PipelineError::MissingRequiredAttribute { stage: STAGE, attribute: "position" };
                log::error!("{STAGE}: mesh {index} ({}): {err}, skipping", tobj_model.name);
                skipped.push(err);
                continue;
            }
            if mesh.normals.is_empty() {
                let err = PipelineError::MissingRequiredAttribute { stage: STAGE, attribute: "normal" };
                log::error!("{STAGE}: mesh {index} ({}): {err}, skipping", tobj_model.name);
                skipped.push(err);
                continue;
            }

            let mut model = match raw_mesh_to_model_data(&mesh) {
                Ok(model) => model,
                Err(err) => {
                    log::error!("{STAGE}: mesh {index} ({}) rejected: {err}", tobj_model.name);
                    skipped.push(err);
                    continue;
                }
            };
            if model.indices.is_empty() {
                model.synthesize_sequential_indices();
            }
            if model.attribute_present(crate::model::AttributeKind::TexCoord)
                && !model.attribute_present(crate::model::AttributeKind::Tangent)
            {
                compute_tangent_space(&mut model);
            }
            model.material_index = mesh.material_id.map(|m| m as u32).unwrap_or(0);
            model.recalculate_bounds();

            meshes.push(RawMesh {
                name: tobj_model.name,
                model,
            });
        }

        if meshes.is_empty() {
            return Err(PipelineError::NoModels { stage: STAGE });
        }

        Ok(ImportOutcome { meshes, skipped })
    }
}

fn raw_mesh_to_model_data(mesh: &tobj::Mesh) -> PipelineResult<ModelData> {
    let vertex_count = mesh.positions.len() / 3;
    let mut model = ModelData::new();
    model.allocate_vertices(vertex_count as u32)?;

    let positions = mesh.positions.chunks_exact(3);
    let normals = mesh.normals.chunks_exact(3).map(Some).chain(std::iter::repeat(None));
    let texcoords = mesh.texcoords.chunks_exact(2).map(Some).chain(std::iter::repeat(None));

    for (v, p, n, t) in itertools::izip!(model.vertices.iter_mut(), positions, normals, texcoords) {
        v.position = Vec3::new(p[0], p[1], p[2]);
        if let Some(n) = n {
            v.normal = Vec3::new(n[0], n[1], n[2]);
        }
        if let Some(t) = t {
            v.tex = crate::math::Vec2::new(t[0], t[1]);
        }
    }

    model.allocate_indices(mesh.indices.len() as u32)?;
    model.indices.copy_from_slice(&mesh.indices);

    Ok(model)
}

/// Derives per-vertex tangent/binormal vectors from positions, normals and
/// UVs using Lengyel's tangent-space algorithm. `tobj` has no equivalent of
/// Assimp's `aiProcess_CalcTangentSpace`, so this stands in for it whenever
/// a mesh carries UVs but no tangents.
fn compute_tangent_space(model: &mut ModelData) {
    let n = model.vertices.len();
    let mut tan1 = vec![Vec3::ZERO; n];
    let mut tan2 = vec![Vec3::ZERO; n];

    for tri in model.indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let v0 = model.vertices[i0].position;
        let v1 = model.vertices[i1].position;
        let v2 = model.vertices[i2].position;
        let w0 = model.vertices[i0].tex;
        let w1 = model.vertices[i1].tex;
        let w2 = model.vertices[i2].tex;

        let x1 = v1.x - v0.x;
        let x2 = v2.x - v0.x;
        let y1 = v1.y - v0.y;
        let y2 = v2.y - v0.y;
        let z1 = v1.z - v0.z;
        let z2 = v2.z - v0.z;

        let s1 = w1.x - w0.x;
        let s2 = w2.x - w0.x;
        let t1 = w1.y - w0.y;
        let t2 = w2.y - w0.y;

        let denom = s1 * t2 - s2 * t1;
        if denom.abs() < f32::EPSILON {
            continue;
        }
        let r = 1.0 / denom;

        let sdir = Vec3::new(
            (t2 * x1 - t1 * x2) * r,
            (t2 * y1 - t1 * y2) * r,
            (t2 * z1 - t1 * z2) * r,
        );
        let tdir = Vec3::new(
            (s1 * x2 - s2 * x1) * r,
            (s1 * y2 - s2 * y1) * r,
            (s1 * z2 - s2 * z1) * r,
        );

        for i in [i0, i1, i2] {
            tan1[i] = tan1[i] + sdir;
            tan2[i] = tan2[i] + tdir;
        }
    }

    for i in 0..n {
        let normal = model.vertices[i].normal;
        let t = tan1[i] - normal * normal.dot(tan1[i]);
        let tangent = t.normalize_or_zero();

        let handedness = if normal.cross(tangent).dot(tan2[i]) < 0.0 {
            -1.0
        } else {
            1.0
        };

        model.vertices[i].tangent = tangent;
        model.vertices[i].binormal = normal.cross(tangent) * handedness;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttributeKind;

    fn triangle_obj() -> &'static [u8] {
        b"v 0 0 0\nv 1 0 0\nv 0 1 0\n\
          vt 0 0\nvt 1 0\nvt 0 1\n\
          vn 0 0 1\nvn 0 0 1\nvn 0 0 1\n\
          f 1/1/1 2/2/2 3/3/3\n"
    }

    #[test]
    fn imports_single_triangle_with_uvs_and_derives_tangents() {
        let outcome = ObjMeshImporter
            .import(triangle_obj(), ImportOptions::default())
            .unwrap();
        assert_eq!(outcome.meshes.len(), 1);
        assert!(outcome.skipped.is_empty());
        let model = &outcome.meshes[0].model;
        assert_eq!(model.vertex_count(), 3);
        assert!(model.attribute_present(AttributeKind::TexCoord));
        assert!(model.attribute_present(AttributeKind::Tangent));
    }

    #[test]
    fn empty_buffer_yields_no_models_error() {
        let result = ObjMeshImporter.import(b"", ImportOptions::default());
        assert!(matches!(result, Err(PipelineError::NoModels { .. })));
    }

    #[test]
    fn a_mesh_missing_normals_is_skipped_but_its_sibling_still_imports() {
        let text = b"o good\n\
                     v 0 0 0\nv 1 0 0\nv 0 1 0\n\
                     vn 0 0 1\nvn 0 0 1\nvn 0 0 1\n\
                     f 1//1 2//2 3//3\n\
                     o no_normals\n\
                     v 10 0 0\nv 11 0 0\nv 10 1 0\n\
                     f 4 5 6\n";
        let outcome = ObjMeshImporter.import(text, ImportOptions::default()).unwrap();
        assert_eq!(outcome.meshes.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert!(matches!(
            outcome.skipped[0],
            PipelineError::MissingRequiredAttribute { attribute: "normal", .. }
        ));
    }
}
