use std::path::Path;

use crate::error::PipelineResult;
use crate::model::{AttributeKind, ModelData};
use crate::stage::OutputStage;

const STAGE: &str = "ObjOutput";

/// Serializes a model as Wavefront OBJ text, with an optional sibling
/// `.mtl` file referencing a texture when written to a file. Corresponds
/// to `ObjFormatOutputTransform` in the original pipeline.
pub struct ObjOutput {
    material_texture: Option<String>,
}

impl ObjOutput {
    pub fn new() -> Self {
        Self { material_texture: None }
    }

    /// When set, `emit_to_file` additionally writes a sibling `.mtl` with
    /// a single default Phong material pointing at `texture_file_name`.
    pub fn with_material_texture(mut self, texture_file_name: impl Into<String>) -> Self {
        self.material_texture = Some(texture_file_name.into());
        self
    }
}

impl Default for ObjOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputStage for ObjOutput {
    fn emit(&self, model: &ModelData) -> PipelineResult<Vec<u8>> {
        Ok(model_to_obj_text(model, self.material_texture.as_deref(), None).into_bytes())
    }

    fn emit_to_file(&self, model: &ModelData, path: &Path) -> PipelineResult<()> {
        let mtl_name = self.material_texture.as_ref().map(|_| mtl_file_name(path));
        let text = model_to_obj_text(model, self.material_texture.as_deref(), mtl_name.as_deref());
        std::fs::write(path, text).map_err(|source| crate::error::PipelineError::IoFailure { stage: STAGE, source })?;

        if let Some(texture) = &self.material_texture {
            write_mtl_sidecar(&mtl_path(path), texture)?;
        }
        log::info!("{STAGE}: wrote {}", path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        STAGE
    }
}

fn model_to_obj_text(model: &ModelData, material_texture: Option<&str>, mtllib_name: Option<&str>) -> String {
    let mut out = String::new();

    if material_texture.is_some() {
        out.push_str(&format!("mtllib {}\n", mtllib_name.unwrap_or("material.mtl")));
    }

    for v in &model.vertices {
        out.push_str(&format!("v {} {} {}\n", v.position.x, v.position.y, v.position.z));
    }

    let has_normal = model.attribute_present(AttributeKind::Normal);
    if has_normal {
        for v in &model.vertices {
            out.push_str(&format!("vn {} {} {}\n", v.normal.x, v.normal.y, v.normal.z));
        }
    }

    let has_tex = model.attribute_present(AttributeKind::TexCoord);
    if has_tex {
        for v in &model.vertices {
            out.push_str(&format!("vt {} {}\n", v.tex.x, v.tex.y));
        }
    }

    if material_texture.is_some() {
        out.push_str("usemtl material0\n");
    }

    for tri in model.indices.chunks_exact(3) {
        let face: Vec<String> = tri
            .iter()
            .map(|&i| format_face_vertex(i + 1, has_tex, has_normal))
            .collect();
        out.push_str(&format!("f {}\n", face.join(" ")));
    }

    out
}

fn format_face_vertex(one_based_index: u32, has_tex: bool, has_normal: bool) -> String {
    match (has_tex, has_normal) {
        (true, true) => format!("{i}/{i}/{i}", i = one_based_index),
        (true, false) => format!("{i}/{i}", i = one_based_index),
        (false, true) => format!("{i}//{i}", i = one_based_index),
        (false, false) => format!("{i}", i = one_based_index),
    }
}

fn mtl_path(obj_path: &Path) -> std::path::PathBuf {
    obj_path.with_extension("mtl")
}

fn mtl_file_name(obj_path: &Path) -> String {
    mtl_path(obj_path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "material.mtl".to_string())
}

/// A single default Phong material. The original pipeline's material
/// parameters for this sidecar were not recoverable from the retrieved
/// source; these are the conventional OBJ/MTL exporter defaults recorded
/// as the Open Question decision in DESIGN.md.
fn write_mtl_sidecar(path: &Path, texture_file_name: &str) -> PipelineResult<()> {
    let text = format!(
        "newmtl material0\n\
         Ns 96.078431\n\
         Ka 1 1 1\n\
         Kd 0.8 0.8 0.8\n\
         Ks 0.5 0.5 0.5\n\
         Ke 0 0 0\n\
         Ni 1.45\n\
         d 1\n\
         illum 2\n\
         map_Kd {texture_file_name}\n"
    );
    std::fs::write(path, text).map_err(|source| crate::error::PipelineError::IoFailure { stage: STAGE, source })
}
