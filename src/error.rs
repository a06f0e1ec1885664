use std::io;

use thiserror::Error;

/// The full error taxonomy for the pipeline, covering every stage kind.
///
/// Most variants carry the name of the stage that raised them so that
/// callers can surface "which component failed" without a separate
/// debug-only code path.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("[{stage}] file data does not match the expected identifier")]
    WrongFormat { stage: &'static str },

    #[error("[{stage}] buffer ended before the expected data was read")]
    Truncated { stage: &'static str },

    #[error("[{stage}] count {count} exceeds the limit of {limit}")]
    CountExceedsLimit {
        stage: &'static str,
        count: u64,
        limit: u64,
    },

    #[error("[{stage}] bounds are invalid (NaN or min > max)")]
    InvalidBounds { stage: &'static str },

    #[error("[{stage}] mesh is missing a required attribute: {attribute}")]
    MissingRequiredAttribute {
        stage: &'static str,
        attribute: &'static str,
    },

    #[error("[{stage}] mesh {mesh_index} has a face with {face_indices} indices, expected 3")]
    NonTriangulatedMesh {
        stage: &'static str,
        mesh_index: usize,
        face_indices: usize,
    },

    #[error("[{stage}] operation requires vertex data but the mesh is empty")]
    EmptyMesh { stage: &'static str },

    #[error("[{stage}] cannot unit-scale a model whose largest extent is zero")]
    DegenerateSize { stage: &'static str },

    #[error("[{stage}] transform file \"{path}\" does not exist")]
    TransformFileMissing { stage: &'static str, path: String },

    #[error("[{stage}] transform file \"{path}\" is malformed: {reason}")]
    TransformFileMalformed {
        stage: &'static str,
        path: String,
        reason: String,
    },

    #[error("pipeline builder is missing a required stage: {which}")]
    MissingStage { which: &'static str },

    #[error("[{stage}] input stage produced no models")]
    NoModels { stage: &'static str },

    #[error("[{stage}] I/O failure: {source}")]
    IoFailure {
        stage: &'static str,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    /// The name of the stage that raised this error, when known.
    pub fn stage_name(&self) -> Option<&'static str> {
        match self {
            PipelineError::WrongFormat { stage }
            | PipelineError::Truncated { stage }
            | PipelineError::CountExceedsLimit { stage, .. }
            | PipelineError::InvalidBounds { stage }
            | PipelineError::MissingRequiredAttribute { stage, .. }
            | PipelineError::NonTriangulatedMesh { stage, .. }
            | PipelineError::EmptyMesh { stage }
            | PipelineError::DegenerateSize { stage }
            | PipelineError::TransformFileMissing { stage, .. }
            | PipelineError::TransformFileMalformed { stage, .. }
            | PipelineError::NoModels { stage }
            | PipelineError::IoFailure { stage, .. } => Some(stage),
            PipelineError::MissingStage { .. } => None,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
