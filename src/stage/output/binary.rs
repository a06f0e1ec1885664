use crate::codec::BinaryCodec;
use crate::error::PipelineResult;
use crate::model::ModelData;
use crate::stage::OutputStage;

/// Serializes a model to the pipeline's own RJM binary format.
/// Corresponds to `BinaryOutputTransform` in the original pipeline.
#[derive(Default)]
pub struct BinaryOutput {
    identifier: Option<Vec<u8>>,
}

impl BinaryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identifier(mut self, identifier: impl Into<Vec<u8>>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }
}

impl OutputStage for BinaryOutput {
    fn emit(&self, model: &ModelData) -> PipelineResult<Vec<u8>> {
        Ok(BinaryCodec::encode_with_identifier(model, self.identifier.as_deref()))
    }

    fn name(&self) -> &'static str {
        "BinaryOutput"
    }
}
