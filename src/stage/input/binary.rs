use crate::codec::BinaryCodec;
use crate::error::PipelineResult;
use crate::model::ModelData;
use crate::stage::{AggregateMetadata, InputSource, InputStage};

const STAGE: &str = "BinaryInput";

/// Reads a single model from the pipeline's own RJM binary format.
/// Corresponds to `InputTransformerRjm` in the original pipeline.
#[derive(Default)]
pub struct BinaryInput {
    identifier: Option<Vec<u8>>,
}

impl BinaryInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the given byte sequence to prefix the file; mismatches
    /// fail with [`crate::error::PipelineError::WrongFormat`].
    pub fn with_identifier(mut self, identifier: impl Into<Vec<u8>>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }
}

impl InputStage for BinaryInput {
    fn produce(&self, source: InputSource, metadata: &mut AggregateMetadata) -> PipelineResult<Vec<ModelData>> {
        let bytes = source.read(STAGE)?;
        let model = BinaryCodec::decode_with_identifier(&bytes, self.identifier.as_deref())?;
        log::info!("{STAGE}: decoded {}", model.to_summary_string());

        metadata.source_identifier = self
            .identifier
            .as_ref()
            .map(|id| String::from_utf8_lossy(id).into_owned());

        Ok(vec![model])
    }

    fn name(&self) -> &'static str {
        STAGE
    }
}
