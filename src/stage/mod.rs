//! Pipeline stage traits.
//!
//! The original pipeline used virtual base classes (`PipelineStage`,
//! `TransformPipelineInput`, `TransformPipelineOutput`) to let the builder
//! assemble a run out of interchangeable components. Rust expresses the
//! same seam with traits rather than inheritance (see the REDESIGN notes),
//! with each stage owning only the behaviour it needs.

pub mod input;
pub mod output;
pub mod process;

use std::path::Path;

use crate::error::PipelineResult;
use crate::model::ModelData;
use crate::size::SizeProperties;

/// Either a file on disk or an already-loaded byte buffer. Passed to
/// `InputStage::produce` at call time rather than baked into the stage,
/// matching the original `produce(source)` contract.
#[derive(Copy, Clone, Debug)]
pub enum InputSource<'a> {
    Path(&'a Path),
    Bytes(&'a [u8]),
}

impl<'a> InputSource<'a> {
    pub(crate) fn read(&self, stage: &'static str) -> PipelineResult<std::borrow::Cow<'a, [u8]>> {
        match self {
            InputSource::Bytes(b) => Ok(std::borrow::Cow::Borrowed(b)),
            InputSource::Path(path) => std::fs::read(path)
                .map(std::borrow::Cow::Owned)
                .map_err(|source| crate::error::PipelineError::IoFailure { stage, source }),
        }
    }
}

/// Read-only metadata accumulated over a pipeline run, populated once by
/// the input stage and visible to every later stage by reference. Mirrors
/// the original's `aggregate_metadata` member on the pipeline.
#[derive(Clone, Debug, Default)]
pub struct AggregateMetadata {
    pub source_identifier: Option<String>,
}

/// The immutable per-run context every processing stage receives: the run
/// metadata, plus the aggregate bounds computed once across the whole
/// model set right after input (`recompute_children = false`). For a
/// single-mesh run this is numerically identical to that mesh's own
/// bounds; for a multi-mesh run it is the joint bounds, letting
/// `CentreStage`/`UnitScaleStage` treat the whole set as one object.
pub struct RunContext {
    pub metadata: AggregateMetadata,
    pub aggregate: SizeProperties,
}

/// Produces the initial set of models for a run, either by importing a
/// foreign format or by decoding the pipeline's own binary format.
pub trait InputStage {
    fn produce(&self, source: InputSource, metadata: &mut AggregateMetadata) -> PipelineResult<Vec<ModelData>>;

    /// A short name used in the pipeline's build-time self-description log
    /// and in error messages.
    fn name(&self) -> &'static str;
}

/// Serializes a single model, either to an owned byte buffer or directly
/// to a file. `emit_to_file` has a default implementation in terms of
/// `emit`; formats that need to write more than one file (e.g. `ObjOutput`'s
/// `.mtl` sidecar) override it.
pub trait OutputStage {
    fn emit(&self, model: &ModelData) -> PipelineResult<Vec<u8>>;

    fn emit_to_file(&self, model: &ModelData, path: &Path) -> PipelineResult<()> {
        let bytes = self.emit(model)?;
        std::fs::write(path, &bytes).map_err(|source| crate::error::PipelineError::IoFailure {
            stage: "OutputStage",
            source,
        })
    }

    /// A short name used in the pipeline's build-time self-description log
    /// and in error messages.
    fn name(&self) -> &'static str;
}

/// Transforms, or merely inspects, a single model in place. May fail
/// independently per model; the pipeline drops a model that fails a stage
/// rather than aborting the whole run (see the error-handling policy in
/// `Pipeline::execute`).
pub trait ProcessingStage {
    fn process(&self, model: &mut ModelData, ctx: &RunContext) -> PipelineResult<()>;

    /// A short name used in log lines and error messages.
    fn name(&self) -> &'static str;
}
