//! Pipeline assembly and execution.
//!
//! Corresponds to `TransformPipeline` and `TransformPipelineBuilder` in the
//! original: a builder collects one input stage, zero or more processing
//! stages, and one output stage, then hands over a `Pipeline` that can be
//! run repeatedly. Each `execute()` call resets the run state (aggregate
//! metadata and aggregate bounds) before the input stage runs.

use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::model::ModelData;
use crate::size::SizeProperties;
use crate::stage::output::destination_for;
use crate::stage::{AggregateMetadata, InputSource, InputStage, OutputStage, ProcessingStage, RunContext};

/// Outcome of one `Pipeline::execute()` call: how many models were written
/// successfully, and how many were dropped because some processing stage
/// failed on them. There is no partial rollback — a model that fails a
/// stage is dropped; its siblings are still processed and written.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub success_count: usize,
    pub failure_count: usize,
}

#[derive(Default)]
pub struct PipelineBuilder {
    input: Option<Box<dyn InputStage>>,
    processes: Vec<Box<dyn ProcessingStage>>,
    output: Option<Box<dyn OutputStage>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, input: impl InputStage + 'static) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    pub fn with_processing(mut self, stage: impl ProcessingStage + 'static) -> Self {
        self.processes.push(Box::new(stage));
        self
    }

    pub fn with_output(mut self, output: impl OutputStage + 'static) -> Self {
        self.output = Some(Box::new(output));
        self
    }

    pub fn build(self) -> PipelineResult<Pipeline> {
        let input = self.input.ok_or(PipelineError::MissingStage { which: "input" })?;
        let output = self.output.ok_or(PipelineError::MissingStage { which: "output" })?;

        let mut names = Vec::with_capacity(self.processes.len() + 2);
        names.push(input.name());
        names.extend(self.processes.iter().map(|stage| stage.name()));
        names.push(output.name());
        log::info!("Pipeline configuration: {}", names.join(" -> "));

        Ok(Pipeline {
            input,
            processes: self.processes,
            output,
        })
    }
}

/// An assembled, runnable pipeline. Owns its stages exclusively; the only
/// state shared across stages is the per-run `RunContext` the pipeline
/// itself builds and passes by reference.
pub struct Pipeline {
    input: Box<dyn InputStage>,
    processes: Vec<Box<dyn ProcessingStage>>,
    output: Box<dyn OutputStage>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Runs the input stage against `source`, then every processing stage
    /// over each resulting model, then writes each surviving model to
    /// `destination` (or `destination.{i}` when there is more than one
    /// model). A model that fails any processing stage is dropped — its
    /// siblings are still processed and written.
    pub fn execute(&mut self, source: InputSource, destination: &Path) -> PipelineResult<RunSummary> {
        let mut metadata = AggregateMetadata::default();
        let models = self.input.produce(source, &mut metadata)?;
        if models.is_empty() {
            return Err(PipelineError::NoModels { stage: "Pipeline" });
        }

        let ctx = RunContext {
            aggregate: SizeProperties::from_models(&models, false),
            metadata,
        };
        let total = models.len();

        let mut success_count = 0usize;
        let mut failure_count = 0usize;

        for (index, mut model) in models.into_iter().enumerate() {
            if let Err(err) = self.run_processing_stages(&mut model, &ctx) {
                log::error!("pipeline dropped model {index}: {err}");
                failure_count += 1;
                continue;
            }

            let path = destination_for(destination, index, total);
            match self.output.emit_to_file(&model, &path) {
                Ok(()) => success_count += 1,
                Err(err) => {
                    log::error!("pipeline failed writing model {index}: {err}");
                    failure_count += 1;
                }
            }
        }

        Ok(RunSummary {
            success_count,
            failure_count,
        })
    }

    /// Processes only the first model produced from `source` and returns
    /// its serialized bytes directly, without touching the filesystem for
    /// output. Documented one-mesh limitation: any sibling meshes in a
    /// multi-mesh source are ignored.
    pub fn execute_in_memory(&mut self, source: InputSource) -> PipelineResult<Vec<u8>> {
        let mut metadata = AggregateMetadata::default();
        let models = self.input.produce(source, &mut metadata)?;
        if models.is_empty() {
            return Err(PipelineError::NoModels { stage: "Pipeline" });
        }

        let ctx = RunContext {
            aggregate: SizeProperties::from_models(&models, false),
            metadata,
        };

        let mut model = models.into_iter().next().expect("checked non-empty above");
        self.run_processing_stages(&mut model, &ctx)?;
        self.output.emit(&model)
    }

    fn run_processing_stages(&self, model: &mut ModelData, ctx: &RunContext) -> PipelineResult<()> {
        for stage in &self.processes {
            stage.process(model, ctx)?;
        }
        Ok(())
    }
}
