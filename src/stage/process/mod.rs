pub mod centre;
pub mod direct_postprocess;
pub mod importer_postprocess;
pub mod output_info;
pub mod unit_scale;

pub use centre::CentreStage;
pub use direct_postprocess::{DirectPostprocessFlags, DirectPostprocessStage};
pub use importer_postprocess::ImporterPostprocessStage;
pub use output_info::OutputModelInfoStage;
pub use unit_scale::UnitScaleStage;
