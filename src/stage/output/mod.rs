pub mod binary;
pub mod obj;

pub use binary::BinaryOutput;
pub use obj::ObjOutput;

use std::path::{Path, PathBuf};

/// A single model's destination path: `destination` itself when there is
/// only one model in the run, otherwise `destination.{index}` per model,
/// matching the original pipeline's behaviour for a multi-mesh scene
/// written through a single-mesh-oriented output format.
pub(crate) fn destination_for(base: &Path, index: usize, total: usize) -> PathBuf {
    if total <= 1 {
        base.to_path_buf()
    } else {
        let mut name = base.as_os_str().to_owned();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }
}
