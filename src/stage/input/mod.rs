pub mod binary;
pub mod obj;

pub use binary::BinaryInput;
pub use obj::ObjImporterInput;
