pub mod canonicalized_path_buf;
pub mod size;

pub use canonicalized_path_buf::CanonicalizedPathBuf;
pub use size::{ByteSize, SizeError};
