mod error;
mod hybrid_vector_macros;
#[cfg(feature = "serde")]
mod serde_support;
mod vector;

pub use error::HybridVectorError;
pub use vector::{HybridVector, IntoIter};
