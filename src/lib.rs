#[cfg(feature = "hybrid_vector")]
mod hybrid_vector;

#[cfg(feature = "hybrid_vector")]
pub use hybrid_vector::*;
