//! Encode engine change sets into transaction delta JSON, and decode
//! transaction delta JSON back into engine operations.

mod decode;
mod encode;
mod error;

pub use decode::decode;
pub use encode::encode;
pub use error::{Error, Result};
