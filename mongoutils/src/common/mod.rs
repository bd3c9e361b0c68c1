//! Shared constants and the encode/decode and deadline helpers used by every
//! collection operation.

mod constants;
mod document_utils;
mod sort_order;
mod timeout;

pub use constants::*;
pub use document_utils::*;
pub use sort_order::*;
pub use timeout::*;
