//! Dense tensor implementation and operations
//!
//! The type lives in [`types`]; shape handling, indexing and arithmetic are
//! split into sibling modules.

pub mod types;

mod arithmetic;
mod indexing;
mod shape_ops;

pub use types::DenseND;
