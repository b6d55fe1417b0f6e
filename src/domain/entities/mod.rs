//! Domain entities - lifecycle operations and their typed outcomes

pub mod operation;

pub use operation::{OpKind, Outcome};
