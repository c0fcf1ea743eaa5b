//! Compiler passes.
//!
//! - Pass 1 (Registration): register classes, properties and method signatures
//! - Pass 2 (Resolution): bind references and type every expression
//!
//! Code generation runs afterwards and reads only the annotations these
//! passes leave on the tree.

mod registration;
mod resolution;

pub use registration::{RegistrationOutput, RegistrationPass};
pub use resolution::{ResolutionOutput, ResolutionPass};
