//! Tree-sitter based Go parsing for stubgen.
//!
//! Finds interface declarations in Go source, validates each method
//! signature against the remote-call shape, and produces normalized
//! service descriptions for the renderer.

pub mod extract;
pub mod treesitter;
pub mod types;
pub mod validate;

pub use extract::{Extraction, extract_services};
pub use treesitter::ParseError;
pub use types::TypeShape;
pub use validate::{MethodSignature, ShapeViolation, ShapeViolationKind, SourcePos, validate};
