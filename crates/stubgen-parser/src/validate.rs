//! Method signature validation.
//!
//! A method is eligible for client generation only when its declared
//! shape matches the remote-call pattern:
//!
//! ```go
//! Name(ctx context.Context, req Msg) (*Reply, error)
//! ```
//!
//! The `context.Context` first parameter is the marker that separates
//! service interfaces from unrelated ones. All six conditions must hold;
//! the check order only picks which diagnostic is emitted first.

use crate::types::TypeShape;
use std::path::PathBuf;

/// Position of a declaration in its source file (1-based line/column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePos {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for SourcePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// A method declaration's shape, as read from the AST.
///
/// Transient: produced per interface method, consumed by [`validate`],
/// and turned into a [`stubgen_core::Method`] on acceptance. Never
/// retained past extraction of its interface.
#[derive(Debug, Clone)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<TypeShape>,
    pub results: Vec<TypeShape>,
    pub pos: SourcePos,
}

/// Which of the six shape conditions a method failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeViolationKind {
    /// Not exactly two parameters.
    ParamCount(usize),
    /// First parameter is not `context.Context`.
    ContextParam,
    /// Second parameter is not a named request payload type.
    RequestParam,
    /// Not exactly two results.
    ResultCount(usize),
    /// First result is not a pointer to a named response payload type.
    ResponseResult,
    /// Second result is not `error`.
    ErrorResult,
}

impl std::fmt::Display for ShapeViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParamCount(n) => write!(f, "has {n} parameters, expected exactly two"),
            Self::ContextParam => write!(f, "first parameter is not context.Context"),
            Self::RequestParam => write!(f, "second parameter is not a named request type"),
            Self::ResultCount(n) => write!(f, "has {n} return values, expected exactly two"),
            Self::ResponseResult => write!(f, "first return value is not a pointer type"),
            Self::ErrorResult => write!(f, "second return value is not error"),
        }
    }
}

/// A rejected method: where it is declared and why it was rejected.
///
/// Recovered locally — the method is skipped, the enclosing interface is
/// still generated.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{pos} {service}.{method} {kind}")]
pub struct ShapeViolation {
    pub service: String,
    pub method: String,
    pub pos: SourcePos,
    pub kind: ShapeViolationKind,
}

/// Check the six shape conditions, reporting the first one that fails.
pub fn check_shape(sig: &MethodSignature) -> Result<(), ShapeViolationKind> {
    if sig.params.len() != 2 {
        return Err(ShapeViolationKind::ParamCount(sig.params.len()));
    }
    if !sig.params[0].is_qualified_as("context", "Context") {
        return Err(ShapeViolationKind::ContextParam);
    }
    if !is_request_shape(&sig.params[1]) {
        return Err(ShapeViolationKind::RequestParam);
    }
    if sig.results.len() != 2 {
        return Err(ShapeViolationKind::ResultCount(sig.results.len()));
    }
    if !matches!(&sig.results[0], TypeShape::Pointer(inner) if matches!(**inner, TypeShape::Named(_)))
    {
        return Err(ShapeViolationKind::ResponseResult);
    }
    if !matches!(&sig.results[1], TypeShape::Named(name) if name == "error") {
        return Err(ShapeViolationKind::ErrorResult);
    }
    Ok(())
}

/// The request payload is a named type, optionally behind one `*`.
/// The declared marker is kept on the stored type name so the generated
/// method signature matches the interface.
fn is_request_shape(shape: &TypeShape) -> bool {
    match shape {
        TypeShape::Named(_) => true,
        TypeShape::Pointer(inner) => matches!(**inner, TypeShape::Named(_)),
        _ => false,
    }
}

/// Validate one method declaration for the given service.
///
/// Emits the violation as a debug-level diagnostic (visible under
/// verbose logging) and returns whether the method is eligible.
#[must_use]
pub fn validate(service: &str, sig: &MethodSignature) -> bool {
    match check_shape(sig) {
        Ok(()) => true,
        Err(kind) => {
            let violation = ShapeViolation {
                service: service.to_string(),
                method: sig.name.clone(),
                pos: sig.pos.clone(),
                kind,
            };
            tracing::debug!("{violation}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> SourcePos {
        SourcePos {
            file: PathBuf::from("echo.go"),
            line: 4,
            column: 2,
        }
    }

    fn named(name: &str) -> TypeShape {
        TypeShape::Named(name.to_string())
    }

    fn pointer_to(name: &str) -> TypeShape {
        TypeShape::Pointer(Box::new(named(name)))
    }

    fn ctx() -> TypeShape {
        TypeShape::Qualified {
            package: "context".to_string(),
            name: "Context".to_string(),
        }
    }

    fn conforming() -> MethodSignature {
        MethodSignature {
            name: "Say".to_string(),
            params: vec![ctx(), named("Msg")],
            results: vec![pointer_to("Reply"), named("error")],
            pos: pos(),
        }
    }

    #[test]
    fn test_conforming_signature_accepted() {
        assert!(check_shape(&conforming()).is_ok());
        assert!(validate("Echo", &conforming()));
    }

    #[test]
    fn test_pointer_request_accepted() {
        let mut sig = conforming();
        sig.params[1] = pointer_to("Msg");
        assert!(check_shape(&sig).is_ok());
    }

    #[test]
    fn test_rejects_wrong_param_count() {
        let mut sig = conforming();
        sig.params.truncate(1);
        assert_eq!(check_shape(&sig), Err(ShapeViolationKind::ParamCount(1)));
        assert!(!validate("Echo", &sig));
    }

    #[test]
    fn test_rejects_non_context_first_param() {
        let mut sig = conforming();
        // Unqualified `Context` is not the context.Context marker type
        sig.params[0] = named("Context");
        assert_eq!(check_shape(&sig), Err(ShapeViolationKind::ContextParam));
    }

    #[test]
    fn test_rejects_qualified_request_param() {
        let mut sig = conforming();
        sig.params[1] = TypeShape::Qualified {
            package: "pb".to_string(),
            name: "Msg".to_string(),
        };
        assert_eq!(check_shape(&sig), Err(ShapeViolationKind::RequestParam));
    }

    #[test]
    fn test_rejects_wrong_result_count() {
        let mut sig = conforming();
        sig.results.truncate(1);
        assert_eq!(check_shape(&sig), Err(ShapeViolationKind::ResultCount(1)));
    }

    #[test]
    fn test_rejects_non_pointer_response() {
        let mut sig = conforming();
        sig.results[0] = named("Reply");
        assert_eq!(check_shape(&sig), Err(ShapeViolationKind::ResponseResult));
    }

    #[test]
    fn test_rejects_non_error_second_result() {
        let mut sig = conforming();
        sig.results[1] = named("bool");
        assert_eq!(check_shape(&sig), Err(ShapeViolationKind::ErrorResult));
    }

    #[test]
    fn test_rejects_double_pointer_request() {
        let mut sig = conforming();
        sig.params[1] = TypeShape::Pointer(Box::new(pointer_to("Msg")));
        assert_eq!(check_shape(&sig), Err(ShapeViolationKind::RequestParam));
    }

    #[test]
    fn test_rejects_unknown_shapes() {
        let mut sig = conforming();
        sig.params[1] = TypeShape::Unknown;
        assert_eq!(check_shape(&sig), Err(ShapeViolationKind::RequestParam));
    }

    #[test]
    fn test_violation_display_has_position() {
        let violation = ShapeViolation {
            service: "Echo".to_string(),
            method: "Say".to_string(),
            pos: pos(),
            kind: ShapeViolationKind::ContextParam,
        };
        assert_eq!(
            violation.to_string(),
            "echo.go:4:2 Echo.Say first parameter is not context.Context"
        );
    }
}
