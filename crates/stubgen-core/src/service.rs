//! Render-ready description of one remote-callable service.
//!
//! A `ServiceDescription` is built once per interface declaration found in
//! the source tree, is immutable after construction, and is consumed
//! exactly once by the stub renderer. Method order is declaration order
//! and is preserved all the way into the generated client.

use serde::Serialize;

/// One remote-callable method of a service.
///
/// `request_type` keeps the declared indirection marker (`*Msg` stays
/// `*Msg`); `response_type` is stored marker-stripped because the stub
/// template re-adds exactly one `*` at the point of use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Method {
    pub name: String,
    pub request_type: String,
    pub response_type: String,
}

impl Method {
    /// Build a method from the declared type names, normalizing the
    /// response name by stripping its leading indirection marker.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        request_type: impl Into<String>,
        response_type: impl Into<String>,
    ) -> Self {
        let response_type = response_type.into();
        Self {
            name: name.into(),
            request_type: request_type.into(),
            response_type: response_type
                .strip_prefix('*')
                .map(str::to_string)
                .unwrap_or(response_type),
        }
    }

    /// The request payload name without any indirection marker.
    /// Used by the type registration block, which registers value types.
    #[must_use]
    pub fn request_payload(&self) -> &str {
        self.request_type.trim_start_matches('*')
    }
}

/// Normalized description of one source interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescription {
    /// Enclosing Go package of the source interface.
    pub package: String,
    /// The interface's declared name.
    pub name: String,
    /// Accepted methods in declaration order.
    pub methods: Vec<Method>,
}

impl ServiceDescription {
    #[must_use]
    pub fn new(package: impl Into<String>, name: impl Into<String>, methods: Vec<Method>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            methods,
        }
    }

    /// Deterministic output file name for this service's generated stub.
    #[must_use]
    pub fn output_file_name(&self) -> String {
        format!("{}_client_gen.go", self.name.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_strips_response_marker() {
        let m = Method::new("Say", "Msg", "*Reply");
        assert_eq!(m.response_type, "Reply");
        assert_eq!(m.request_type, "Msg");
    }

    #[test]
    fn test_method_keeps_request_marker() {
        let m = Method::new("Say", "*Msg", "*Reply");
        assert_eq!(m.request_type, "*Msg");
        assert_eq!(m.request_payload(), "Msg");
    }

    #[test]
    fn test_method_bare_response_unchanged() {
        let m = Method::new("Say", "Msg", "Reply");
        assert_eq!(m.response_type, "Reply");
    }

    #[test]
    fn test_output_file_name_lowercases_service() {
        let desc = ServiceDescription::new("users", "UserService", Vec::new());
        assert_eq!(desc.output_file_name(), "userservice_client_gen.go");
    }

    #[test]
    fn test_method_order_preserved() {
        let desc = ServiceDescription::new(
            "echo",
            "Echo",
            vec![
                Method::new("B", "Req", "*Resp"),
                Method::new("A", "Req", "*Resp"),
            ],
        );
        let names: Vec<&str> = desc.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
    }
}
