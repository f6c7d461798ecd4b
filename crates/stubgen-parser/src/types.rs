//! Declared-type shapes as they appear in Go method signatures.

/// The closed set of type-expression shapes the extractor understands.
///
/// `Unknown` is an explicit terminal variant: any expression outside the
/// set (slices, maps, funcs, generics, variadics) lands there and is
/// rejected by the validator instead of being silently mis-read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    /// A plain named type: `Msg`, `error`.
    Named(String),
    /// One level of indirection: `*Msg`.
    Pointer(Box<TypeShape>),
    /// A package-qualified reference: `context.Context`.
    Qualified { package: String, name: String },
    /// Anything else.
    Unknown,
}

impl TypeShape {
    /// Read the shape of a type expression node.
    #[must_use]
    pub fn from_node(node: &tree_sitter::Node, source: &str) -> Self {
        match node.kind() {
            "type_identifier" => Self::Named(source[node.byte_range()].to_string()),
            "pointer_type" => match node.named_child(0) {
                Some(inner) => Self::Pointer(Box::new(Self::from_node(&inner, source))),
                None => Self::Unknown,
            },
            "qualified_type" => {
                let package = node
                    .child_by_field_name("package")
                    .map(|n| source[n.byte_range()].to_string());
                let name = node
                    .child_by_field_name("name")
                    .map(|n| source[n.byte_range()].to_string());
                match (package, name) {
                    (Some(package), Some(name)) => Self::Qualified { package, name },
                    _ => Self::Unknown,
                }
            }
            _ => Self::Unknown,
        }
    }

    /// The declared spelling of this shape: `Msg`, `*Msg`, `context.Context`.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Named(name) => name.clone(),
            Self::Pointer(inner) => format!("*{}", inner.render()),
            Self::Qualified { package, name } => format!("{package}.{name}"),
            Self::Unknown => "unknown".to_string(),
        }
    }

    /// True for a qualified reference whose full name is `package.name`.
    #[must_use]
    pub fn is_qualified_as(&self, package: &str, name: &str) -> bool {
        matches!(self, Self::Qualified { package: p, name: n } if p == package && n == name)
    }
}
