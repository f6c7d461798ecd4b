//! Interface extraction: Go source tree → service descriptions.

use crate::treesitter::{self, ParseError};
use crate::types::TypeShape;
use crate::validate::{MethodSignature, SourcePos, validate};
use std::path::Path;
use stubgen_core::{Method, ServiceDescription};

/// Everything extracted from one source file.
#[derive(Debug, Default)]
pub struct Extraction {
    /// One description per interface declaration, in declaration order.
    /// Interfaces with zero eligible methods are kept (they still render
    /// a client with constructor and Close only).
    pub services: Vec<ServiceDescription>,
    /// Methods skipped by signature validation.
    pub rejected_methods: usize,
}

/// Extract service descriptions from a Go source file.
///
/// Every `type ... interface` declaration becomes a service named after
/// the type, in the package named by the file's package clause. Only
/// methods declared directly on the interface are considered; embedded
/// interfaces are not flattened.
pub fn extract_services(path: &Path, source: &str) -> Result<Extraction, ParseError> {
    let tree = treesitter::parse_go(path, source)?;
    let root = tree.root_node();

    let package = package_name(&root, source).ok_or_else(|| ParseError::MissingPackageClause {
        file: path.to_path_buf(),
    })?;

    let mut extraction = Extraction::default();
    collect_interfaces(&root, path, source, &package, &mut extraction);
    Ok(extraction)
}

fn package_name(root: &tree_sitter::Node, source: &str) -> Option<String> {
    let mut cursor = root.walk();
    root.children(&mut cursor)
        .find(|n| n.kind() == "package_clause")
        .and_then(|clause| {
            let mut c = clause.walk();
            clause
                .children(&mut c)
                .find(|n| n.kind() == "package_identifier")
                .map(|n| source[n.byte_range()].to_string())
        })
}

/// Depth-first walk over every type declaration in the tree.
fn collect_interfaces(
    node: &tree_sitter::Node,
    path: &Path,
    source: &str,
    package: &str,
    extraction: &mut Extraction,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "type_declaration" {
            let mut tc = child.walk();
            for spec in child.children(&mut tc) {
                if spec.kind() != "type_spec" {
                    continue;
                }
                let Some(name_node) = spec.child_by_field_name("name") else {
                    continue;
                };
                let Some(type_node) = spec.child_by_field_name("type") else {
                    continue;
                };
                if type_node.kind() != "interface_type" {
                    continue;
                }
                let service = source[name_node.byte_range()].to_string();
                tracing::debug!("found interface: {service}");

                let methods = extract_methods(&type_node, path, source, &service, extraction);
                extraction
                    .services
                    .push(ServiceDescription::new(package, service, methods));
            }
        } else {
            collect_interfaces(&child, path, source, package, extraction);
        }
    }
}

/// Run the validator over each directly declared method, keeping accepted
/// ones in declaration order.
fn extract_methods(
    interface_node: &tree_sitter::Node,
    path: &Path,
    source: &str,
    service: &str,
    extraction: &mut Extraction,
) -> Vec<Method> {
    let mut methods = Vec::new();

    let mut cursor = interface_node.walk();
    for elem in interface_node.named_children(&mut cursor) {
        // type_elem children are embedded interfaces; skipped by design
        if elem.kind() != "method_elem" {
            continue;
        }
        let Some(sig) = method_signature(&elem, path, source) else {
            continue;
        };

        if !validate(service, &sig) {
            extraction.rejected_methods += 1;
            continue;
        }

        methods.push(Method::new(
            sig.name,
            sig.params[1].render(),
            sig.results[0].render(),
        ));
    }

    methods
}

/// Read one `method_elem` into its transient signature.
fn method_signature(elem: &tree_sitter::Node, path: &Path, source: &str) -> Option<MethodSignature> {
    let name_node = elem.child_by_field_name("name")?;
    let name = source[name_node.byte_range()].to_string();

    let params = elem
        .child_by_field_name("parameters")
        .map(|list| type_shapes(&list, source))
        .unwrap_or_default();

    let results = match elem.child_by_field_name("result") {
        Some(result) if result.kind() == "parameter_list" => type_shapes(&result, source),
        Some(result) => vec![TypeShape::from_node(&result, source)],
        None => Vec::new(),
    };

    let point = elem.start_position();
    Some(MethodSignature {
        name,
        params,
        results,
        pos: SourcePos {
            file: path.to_path_buf(),
            line: point.row + 1,
            column: point.column + 1,
        },
    })
}

/// Shapes of the declarations in a parameter list, one per declaration
/// (a declaration naming several parameters still counts once).
fn type_shapes(list: &tree_sitter::Node, source: &str) -> Vec<TypeShape> {
    let mut shapes = Vec::new();
    let mut cursor = list.walk();
    for decl in list.named_children(&mut cursor) {
        match decl.kind() {
            "parameter_declaration" => {
                let shape = decl
                    .child_by_field_name("type")
                    .map(|t| TypeShape::from_node(&t, source))
                    .unwrap_or(TypeShape::Unknown);
                shapes.push(shape);
            }
            // Variadic parameters have no remote-call shape
            "variadic_parameter_declaration" => shapes.push(TypeShape::Unknown),
            _ => {}
        }
    }
    shapes
}
