//! Tree-sitter integration for Go source parsing.

use std::path::{Path, PathBuf};

/// The source tree cannot be parsed. Always fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to load Go grammar: {0}")]
    Grammar(String),
    #[error("failed to parse {file}")]
    Unparsable { file: PathBuf },
    #[error("syntax error in {file} at line {line}")]
    Syntax { file: PathBuf, line: usize },
    #[error("{file} has no package clause")]
    MissingPackageClause { file: PathBuf },
}

/// Parse a Go source file and return the tree-sitter tree.
///
/// A tree whose root contains error nodes is rejected: the reference
/// pipeline treats any parse failure as fatal rather than extracting
/// from a partial tree.
pub fn parse_go(path: &Path, source: &str) -> Result<tree_sitter::Tree, ParseError> {
    let lang: tree_sitter::Language = tree_sitter_go::LANGUAGE.into();
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&lang)
        .map_err(|e| ParseError::Grammar(e.to_string()))?;
    let tree = parser
        .parse(source.as_bytes(), None)
        .ok_or_else(|| ParseError::Unparsable {
            file: path.to_path_buf(),
        })?;

    if tree.root_node().has_error() {
        let line = first_error_line(&tree.root_node());
        return Err(ParseError::Syntax {
            file: path.to_path_buf(),
            line,
        });
    }

    Ok(tree)
}

fn first_error_line(node: &tree_sitter::Node) -> usize {
    if node.is_error() || node.is_missing() {
        return node.start_position().row + 1;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            return first_error_line(&child);
        }
    }
    node.start_position().row + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_go() {
        let source = "package demo\n\ntype Echo interface {}\n";
        assert!(parse_go(Path::new("demo.go"), source).is_ok());
    }

    #[test]
    fn test_parse_rejects_syntax_errors() {
        let source = "package demo\n\ntype Echo interface {\n";
        let err = parse_go(Path::new("demo.go"), source).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }
}
