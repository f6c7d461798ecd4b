//! Post-render import normalization.
//!
//! Rewrites a generated file's import block to exactly the set of
//! packages its body references: scans for package qualifiers (string
//! literals and comments excluded), maps them through the closed table of
//! stdlib packages the stub template can reach, and emits a sorted
//! import block after the package clause. Idempotent: normalizing its
//! own output is a fixed point.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Import resolution failure for one generated unit.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("generated source has no package clause")]
    MissingPackageClause,
    #[error("malformed import block: {0}")]
    MalformedImportBlock(String),
    #[error("unresolved symbol: package qualifier `{0}` has no known import")]
    UnresolvedSymbol(String),
}

/// Packages the stub template's expansion can reference, keyed by the
/// qualifier that appears in source.
const STDLIB_PACKAGES: &[(&str, &str)] = &[
    ("context", "context"),
    ("errors", "errors"),
    ("fmt", "fmt"),
    ("gob", "encoding/gob"),
    ("rpc", "net/rpc"),
    ("strings", "strings"),
    ("time", "time"),
];

static STRING_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(?:[^"\\\n]|\\.)*"|`[^`]*`"#).expect("valid regex"));
static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"//[^\n]*").expect("valid regex"));
static QUALIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^.\w])([a-z][A-Za-z0-9_]*)\.[A-Za-z_]").expect("valid regex")
});
static RECEIVER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"func\s*\(\s*([A-Za-z_]\w*)\b").expect("valid regex"));
static PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[(,]\s*([a-z_]\w*)\s+[*\[\]A-Za-z_]").expect("valid regex"));
static SHORT_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z_]\w*(?:\s*,\s*[A-Za-z_]\w*)*)\s*:=").expect("valid regex")
});
static VAR_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bvar\s+([A-Za-z_]\w*)").expect("valid regex"));

/// Rewrite the import block of `source` to the packages actually used.
pub fn normalize_imports(source: &str) -> Result<String, ImportError> {
    let lines: Vec<&str> = source.lines().collect();

    let package_idx = lines
        .iter()
        .position(|l| {
            let t = l.trim_start();
            t.starts_with("package ") || t == "package"
        })
        .ok_or(ImportError::MissingPackageClause)?;

    // Drop existing import lines from the body
    let mut body_lines: Vec<&str> = Vec::new();
    let mut i = package_idx + 1;
    while i < lines.len() {
        let trimmed = lines[i].trim();
        if trimmed.starts_with("import (") {
            let close = lines[i + 1..]
                .iter()
                .position(|l| l.trim() == ")")
                .ok_or_else(|| {
                    ImportError::MalformedImportBlock("unterminated import group".to_string())
                })?;
            i += close + 2;
            continue;
        }
        if trimmed.starts_with("import ") && trimmed.contains('"') {
            i += 1;
            continue;
        }
        body_lines.push(lines[i]);
        i += 1;
    }

    let body = body_lines.join("\n");
    let needed = resolve_packages(&body)?;

    let mut out = String::new();
    out.push_str(lines[package_idx].trim_end());
    out.push('\n');
    match needed.len() {
        0 => {}
        1 => {
            let path = needed.iter().next().expect("one import");
            out.push_str(&format!("\nimport \"{path}\"\n"));
        }
        _ => {
            out.push_str("\nimport (\n");
            for path in &needed {
                out.push_str(&format!("\t\"{path}\"\n"));
            }
            out.push_str(")\n");
        }
    }

    let body = body.trim_start_matches('\n');
    if !body.is_empty() {
        out.push('\n');
        out.push_str(body);
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

/// Map the body's package qualifiers through the stdlib table.
fn resolve_packages(body: &str) -> Result<BTreeSet<&'static str>, ImportError> {
    let stripped = STRING_LITERAL.replace_all(body, "\"\"");
    let stripped = LINE_COMMENT.replace_all(&stripped, "");

    let locals = local_bindings(&stripped);

    let mut needed = BTreeSet::new();
    let mut unresolved = BTreeSet::new();
    for cap in QUALIFIER.captures_iter(&stripped) {
        let qualifier = cap.get(1).expect("capture group").as_str();
        match STDLIB_PACKAGES.iter().find(|(q, _)| *q == qualifier) {
            Some((_, path)) => {
                needed.insert(*path);
            }
            None if locals.contains(qualifier) => {}
            None => {
                unresolved.insert(qualifier.to_string());
            }
        }
    }

    if let Some(first) = unresolved.into_iter().next() {
        return Err(ImportError::UnresolvedSymbol(first));
    }
    Ok(needed)
}

/// Identifiers bound locally in the body: receivers, parameters, var
/// declarations, and short variable declarations. Enough scope analysis
/// to tell a field access chain root from a package qualifier.
fn local_bindings(stripped: &str) -> BTreeSet<String> {
    let mut locals = BTreeSet::new();
    for cap in RECEIVER.captures_iter(stripped) {
        locals.insert(cap[1].to_string());
    }
    for cap in PARAM.captures_iter(stripped) {
        locals.insert(cap[1].to_string());
    }
    for cap in VAR_DECL.captures_iter(stripped) {
        locals.insert(cap[1].to_string());
    }
    for cap in SHORT_DECL.captures_iter(stripped) {
        for name in cap[1].split(',') {
            locals.insert(name.trim().to_string());
        }
    }
    locals
}
