// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template variable interpolation.
//!
//! Job definitions reference their merged argument map with the same
//! `{{.field}}` / `{{js .field}}` grammar as the on-disk job files they are
//! loaded from. A template with no `{{` is returned unchanged -- the common
//! case, and checked up front rather than paid for on every substitution.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static FIELD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*(js\s+)?\.([A-Za-z_][A-Za-z0-9_]*)\s*\}\}")
        .expect("constant regex pattern is valid")
});

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template directive not supported: {0}")]
    UnsupportedDirective(String),
}

/// Expand every `{{.field}}` / `{{js .field}}` placeholder in `template`
/// against `args`.
///
/// A field absent from `args` expands to the empty string, matching
/// `text/template`'s tolerant behavior for missing map keys. Anything
/// inside `{{ }}` outside this grammar (`{{range ...}}`, `{{if ...}}`, a
/// name without a leading dot) is a [`TemplateError::UnsupportedDirective`]
/// rather than a silent pass-through.
pub fn expand(template: &str, args: &HashMap<String, String>) -> Result<String, TemplateError> {
    if !template.contains("{{") {
        return Ok(template.to_string());
    }

    let expanded = FIELD_PATTERN.replace_all(template, |caps: &regex::Captures| {
        let is_js = caps.get(1).is_some();
        let field = &caps[2];
        match args.get(field) {
            Some(value) if is_js => js_escape(value),
            Some(value) => value.clone(),
            None => String::new(),
        }
    });

    if let Some(start) = expanded.find("{{") {
        let end = expanded[start..]
            .find("}}")
            .map(|i| start + i + 2)
            .unwrap_or(expanded.len());
        return Err(TemplateError::UnsupportedDirective(
            expanded[start..end].to_string(),
        ));
    }

    Ok(expanded.into_owned())
}

/// Escape a string the way `text/template`'s `js` pipeline does, for the
/// characters that matter when a substituted value lands inside a
/// double-quoted argument: backslashes, quotes, and line terminators.
fn js_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '<' => out.push_str("\\u003C"),
            '>' => out.push_str("\\u003E"),
            '&' => out.push_str("\\u0026"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
