// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Merged-argument-map lookups.
//!
//! A job's configuration comes from more than one source layered in
//! priority order -- the job file's own fields first, then the daemon's
//! global arguments as a fallback. `*_with_arguments` walks that layered
//! list and returns the first map that defines the key; `*_with_default`
//! looks at a single map.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;

pub type ArgMap = serde_json::Map<String, Value>;

fn value_as_nonempty_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

/// First-match-wins string lookup across a layered argument-map list.
pub fn string_with_arguments(args: &[&ArgMap], key: &str, default: &str) -> String {
    for arg in args {
        if let Some(v) = arg.get(key) {
            if let Some(s) = value_as_nonempty_string(v) {
                return s;
            }
        }
    }
    default.to_string()
}

/// Single-map string lookup with a plain default, no list fallback.
pub fn string_with_default(args: &ArgMap, key: &str, default: &str) -> String {
    match args.get(key) {
        Some(v) => value_as_nonempty_string(v).unwrap_or_else(|| default.to_string()),
        None => default.to_string(),
    }
}

/// First-match-wins boolean lookup; `"1"`/`"true"` and `"0"`/`"false"` are
/// accepted as string spellings of a bool.
pub fn bool_with_arguments(args: &[&ArgMap], key: &str, default: bool) -> bool {
    for arg in args {
        match arg.get(key) {
            Some(Value::Bool(b)) => return *b,
            Some(v) => match v.to_string().trim_matches('"') {
                "1" | "true" => return true,
                "0" | "false" => return false,
                _ => continue,
            },
            None => continue,
        }
    }
    default
}

/// First-match-wins duration lookup, accepting Go-style duration strings
/// (`"10m"`, `"1h30m"`, `"500ms"`).
pub fn duration_with_arguments(args: &[&ArgMap], key: &str, default: Duration) -> Duration {
    for arg in args {
        if let Some(v) = arg.get(key) {
            let text = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if let Some(d) = parse_go_duration(&text) {
                return d;
            }
        }
    }
    default
}

/// Lists and strings interchangeably resolve to a `Vec<String>`: a JSON
/// array is taken element-wise, a string is split on `sep` (or kept whole
/// when `sep` is empty). `is_merge` concatenates across every layer
/// instead of stopping at the first match.
pub fn strings_with_arguments(
    args: &[&ArgMap],
    key: &str,
    sep: &str,
    default: Option<Vec<String>>,
    is_merge: bool,
) -> Option<Vec<String>> {
    if is_merge {
        let mut values = default.unwrap_or_default();
        for arg in args {
            if let Some(ss) = strings_with_default(arg, key, sep, None) {
                values.extend(ss);
            }
        }
        return if values.is_empty() { None } else { Some(values) };
    }

    for arg in args {
        if let Some(v) = arg.get(key) {
            if let Some(ss) = value_as_strings(v, sep) {
                return Some(ss);
            }
        }
    }
    default
}

fn strings_with_default(args: &ArgMap, key: &str, sep: &str, default: Option<Vec<String>>) -> Option<Vec<String>> {
    match args.get(key) {
        Some(v) => value_as_strings(v, sep).or(default),
        None => default,
    }
}

fn value_as_strings(v: &Value, sep: &str) -> Option<Vec<String>> {
    match v {
        Value::Array(items) => Some(items.iter().map(value_to_plain_string).collect()),
        Value::String(s) if !s.is_empty() => {
            if sep.is_empty() {
                Some(vec![s.clone()])
            } else {
                Some(s.split(sep).map(|p| p.to_string()).collect())
            }
        }
        _ => None,
    }
}

fn value_to_plain_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Flatten a JSON object into a string map for template substitution.
/// Non-string values are rendered with their JSON textual form.
pub fn to_string_map(args: &ArgMap) -> HashMap<String, String> {
    args.iter()
        .map(|(k, v)| {
            let s = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), s)
        })
        .collect()
}

/// Parse a Go-style duration string: a sequence of `<number><unit>` pairs
/// (`h`, `m`, `s`, `ms`), e.g. `"1h30m"`, `"10m"`, `"500ms"`.
pub fn parse_go_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let mut total = Duration::ZERO;
    let mut chars = s.char_indices().peekable();
    let mut any = false;

    while let Some(&(start, c)) = chars.peek() {
        if !c.is_ascii_digit() && c != '.' {
            return None;
        }
        let mut end = start;
        while let Some(&(i, c)) = chars.peek() {
            if c.is_ascii_digit() || c == '.' {
                end = i + c.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        let number: f64 = s[start..end].parse().ok()?;

        let unit_start = end;
        let mut unit_end = end;
        while let Some(&(i, c)) = chars.peek() {
            if c.is_ascii_alphabetic() || c == 'µ' {
                unit_end = i + c.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        let unit = &s[unit_start..unit_end];
        let seconds = match unit {
            "h" => number * 3600.0,
            "m" => number * 60.0,
            "s" => number,
            "ms" => number / 1_000.0,
            "us" | "µs" => number / 1_000_000.0,
            "ns" => number / 1_000_000_000.0,
            _ => return None,
        };
        total += Duration::from_secs_f64(seconds.max(0.0));
        any = true;
    }

    if any {
        Some(total)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
