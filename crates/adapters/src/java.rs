// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Java executable normalisation: classpath glob expansion and JDWP/
//! options/class/jar argv synthesis. Shared by the file and DB loaders.

/// Platform classpath separator: `;` on Windows, `:` elsewhere.
#[cfg(windows)]
pub const CLASSPATH_SEP: &str = ";";
#[cfg(not(windows))]
pub const CLASSPATH_SEP: &str = ":";

/// Expand each glob pattern in `patterns`, collecting all matches.
///
/// The source this is grounded on inverted this check (`if non-empty {
/// return nothing }`), silently disabling expansion whenever classpath
/// patterns were actually supplied. This expands unconditionally, which
/// is the corrected behavior the spec calls for from both loaders.
pub fn expand_classpath_patterns(patterns: &[String]) -> Vec<String> {
    let mut classpath = Vec::new();
    for pattern in patterns {
        if pattern.is_empty() {
            continue;
        }
        match glob::glob(pattern) {
            Ok(paths) => {
                classpath.extend(paths.filter_map(Result::ok).map(|p| p.display().to_string()))
            }
            Err(_) => classpath.push(pattern.clone()),
        }
    }
    classpath
}

/// Split a `;`-separated classpath string and expand each segment.
pub fn expand_classpath_str(classpath: &str) -> Vec<String> {
    let patterns: Vec<String> = classpath.split(';').map(str::to_string).collect();
    expand_classpath_patterns(&patterns)
}

/// Rewrite any `-cp`/`--classpath` paired argument in place: glob-expand its
/// `;`-separated value and rejoin with the platform classpath separator.
/// Used by the DB loader's post-load normalisation.
pub fn expand_classpath_pairs(arguments: &mut [String]) {
    let mut i = 0;
    while i + 1 < arguments.len() {
        if arguments[i] == "-cp" || arguments[i] == "--classpath" {
            let expanded = expand_classpath_str(&arguments[i + 1]);
            arguments[i + 1] = expanded.join(CLASSPATH_SEP);
        }
        i += 2;
    }
}

/// The `java_*` keys recognised by the file loader, bundled for
/// [`synthesize_java_argv`].
#[derive(Debug, Default)]
pub struct JavaArgs<'a> {
    pub classpath: &'a [String],
    pub debug: Option<&'a str>,
    pub debug_suspend: bool,
    pub options: &'a [String],
    pub class: Option<&'a str>,
    pub jar: Option<&'a str>,
}

/// Synthesise the java argv prefix (classpath, JDWP agent string, options,
/// class, jar) ahead of the job's own arguments, in that order.
pub fn synthesize_java_argv(java: &JavaArgs<'_>, user_arguments: &[String]) -> Vec<String> {
    let mut results = Vec::new();

    let classpath = expand_classpath_patterns(java.classpath);
    if !classpath.is_empty() {
        results.push("-cp".to_string());
        results.push(classpath.join(CLASSPATH_SEP));
    }

    if let Some(debug) = java.debug {
        if !debug.is_empty() {
            let suspend = if java.debug_suspend { "y" } else { "n" };
            results.push(format!(
                "-agentlib:jdwp=transport=dt_socket,server=y,suspend={suspend},address=5005"
            ));
        }
    }

    results.extend(java.options.iter().cloned());

    if let Some(class) = java.class {
        if !class.is_empty() {
            results.push(class.to_string());
        }
    }

    if let Some(jar) = java.jar {
        if !jar.is_empty() {
            results.push(jar.to_string());
        }
    }

    results.extend(user_arguments.iter().cloned());
    results
}

/// `true` if `execute`'s basename is `java` or `java.exe` (case-insensitive).
pub fn is_java_executable(execute: &str) -> bool {
    let base = std::path::Path::new(execute)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(execute)
        .to_lowercase();
    base == "java" || base == "java.exe"
}

#[cfg(test)]
#[path = "java_tests.rs"]
mod tests;
