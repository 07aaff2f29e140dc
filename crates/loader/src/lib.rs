// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! shed-loader: Component E, the file-based job loader and its shared
//! argument-map and template-expansion machinery. The database loader in
//! `shed-storage` reuses [`args`] and [`template`] for the same expansion
//! grammar against DB rows instead of files.

pub mod args;
pub mod file_loader;
pub mod template;

pub use args::{
    bool_with_arguments, duration_with_arguments, parse_go_duration, string_with_arguments,
    string_with_default, strings_with_arguments, to_string_map, ArgMap,
};
pub use file_loader::{job_from_map, list_job_files, load_job_from_file, LoadError};
pub use template::{expand, TemplateError};
