// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn for_file_lowercases_basename() {
    let id = EntryId::for_file("Nightly-Backup.json");
    assert_eq!(id.as_str(), "nightly-backup.json");
}

#[test]
fn for_db_row_uses_decimal_form() {
    let id = EntryId::for_db_row(42);
    assert_eq!(id.as_str(), "42");
}

#[test]
fn disjoint_namespaces_never_collide_even_with_the_same_id_string() {
    let file_id = EntryId::for_file("42");
    let db_id = EntryId::for_db_row(42);
    // Both render the same id-string here, but the source tag keeps them
    // from ever being the same registry key: the spec requires the two
    // namespaces to be disjoint, not merely that the strings differ.
    assert_eq!(file_id.as_str(), db_id.as_str());
    assert_ne!(file_id, db_id);
}

#[test]
fn short_truncates() {
    let id = EntryId::for_file("abcdefgh");
    assert_eq!(id.short(4), "abcd");
    assert_eq!(id.short(100), "abcdefgh");
}

#[test]
fn display_matches_as_str() {
    let id = EntryId::for_file("job-one");
    assert_eq!(format!("{id}"), "job-one");
}
