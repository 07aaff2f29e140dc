// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID newtypes, including the cron registry's source-tagged entry id.

use std::fmt;

/// Trait for truncating identifiers to a short prefix.
pub trait ShortId {
    /// Returns a string slice truncated to at most `n` characters.
    fn short(&self, n: usize) -> &str;
}

impl ShortId for str {
    fn short(&self, n: usize) -> &str {
        if self.len() <= n {
            self
        } else {
            &self[..n]
        }
    }
}

/// Which id space an [`EntryId`] belongs to.
///
/// File-sourced jobs key on their lowercased basename; DB-sourced jobs key
/// on the decimal form of their row id. The data model calls these two
/// spaces disjoint and the testable properties require "no two entries
/// share an id-string", but a bare `String` id can't actually enforce
/// that on its own: a file named `42.json` and a DB row with `id=42` both
/// render the id-string `"42"`. Carrying the source as part of the
/// identity itself, instead of erasing it into a plain `String`, means the
/// two can never collide no matter what the underlying name or row id
/// happen to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Source {
    File,
    Db,
}

/// Identifies a registered entry in the cron engine's registry.
///
/// Two `EntryId`s only compare equal if both their source and their
/// id-string match -- a file-sourced and a DB-sourced entry are never
/// `==` to one another, even when [`EntryId::as_str`] would return the
/// same text for both. See [`Source`] for why.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryId {
    source: Source,
    value: String,
}

impl EntryId {
    /// Build the id for a file-sourced job: the lowercased basename.
    pub fn for_file(basename: &str) -> Self {
        Self {
            source: Source::File,
            value: basename.to_lowercase(),
        }
    }

    /// Build the id for a DB-sourced job: the decimal row id.
    pub fn for_db_row(id: i64) -> Self {
        Self {
            source: Source::Db,
            value: id.to_string(),
        }
    }

    /// The bare id-string this entry is registered and displayed under --
    /// the data model's "id-string". Two `EntryId`s from different sources
    /// may return the same text here without ever being `==` to one
    /// another; see [`Source`].
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns a string slice truncated to at most `n` characters.
    pub fn short(&self, n: usize) -> &str {
        self.value.short(n)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
