//! Schema-validated parsing of the encoded list fields.
//!
//! The genres, keywords, cast and crew columns hold JSON arrays of objects:
//!
//! ```text
//! [{"id": 28, "name": "Action"}, {"id": 12, "name": "Adventure"}]
//! ```
//!
//! Each field is deserialized into typed entries, so a missing `name`, a
//! non-array value or broken syntax is rejected here rather than surfacing
//! later as an odd token.

use crate::types::{CrewEntry, NamedEntry};

/// The crew job that identifies a director
pub const DIRECTOR_JOB: &str = "Director";

/// Extract `name` from every entry, preserving order.
///
/// Example: `[{"name": "Science Fiction"}]` -> `["Science Fiction"]`
pub fn parse_names(raw: &str) -> Result<Vec<String>, serde_json::Error> {
    let entries: Vec<NamedEntry> = serde_json::from_str(raw)?;
    Ok(entries.into_iter().map(|e| e.name).collect())
}

/// Extract `name` from at most the first `limit` entries.
///
/// The whole list is still validated; only the output is truncated.
pub fn parse_top_names(raw: &str, limit: usize) -> Result<Vec<String>, serde_json::Error> {
    let mut names = parse_names(raw)?;
    names.truncate(limit);
    Ok(names)
}

/// Find the first crew member whose job is exactly "Director".
pub fn parse_director(raw: &str) -> Result<Option<String>, serde_json::Error> {
    let crew: Vec<CrewEntry> = serde_json::from_str(raw)?;
    Ok(crew
        .into_iter()
        .find(|member| member.job == DIRECTOR_JOB)
        .map(|member| member.name))
}
