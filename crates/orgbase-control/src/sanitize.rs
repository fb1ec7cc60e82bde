//! Collection name sanitizer
//!
//! Deterministically maps a human-chosen organization name to a safe storage
//! unit identifier. The directory's unique index on the derived id is the
//! correctness backstop; this function only has to be total and stable.

/// Namespace tag keeping tenant units clear of the directory units
const UNIT_PREFIX: &str = "org_";

/// Derive the storage unit identifier for an organization name.
///
/// Lowercases the name and maps every character outside `[a-z0-9_]` to `_`.
/// Pure and total: never fails, same input always yields the same output.
pub fn storage_unit_id(name: &str) -> String {
    let mut id = String::with_capacity(UNIT_PREFIX.len() + name.len());
    id.push_str(UNIT_PREFIX);

    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' {
            id.push(ch);
        } else {
            id.push('_');
        }
    }

    id
}
