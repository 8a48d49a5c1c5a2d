//! # Shared Utility Functions
//!
//! Common utility functions used by the explorer and its API clients.
//!
//! ## Term Lists
//!
//! - [`join_term_entities`] - Comma-join entity ids for query strings
//! - [`join_term_names`] - Comma-join display names for logs and headings
//!
//! ## Label Formatting
//!
//! - [`truncate_label`] - Shorten a label to a character budget with an ellipsis
//!
//! ## Usage
//!
//! ```rust
//! use shared::dto::trends::Term;
//! use shared::utils::join_term_names;
//!
//! let terms = vec![Term::new("/m/a", "Measles"), Term::new("/m/b", "Mumps")];
//! assert_eq!(join_term_names(&terms), "Measles, Mumps");
//! ```

use crate::dto::trends::Term;

/// Comma-join the entity ids of `terms`, preserving order.
pub fn join_term_entities(terms: &[Term]) -> String {
    terms
        .iter()
        .map(|t| t.entity.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Comma-join the display names of `terms`, preserving order.
pub fn join_term_names(terms: &[Term]) -> String {
    terms
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Shorten `label` to at most `max_chars` characters, ending with `...` when cut.
///
/// Counts characters, not bytes, so multi-byte names are never split.
///
/// # Examples
///
/// ```rust
/// use shared::utils::truncate_label;
///
/// assert_eq!(truncate_label("Raynaud syndrome", 10), "Raynaud...");
/// assert_eq!(truncate_label("Cold", 10), "Cold");
/// ```
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    let char_count = label.chars().count();
    if char_count <= max_chars {
        return label.to_string();
    }

    // Budget too small to fit an ellipsis: hard cut
    if max_chars <= 3 {
        return label.chars().take(max_chars).collect();
    }

    let head: String = label.chars().take(max_chars - 3).collect();
    format!("{}...", head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_term_entities() {
        let terms = vec![Term::new("/m/a", "A"), Term::new("/m/b", "B")];
        assert_eq!(join_term_entities(&terms), "/m/a,/m/b");
        assert_eq!(join_term_entities(&[]), "");
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("Winter vomiting bug", 12), "Winter vo...");
        assert_eq!(truncate_label("Burn", 4), "Burn");
        assert_eq!(truncate_label("Burn", 2), "Bu");
    }

    #[test]
    fn test_truncate_label_multibyte() {
        assert_eq!(truncate_label("Gripe é forte", 8), "Gripe...");
    }
}
