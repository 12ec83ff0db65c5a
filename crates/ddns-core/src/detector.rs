//! Change detection
//!
//! Pure comparison of the observed address against the published one.
//! Comparison happens on the canonical form, which ignores whitespace and
//! letter case.

use crate::address::{Address, Published};

/// Outcome of comparing observed and published addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Both sides agree, no write needed
    Unchanged,
    /// The zone must be moved from `from` to `to`
    Required { from: Published, to: Address },
}

impl Change {
    pub fn is_required(&self) -> bool {
        matches!(self, Change::Required { .. })
    }
}

/// Decide whether `published` must be replaced by `observed`
///
/// Both sides are already canonical, so equality of the parsed values is
/// equality under canonical form.
pub fn detect(observed: Address, published: Published) -> Change {
    match published {
        Published::Present(current) if current == observed => Change::Unchanged,
        _ => Change::Required {
            from: published,
            to: observed,
        },
    }
}

/// Canonical comparison form of a raw address string
///
/// Strips all whitespace and lowercases.
pub fn canonical_form(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Compare two raw address strings under canonical form
///
/// For unparsed input; parsed [`Address`] values compare with `==`.
pub fn differs(observed: &str, published: &str) -> bool {
    canonical_form(observed) != canonical_form(published)
}
