//! Scheme link parsing.

use super::{Category, RoutingDomainError};

/// Separator between a scheme and the rest of a link.
const SCHEME_SEPARATOR: &str = "://";

/// A link of the claimed scheme, split just far enough to route it.
///
/// Only the category segment (the text between `://` and the first `/`,
/// `?` or `#`) is interpreted. The link itself is kept verbatim and handed
/// to the handler unchanged; percent-encoding is left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeLink {
    category: Option<Category>,
    raw: String,
}

impl SchemeLink {
    /// Parses `raw` as a link of `scheme`.
    ///
    /// A missing or unusable category segment is not an error; the link then
    /// carries no category and only a default handler can take it.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingDomainError::MalformedLink`] when `raw` does not start
    /// with `<scheme>://` (the scheme is compared case-insensitively).
    pub fn parse(scheme: &str, raw: &str) -> Result<Self, RoutingDomainError> {
        let rest = strip_scheme(scheme, raw).ok_or_else(|| RoutingDomainError::MalformedLink {
            scheme: scheme.to_owned(),
            link: raw.to_owned(),
        })?;

        let segment = rest.split(['/', '?', '#']).next().unwrap_or_default();
        let category = Category::new(segment).ok();

        Ok(Self {
            category,
            raw: raw.to_owned(),
        })
    }

    /// Returns the routing category, if the link carries a usable one.
    #[must_use]
    pub const fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    /// Returns the link exactly as received.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn strip_scheme<'a>(scheme: &str, raw: &'a str) -> Option<&'a str> {
    let split_at = scheme.len();
    let prefix = raw.get(..split_at)?;
    if scheme.is_empty() || !prefix.eq_ignore_ascii_case(scheme) {
        return None;
    }
    raw.get(split_at..)?.strip_prefix(SCHEME_SEPARATOR)
}
