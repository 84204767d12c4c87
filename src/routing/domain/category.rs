//! Validated category identifiers and registration targets.

use super::RoutingDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token that selects the default handler in a category list.
const DEFAULT_TARGET_TOKEN: &str = "*";

/// Case-insensitive routing key extracted from a link, such as a game
/// short-name.
///
/// Categories are trimmed and lowercased on construction, so `SkyrimSE` and
/// `skyrimse` name the same mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Category(String);

impl Category {
    /// Creates a validated category.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingDomainError::EmptyCategory`] when the value is empty
    /// after trimming, or [`RoutingDomainError::InvalidCategory`] when it
    /// contains whitespace or one of `/ ? # , *`.
    pub fn new(value: impl Into<String>) -> Result<Self, RoutingDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(RoutingDomainError::EmptyCategory);
        }

        let is_valid = normalized
            .chars()
            .all(|c| !c.is_whitespace() && !matches!(c, '/' | '?' | '#' | ',' | '*'));
        if !is_valid {
            return Err(RoutingDomainError::InvalidCategory(raw));
        }

        Ok(Self(normalized))
    }

    /// Returns the category as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Category {
    type Error = RoutingDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.0
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Slot a handler executable can be registered into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HandlerTarget {
    /// Handler for one category.
    Category(Category),
    /// Catch-all handler used when no category mapping resolves.
    Default,
}

impl HandlerTarget {
    /// Parses a single target token; `*` selects the default handler.
    ///
    /// # Errors
    ///
    /// Returns category validation errors for any other token.
    pub fn parse(token: &str) -> Result<Self, RoutingDomainError> {
        if token.trim() == DEFAULT_TARGET_TOKEN {
            return Ok(Self::Default);
        }
        Category::new(token).map(Self::Category)
    }

    /// Parses a comma-separated target list such as `skyrimse,fallout4,*`.
    ///
    /// Empty entries are skipped and duplicates collapse to their first
    /// occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingDomainError::EmptyCategoryList`] when no entries
    /// remain, or the validation error of the first invalid entry.
    pub fn parse_list(list: &str) -> Result<Vec<Self>, RoutingDomainError> {
        let mut targets: Vec<Self> = Vec::new();
        for token in list.split(',').filter(|token| !token.trim().is_empty()) {
            let target = Self::parse(token)?;
            if !targets.contains(&target) {
                targets.push(target);
            }
        }

        if targets.is_empty() {
            return Err(RoutingDomainError::EmptyCategoryList);
        }
        Ok(targets)
    }
}

impl fmt::Display for HandlerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category(category) => category.fmt(f),
            Self::Default => f.write_str(DEFAULT_TARGET_TOKEN),
        }
    }
}
