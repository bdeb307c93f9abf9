//! URL-safe slug type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The input string is empty.
    #[error("slug cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `a-z`, `0-9` and `-`.
    #[error("slug may only contain lowercase letters, digits and hyphens (found {0:?})")]
    InvalidCharacter(char),
    /// The input starts or ends with a hyphen.
    #[error("slug cannot start or end with a hyphen")]
    EdgeHyphen,
}

/// A URL-safe textual identifier, unique per entity type.
///
/// ## Constraints
///
/// - Length: 1-200 characters
/// - Only lowercase ASCII letters, digits and `-`
/// - No leading or trailing `-`
///
/// ## Examples
///
/// ```
/// use inventory_core::Slug;
///
/// assert!(Slug::parse("summer-2024").is_ok());
/// assert!(Slug::parse("Summer").is_err());
/// assert!(Slug::parse("-edge").is_err());
///
/// let derived = Slug::from_name("Kitchen & Dining").unwrap();
/// assert_eq!(derived.as_str(), "kitchen-dining");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Maximum length of a slug.
    pub const MAX_LENGTH: usize = 200;

    /// Parse a `Slug` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 200 characters,
    /// contains characters other than `a-z`, `0-9` and `-`, or begins or ends
    /// with a hyphen.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(SlugError::InvalidCharacter(c));
        }

        if s.starts_with('-') || s.ends_with('-') {
            return Err(SlugError::EdgeHyphen);
        }

        Ok(Self(s.to_owned()))
    }

    /// Derive a slug from a display name.
    ///
    /// ASCII letters are lowercased and digits kept; every other run of
    /// characters collapses into a single hyphen. The result is truncated to
    /// [`Self::MAX_LENGTH`].
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Empty`] if the name contains no ASCII
    /// alphanumerics.
    pub fn from_name(name: &str) -> Result<Self, SlugError> {
        let mut slug = String::with_capacity(name.len());
        let mut pending_hyphen = false;

        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(c.to_ascii_lowercase());
            } else {
                pending_hyphen = true;
            }
        }

        slug.truncate(Self::MAX_LENGTH);
        while slug.ends_with('-') {
            slug.pop();
        }

        Self::parse(&slug)
    }

    /// Check the slug against a column narrower than [`Self::MAX_LENGTH`].
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::TooLong`] if the slug exceeds `max` characters.
    pub fn ensure_max_len(&self, max: usize) -> Result<(), SlugError> {
        if self.0.len() > max {
            return Err(SlugError::TooLong { max });
        }
        Ok(())
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Slug` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Slug {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Slug {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Slug {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Slug::parse("electronics").is_ok());
        assert!(Slug::parse("old-name").is_ok());
        assert!(Slug::parse("a1-b2-c3").is_ok());
        assert!(Slug::parse("x").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Slug::parse(""), Err(SlugError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a".repeat(Slug::MAX_LENGTH + 1);
        assert_eq!(
            Slug::parse(&long),
            Err(SlugError::TooLong {
                max: Slug::MAX_LENGTH
            })
        );
        assert!(Slug::parse(&"a".repeat(Slug::MAX_LENGTH)).is_ok());
    }

    #[test]
    fn test_parse_rejects_uppercase_and_spaces() {
        assert_eq!(Slug::parse("Shoes"), Err(SlugError::InvalidCharacter('S')));
        assert_eq!(
            Slug::parse("new shoes"),
            Err(SlugError::InvalidCharacter(' '))
        );
    }

    #[test]
    fn test_parse_rejects_edge_hyphen() {
        assert_eq!(Slug::parse("-shoes"), Err(SlugError::EdgeHyphen));
        assert_eq!(Slug::parse("shoes-"), Err(SlugError::EdgeHyphen));
    }

    #[test]
    fn test_ensure_max_len() {
        let slug = Slug::parse(&"a".repeat(101)).unwrap();
        assert_eq!(slug.ensure_max_len(100), Err(SlugError::TooLong { max: 100 }));
        assert!(slug.ensure_max_len(200).is_ok());
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Slug::from_name("Electronics").unwrap().as_str(), "electronics");
        assert_eq!(Slug::from_name("New Name").unwrap().as_str(), "new-name");
        assert_eq!(
            Slug::from_name("  Summer -- Sale 2024!  ").unwrap().as_str(),
            "summer-sale-2024"
        );
        assert_eq!(Slug::from_name("Café Crème").unwrap().as_str(), "caf-cr-me");
    }

    #[test]
    fn test_from_name_without_alphanumerics() {
        assert_eq!(Slug::from_name("!!! ???"), Err(SlugError::Empty));
    }

    #[test]
    fn test_from_name_truncates() {
        let slug = Slug::from_name(&"ab ".repeat(150)).unwrap();
        assert!(slug.as_str().len() <= Slug::MAX_LENGTH);
        assert!(!slug.as_str().ends_with('-'));
    }

    #[test]
    fn test_serde_validates() {
        let slug: Slug = serde_json::from_str("\"home-decor\"").unwrap();
        assert_eq!(slug.as_str(), "home-decor");
        assert_eq!(serde_json::to_string(&slug).unwrap(), "\"home-decor\"");

        assert!(serde_json::from_str::<Slug>("\"Home Decor\"").is_err());
    }
}
