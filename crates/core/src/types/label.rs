//! Bounded display text.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Label`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    /// The input is empty or only whitespace.
    #[error("value cannot be blank")]
    Blank,
    /// The input string is too long.
    #[error("value must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length in characters.
        max: usize,
    },
}

/// Non-blank text of at most `MAX` characters.
///
/// Used for entity names, whose column widths differ per table.
///
/// ```
/// use inventory_core::{CatalogName, ProductName};
///
/// assert!(CatalogName::parse("Electronics").is_ok());
/// assert!(CatalogName::parse("   ").is_err());
/// assert!(CatalogName::parse(&"x".repeat(101)).is_err());
/// assert!(ProductName::parse(&"x".repeat(200)).is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Label<const MAX: usize>(String);

/// Name of a category or collection.
pub type CatalogName = Label<100>;

/// Name of a product.
pub type ProductName = Label<200>;

impl<const MAX: usize> Label<MAX> {
    /// Maximum length in characters.
    pub const MAX_LENGTH: usize = MAX;

    /// Parse a label from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is blank or longer than `MAX` characters.
    pub fn parse(s: &str) -> Result<Self, LabelError> {
        if s.trim().is_empty() {
            return Err(LabelError::Blank);
        }

        if s.chars().count() > MAX {
            return Err(LabelError::TooLong { max: MAX });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the label and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<const MAX: usize> fmt::Display for Label<MAX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<const MAX: usize> TryFrom<String> for Label<MAX> {
    type Error = LabelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl<const MAX: usize> From<Label<MAX>> for String {
    fn from(label: Label<MAX>) -> Self {
        label.0
    }
}

impl<const MAX: usize> AsRef<str> for Label<MAX> {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl<const MAX: usize> sqlx::Type<sqlx::Postgres> for Label<MAX> {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r, const MAX: usize> sqlx::Decode<'r, sqlx::Postgres> for Label<MAX> {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl<const MAX: usize> sqlx::Encode<'_, sqlx::Postgres> for Label<MAX> {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
