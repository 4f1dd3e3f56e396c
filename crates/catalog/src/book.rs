//! Book records.
//!
//! # Invariants
//! - `title` and `isbn` are each globally unique (enforced by the store).
//! - `isbn` passes checksum validation before persistence on create or
//!   update ([`Isbn`] makes invalid values unrepresentable).
//! - `version` increases by one on every persisted mutation.

use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use bookshelf_core::{BookId, DomainError, DomainResult, Entity};

use crate::Isbn;

/// Month-granularity publication date, rendered as `MM/YYYY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublishDate {
    month: u32,
    year: i32,
}

impl PublishDate {
    pub fn new(month: u32, year: i32) -> DomainResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::validation(format!("invalid month {month}")));
        }
        if !(0..=9999).contains(&year) {
            return Err(DomainError::validation(format!("invalid year {year}")));
        }
        Ok(Self { month, year })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }
}

impl core::fmt::Display for PublishDate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02}/{:04}", self.month, self.year)
    }
}

impl FromStr for PublishDate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (month, year) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| DomainError::validation(format!("publish date '{s}' is not MM/YYYY")))?;

        let month = month
            .parse::<u32>()
            .map_err(|_| DomainError::validation(format!("publish date '{s}' is not MM/YYYY")))?;
        let year = year
            .parse::<i32>()
            .map_err(|_| DomainError::validation(format!("publish date '{s}' is not MM/YYYY")))?;

        Self::new(month, year)
    }
}

impl Serialize for PublishDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PublishDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A catalog item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: Isbn,
    /// Currency amount kept as the string the caller supplied; the catalog
    /// does no arithmetic on it.
    pub price: String,
    pub published: PublishDate,
    pub cover_image: Option<String>,
    pub version: u64,
}

impl Entity for Book {
    type Id = BookId;

    fn id(&self) -> BookId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// A book ready to be persisted (id and version are store-assigned).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: Isbn,
    pub price: String,
    pub published: PublishDate,
    pub cover_image: Option<String>,
}

/// Lookup key for resolving a book by any of its unique attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookKey {
    Id(BookId),
    Title(String),
    Isbn(String),
}

impl core::fmt::Display for BookKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BookKey::Id(id) => write!(f, "id={id}"),
            BookKey::Title(t) => write!(f, "title={t}"),
            BookKey::Isbn(i) => write!(f, "isbn={i}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_date_renders_zero_padded() {
        let date = PublishDate::new(3, 2021).unwrap();
        assert_eq!(date.to_string(), "03/2021");
    }

    #[test]
    fn publish_date_parses_its_own_rendering() {
        let date: PublishDate = "11/1987".parse().unwrap();
        assert_eq!(date.month(), 11);
        assert_eq!(date.year(), 1987);
        assert_eq!(date, date.to_string().parse().unwrap());
    }

    #[test]
    fn publish_date_accepts_unpadded_months() {
        let date: PublishDate = "3/2021".parse().unwrap();
        assert_eq!(date.to_string(), "03/2021");
    }

    #[test]
    fn publish_date_rejects_garbage() {
        for raw in ["", "2021", "13/2021", "00/2021", "March 2021", "03-2021"] {
            assert!(raw.parse::<PublishDate>().is_err(), "should reject '{raw}'");
        }
    }

    #[test]
    fn publish_date_serde_uses_the_wire_format() {
        let date = PublishDate::new(7, 2019).unwrap();
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, "\"07/2019\"");
        let back: PublishDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, date);
    }
}
