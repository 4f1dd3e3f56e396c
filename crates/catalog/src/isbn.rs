//! ISBN value object with ISBN-10 / ISBN-13 checksum validation.

use serde::{Deserialize, Serialize};

use bookshelf_core::{DomainError, DomainResult};

/// A checksum-validated ISBN.
///
/// Construction is the only validation gate: a stored `Isbn` is always a
/// well-formed ISBN-10 or ISBN-13.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Isbn(String);

impl Isbn {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let s = raw.trim();
        if is_valid_isbn10(s) || is_valid_isbn13(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(DomainError::validation(format!("invalid isbn '{s}'")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Isbn {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// ISBN-10: nine digits weighted 10..2, then a check value (digit, or 10 for
/// a trailing 'X'); valid iff the total is divisible by 11.
fn is_valid_isbn10(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 10 {
        return false;
    }

    let mut sum: u32 = 0;
    for (i, b) in bytes[..9].iter().enumerate() {
        if !b.is_ascii_digit() {
            return false;
        }
        sum += u32::from(b - b'0') * (10 - i as u32);
    }

    let check = match bytes[9] {
        b'X' => 10,
        b if b.is_ascii_digit() => u32::from(b - b'0'),
        _ => return false,
    };

    (sum + check) % 11 == 0
}

/// ISBN-13: twelve digits weighted 1,3,1,3,..., check digit equals
/// `(10 - sum mod 10) mod 10`.
fn is_valid_isbn13(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 13 || !bytes.iter().all(u8::is_ascii_digit) {
        return false;
    }

    let sum: u32 = bytes[..12]
        .iter()
        .enumerate()
        .map(|(i, b)| u32::from(b - b'0') * if i % 2 == 0 { 1 } else { 3 })
        .sum();
    let check = (10 - (sum % 10)) % 10;

    check == u32::from(bytes[12] - b'0')
}
