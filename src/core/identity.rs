//! Account identity generation - codes and passwords.
//!
//! A code is a run of uppercase letters followed by a run of pairwise distinct
//! digits, e.g. `K40217`. The number of letters and digits depends on the role
//! (see [`CodeFormat`]). Uniqueness is checked against the codes already in the
//! role's main sheet, which the caller reads fresh right before generating.

use crate::errors::{Error, Result};
use rand::{Rng, distributions::Alphanumeric, seq::SliceRandom};
use serde::Deserialize;
use std::collections::HashSet;

const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";

/// Upper bound on generation attempts before giving up.
pub const MAX_ATTEMPTS: usize = 10_000;

/// Shape of an account code.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct CodeFormat {
    /// Leading uppercase letters (1 or 2)
    pub letters: usize,
    /// Trailing digits, pairwise distinct (1 to 10)
    pub digits: usize,
}

impl CodeFormat {
    /// Checks that codes of this format can be generated.
    pub fn validate(&self) -> Result<()> {
        if !(1..=2).contains(&self.letters) {
            return Err(Error::validation("letters must be 1 or 2"));
        }
        if !(1..=DIGITS.len()).contains(&self.digits) {
            return Err(Error::validation("digits must be between 1 and 10"));
        }
        Ok(())
    }

    /// Total length of a code.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.letters + self.digits
    }

    /// Number of distinct codes this format can produce.
    #[must_use]
    pub fn capacity(&self) -> u128 {
        let letters = 26u128.pow(u32::try_from(self.letters).unwrap_or(u32::MAX));
        let digits: u128 = (0..self.digits).map(|i| 10 - i as u128).product();
        letters * digits
    }

    /// Draws one random code.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let mut code = String::with_capacity(self.len());
        for _ in 0..self.letters {
            code.push(char::from(LETTERS[rng.gen_range(0..LETTERS.len())]));
        }
        code.extend(
            DIGITS
                .choose_multiple(rng, self.digits)
                .map(|d| char::from(*d)),
        );
        code
    }

    /// True when `code` has this format's shape.
    #[must_use]
    pub fn matches(&self, code: &str) -> bool {
        let bytes = code.as_bytes();
        if bytes.len() != self.len() {
            return false;
        }
        let (letters, digits) = bytes.split_at(self.letters);
        let mut seen = HashSet::new();
        letters.iter().all(u8::is_ascii_uppercase)
            && digits.iter().all(|d| d.is_ascii_digit() && seen.insert(*d))
    }
}

/// Generates a code of `format` that is not in `existing`.
///
/// Retries until a fresh code comes up, or fails with
/// [`Error::CodeSpaceExhausted`] after [`MAX_ATTEMPTS`] collisions.
pub fn generate_unique_code<R, S>(rng: &mut R, format: CodeFormat, existing: &[S]) -> Result<String>
where
    R: Rng + ?Sized,
    S: AsRef<str>,
{
    let taken: HashSet<&str> = existing.iter().map(|c| c.as_ref().trim()).collect();
    let free = format
        .capacity()
        .saturating_sub(u128::try_from(taken.len()).unwrap_or(u128::MAX));
    if free == 0 {
        return Err(Error::CodeSpaceExhausted { attempts: 0 });
    }

    for attempt in 1..=MAX_ATTEMPTS {
        let code = format.generate(rng);
        if !taken.contains(code.as_str()) {
            tracing::trace!("Generated code {} after {} attempt(s)", code, attempt);
            return Ok(code);
        }
    }
    Err(Error::CodeSpaceExhausted {
        attempts: MAX_ATTEMPTS,
    })
}

/// Generates a random ASCII alphanumeric password.
pub fn generate_password<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
