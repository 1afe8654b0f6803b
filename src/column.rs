//! Column references.
//!
//! A column can be named three ways: a spreadsheet letter (`D`, `AA`), a
//! 0-based index (`3`), or a header label (`Rating`). Labels are looked up in
//! the header row first so a header called `Age` is not read as column `AGE`.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ColumnError {
    #[error("unknown column reference {0:?}")]
    Unknown(String),
}

/// Maps spreadsheet letters to a 0-based index: `A` -> 0, `Z` -> 25, `AA` -> 26.
pub fn letter_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    letters
        .chars()
        .map(|c| (c.to_ascii_uppercase() as u8 - b'A') as usize + 1)
        .try_fold(0usize, |acc, digit| acc.checked_mul(26)?.checked_add(digit))
        .map(|n| n - 1)
}

/// Resolves a column reference against an optional header row.
pub fn resolve<S: AsRef<str>>(reference: &str, header: Option<&[S]>) -> Result<usize, ColumnError> {
    let reference = reference.trim();
    if let Ok(index) = reference.parse::<usize>() {
        return Ok(index);
    }
    if let Some(header) = header {
        let found = header
            .iter()
            .position(|label| label.as_ref().trim().eq_ignore_ascii_case(reference));
        if let Some(index) = found {
            return Ok(index);
        }
    }
    letter_index(reference).ok_or_else(|| ColumnError::Unknown(reference.to_string()))
}
