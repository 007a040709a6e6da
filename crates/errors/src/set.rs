//! Joined error collections for batch operations

use std::fmt;

use crate::Error;

/// Errors accumulated across independent items of one batch
///
/// Batches (per-module manifest fetches, per-file downloads) keep going when
/// one item fails and surface everything once at the end.
#[derive(Debug, Clone, Default)]
pub struct ErrorSet {
    errors: Vec<Error>,
}

impl ErrorSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an error, flattening nested sets
    pub fn push(&mut self, error: impl Into<Error>) {
        match error.into() {
            Error::Multiple(set) => self.errors.extend(set.errors),
            other => self.errors.push(other),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.errors.iter()
    }

    /// Collapse into a single optional error: none, the only one, or the set
    #[must_use]
    pub fn into_error(mut self) -> Option<Error> {
        match self.errors.len() {
            0 => None,
            1 => self.errors.pop(),
            _ => Some(Error::Multiple(self)),
        }
    }

    /// `Ok(())` when nothing failed
    ///
    /// # Errors
    ///
    /// Returns the collapsed error when at least one was recorded.
    pub fn into_result(self) -> Result<(), Error> {
        match self.into_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl fmt::Display for ErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} errors occurred:", self.errors.len())?;
        for err in &self.errors {
            write!(f, "\n  - {err}")?;
        }
        Ok(())
    }
}

impl<E: Into<Error>> Extend<E> for ErrorSet {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        for err in iter {
            self.push(err);
        }
    }
}

impl<E: Into<Error>> FromIterator<E> for ErrorSet {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for ErrorSet {
    type Item = Error;
    type IntoIter = std::vec::IntoIter<Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorSet {
    type Item = &'a Error;
    type IntoIter = std::slice::Iter<'a, Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
