use crate::storage::RecordError;

/// Result of a repository operation, before it is collapsed into a sentinel.
#[derive(Debug)]
pub enum Outcome<T> {
    Success(T),
    /// The store answered, but there is no such record
    NotFound,
    Failure(RecordError),
}

impl<T> Outcome<T> {
    /// `Some` only on success
    pub fn ok(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::NotFound | Outcome::Failure(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Outcome::NotFound)
    }

    pub fn error(&self) -> Option<&RecordError> {
        match self {
            Outcome::Failure(err) => Some(err),
            _ => None,
        }
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::NotFound => Outcome::NotFound,
            Outcome::Failure(err) => Outcome::Failure(err),
        }
    }

    /// `Ok(None)` is treated as not found
    pub fn from_optional(result: Result<Option<T>, RecordError>) -> Self {
        match result {
            Ok(Some(value)) => Outcome::Success(value),
            Ok(None) => Outcome::NotFound,
            Err(err) => Outcome::Failure(err),
        }
    }
}

impl<T> From<Result<T, RecordError>> for Outcome<T> {
    fn from(result: Result<T, RecordError>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(err) => Outcome::Failure(err),
        }
    }
}
