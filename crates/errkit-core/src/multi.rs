//! Aggregation of independent errors

use crate::chain;
use crate::SharedError;
use parking_lot::Mutex;
use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, OnceLock};

const SEPARATOR: &str = " | ";

/// An ordered collection of errors that is itself an error.
///
/// Members are never absent: adding `None` is a no-op. The `safe_*` methods
/// lock an internal mutex and may be called through a shared reference;
/// their unlocked counterparts require exclusive access instead.
///
/// Identity checks ([`MultiError::is`], [`chain::is`]) look at every member,
/// while `source()` exposes only the first one, so [`chain::find`] binds
/// through the first member's chain only.
#[derive(Default)]
pub struct MultiError {
    errors: Mutex<Vec<SharedError>>,
    first: OnceLock<SharedError>,
}

impl MultiError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a list of optional errors, skipping the absent ones.
    pub fn from_errors<I>(errors: I) -> Self
    where
        I: IntoIterator<Item = Option<SharedError>>,
    {
        errors.into_iter().collect()
    }

    /// Append without locking.
    pub fn add(&mut self, err: Option<SharedError>) {
        if let Some(err) = err {
            let _ = self.first.get_or_init(|| err.clone());
            self.errors.get_mut().push(err);
        }
    }

    /// Append under the lock.
    pub fn safe_add(&self, err: Option<SharedError>) {
        if let Some(err) = err {
            let mut errors = self.errors.lock();
            let _ = self.first.get_or_init(|| err.clone());
            errors.push(err);
        }
    }

    pub fn len(&mut self) -> usize {
        self.errors.get_mut().len()
    }

    pub fn safe_len(&self) -> usize {
        self.errors.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.first.get().is_none()
    }

    /// Unlocked view of the members.
    pub fn errors_mut(&mut self) -> &[SharedError] {
        self.errors.get_mut().as_slice()
    }

    /// Snapshot of the members, in insertion order.
    pub fn errors(&self) -> Vec<SharedError> {
        self.errors.lock().clone()
    }

    pub fn first(&self) -> Option<&SharedError> {
        self.first.get()
    }

    /// `None` when empty, otherwise this aggregate.
    pub fn err(&self) -> Option<&MultiError> {
        if self.is_empty() { None } else { Some(self) }
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), MultiError> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// True if any member matches `target` through its own chain.
    pub fn is<E>(&self, target: &E) -> bool
    where
        E: StdError + PartialEq + 'static,
    {
        self.errors
            .lock()
            .iter()
            .any(|member| chain::is(member.as_ref(), target))
    }

    /// True if `err` is one of the members, by pointer identity.
    pub fn contains(&self, err: &SharedError) -> bool {
        self.errors
            .lock()
            .iter()
            .any(|member| Arc::ptr_eq(member, err))
    }
}

impl Clone for MultiError {
    fn clone(&self) -> Self {
        let errors = self.errors.lock().clone();
        let first = OnceLock::new();
        if let Some(head) = errors.first() {
            let _ = first.set(head.clone());
        }
        Self {
            errors: Mutex::new(errors),
            first,
        }
    }
}

impl FromIterator<SharedError> for MultiError {
    fn from_iter<I: IntoIterator<Item = SharedError>>(iter: I) -> Self {
        iter.into_iter().map(Some).collect()
    }
}

impl FromIterator<Option<SharedError>> for MultiError {
    fn from_iter<I: IntoIterator<Item = Option<SharedError>>>(iter: I) -> Self {
        let mut multi = Self::new();
        for err in iter {
            multi.add(err);
        }
        multi
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self.errors.lock();
        for (index, err) in errors.iter().enumerate() {
            if index > 0 {
                f.write_str(SEPARATOR)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl fmt::Debug for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MultiError")
            .field(&*self.errors.lock())
            .finish()
    }
}

impl StdError for MultiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.first
            .get()
            .map(|first| first.as_ref() as &(dyn StdError + 'static))
    }
}
