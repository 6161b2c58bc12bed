//! Walking the `source()` chain of an error

use crate::multi::MultiError;
use crate::SharedError;
use std::error::Error as StdError;
use std::iter::FusedIterator;

/// Iterator over an error and its successive `source()`s, outermost first.
///
/// Shared handles (`Arc<dyn Error + Send + Sync>`) are looked through, so a
/// handle and the error it holds count as one node.
#[derive(Clone)]
pub struct Chain<'a> {
    next: Option<&'a (dyn StdError + 'static)>,
}

impl<'a> Chain<'a> {
    pub fn new(err: &'a (dyn StdError + 'static)) -> Self {
        Self {
            next: Some(peel(err)),
        }
    }
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn StdError + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.source().map(peel);
        Some(current)
    }
}

impl FusedIterator for Chain<'_> {}

fn peel<'a>(mut err: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    while let Some(shared) = err.downcast_ref::<SharedError>() {
        err = &**shared;
    }
    err
}

pub fn chain<'a>(err: &'a (dyn StdError + 'static)) -> Chain<'a> {
    Chain::new(err)
}

/// Root cause of `err`: the last node of its chain.
///
/// Never returns nothing; an error without a source is its own cause.
pub fn cause<'a>(err: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    chain(err).last().unwrap_or(err)
}

/// Identity match: is any node of the chain equal to `target`?
///
/// A [`MultiError`] node answers for all of its members and ends the walk.
pub fn is<E>(err: &(dyn StdError + 'static), target: &E) -> bool
where
    E: StdError + PartialEq + 'static,
{
    for node in chain(err) {
        if node.downcast_ref::<E>().is_some_and(|candidate| candidate == target) {
            return true;
        }
        if let Some(multi) = node.downcast_ref::<MultiError>() {
            return multi.is(target);
        }
    }
    false
}

/// Type match: the first node of the chain that is an `E`.
///
/// Only `source()` is followed, so a [`MultiError`] exposes just its first
/// member here.
pub fn find<'a, E>(err: &'a (dyn StdError + 'static)) -> Option<&'a E>
where
    E: StdError + 'static,
{
    chain(err).find_map(|node| node.downcast_ref::<E>())
}
