//! Lazy depth-first traversal of the declaration tree.

use std::slice;

use crate::model::{Cursor, CursorKind, TranslationUnit};

/// One-shot pre-order walk over declarations.
///
/// Namespaces and linkage specifications are entered; records and enums
/// are yielded but not entered, so their members are reached through
/// [`Cursor::children`]. The walk ends early, and for good, the first time
/// it meets a cursor of the sentinel kind. The sentinel itself is not
/// yielded.
pub struct Declarations<'a> {
    stack: Vec<slice::Iter<'a, Cursor>>,
    sentinel: Option<CursorKind>,
    stopped: bool,
}

impl<'a> Declarations<'a> {
    /// Walk the children of `root`.
    pub fn new(root: &'a Cursor) -> Self {
        Declarations {
            stack: vec![root.children.iter()],
            sentinel: None,
            stopped: false,
        }
    }

    /// Stop at the first cursor of `kind`.
    #[must_use]
    pub fn stop_at(mut self, kind: CursorKind) -> Self {
        self.sentinel = Some(kind);
        self
    }

    /// `true` once the sentinel has been reached.
    pub fn stopped_at_sentinel(&self) -> bool {
        self.stopped
    }
}

impl<'a> Iterator for Declarations<'a> {
    type Item = &'a Cursor;

    fn next(&mut self) -> Option<&'a Cursor> {
        loop {
            let top = self.stack.last_mut()?;
            let Some(cursor) = top.next() else {
                self.stack.pop();
                continue;
            };
            if Some(cursor.kind) == self.sentinel {
                self.stopped = true;
                self.stack.clear();
                return None;
            }
            if cursor.kind.is_transparent_scope() {
                self.stack.push(cursor.children.iter());
            }
            return Some(cursor);
        }
    }
}

impl std::iter::FusedIterator for Declarations<'_> {}

impl TranslationUnit {
    /// Declarations of the unit, stopping at the first invalid one.
    pub fn declarations(&self) -> Declarations<'_> {
        Declarations::new(&self.root).stop_at(CursorKind::Invalid)
    }
}

#[cfg(test)]
mod tests;
