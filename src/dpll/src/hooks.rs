
//! Notifications from the core solver to a layer that keeps its own
//! references into the clause arena (the preprocessor).

use crate::clause::{Clause, ClauseAllocator, LBool, VMap};

/// Observer of clause-database mutations performed by `Solver`.
///
/// The core threads a `&mut impl Hooks` through every operation that may
/// delete or move clauses.
pub trait Hooks {
    /// `c` is about to be removed (it is still intact).
    fn on_remove_clause(&mut self, _c: &Clause, _assigns: &VMap<LBool>) {}

    /// Garbage collection: every clause reference held by the hook must be
    /// moved from `from` into `to` with `ClauseAllocator::reloc`.
    ///
    /// Called before the core relocates its own references.
    fn reloc_all(&mut self, _from: &mut ClauseAllocator, _to: &mut ClauseAllocator) {}
}

/// No extra bookkeeping.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl Hooks for NoHooks {}
