/*****************************************************************************************[lib.rs]
Copyright (c) 2018-2018, Masaki Hara

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

//! CDCL SAT solver in the MiniSat tradition, with a preprocessor for
//! subsumption and bounded variable elimination.
//!
//! ```
//! use dpll::*;
//! let mut s = BasicSimpSolver::default();
//! let a = Lit::new(s.new_var_default(), true);
//! let b = Lit::new(s.new_var_default(), true);
//! s.add_clause(&[a, b]);
//! s.add_clause(&[!a]);
//! assert!(s.solve(&[]));
//! assert_eq!(s.value_lit(b), LBool::TRUE);
//! assert!(!s.solve(&[!b]));
//! ```

//======== LOG ============

// stubs when logging is not enabled
#[cfg(not(feature = "logging"))]
#[macro_use]
pub(crate) mod log {
    macro_rules! trace {
        ($( $x:expr ),*) => {};
    }
    macro_rules! debug {
        ($( $x:expr ),*) => {};
    }
    macro_rules! info {
        ($( $x:expr ),*) => {};
    }
}

#[cfg(feature = "logging")]
#[macro_use]
pub extern crate log;

//======== PUBLIC INTERFACE ============

pub mod alloc;
pub mod callbacks;
pub mod clause;
pub mod core;
pub mod dimacs;
pub mod hooks;
pub mod interface;
pub mod intmap;
pub mod queue;
pub mod simp;

pub use crate::{
    callbacks::{Basic as BasicCallbacks, Callbacks, ProgressStatus, Verbose},
    clause::{display::Print, LBool, LMap, LSet, Lit, VMap, Var},
    core::{CCMin, Solver, SolverOpts},
    interface::SolverInterface,
    simp::{SimpOpts, SimpSolver},
};

/// Basic solver, with basic callbacks
pub type BasicSolver = Solver<BasicCallbacks>;

/// Solver with preprocessing, with basic callbacks
pub type BasicSimpSolver = SimpSolver<BasicCallbacks>;
