
use crate::clause::LBool;

/// Basic callbacks to the solver
///
/// Typically intended for printing/statistics
pub trait Callbacks {
    /// Called before starting to solve
    fn on_start(&mut self) {}

    /// Called whenever the solver simplifies its set of clauses
    fn on_simplify(&mut self) {}

    /// Called after a clause GC, with the arena sizes before and after
    fn on_gc(&mut self, _old_size: usize, _new_size: usize) {}

    /// Called at each restart
    fn on_restart(&mut self) {}

    /// called regularly to indicate progress. The status is only built
    /// if the callback asks for it.
    fn on_progress<F>(&mut self, _f: F)
    where
        F: FnOnce() -> ProgressStatus,
    {
    }

    /// Called when a result is computed
    fn on_result(&mut self, _s: LBool) {}

    /// Should we stop? called regularly for asynchronous interrupts and such
    fn stop(&self) -> bool {
        false
    }
}

/// Progress indicator from the SAT solver.
///
/// This is given to `Callbacks` regularly so it can log it somehow.
#[derive(Debug, Clone, Copy)]
pub struct ProgressStatus {
    pub conflicts: u64,
    pub dec_vars: i64,
    pub n_clauses: u64,
    pub n_clause_lits: u64,
    pub max_learnt: i64,
    pub n_learnt: u64,
    pub n_learnt_lits: f64,
    pub progress_estimate: f64,
}

type StopFn = Box<dyn Fn() -> bool>;

/// Basic set of callbacks
///
/// This doesn't do anything except storing a function to `stop`
#[derive(Default)]
pub struct Basic {
    stop: Option<StopFn>,
}

impl Callbacks for Basic {
    fn stop(&self) -> bool {
        match self.stop {
            None => false,
            Some(ref f) => f(),
        }
    }
}

impl Basic {
    /// Allocate a new set of callbacks
    pub fn new() -> Self {
        Basic { stop: None }
    }

    /// Set the `stop` function
    pub fn set_stop<F>(&mut self, f: F)
    where
        F: 'static + Fn() -> bool,
    {
        self.stop = Some(Box::new(f));
    }
}

/// Callbacks that log the search progress table.
///
/// `verbosity` 0 is silent, 1 prints the table, 2 also reports garbage
/// collections.
#[derive(Default)]
pub struct Verbose {
    basic: Basic,
    verbosity: u32,
}

impl Verbose {
    pub fn new(verbosity: u32) -> Self {
        Verbose {
            basic: Basic::new(),
            verbosity,
        }
    }

    pub fn verbosity(&self) -> u32 {
        self.verbosity
    }

    /// Set the `stop` function
    pub fn set_stop<F>(&mut self, f: F)
    where
        F: 'static + Fn() -> bool,
    {
        self.basic.set_stop(f)
    }
}

const RULE: &str =
    "===============================================================================";

impl Callbacks for Verbose {
    fn on_start(&mut self) {
        if self.verbosity >= 1 {
            info!("============================[ Search Statistics ]==============================");
            info!("| Conflicts |          ORIGINAL         |          LEARNT          | Progress |");
            info!("|           |    Vars  Clauses Literals |    Limit  Clauses Lit/Cl |          |");
            info!("{}", RULE);
        }
    }

    fn on_gc(&mut self, old_size: usize, new_size: usize) {
        if self.verbosity >= 2 {
            info!(
                "|  Garbage collection:   {:12} units => {:12} units             |",
                old_size, new_size
            );
        }
    }

    fn on_progress<F>(&mut self, f: F)
    where
        F: FnOnce() -> ProgressStatus,
    {
        if self.verbosity >= 1 {
            let p = f();
            info!(
                "| {:9} | {:7} {:8} {:8} | {:8} {:8} {:6.0} | {:6.3} % |",
                p.conflicts,
                p.dec_vars,
                p.n_clauses,
                p.n_clause_lits,
                p.max_learnt,
                p.n_learnt,
                p.n_learnt_lits,
                p.progress_estimate
            );
        }
    }

    fn on_result(&mut self, _s: LBool) {
        if self.verbosity >= 1 {
            info!("{}", RULE);
        }
    }

    fn stop(&self) -> bool {
        self.basic.stop()
    }
}
