
/* Main Interface */

use crate::clause::{LBool, Lit, Var};

/// Main interface for a solver: it makes it possible to add clauses,
/// allocate variables, and check for satisfiability
pub trait SolverInterface {
    fn num_vars(&self) -> u32;
    fn num_clauses(&self) -> u64;
    fn num_conflicts(&self) -> u64;
    fn num_propagations(&self) -> u64;
    fn num_decisions(&self) -> u64;
    fn num_restarts(&self) -> u64;

    fn is_ok(&self) -> bool;

    /// Print some current statistics to standard output.
    fn print_stats(&self);

    /// Creates a new SAT variable in the solver. If 'decision' is cleared, variable will not be
    /// used as a decision variable (NOTE! This has effects on the meaning of a SATISFIABLE result).
    fn new_var(&mut self, upol: LBool, dvar: bool) -> Var;

    /// Create a new variable with the default polarity
    fn new_var_default(&mut self) -> Var;

    /// The variable with DIMACS identifier `v_idx`, creating variables
    /// up to it if needed.
    fn var_of_int(&mut self, v_idx: u32) -> Var;

    /// Add a clause to the solver. Returns `false` if the solver is in
    /// an `UNSAT` state.
    ///
    /// The vector is used as scratch space and its content is unspecified
    /// afterwards.
    fn add_clause_reuse(&mut self, clause: &mut Vec<Lit>) -> bool;

    /// Add a clause to the solver, copying it.
    fn add_clause(&mut self, lits: &[Lit]) -> bool {
        let mut c = lits.to_vec();
        self.add_clause_reuse(&mut c)
    }

    /// Simplify the clause database according to the current top-level assigment. Currently, the only
    /// thing done here is the removal of satisfied clauses, but more things can be put here.
    fn simplify(&mut self) -> bool;

    /// Search for a model that respects a given set of assumptions (with resource constraints).
    fn solve_limited(&mut self, assumps: &[Lit]) -> LBool;

    /// Search for a model that respects a given set of assumptions,
    /// ignoring any conflict or propagation budget.
    fn solve(&mut self, assumps: &[Lit]) -> bool;

    /// Ask a running search to stop as soon as possible.
    fn interrupt(&self);

    /// Reset the interrupt flag.
    fn clear_interrupt(&self);

    /// Obtain the slice of literals that are proved at level 0.
    ///
    /// These literals will keep this value from now on.
    fn proved_at_lvl_0(&self) -> &[Lit];

    /// Query whole model, indexed by variable (slot 0 is unused).
    ///
    /// Precondition: last result was `Sat` (ie `LBool::TRUE`)
    fn get_model(&self) -> &[LBool];

    /// Query model for var
    ///
    /// Precondition: last result was `Sat` (ie `LBool::TRUE`)
    fn value_var(&self, v: Var) -> LBool;

    /// Query model for lit
    fn value_lit(&self, lit: Lit) -> LBool;

    /// Value of this literal if it's assigned at level 0, or `UNDEF` otherwise
    fn value_lvl_0(&self, lit: Lit) -> LBool;

    /// Return unsat core (as a subset of assumptions).
    ///
    /// Precondition: last result was `Unsat`
    fn unsat_core(&self) -> &[Lit];

    /// Does this literal occur in the unsat-core?
    ///
    /// Precondition: last result was `Unsat`
    fn unsat_core_contains_lit(&self, lit: Lit) -> bool;

    /// Does this variable occur in the unsat-core?
    ///
    /// Precondition: last result was `Unsat`
    fn unsat_core_contains_var(&self, v: Var) -> bool {
        let lit = Lit::new(v, true);
        self.unsat_core_contains_lit(lit) || self.unsat_core_contains_lit(!lit)
    }
}
