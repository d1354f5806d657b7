/*****************************************************************************************[core.rs]
Copyright (c) 2003-2006, Niklas Een, Niklas Sorensson (MiniSat)
Copyright (c) 2007-2010, Niklas Sorensson (MiniSat)
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

use {
    crate::callbacks::{Callbacks, ProgressStatus},
    crate::clause::{
        CRef, ClauseAllocator, DeletePred, LBool, LSet, Lit, OccLists, OccListsData, VMap, Var,
    },
    crate::hooks::{Hooks, NoHooks},
    crate::interface::SolverInterface,
    crate::intmap::{Comparator, Heap, HeapData},
    std::{
        cmp, f64, fmt, mem,
        sync::atomic::{AtomicBool, Ordering},
        time::Instant,
    },
};

/// The main solver structure
///
/// A `Solver` object contains the whole state of the SAT solver, including
/// a clause allocator, literals, clauses, and statistics.
///
/// It is parametrized by `Callbacks`
pub struct Solver<Cb: Callbacks> {
    // Extra results: (read-only member variable)
    /// If problem is satisfiable, this vector contains the model (if any),
    /// indexed by variable.
    pub(crate) model: Vec<LBool>,
    /// If problem is unsatisfiable (possibly under assumptions),
    /// this vector represent the final conflict clause expressed in the assumptions.
    pub(crate) conflict: LSet,

    cb: Cb, // the callbacks
    asynch_interrupt: AtomicBool,

    /// List of problem clauses.
    pub(crate) clauses: Vec<CRef>,
    /// List of learnt clauses.
    pub(crate) learnts: Vec<CRef>,

    pub(crate) v: SolverV,
    tmp_learnt: Vec<Lit>,
    start_time: Instant,
}

/// The current assignments.
pub(crate) struct VarState {
    /// A heuristic measurement of the activity of a variable.
    activity: VMap<f64>,
    /// Current assignment for each variable.
    pub(crate) ass: VMap<LBool>,
    /// Stores reason and level for each variable.
    vardata: VMap<VarData>,
    /// Amount to bump next variable with.
    var_inc: f64,
    var_decay: f64,

    /// Assignment stack; stores all assigments made in the order they were made.
    pub(crate) trail: Vec<Lit>,
    /// Separator indices for different decision levels in `trail`.
    pub(crate) trail_lim: Vec<i32>,
}

pub(crate) struct SolverV {
    pub(crate) vars: VarState,

    learntsize_adjust_start_confl: i32,
    learntsize_adjust_inc: f64,
    max_learnts: f64,
    learntsize_adjust_confl: f64,
    learntsize_adjust_cnt: i32,

    /// Indicates whether possibly inefficient linear scan for satisfied
    /// problem clauses should be performed in `simplify`.
    pub(crate) remove_satisfied: bool,

    // Statistics: (read-only member variable)
    solves: u64,
    starts: u64,
    decisions: u64,
    rnd_decisions: u64,
    propagations: u64,
    conflicts: u64,
    dec_vars: u64,
    max_literals: u64,
    tot_literals: u64,
    removed_satisfied: u64,

    num_clauses: u64,
    num_learnts: u64,
    clauses_literals: u64,
    learnts_literals: u64,

    // Mode of operation:
    clause_decay: f64,
    random_var_freq: f64,
    random_seed: f64,
    luby_restart: bool,
    ccmin_mode: CCMin,
    /// Controls the level of phase saving (0=none, 1=limited, 2=full).
    phase_saving: i32,
    /// Use random polarities for branching heuristics.
    rnd_pol: bool,
    /// Initialize variable activities with a small random value.
    rnd_init_act: bool,
    /// The fraction of wasted memory allowed before a garbage collection is triggered.
    pub(crate) garbage_frac: f64,
    /// Minimum number to set the learnts limit to.
    min_learnts_lim: i32,

    /// The initial restart limit.
    restart_first: i32,
    /// The factor with which the restart limit is multiplied in each restart.
    restart_inc: f64,
    /// The intitial limit for learnt clauses is a factor of the original clauses.
    learntsize_factor: f64,
    /// The limit for learnt clauses is multiplied with this factor each restart.
    learntsize_inc: f64,

    /// The preferred polarity of each variable (`true` is positive).
    polarity: VMap<bool>,
    /// The users preferred polarity of each variable.
    user_pol: VMap<LBool>,
    /// Declares if a variable is eligible for selection in the decision heuristic.
    decision: VMap<bool>,
    /// `watches[lit]` is a list of constraints watching 'lit' (will go there if literal becomes true).
    watches_data: OccListsData<Lit, Watcher>,
    /// A priority queue of variables ordered with respect to the variable activity.
    order_heap_data: HeapData<Var>,
    /// If `false`, the constraints are already unsatisfiable. No part of the solver state may be used!
    pub(crate) ok: bool,
    /// Amount to bump next clause with.
    cla_inc: f64,
    /// Head of queue (as index into the trail).
    pub(crate) qhead: i32,
    /// Number of top-level assignments since last execution of 'simplify()'.
    simp_db_assigns: i64,
    /// Remaining number of propagations that must be made before next execution of 'simplify()'.
    simp_db_props: i64,
    /// Set by `search()`.
    progress_estimate: f64,

    /// Next variable to be created.
    next_var: Var,
    pub(crate) ca: ClauseAllocator,

    /// Variables released by the user, to be recycled by the next `simplify`.
    released_vars: Vec<Var>,
    free_vars: Vec<Var>,

    /// Current set of assumptions provided to solve by the user.
    pub(crate) assumptions: Vec<Lit>,

    // Temporaries (to reduce allocation overhead). Each variable is prefixed by the method in which it is
    // used, except `seen` wich is used in several places.
    seen: VMap<Seen>,
    minimize_stack: Vec<(u32, Lit)>,
    analyze_toclear: Vec<Lit>,

    // Resource contraints:
    conflict_budget: i64,
    propagation_budget: i64,
}

/// Display the model in the DIMACS solution format (`v 1 -2 3 0`).
pub struct SolverPrintDimacs<'a, Cb: Callbacks + 'a> {
    s: &'a Solver<Cb>,
}

mod dimacs {
    use super::*;

    impl<'a, Cb: Callbacks> fmt::Display for SolverPrintDimacs<'a, Cb> {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            write!(out, "v ")?;
            for (i, &val) in self.s.model.iter().enumerate().skip(1) {
                if val == LBool::TRUE {
                    write!(out, "{} ", i)?
                } else if val == LBool::FALSE {
                    write!(out, "-{} ", i)?
                }
            }
            writeln!(out, "0")
        }
    }
}

// public API
impl<Cb: Callbacks> SolverInterface for Solver<Cb> {
    fn new_var(&mut self, upol: LBool, dvar: bool) -> Var {
        self.v.new_var(upol, dvar)
    }

    fn new_var_default(&mut self) -> Var {
        self.new_var(LBool::UNDEF, true)
    }

    fn var_of_int(&mut self, v_idx: u32) -> Var {
        assert!(v_idx > 0, "variables are numbered from 1");
        while v_idx > self.num_vars() {
            self.new_var_default();
        }
        Var::from_idx(v_idx)
    }

    // in the API, we can only add clauses at level 0
    fn add_clause_reuse(&mut self, clause: &mut Vec<Lit>) -> bool {
        debug!("add toplevel clause {:?}", clause);
        assert_eq!(
            self.v.decision_level(),
            0,
            "clauses can only be added at level 0"
        );
        clause.sort_unstable();
        self.add_clause_(clause)
    }

    fn simplify(&mut self) -> bool {
        self.simplify_internal(&mut NoHooks)
    }

    fn solve_limited(&mut self, assumps: &[Lit]) -> LBool {
        self.v.assumptions.clear();
        self.v.assumptions.extend_from_slice(assumps);
        self.solve_internal(&mut NoHooks)
    }

    fn solve(&mut self, assumps: &[Lit]) -> bool {
        self.budget_off();
        self.solve_limited(assumps) == LBool::TRUE
    }

    fn interrupt(&self) {
        self.asynch_interrupt.store(true, Ordering::Relaxed);
    }

    fn clear_interrupt(&self) {
        self.asynch_interrupt.store(false, Ordering::Relaxed);
    }

    fn value_var(&self, v: Var) -> LBool {
        self.model
            .get(v.idx() as usize)
            .copied()
            .unwrap_or(LBool::UNDEF)
    }

    fn value_lit(&self, lit: Lit) -> LBool {
        self.value_var(lit.var()) ^ !lit.sign()
    }

    fn get_model(&self) -> &[LBool] {
        &self.model
    }

    fn is_ok(&self) -> bool {
        self.v.ok
    }

    fn num_vars(&self) -> u32 {
        self.v.num_vars()
    }
    fn num_clauses(&self) -> u64 {
        self.v.num_clauses
    }
    fn num_conflicts(&self) -> u64 {
        self.v.conflicts
    }
    fn num_propagations(&self) -> u64 {
        self.v.propagations
    }
    fn num_decisions(&self) -> u64 {
        self.v.decisions
    }
    fn num_restarts(&self) -> u64 {
        self.v.starts
    }

    fn value_lvl_0(&self, lit: Lit) -> LBool {
        let mut res = self.v.value_lit(lit);
        if self.v.level(lit.var()) != 0 {
            res = LBool::UNDEF;
        }
        res
    }

    fn print_stats(&self) {
        let secs = self.start_time.elapsed().as_secs_f64();
        let per_sec = |n: u64| if secs > 0.0 { n as f64 / secs } else { 0.0 };
        println!("c restarts              : {}", self.v.starts);
        println!(
            "c conflicts             : {:<12}   ({:.0} /sec)",
            self.v.conflicts,
            per_sec(self.v.conflicts)
        );
        println!(
            "c decisions             : {:<12}   ({:4.2} % random) ({:.0} /sec)",
            self.v.decisions,
            percent(self.v.rnd_decisions, self.v.decisions),
            per_sec(self.v.decisions)
        );
        println!(
            "c propagations          : {:<12}   ({:.0} /sec)",
            self.v.propagations,
            per_sec(self.v.propagations)
        );
        println!(
            "c conflict literals     : {:<12}   ({:4.2} % deleted)",
            self.v.tot_literals,
            percent(self.v.max_literals - self.v.tot_literals, self.v.max_literals)
        );
        println!("c solve time            : {:.3} s", secs);
    }

    fn unsat_core(&self) -> &[Lit] {
        self.conflict.as_slice()
    }

    fn unsat_core_contains_lit(&self, lit: Lit) -> bool {
        self.conflict.has(lit)
    }

    fn proved_at_lvl_0(&self) -> &[Lit] {
        self.v.vars.proved_at_lvl_0()
    }
}

fn percent(n: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        n as f64 * 100.0 / total as f64
    }
}

impl<Cb: Callbacks + Default> Default for Solver<Cb> {
    fn default() -> Self {
        Solver::new(SolverOpts::default(), Default::default())
    }
}

impl<Cb: Callbacks> Solver<Cb> {
    /// Create a new solver with the given options and callbacks.
    ///
    /// Panics if the options are out of range (see `SolverOpts::check`).
    pub fn new(opts: SolverOpts, cb: Cb) -> Self {
        assert!(opts.check(), "invalid solver options {:?}", opts);
        Self {
            model: vec![],
            conflict: LSet::new(),
            cb,
            clauses: vec![],
            learnts: vec![],
            asynch_interrupt: AtomicBool::new(false),
            v: SolverV::new(&opts),
            tmp_learnt: vec![],
            start_time: Instant::now(),
        }
    }

    /// Release a variable: `lit` is asserted at level 0 and, once the next
    /// `simplify` has removed the clauses it satisfies, the variable is
    /// recycled by `new_var`.
    ///
    /// The caller must not use the variable anymore.
    pub fn release_var(&mut self, lit: Lit) {
        if self.v.value_lit(lit) == LBool::UNDEF {
            self.add_clause(&[lit]);
            self.v.released_vars.push(lit.var());
        }
    }

    /// Declare which polarity the decision heuristic should use for a variable.
    pub fn set_polarity(&mut self, v: Var, pol: LBool) {
        self.v.user_pol[v] = pol;
    }

    /// Declare if a variable should be eligible for selection in the decision heuristic.
    pub fn set_decision_var(&mut self, v: Var, b: bool) {
        self.v.set_decision_var(v, b)
    }

    /// The literals implied by `assumps` by unit propagation alone, or
    /// `None` if propagating them leads to a conflict.
    ///
    /// The solver is left at level 0.
    pub fn implies(&mut self, assumps: &[Lit]) -> Option<Vec<Lit>> {
        assert_eq!(self.v.decision_level(), 0);
        self.v.vars.new_decision_level();
        for &a in assumps {
            let val = self.v.value_lit(a);
            if val == LBool::FALSE {
                self.v.cancel_until(0);
                return None;
            } else if val == LBool::UNDEF {
                self.v.vars.unchecked_enqueue(a, CRef::UNDEF);
            }
        }

        let trail_before = self.v.vars.trail.len();
        let res = if self.v.propagate().is_none() {
            Some(self.v.vars.trail[trail_before..].to_vec())
        } else {
            None
        };
        self.v.cancel_until(0);
        res
    }

    /// Limit the number of conflicts of the next `solve_limited` calls.
    pub fn set_conf_budget(&mut self, x: i64) {
        self.v.conflict_budget = self.v.conflicts as i64 + x;
    }

    /// Limit the number of propagations of the next `solve_limited` calls.
    pub fn set_prop_budget(&mut self, x: i64) {
        self.v.propagation_budget = self.v.propagations as i64 + x;
    }

    pub fn budget_off(&mut self) {
        self.v.conflict_budget = -1;
        self.v.propagation_budget = -1;
    }

    /// Temporary access to the callbacks
    pub fn cb_mut(&mut self) -> &mut Cb {
        &mut self.cb
    }

    /// Temporary access to the callbacks
    pub fn cb(&self) -> &Cb {
        &self.cb
    }

    pub fn dimacs_model(&self) -> SolverPrintDimacs<Cb> {
        SolverPrintDimacs { s: self }
    }

    /// The final conflict: the subset of the negated assumptions used to
    /// derive unsatisfiability.
    pub fn conflict(&self) -> &LSet {
        &self.conflict
    }

    pub fn num_assigns(&self) -> u32 {
        self.v.num_assigns()
    }

    /// Number of decision variables that are not assigned at level 0.
    pub fn num_free_vars(&self) -> u32 {
        let lvl0 = self
            .v
            .vars
            .trail_lim
            .first()
            .map_or(self.v.vars.trail.len(), |&x| x as usize);
        (self.v.dec_vars as i64 - lvl0 as i64).max(0) as u32
    }

    pub fn num_learnts(&self) -> u64 {
        self.v.num_learnts
    }

    /// Total number of clauses removed by `simplify` because they were
    /// satisfied at level 0.
    pub fn num_removed_satisfied(&self) -> u64 {
        self.v.removed_satisfied
    }

    /// The last model found, indexed by variable (slot 0 is unused).
    pub fn model(&self) -> &[LBool] {
        &self.model
    }

    pub fn decision_level(&self) -> u32 {
        self.v.decision_level()
    }

    pub(crate) fn interrupted(&self) -> bool {
        self.asynch_interrupt.load(Ordering::Relaxed)
    }

    fn within_budget(&self) -> bool {
        !self.interrupted()
            && (self.v.conflict_budget < 0 || self.v.conflicts < self.v.conflict_budget as u64)
            && (self.v.propagation_budget < 0
                || self.v.propagations < self.v.propagation_budget as u64)
            && !self.cb.stop()
    }

    /// Add clause.
    ///
    /// Precondition: `clause` is sorted, and the solver is at level 0.
    pub(crate) fn add_clause_(&mut self, clause: &mut Vec<Lit>) -> bool {
        if !self.v.ok {
            return false;
        }

        // remove duplicates, false literals; detect tautologies
        let mut last_lit = Lit::UNDEF;
        let mut j = 0;
        for i in 0..clause.len() {
            let lit_i = clause[i];
            let value = self.v.value_lit(lit_i);
            if value == LBool::TRUE || lit_i == !last_lit {
                return true; // satisfied or tautology
            } else if value != LBool::FALSE && lit_i != last_lit {
                last_lit = lit_i;
                clause[j] = lit_i;
                j += 1;
            }
        }
        clause.truncate(j);

        match clause.len() {
            0 => {
                self.v.ok = false;
                false
            }
            1 => {
                self.v.vars.unchecked_enqueue(clause[0], CRef::UNDEF);
                self.v.ok = self.v.propagate().is_none();
                self.v.ok
            }
            _ => {
                let cr = self.v.ca.alloc_with_learnt(clause, false);
                self.clauses.push(cr);
                self.v.attach_clause(cr);
                true
            }
        }
    }

    /// Simplify the clause database according to the level 0 assignment.
    pub(crate) fn simplify_internal<H: Hooks>(&mut self, hooks: &mut H) -> bool {
        assert_eq!(self.v.decision_level(), 0);

        if !self.v.ok || self.v.propagate().is_some() {
            self.v.ok = false;
            return false;
        }

        if self.v.num_assigns() as i64 == self.v.simp_db_assigns || self.v.simp_db_props > 0 {
            return true;
        }

        self.cb.on_simplify();
        self.remove_satisfied(ClauseSetSelect::Learnt, hooks); // Remove satisfied learnt clauses
        if self.v.remove_satisfied {
            self.remove_satisfied(ClauseSetSelect::Original, hooks); // remove satisfied normal clauses
            self.v.purge_released_vars();
        }
        self.check_garbage(hooks);
        self.v.rebuild_order_heap();

        self.v.simp_db_assigns = self.v.num_assigns() as i64;
        // (shouldn't depend on stats really, but it will do for now)
        self.v.simp_db_props = (self.v.clauses_literals + self.v.learnts_literals) as i64;

        true
    }

    /// Search for a model the specified number of conflicts.
    ///
    /// Use negative value for `nof_conflicts` indicate infinity.
    ///
    /// # Output:
    ///
    /// - `LBool::TRUE` if a partial assigment that is consistent with respect to the clauseset is found. If
    ///    all variables are decision variables, this means that the clause set is satisfiable.
    /// - `LBool::FALSE` if the clause set is unsatisfiable.
    /// - `LBool::UNDEF` if the bound on number of conflicts is reached.
    fn search<H: Hooks>(&mut self, nof_conflicts: i32, hooks: &mut H) -> LBool {
        debug_assert!(self.v.ok);
        let mut conflict_c = 0;
        self.v.starts += 1;
        let mut learnt = mem::take(&mut self.tmp_learnt);

        let res = 'main: loop {
            // boolean propagation
            if let Some(confl) = self.v.propagate() {
                // conflict analysis
                self.v.conflicts += 1;
                conflict_c += 1;
                if self.v.decision_level() == 0 {
                    break 'main LBool::FALSE;
                }

                let btlevel = self.v.analyze(confl, &self.learnts, &mut learnt);
                self.v.cancel_until(btlevel as u32);

                if learnt.len() == 1 {
                    self.v.vars.unchecked_enqueue(learnt[0], CRef::UNDEF);
                } else {
                    let cr = self.v.ca.alloc_with_learnt(&learnt, true);
                    self.learnts.push(cr);
                    self.v.attach_clause(cr);
                    self.v.cla_bump_activity(&self.learnts, cr);
                    self.v.vars.unchecked_enqueue(learnt[0], cr);
                }
                trace!("learnt clause {:?} (backtrack to {})", learnt, btlevel);

                self.v.vars.var_decay_activity();
                self.v.cla_decay_activity();

                self.v.learntsize_adjust_cnt -= 1;
                if self.v.learntsize_adjust_cnt == 0 {
                    self.v.learntsize_adjust_confl *= self.v.learntsize_adjust_inc;
                    self.v.learntsize_adjust_cnt = self.v.learntsize_adjust_confl as i32;
                    self.v.max_learnts *= self.v.learntsize_inc;

                    let v = &self.v;
                    self.cb.on_progress(|| ProgressStatus {
                        conflicts: v.conflicts,
                        dec_vars: v.dec_vars as i64
                            - v.vars.trail_lim.first().map_or(v.vars.trail.len() as i64, |&x| {
                                x as i64
                            }),
                        n_clauses: v.num_clauses,
                        n_clause_lits: v.clauses_literals,
                        max_learnt: v.max_learnts as i64,
                        n_learnt: v.num_learnts,
                        n_learnt_lits: v.learnts_literals as f64 / v.num_learnts.max(1) as f64,
                        progress_estimate: v.progress_estimate() * 100.0,
                    });
                }
            } else {
                // no conflict
                if (nof_conflicts >= 0 && conflict_c >= nof_conflicts) || !self.within_budget() {
                    // Reached bound on number of conflicts:
                    self.v.progress_estimate = self.v.progress_estimate();
                    self.v.cancel_until(0);
                    break 'main LBool::UNDEF;
                }

                // Simplify the set of problem clauses:
                if self.v.decision_level() == 0 && !self.simplify_internal(hooks) {
                    break 'main LBool::FALSE;
                }

                if self.learnts.len() as f64 - self.v.num_assigns() as f64 >= self.v.max_learnts {
                    // Reduce the set of learnt clauses:
                    self.reduce_db(hooks);
                }

                let mut next = Lit::UNDEF;
                while (self.v.decision_level() as usize) < self.v.assumptions.len() {
                    // Perform user provided assumption:
                    let p = self.v.assumptions[self.v.decision_level() as usize];
                    if self.v.value_lit(p) == LBool::TRUE {
                        // Dummy decision level:
                        self.v.vars.new_decision_level();
                    } else if self.v.value_lit(p) == LBool::FALSE {
                        let mut conflict = mem::take(&mut self.conflict);
                        self.v.analyze_final(!p, &mut conflict);
                        self.conflict = conflict;
                        break 'main LBool::FALSE;
                    } else {
                        next = p;
                        break;
                    }
                }

                if next == Lit::UNDEF {
                    // New variable decision:
                    self.v.decisions += 1;
                    next = self.v.pick_branch_lit();
                    if next == Lit::UNDEF {
                        // Model found:
                        break 'main LBool::TRUE;
                    }
                }

                // Increase decision level and enqueue 'next'
                trace!("pick-next {:?}", next);
                self.v.vars.new_decision_level();
                self.v.vars.unchecked_enqueue(next, CRef::UNDEF);
            }
        };

        self.tmp_learnt = learnt;
        res
    }

    /// Main solve method (assumptions given in `self.v.assumptions`).
    pub(crate) fn solve_internal<H: Hooks>(&mut self, hooks: &mut H) -> LBool {
        assert_eq!(self.v.decision_level(), 0);
        self.model.clear();
        self.conflict.clear();
        if !self.v.ok {
            return LBool::FALSE;
        }

        self.start_time = Instant::now();
        self.v.solves += 1;

        self.v.max_learnts = self.v.num_clauses as f64 * self.v.learntsize_factor;
        if self.v.max_learnts < self.v.min_learnts_lim as f64 {
            self.v.max_learnts = self.v.min_learnts_lim as f64;
        }

        self.v.learntsize_adjust_confl = self.v.learntsize_adjust_start_confl as f64;
        self.v.learntsize_adjust_cnt = self.v.learntsize_adjust_confl as i32;

        debug!("search.start");
        self.cb.on_start();

        // Search:
        let mut curr_restarts: i32 = 0;
        let status = loop {
            let rest_base = if self.v.luby_restart {
                utils::luby(self.v.restart_inc, curr_restarts)
            } else {
                f64::powi(self.v.restart_inc, curr_restarts)
            };
            let nof_conflicts = (rest_base * self.v.restart_first as f64) as i32;
            let status = self.search(nof_conflicts, hooks);
            if status != LBool::UNDEF || !self.within_budget() {
                break status;
            }
            curr_restarts += 1;
            debug!("search.restart({})", curr_restarts);
            self.cb.on_restart();
        };

        self.cb.on_result(status);

        if status == LBool::TRUE {
            // Copy model:
            let num_vars = self.v.num_vars();
            self.model.clear();
            self.model.resize(num_vars as usize + 1, LBool::UNDEF);
            for i in 1..=num_vars {
                self.model[i as usize] = self.v.value(Var::from_idx(i));
            }
        } else if status == LBool::FALSE && self.conflict.is_empty() {
            // NOTE: we may return `false` without an empty conflict in case we had assumptions. In
            // this case `self.conflict` contains the unsat-core but adding new clauses might
            // succeed in the absence of these assumptions.
            self.v.ok = false;
        }

        self.v.cancel_until(0);
        debug!("res: {:?}", status);
        status
    }

    /// Remove half of the learnt clauses, minus the clauses locked by the current assignment. Locked
    /// clauses are clauses that are reason to some assignment. Binary clauses are never removed.
    fn reduce_db<H: Hooks>(&mut self, hooks: &mut H) {
        let extra_lim = self.v.cla_inc / self.learnts.len() as f64; // Remove any clause below this activity

        debug!("reduce_db.start");

        {
            let ca = &self.v.ca;
            self.learnts.sort_unstable_by(|&x, &y| {
                let x = ca.get_ref(x);
                let y = ca.get_ref(y);
                debug_assert!(x.learnt());
                debug_assert!(y.learnt());
                Ord::cmp(&(x.size() <= 2), &(y.size() <= 2)).then(
                    PartialOrd::partial_cmp(&x.activity(), &y.activity())
                        .unwrap_or(cmp::Ordering::Equal),
                )
            });
        }
        // Don't delete binary or locked clauses. From the rest, delete clauses from the first half
        // and clauses with activity smaller than `extra_lim`:
        let mut j = 0;
        let n = self.learnts.len();
        for i in 0..n {
            let cr = self.learnts[i];
            let cond = {
                let c = self.v.ca.get_ref(cr);
                c.size() > 2
                    && !self.v.locked(cr)
                    && (i < n / 2 || (c.activity() as f64) < extra_lim)
            };
            if cond {
                self.v.remove_clause(cr, hooks);
            } else {
                self.learnts[j] = cr;
                j += 1;
            }
        }
        self.learnts.truncate(j);

        debug!("reduce_db.done (deleted {})", n - j);

        self.check_garbage(hooks);
    }

    /// Shrink the given set to contain only non-satisfied clauses.
    fn remove_satisfied<H: Hooks>(&mut self, which: ClauseSetSelect, hooks: &mut H) {
        assert_eq!(self.v.decision_level(), 0);
        let cs: &mut Vec<CRef> = match which {
            ClauseSetSelect::Learnt => &mut self.learnts,
            ClauseSetSelect::Original => &mut self.clauses,
        };
        let self_v = &mut self.v;
        cs.retain(|&cr| {
            let satisfied = self_v.satisfied(cr);
            if satisfied {
                trace!("remove satisfied clause {:?}", self_v.ca[cr].lits());
                self_v.remove_clause(cr, hooks);
                self_v.removed_satisfied += 1;
            } else {
                let c = &mut self_v.ca[cr];
                // Trim clause (but keep the 2 first lits as they are watching):
                debug_assert_eq!(self_v.vars.value_lit(c[0]), LBool::UNDEF);
                debug_assert_eq!(self_v.vars.value_lit(c[1]), LBool::UNDEF);
                let orig_size = c.size();
                let mut k = 2;
                let mut end = c.size();
                while k < end {
                    if self_v.vars.value_lit(c[k]) == LBool::FALSE {
                        end -= 1;
                        c[k] = c[end];
                    } else {
                        k += 1;
                    }
                }
                c.shrink(end);
                let shaved = orig_size - end;
                if c.learnt() {
                    self_v.learnts_literals -= shaved as u64;
                } else {
                    self_v.clauses_literals -= shaved as u64;
                }
                self_v.ca.free_amount(shaved);
            }
            !satisfied
        });
    }

    /// Garbage collect the clause allocator by moving alive clauses into
    /// another allocator.
    pub(crate) fn garbage_collect<H: Hooks>(&mut self, hooks: &mut H) {
        // Initialize the next region to a size corresponding to the estimated utilization degree. This
        // is not precise but should avoid some unnecessary reallocations for the new region:
        let mut to =
            ClauseAllocator::with_start_cap((self.clauses.len() + self.learnts.len()) as u32 + 1);
        to.set_extra_clause_field(self.v.ca.extra_clause_field());

        hooks.reloc_all(&mut self.v.ca, &mut to);
        self.v
            .reloc_all(&mut self.learnts, &mut self.clauses, &mut to);

        let (old_size, new_size) = (self.v.ca.len() as usize, to.len() as usize);
        debug!("garbage collection: {} units => {} units", old_size, new_size);
        self.cb.on_gc(old_size, new_size);
        self.v.ca = to;
    }

    /// Collect garbage if the wasted space exceeds `garbage_frac`.
    pub(crate) fn check_garbage<H: Hooks>(&mut self, hooks: &mut H) {
        let frac = self.v.garbage_frac;
        self.check_garbage_frac(frac, hooks)
    }

    /// Check whether the space wasted by dead clauses in the clause allocator exceeds
    /// the fraction `gf` of its size.
    pub(crate) fn check_garbage_frac<H: Hooks>(&mut self, gf: f64, hooks: &mut H) {
        if self.v.ca.wasted() as f64 > self.v.ca.len() as f64 * gf {
            self.garbage_collect(hooks);
        }
    }
}

impl SolverV {
    #[inline(always)]
    pub(crate) fn num_assigns(&self) -> u32 {
        self.vars.num_assigns()
    }

    #[inline(always)]
    pub(crate) fn num_vars(&self) -> u32 {
        self.next_var.idx() - 1
    }

    #[inline(always)]
    pub(crate) fn level(&self, x: Var) -> i32 {
        self.vars.level(x)
    }

    #[inline(always)]
    pub(crate) fn value(&self, x: Var) -> LBool {
        self.vars.value(x)
    }

    #[inline(always)]
    pub(crate) fn value_lit(&self, x: Lit) -> LBool {
        self.vars.value_lit(x)
    }

    fn order_heap(&mut self) -> Heap<Var, VarOrder> {
        self.order_heap_data.promote(VarOrder {
            activity: &self.vars.activity,
        })
    }

    pub(crate) fn set_decision_var(&mut self, v: Var, b: bool) {
        if b && !self.decision[v] {
            self.dec_vars += 1;
        } else if !b && self.decision[v] {
            self.dec_vars -= 1;
        }
        self.decision[v] = b;
        self.insert_var_order(v);
    }

    fn insert_var_order(&mut self, x: Var) {
        if !self.order_heap_data.in_heap(x) && self.decision[x] {
            self.order_heap().insert(x);
        }
    }

    fn cla_decay_activity(&mut self) {
        self.cla_inc *= 1.0 / self.clause_decay;
    }

    fn cla_bump_activity(&mut self, learnts: &[CRef], cr: CRef) {
        let new_activity = {
            let c = &mut self.ca[cr];
            let r = c.activity() + self.cla_inc as f32;
            c.set_activity(r);
            r
        };
        if new_activity > 1e20 {
            // Rescale:
            for &learnt in learnts.iter() {
                let c = &mut self.ca[learnt];
                let r = c.activity() * 1e-20;
                c.set_activity(r);
            }
            self.cla_inc *= 1e-20;
        }
    }

    /// Pick a literal to make a decision with
    fn pick_branch_lit(&mut self) -> Lit {
        let mut next = Var::UNDEF;

        // Random decision:
        if utils::drand(&mut self.random_seed) < self.random_var_freq
            && !self.order_heap_data.is_empty()
        {
            let idx_tmp =
                utils::irand(&mut self.random_seed, self.order_heap_data.len() as i32) as usize;
            next = self.order_heap_data[idx_tmp];
            if self.value(next) == LBool::UNDEF && self.decision[next] {
                self.rnd_decisions += 1;
            }
        }

        // Activity based decision:
        while next == Var::UNDEF || self.value(next) != LBool::UNDEF || !self.decision[next] {
            match self.order_heap().remove_min() {
                Some(v) => next = v,
                None => return Lit::UNDEF,
            }
        }

        // Choose polarity based on different polarity modes (global or per-variable):
        if self.user_pol[next] != LBool::UNDEF {
            Lit::new(next, self.user_pol[next] == LBool::TRUE)
        } else if self.rnd_pol {
            Lit::new(next, utils::drand(&mut self.random_seed) < 0.5)
        } else {
            Lit::new(next, self.polarity[next])
        }
    }

    fn watches(&mut self) -> OccLists<Lit, Watcher, WatcherDeleted> {
        self.watches_data.promote(WatcherDeleted { ca: &self.ca })
    }

    pub(crate) fn new_var(&mut self, upol: LBool, dvar: bool) -> Var {
        let v = match self.free_vars.pop() {
            Some(v) => v,
            None => {
                let v = self.next_var;
                self.next_var = Var::from_idx(v.idx() + 1);
                v
            }
        };
        self.watches().init(Lit::new(v, false));
        self.watches().init(Lit::new(v, true));
        self.vars.ass.insert_default(v, LBool::UNDEF);
        self.vars.vardata.insert_default(v, VarData::default());
        let act = if self.rnd_init_act {
            utils::drand(&mut self.random_seed) * 0.00001
        } else {
            0.0
        };
        self.vars.activity.insert_default(v, act);
        self.seen.insert_default(v, Seen::UNDEF);
        self.polarity.insert_default(v, false);
        self.user_pol.insert_default(v, upol);
        self.decision.reserve_default(v);
        let len = self.vars.trail.len();
        if v.idx() as usize > len {
            self.vars.trail.reserve(v.idx() as usize + 1 - len);
        }
        self.set_decision_var(v, dvar);
        v
    }

    /// Analyze conflict and produce a reason clause.
    ///
    /// # Pre-conditions:
    ///
    /// - current decision level must be greater than root level.
    /// - every literal of `confl` is false in the current trail
    ///
    /// # Post-conditions:
    ///
    /// - the backtrack level is returned.
    /// - `out_learnt[0]` is the asserting literal at that level.
    /// - if `out_learnt.len() > 1` then `out_learnt[1]` has the greatest decision level of the
    ///   rest of literals. There may be others from the same level though.
    fn analyze(&mut self, confl: CRef, learnts: &[CRef], out_learnt: &mut Vec<Lit>) -> i32 {
        out_learnt.clear();
        out_learnt.push(Lit::UNDEF); // leave room for the asserting literal
        let decision_level = self.decision_level() as i32;

        let mut path_c = 0;
        let mut p = Lit::UNDEF;
        let mut index = self.vars.trail.len();
        let mut confl = confl;

        loop {
            assert_ne!(confl, CRef::UNDEF, "reached a decision literal");
            if self.ca[confl].learnt() {
                self.cla_bump_activity(learnts, confl);
            }

            let c = &self.ca[confl];
            let start = if p == Lit::UNDEF { 0 } else { 1 };
            for &q in &c.lits()[start..] {
                let v = q.var();
                if !self.seen[v].is_seen() && self.vars.level(v) > 0 {
                    self.vars.var_bump_activity(&mut self.order_heap_data, v);
                    self.seen[v] = Seen::SOURCE;
                    if self.vars.level(v) >= decision_level {
                        path_c += 1;
                    } else {
                        out_learnt.push(q);
                    }
                }
            }

            // Select next clause to look at:
            loop {
                index -= 1;
                if self.seen[self.vars.trail[index].var()].is_seen() {
                    break;
                }
            }
            p = self.vars.trail[index];
            confl = self.vars.reason(p.var());
            self.seen[p.var()] = Seen::UNDEF;
            path_c -= 1;
            if path_c <= 0 {
                break;
            }
        }
        out_learnt[0] = !p;

        // Simplify conflict clause:
        self.analyze_toclear.clear();
        self.analyze_toclear.extend_from_slice(out_learnt);
        let orig_len = out_learnt.len();
        match self.ccmin_mode {
            CCMin::Deep => {
                let mut j = 1;
                for i in 1..orig_len {
                    let lit = out_learnt[i];
                    if self.vars.reason(lit.var()) == CRef::UNDEF || !self.lit_redundant(lit) {
                        out_learnt[j] = lit;
                        j += 1;
                    }
                }
                out_learnt.truncate(j);
            }
            CCMin::Basic => {
                let mut j = 1;
                for i in 1..orig_len {
                    let x = out_learnt[i].var();
                    let reason = self.vars.reason(x);
                    let keep = reason == CRef::UNDEF || {
                        let c = &self.ca[reason];
                        c.lits()[1..].iter().any(|&k| {
                            !self.seen[k.var()].is_seen() && self.vars.level(k.var()) > 0
                        })
                    };
                    if keep {
                        out_learnt[j] = out_learnt[i];
                        j += 1;
                    }
                }
                out_learnt.truncate(j);
            }
            CCMin::None => (),
        }

        self.max_literals += orig_len as u64;
        self.tot_literals += out_learnt.len() as u64;

        // Find correct backtrack level:
        let btlevel = if out_learnt.len() == 1 {
            0
        } else {
            // Find the first literal assigned at the next-highest level:
            let mut max_i = 1;
            let mut max_level = self.vars.level(out_learnt[1].var());
            for (i, &lit) in out_learnt.iter().enumerate().skip(2) {
                let level = self.vars.level(lit.var());
                if level > max_level {
                    max_i = i;
                    max_level = level;
                }
            }
            // Swap-in this literal at index 1:
            out_learnt.swap(1, max_i);
            max_level
        };

        for &lit in &self.analyze_toclear {
            self.seen[lit.var()] = Seen::UNDEF; // (`seen[]` is now cleared)
        }
        btlevel
    }

    /// Check if `p` can be removed from a conflict clause: every path from
    /// `p` back through the implication graph ends in a literal of the clause
    /// or in a literal assigned at level 0.
    ///
    /// Results are cached in `seen` (`REMOVABLE`/`FAILED`), and each newly
    /// marked variable is recorded in `analyze_toclear`.
    fn lit_redundant(&mut self, mut p: Lit) -> bool {
        debug_assert!(self.seen[p.var()] == Seen::UNDEF || self.seen[p.var()] == Seen::SOURCE);
        debug_assert_ne!(self.vars.reason(p.var()), CRef::UNDEF);

        self.minimize_stack.clear();
        let mut i: u32 = 1;
        loop {
            let cr = self.vars.reason(p.var());
            if i < self.ca[cr].size() {
                // Checking `p`-parents `l`:
                let l = self.ca[cr][i];
                let v = l.var();

                // Variable at level 0 or previously removable:
                if self.vars.level(v) == 0
                    || self.seen[v] == Seen::SOURCE
                    || self.seen[v] == Seen::REMOVABLE
                {
                    i += 1;
                    continue;
                }

                // Check variable can not be removed for some local reason:
                if self.vars.reason(v) == CRef::UNDEF || self.seen[v] == Seen::FAILED {
                    self.minimize_stack.push((0, p));
                    for &(_, q) in &self.minimize_stack {
                        if self.seen[q.var()] == Seen::UNDEF {
                            self.seen[q.var()] = Seen::FAILED;
                            self.analyze_toclear.push(q);
                        }
                    }
                    return false;
                }

                // Recursively check `l`:
                self.minimize_stack.push((i, p));
                i = 1;
                p = l;
            } else {
                // Finished with current element `p` and reason `c`:
                if self.seen[p.var()] == Seen::UNDEF {
                    self.seen[p.var()] = Seen::REMOVABLE;
                    self.analyze_toclear.push(p);
                }

                // Terminate with success if stack is empty:
                match self.minimize_stack.pop() {
                    None => break,
                    Some((j, q)) => {
                        // Continue with top element on stack:
                        i = j + 1;
                        p = q;
                    }
                }
            }
        }

        true
    }

    /// Specialized analysis procedure to express the final conflict in terms of assumptions.
    /// Calculates the (possibly empty) set of assumptions that led to the assignment of 'p', and
    /// stores the result in 'out_conflict'.
    fn analyze_final(&mut self, p: Lit, out_conflict: &mut LSet) {
        out_conflict.clear();
        out_conflict.insert(p);

        if self.decision_level() == 0 {
            return;
        }

        self.seen[p.var()] = Seen::SOURCE;

        let start = self.vars.trail_lim[0] as usize;
        for i in (start..self.vars.trail.len()).rev() {
            let x = self.vars.trail[i].var();
            if self.seen[x].is_seen() {
                let reason = self.vars.reason(x);
                if reason == CRef::UNDEF {
                    debug_assert!(self.vars.level(x) > 0);
                    out_conflict.insert(!self.vars.trail[i]);
                } else {
                    let c = &self.ca[reason];
                    for &lit in &c.lits()[1..] {
                        if self.vars.level(lit.var()) > 0 {
                            self.seen[lit.var()] = Seen::SOURCE;
                        }
                    }
                }
                self.seen[x] = Seen::UNDEF;
            }
        }

        self.seen[p.var()] = Seen::UNDEF;
    }

    /// Propagates all enqueued facts. If a conflict arises, the conflicting clause is returned,
    /// otherwise `None`.
    ///
    /// Post-conditions: the propagation queue is empty, even if there was a conflict.
    pub(crate) fn propagate(&mut self) -> Option<CRef> {
        let mut confl = None;
        let mut num_props: u64 = 0;

        while (self.qhead as usize) < self.vars.trail.len() {
            // `p` is enqueued fact to propagate.
            let p = self.vars.trail[self.qhead as usize];
            self.qhead += 1;
            num_props += 1;

            // New watchers never go to `p` itself, so its list can be
            // detached while it is scanned.
            let mut ws = mem::take(
                self.watches_data
                    .lookup_mut_pred(p, &WatcherDeleted { ca: &self.ca }),
            );
            let false_lit = !p;
            let end = ws.len();
            let mut i = 0;
            let mut j = 0;

            'clauses: while i < end {
                // Try to avoid inspecting the clause:
                let blocker = ws[i].blocker;
                if self.vars.value_lit(blocker) == LBool::TRUE {
                    ws[j] = ws[i];
                    j += 1;
                    i += 1;
                    continue;
                }

                // Make sure the false literal is data[1]:
                let cr = ws[i].cref;
                let c = &mut self.ca[cr];
                if c[0] == false_lit {
                    c[0] = c[1];
                    c[1] = false_lit;
                }
                debug_assert_eq!(c[1], false_lit);
                i += 1;

                // If 0th watch is true, then clause is already satisfied.
                let first = c[0];
                let w = Watcher::new(cr, first);
                if first != blocker && self.vars.value_lit(first) == LBool::TRUE {
                    ws[j] = w;
                    j += 1;
                    continue;
                }

                // Look for new watch:
                for k in 2..c.size() {
                    if self.vars.value_lit(c[k]) != LBool::FALSE {
                        c[1] = c[k];
                        c[k] = false_lit;
                        let new_watch = !c[1];
                        self.watches_data[new_watch].push(w);
                        continue 'clauses;
                    }
                }

                // Did not find watch -- clause is unit under assignment:
                ws[j] = w;
                j += 1;
                if self.vars.value_lit(first) == LBool::FALSE {
                    confl = Some(cr);
                    self.qhead = self.vars.trail.len() as i32;
                    // Copy the remaining watches:
                    while i < end {
                        ws[j] = ws[i];
                        j += 1;
                        i += 1;
                    }
                } else {
                    self.vars.unchecked_enqueue(first, cr);
                }
            }
            ws.truncate(j);
            self.watches_data[p] = ws;
        }
        self.propagations += num_props;
        self.simp_db_props -= num_props as i64;

        confl
    }

    pub(crate) fn rebuild_order_heap(&mut self) {
        let mut vs = vec![];
        for v in (1..=self.num_vars()).map(Var::from_idx) {
            if self.decision[v] && self.value(v) == LBool::UNDEF {
                vs.push(v);
            }
        }
        self.order_heap().build(&vs);
    }

    /// Remove the released variables from the level 0 trail and make them
    /// available to `new_var`.
    ///
    /// Only valid once the clauses they satisfy are gone.
    fn purge_released_vars(&mut self) {
        if self.released_vars.is_empty() {
            return;
        }
        debug_assert_eq!(self.decision_level(), 0);
        let released = mem::take(&mut self.released_vars);
        for &v in &released {
            debug_assert!(!self.seen[v].is_seen());
            self.seen[v] = Seen::SOURCE;
        }

        let seen = &self.seen;
        self.vars.trail.retain(|lit| !seen[lit.var()].is_seen());
        self.qhead = self.vars.trail.len() as i32;

        for &v in &released {
            self.seen[v] = Seen::UNDEF;
        }
        debug!("recycling {} released variables", released.len());
        self.free_vars.extend(released);
    }

    /// Move to the given clause allocator, where clause indices might differ
    fn reloc_all(
        &mut self,
        learnts: &mut Vec<CRef>,
        clauses: &mut Vec<CRef>,
        to: &mut ClauseAllocator,
    ) {
        // All watchers:
        self.watches().clean_all();
        for v in (1..=self.num_vars()).map(Var::from_idx) {
            for &sign in &[false, true] {
                let p = Lit::new(v, sign);
                for watch in self.watches_data[p].iter_mut() {
                    self.ca.reloc(&mut watch.cref, to);
                }
            }
        }

        // All reasons:
        for i in 0..self.vars.trail.len() {
            let v = self.vars.trail[i].var();
            let reason = self.vars.reason(v);
            if reason != CRef::UNDEF {
                // a relocated clause has lost its literals: test `reloced` first
                if self.ca[reason].reloced() || self.locked(reason) {
                    debug_assert_ne!(self.ca[reason].mark(), 1);
                    self.ca.reloc(&mut self.vars.vardata[v].reason, to);
                } else {
                    // stale reason of a level 0 literal
                    self.vars.vardata[v].reason = CRef::UNDEF;
                }
            }
        }

        // All learnt, then all original:
        for cs in &mut [learnts, clauses] {
            let mut j = 0;
            for i in 0..cs.len() {
                let mut cr = cs[i];
                if self.ca[cr].mark() != 1 {
                    self.ca.reloc(&mut cr, to);
                    cs[j] = cr;
                    j += 1;
                }
            }
            cs.truncate(j);
        }
    }

    /// Attach a clause to watcher lists
    pub(crate) fn attach_clause(&mut self, cr: CRef) {
        let (c0, c1, learnt, size) = {
            let c = &self.ca[cr];
            debug_assert!(c.size() > 1);
            (c[0], c[1], c.learnt(), c.size())
        };
        self.watches_data[!c0].push(Watcher::new(cr, c1));
        self.watches_data[!c1].push(Watcher::new(cr, c0));
        if learnt {
            self.num_learnts += 1;
            self.learnts_literals += size as u64;
        } else {
            self.num_clauses += 1;
            self.clauses_literals += size as u64;
        }
    }

    /// Revert to the state at given level (keeping all assignment at `level` but not beyond).
    pub(crate) fn cancel_until(&mut self, level: u32) {
        if self.decision_level() <= level {
            return;
        }
        let trail_lim_last = *self.vars.trail_lim.last().unwrap_or(&0) as usize;
        let trail_lim_level = self.vars.trail_lim[level as usize] as usize;
        for c in (trail_lim_level..self.vars.trail.len()).rev() {
            let x = self.vars.trail[c].var();
            self.vars.ass[x] = LBool::UNDEF;
            if self.phase_saving > 1 || (self.phase_saving == 1 && c > trail_lim_last) {
                self.polarity[x] = self.vars.trail[c].sign();
            }
            self.insert_var_order(x);
        }
        self.qhead = trail_lim_level as i32;
        self.vars.trail.truncate(trail_lim_level);
        self.vars.trail_lim.truncate(level as usize);
    }

    /// Detach a clause from watcher lists.
    ///
    /// param `strict` means we remove the clause from watchers eagerly, instead
    /// of just marking the watchlist as "dirty"
    pub(crate) fn detach_clause(&mut self, cr: CRef, strict: bool) {
        let (c0, c1, csize, clearnt) = {
            let c = &self.ca[cr];
            (c[0], c[1], c.size(), c.learnt())
        };
        debug_assert!(csize > 1);

        // Strict or lazy detaching:
        if strict {
            self.watches_data.remove(!c0, &Watcher::new(cr, c1));
            self.watches_data.remove(!c1, &Watcher::new(cr, c0));
        } else {
            self.watches_data.smudge(!c0);
            self.watches_data.smudge(!c1);
        }

        if clearnt {
            self.num_learnts -= 1;
            self.learnts_literals -= csize as u64;
        } else {
            self.num_clauses -= 1;
            self.clauses_literals -= csize as u64;
        }
    }

    /// Detach and free a clause.
    pub(crate) fn remove_clause<H: Hooks>(&mut self, cr: CRef, hooks: &mut H) {
        hooks.on_remove_clause(&self.ca[cr], &self.vars.ass);
        self.detach_clause(cr, false);
        // Don't leave pointers to free'd memory!
        if self.locked(cr) {
            let v = self.ca[cr][0].var();
            self.vars.vardata[v].reason = CRef::UNDEF;
        }
        self.ca[cr].set_mark(1); // used in reloc
        self.ca.free(cr);
    }

    /// Enqueue `p` unless it is already assigned; `false` if `p` is false.
    pub(crate) fn enqueue(&mut self, p: Lit, from: CRef) -> bool {
        let val = self.value_lit(p);
        if val != LBool::UNDEF {
            val != LBool::FALSE
        } else {
            self.vars.unchecked_enqueue(p, from);
            true
        }
    }

    pub(crate) fn satisfied(&self, cr: CRef) -> bool {
        self.ca[cr]
            .iter()
            .any(|&lit| self.value_lit(lit) == LBool::TRUE)
    }

    #[inline(always)]
    pub(crate) fn decision_level(&self) -> u32 {
        self.vars.decision_level()
    }

    /// Returns `true` if a clause is a reason for some implication in the current state.
    fn locked(&self, cr: CRef) -> bool {
        let c0 = self.ca[cr][0];
        self.value_lit(c0) == LBool::TRUE && self.vars.reason(c0.var()) == cr
    }

    fn progress_estimate(&self) -> f64 {
        if self.num_vars() == 0 {
            return 0.0;
        }
        let mut progress = 0.0;
        let f = 1.0 / self.num_vars() as f64;

        for i in 0..self.decision_level() + 1 {
            let beg: i32 = if i == 0 {
                0
            } else {
                self.vars.trail_lim[i as usize - 1]
            };
            let end: i32 = if i == self.decision_level() {
                self.vars.trail.len() as i32
            } else {
                self.vars.trail_lim[i as usize]
            };
            progress += f64::powi(f, i as i32) * (end - beg) as f64;
        }

        progress / self.num_vars() as f64
    }

    fn new(opts: &SolverOpts) -> Self {
        Self {
            vars: VarState::new(opts),
            num_clauses: 0,
            num_learnts: 0,
            clauses_literals: 0,
            learnts_literals: 0,

            clause_decay: opts.clause_decay,
            random_var_freq: opts.random_var_freq,
            random_seed: opts.random_seed,
            luby_restart: opts.luby_restart,
            ccmin_mode: opts.ccmin_mode,
            phase_saving: opts.phase_saving,
            rnd_pol: opts.rnd_pol,
            rnd_init_act: opts.rnd_init_act,
            garbage_frac: opts.garbage_frac,
            min_learnts_lim: opts.min_learnts_lim,
            restart_first: opts.restart_first,
            restart_inc: opts.restart_inc,
            learntsize_factor: opts.learntsize_factor,
            learntsize_inc: opts.learntsize_inc,

            // Parameters (experimental):
            learntsize_adjust_start_confl: 100,
            learntsize_adjust_inc: 1.5,

            // Statistics:
            solves: 0,
            starts: 0,
            decisions: 0,
            rnd_decisions: 0,
            propagations: 0,
            conflicts: 0,
            dec_vars: 0,
            max_literals: 0,
            tot_literals: 0,
            removed_satisfied: 0,

            polarity: VMap::new(),
            user_pol: VMap::new(),
            decision: VMap::new(),
            watches_data: OccListsData::new(),
            order_heap_data: HeapData::new(),
            ok: true,
            cla_inc: 1.0,
            qhead: 0,
            simp_db_assigns: -1,
            simp_db_props: 0,
            progress_estimate: 0.0,
            remove_satisfied: true,
            next_var: Var::from_idx(1),

            ca: ClauseAllocator::new(),
            released_vars: vec![],
            free_vars: vec![],
            assumptions: vec![],

            seen: VMap::new(),
            minimize_stack: vec![],
            analyze_toclear: vec![],
            max_learnts: 0.0,
            learntsize_adjust_confl: 0.0,
            learntsize_adjust_cnt: 0,

            // Resource constraints:
            conflict_budget: -1,
            propagation_budget: -1,
        }
    }
}

impl VarState {
    fn new(opts: &SolverOpts) -> Self {
        Self {
            ass: VMap::new(),
            vardata: VMap::new(),
            activity: VMap::new(),
            var_inc: 1.0,
            var_decay: opts.var_decay,
            trail: vec![],
            trail_lim: vec![],
        }
    }

    #[inline(always)]
    pub(crate) fn num_assigns(&self) -> u32 {
        self.trail.len() as u32
    }

    /// Begins a new decision level.
    pub(crate) fn new_decision_level(&mut self) {
        let lvl = self.trail.len() as i32;
        self.trail_lim.push(lvl);
    }

    fn proved_at_lvl_0(&self) -> &[Lit] {
        // find where the end of the level-0 part of the trail is
        let end = self
            .trail_lim
            .first()
            .map_or(self.trail.len(), |&x| x as usize);
        &self.trail[..end]
    }

    #[inline(always)]
    pub(crate) fn value(&self, x: Var) -> LBool {
        self.ass[x]
    }

    #[inline(always)]
    pub(crate) fn value_lit(&self, x: Lit) -> LBool {
        self.ass[x.var()] ^ !x.sign()
    }

    #[inline(always)]
    fn level(&self, x: Var) -> i32 {
        self.vardata[x].level
    }

    #[inline(always)]
    fn reason(&self, x: Var) -> CRef {
        self.vardata[x].reason
    }

    fn var_decay_activity(&mut self) {
        self.var_inc *= 1.0 / self.var_decay;
    }

    #[inline(always)]
    pub(crate) fn decision_level(&self) -> u32 {
        self.trail_lim.len() as u32
    }

    pub(crate) fn unchecked_enqueue(&mut self, p: Lit, from: CRef) {
        debug_assert_eq!(
            self.value_lit(p),
            LBool::UNDEF,
            "lit {:?} should be undef",
            p
        );
        self.ass[p.var()] = LBool::new(p.sign());
        self.vardata[p.var()] = VarData::new(from, self.decision_level() as i32);
        self.trail.push(p);
    }

    /// Increase a variable with the current 'bump' value.
    fn var_bump_activity(&mut self, order_heap_data: &mut HeapData<Var>, v: Var) {
        self.activity[v] += self.var_inc;
        if self.activity[v] > 1e100 {
            // Rescale:
            for (_, x) in self.activity.iter_mut() {
                *x *= 1e-100;
            }
            self.var_inc *= 1e-100;
        }

        // Update order_heap with respect to new activity:
        let mut order_heap = order_heap_data.promote(VarOrder {
            activity: &self.activity,
        });
        if order_heap.in_heap(v) {
            order_heap.decrease(v);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ClauseSetSelect {
    Original,
    Learnt,
}

#[derive(Debug, Clone, Copy)]
struct VarData {
    reason: CRef,
    level: i32,
}

#[derive(Debug, Clone, Copy)]
struct Watcher {
    cref: CRef,
    blocker: Lit,
}

struct VarOrder<'a> {
    activity: &'a VMap<f64>,
}

/// Predicate to test whether a clause has been removed from some lit's watchlist
struct WatcherDeleted<'a> {
    ca: &'a ClauseAllocator,
}

/// Marks used by conflict analysis. `REMOVABLE` and `FAILED` cache the
/// outcome of `lit_redundant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
enum Seen {
    UNDEF,
    SOURCE,
    REMOVABLE,
    FAILED,
}

pub mod utils {
    /// Finite subsequences of the Luby-sequence:
    ///
    /// > 0: 1
    /// > 1: 1 1 2
    /// > 2: 1 1 2 1 1 2 4
    /// > 3: 1 1 2 1 1 2 4 1 1 2 1 1 2 4 8
    /// ...
    ///
    /// ```
    /// use dpll::core::utils::luby;
    /// let xs: Vec<f64> = (0..7).map(|i| luby(2.0, i)).collect();
    /// assert_eq!(xs, vec![1.0, 1.0, 2.0, 1.0, 1.0, 2.0, 4.0]);
    /// ```
    pub fn luby(y: f64, mut x: i32) -> f64 {
        // Find the finite subsequence that contains index 'x', and the
        // size of that subsequence:
        let mut size = 1;
        let mut seq = 0;
        while size < x + 1 {
            seq += 1;
            size = 2 * size + 1;
        }

        while size - 1 != x {
            size = (size - 1) >> 1;
            seq -= 1;
            x %= size;
        }

        f64::powi(y, seq)
    }

    /// Generate a random double:
    pub(crate) fn drand(seed: &mut f64) -> f64 {
        *seed *= 1389796.0;
        let q = (*seed / 2147483647.0) as i32;
        *seed -= q as f64 * 2147483647.0;
        *seed / 2147483647.0
    }

    /// Generate a random integer:
    pub(crate) fn irand(seed: &mut f64, size: i32) -> i32 {
        (drand(seed) * size as f64) as i32
    }
}

impl Default for VarData {
    fn default() -> Self {
        Self {
            reason: CRef::UNDEF,
            level: 0,
        }
    }
}

impl VarData {
    #[inline(always)]
    fn new(reason: CRef, level: i32) -> Self {
        Self { reason, level }
    }
}

impl PartialEq for Watcher {
    #[inline(always)]
    fn eq(&self, rhs: &Self) -> bool {
        self.cref == rhs.cref
    }
}
impl Eq for Watcher {}

impl<'a> Comparator<Var> for VarOrder<'a> {
    fn cmp(&self, lhs: &Var, rhs: &Var) -> cmp::Ordering {
        PartialOrd::partial_cmp(&self.activity[*rhs], &self.activity[*lhs])
            .unwrap_or(cmp::Ordering::Equal)
    }
}

impl<'a> DeletePred<Watcher> for WatcherDeleted<'a> {
    #[inline]
    fn deleted(&self, w: &Watcher) -> bool {
        self.ca[w.cref].mark() == 1
    }
}

impl Default for Seen {
    #[inline]
    fn default() -> Self {
        Seen::UNDEF
    }
}

impl Seen {
    #[inline(always)]
    fn is_seen(&self) -> bool {
        *self != Seen::UNDEF
    }
}

impl Watcher {
    fn new(cref: CRef, blocker: Lit) -> Self {
        Self { cref, blocker }
    }
}

/// Conflict clause minimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CCMin {
    None,
    /// Drop literals whose reason is covered by the clause.
    Basic,
    /// Recursive minimization.
    Deep,
}

impl CCMin {
    /// From the numeric command line level (0, 1 or 2).
    pub fn from_level(level: u32) -> Option<Self> {
        match level {
            0 => Some(CCMin::None),
            1 => Some(CCMin::Basic),
            2 => Some(CCMin::Deep),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SolverOpts {
    pub var_decay: f64,
    pub clause_decay: f64,
    pub random_var_freq: f64,
    pub random_seed: f64,
    pub ccmin_mode: CCMin,
    pub phase_saving: i32,
    pub rnd_pol: bool,
    pub rnd_init_act: bool,
    pub luby_restart: bool,
    pub restart_first: i32,
    pub restart_inc: f64,
    pub learntsize_factor: f64,
    pub learntsize_inc: f64,
    pub garbage_frac: f64,
    pub min_learnts_lim: i32,
}

impl Default for SolverOpts {
    fn default() -> SolverOpts {
        Self {
            var_decay: 0.95,
            clause_decay: 0.999,
            random_var_freq: 0.0,
            random_seed: 91648253.0,
            ccmin_mode: CCMin::Deep,
            phase_saving: 2,
            rnd_pol: false,
            rnd_init_act: false,
            luby_restart: true,
            restart_first: 100,
            restart_inc: 2.0,
            learntsize_factor: 1.0 / 3.0,
            learntsize_inc: 1.1,
            garbage_frac: 0.20,
            min_learnts_lim: 0,
        }
    }
}

impl SolverOpts {
    /// Check that options are valid.
    pub fn check(&self) -> bool {
        (0.0 < self.var_decay && self.var_decay < 1.0)
            && (0.0 < self.clause_decay && self.clause_decay < 1.0)
            && (0.0 <= self.random_var_freq && self.random_var_freq <= 1.0)
            && (0.0 < self.random_seed && self.random_seed < f64::INFINITY)
            && (0 <= self.phase_saving && self.phase_saving <= 2)
            && 1 <= self.restart_first
            && (1.0 < self.restart_inc && self.restart_inc < f64::INFINITY)
            && 0.0 < self.learntsize_factor
            && 1.0 <= self.learntsize_inc
            && (0.0 < self.garbage_frac && self.garbage_frac < f64::INFINITY)
            && 0 <= self.min_learnts_lim
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::callbacks::Basic;

    type S = Solver<Basic>;

    fn lits(xs: &[i32]) -> Vec<Lit> {
        xs.iter().map(|&i| Lit::from_dimacs(i)).collect()
    }

    fn mk_solver(n: u32, cs: &[&[i32]]) -> S {
        let mut s = S::default();
        for _ in 0..n {
            s.new_var_default();
        }
        for c in cs {
            s.add_clause(&lits(c));
        }
        s
    }

    #[test]
    fn test_luby() {
        let xs: Vec<f64> = (0..15).map(|i| utils::luby(2.0, i)).collect();
        assert_eq!(
            xs,
            vec![1., 1., 2., 1., 1., 2., 4., 1., 1., 2., 1., 1., 2., 4., 8.]
        );
        assert_eq!(utils::luby(3.0, 2), 3.0);
    }

    #[test]
    fn test_drand_deterministic() {
        let mut s1 = 91648253.0;
        let mut s2 = 91648253.0;
        for _ in 0..100 {
            let x = utils::drand(&mut s1);
            assert!(0.0 <= x && x < 1.0);
            assert_eq!(x, utils::drand(&mut s2));
        }
        for _ in 0..100 {
            let i = utils::irand(&mut s1, 7);
            assert!(0 <= i && i < 7);
        }
    }

    #[test]
    fn test_vars_start_at_one() {
        let mut s = S::default();
        assert_eq!(s.num_vars(), 0);
        let v = s.new_var_default();
        assert_eq!(v.idx(), 1);
        assert_eq!(s.var_of_int(4).idx(), 4);
        assert_eq!(s.num_vars(), 4);
    }

    #[test]
    fn test_add_clause_normalizes() {
        let mut s = mk_solver(3, &[]);
        // tautology: not stored
        assert!(s.add_clause(&lits(&[1, -1, 2])));
        assert_eq!(s.num_clauses(), 0);
        // duplicates are merged
        assert!(s.add_clause(&lits(&[1, 2, 1])));
        assert_eq!(s.num_clauses(), 1);
        assert_eq!(s.v.ca[s.clauses[0]].size(), 2);
        // unit: enqueued and propagated
        assert!(s.add_clause(&lits(&[-1])));
        assert_eq!(s.value_lvl_0(Lit::from_dimacs(2)), LBool::TRUE);
        // satisfied at level 0: dropped
        assert!(s.add_clause(&lits(&[2, 3])));
        assert_eq!(s.num_clauses(), 1);
        // false literals are removed, empty clause makes the solver unsat
        assert!(!s.add_clause(&lits(&[1, -2])));
        assert!(!s.is_ok());
        assert!(!s.add_clause(&lits(&[3])));
    }

    #[test]
    fn test_solve_small_sat() {
        let mut s = mk_solver(3, &[&[1, 2], &[-1, 3], &[-2, -3], &[2, 3]]);
        assert!(s.solve(&[]));
        let m = s.get_model().to_vec();
        assert_eq!(m.len(), 4);
        for c in &[&[1, 2][..], &[-1, 3], &[-2, -3], &[2, 3]] {
            assert!(c.iter().any(|&l| s.value_lit(Lit::from_dimacs(l)) == LBool::TRUE));
        }
    }

    #[test]
    fn test_solve_unsat_needs_learning() {
        // all 8 clauses over 3 variables
        let mut cs = vec![];
        for mask in 0..8 {
            let c: Vec<i32> = (0..3)
                .map(|i| if mask & (1 << i) != 0 { i + 1 } else { -(i + 1) })
                .collect();
            cs.push(c);
        }
        let cs: Vec<&[i32]> = cs.iter().map(|c| &c[..]).collect();
        let mut s = mk_solver(3, &cs);
        assert!(!s.solve(&[]));
        assert!(!s.is_ok());
        assert!(s.num_conflicts() > 0);
        // stays unsat
        assert_eq!(s.solve_limited(&[]), LBool::FALSE);
    }

    #[test]
    fn test_assumptions_conflict() {
        let mut s = mk_solver(3, &[&[-1, 2], &[-2, 3]]);
        let a = Lit::from_dimacs(1);
        let b = Lit::from_dimacs(-3);
        assert_eq!(s.solve_limited(&[a, b]), LBool::FALSE);
        assert!(s.is_ok());
        let core = s.unsat_core().to_vec();
        assert!(core.contains(&!a));
        assert!(core.contains(&!b));
        assert!(s.unsat_core_contains_var(a.var()));
        // without assumptions, still sat
        assert!(s.solve(&[]));
        assert!(s.unsat_core().is_empty());
    }

    #[test]
    fn test_simplify_is_idempotent() {
        let mut s = mk_solver(4, &[&[1, 2], &[1, 3, 4], &[-2, 3, 4], &[2, -4]]);
        assert!(s.add_clause(&lits(&[1])));
        assert!(s.simplify());
        let n = s.num_clauses();
        assert_eq!(n, 2);
        assert_eq!(s.num_removed_satisfied(), 2);
        assert!(s.simplify());
        assert_eq!(s.num_clauses(), n);
        assert_eq!(s.num_removed_satisfied(), 2);
        assert!(s.solve(&[]));
    }

    #[test]
    fn test_removed_clauses_leave_watch_lists() {
        let opts = SolverOpts {
            garbage_frac: 1e9,
            ..SolverOpts::default()
        };
        let mut s = S::new(opts, Basic::default());
        for _ in 0..6 {
            s.new_var_default();
        }
        let watchers = |s: &S, l: i32| -> Vec<CRef> {
            s.v.watches_data[Lit::from_dimacs(l)]
                .iter()
                .map(|w| w.cref)
                .collect()
        };

        assert!(s.add_clause(&lits(&[1, 2, 3])));
        assert!(s.add_clause(&lits(&[-1, 4, 5])));
        assert!(s.add_clause(&lits(&[2, 4, 6])));
        let (a, c) = (s.clauses[0], s.clauses[2]);
        assert!(watchers(&s, -1).contains(&a));
        assert!(watchers(&s, -2).contains(&a));

        // `1` satisfies the first clause, `simplify` drops it lazily
        assert!(s.add_clause(&lits(&[1])));
        assert!(s.simplify());
        assert_eq!(s.num_clauses(), 2);
        assert_eq!(s.num_removed_satisfied(), 1);
        assert_eq!(s.v.ca[a].mark(), 1);
        assert!(s.v.watches_data.is_dirty(Lit::from_dimacs(-1)));
        assert!(watchers(&s, -1).contains(&a));

        assert!(s.v.watches().lookup(Lit::from_dimacs(-1)).iter().all(|w| w.cref != a));
        assert!(!s.v.watches_data.is_dirty(Lit::from_dimacs(-1)));
        assert!(s.v.watches_data.is_dirty(Lit::from_dimacs(-2)));
        s.v.watches().clean_all();
        assert!(!s.v.watches_data.is_dirty(Lit::from_dimacs(-2)));
        assert_eq!(watchers(&s, -2), vec![c]);

        // explicit removal of a live clause
        s.v.remove_clause(c, &mut NoHooks);
        s.clauses.retain(|&x| x != c);
        assert_eq!(s.num_clauses(), 1);
        assert!(s.v.watches().lookup(Lit::from_dimacs(-2)).is_empty());
        assert!(s.v.watches().lookup(Lit::from_dimacs(-4)).iter().all(|w| w.cref != c));

        assert!(s.solve(&[]));
        assert_eq!(s.value_lit(Lit::from_dimacs(1)), LBool::TRUE);
    }

    #[test]
    fn test_implies() {
        let mut s = mk_solver(4, &[&[-1, 2], &[-2, 3], &[-3, -1, 4]]);
        let out = s.implies(&lits(&[1])).expect("no conflict");
        assert_eq!(out, lits(&[2, 3, 4]));
        assert_eq!(s.decision_level(), 0);
        assert_eq!(s.v.value(Var::new(2)), LBool::UNDEF);

        assert!(s.add_clause(&lits(&[-4])));
        assert_eq!(s.implies(&lits(&[1])), None);
        assert_eq!(s.implies(&lits(&[4])), None);
    }

    #[test]
    fn test_release_var_recycles() {
        let mut s = mk_solver(3, &[&[1, 2, 3], &[-1, 2]]);
        s.release_var(Lit::from_dimacs(1));
        assert!(s.simplify());
        // `1` satisfied the first clause; the second one is gone too
        assert_eq!(s.num_clauses(), 0);
        let v = s.new_var_default();
        assert_eq!(v.idx(), 1);
        assert_eq!(s.num_vars(), 3);
        assert_eq!(s.v.value(v), LBool::UNDEF);
        assert!(s.add_clause(&lits(&[-1, -2])));
        assert!(s.solve(&[]));
    }

    #[test]
    fn test_budget_and_interrupt() {
        let mut s = mk_solver(2, &[&[1, 2]]);
        s.interrupt();
        assert_eq!(s.solve_limited(&[]), LBool::UNDEF);
        s.clear_interrupt();
        assert_eq!(s.solve_limited(&[]), LBool::TRUE);

        s.set_conf_budget(0);
        s.set_prop_budget(0);
        assert_eq!(s.solve_limited(&[]), LBool::UNDEF);
        s.budget_off();
        assert_eq!(s.solve_limited(&[]), LBool::TRUE);
    }

    #[test]
    fn test_stop_callback() {
        let mut s = mk_solver(2, &[&[1, 2]]);
        s.cb_mut().set_stop(|| true);
        assert_eq!(s.solve_limited(&[]), LBool::UNDEF);
    }

    #[test]
    fn test_dimacs_model() {
        let mut s = mk_solver(2, &[&[1], &[-2]]);
        assert!(s.solve(&[]));
        assert_eq!(format!("{}", s.dimacs_model()), "v 1 -2 0\n");
    }

    #[test]
    fn test_user_polarity() {
        let mut s = mk_solver(2, &[&[1, 2]]);
        s.set_polarity(Var::new(1), LBool::TRUE);
        s.set_polarity(Var::new(2), LBool::FALSE);
        assert!(s.solve(&[]));
        assert_eq!(s.value_var(Var::new(1)), LBool::TRUE);
        assert_eq!(s.value_var(Var::new(2)), LBool::FALSE);
    }

    #[test]
    fn test_opts_check() {
        assert!(SolverOpts::default().check());
        let mut o = SolverOpts::default();
        o.var_decay = 1.5;
        assert!(!o.check());
        assert_eq!(CCMin::from_level(1), Some(CCMin::Basic));
        assert_eq!(CCMin::from_level(3), None);
    }

    #[test]
    fn test_minimization_modes_agree() {
        // pigeons 3 into 2 holes
        let mut cs: Vec<Vec<i32>> = vec![];
        let var = |p: i32, h: i32| p * 2 + h + 1;
        for p in 0..3 {
            cs.push((0..2).map(|h| var(p, h)).collect());
        }
        for h in 0..2 {
            for p in 0..3 {
                for q in p + 1..3 {
                    cs.push(vec![-var(p, h), -var(q, h)]);
                }
            }
        }
        for &mode in &[CCMin::None, CCMin::Basic, CCMin::Deep] {
            let mut opts = SolverOpts::default();
            opts.ccmin_mode = mode;
            let mut s = S::new(opts, Basic::new());
            for c in &cs {
                let c: Vec<Lit> = c.iter().map(|&i| Lit::from_dimacs(i)).collect();
                for l in &c {
                    s.var_of_int(l.var().idx());
                }
                s.add_clause(&c);
            }
            assert!(!s.solve(&[]), "mode {:?}", mode);
        }
    }
}
