/*****************************************************************************************[simp.rs]
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

//! Preprocessing on top of the core solver: subsumption, self-subsuming
//! resolution, asymmetric branching and bounded variable elimination.

use {
    crate::callbacks::Callbacks,
    crate::clause::{
        CRef, Clause, ClauseAllocator, DeletePred, LBool, LMap, Lit, OccListsData, Subsumption,
        VMap, Var,
    },
    crate::core::{Solver, SolverOpts},
    crate::hooks::Hooks,
    crate::interface::SolverInterface,
    crate::intmap::{AsIndex, Comparator, Heap, HeapData},
    crate::queue::ClauseQueue,
    std::{cmp, ops},
};

/// Options of the preprocessor.
#[derive(Debug, Clone)]
pub struct SimpOpts {
    /// Allow a variable elimination step to grow by a number of clauses.
    pub grow: i32,
    /// Variables are not eliminated if it produces a resolvent with a length
    /// above this limit. -1 means no limit.
    pub clause_lim: i32,
    /// Do not check if subsumption against a clause larger than this. -1 means no limit.
    pub subsumption_lim: i32,
    /// A different limit for when to issue a GC during simplification.
    pub simp_garbage_frac: f64,
    /// Shrink clauses by asymmetric branching.
    pub use_asymm: bool,
    /// Check if a clause is already implied. Costly, and subsumes subsumptions.
    pub use_rcheck: bool,
    /// Perform variable elimination.
    pub use_elim: bool,
    /// Compute values of eliminated variables in the model.
    pub extend_model: bool,
}

impl Default for SimpOpts {
    fn default() -> Self {
        SimpOpts {
            grow: 0,
            clause_lim: 20,
            subsumption_lim: 1000,
            simp_garbage_frac: 0.5,
            use_asymm: false,
            use_rcheck: false,
            use_elim: true,
            extend_model: true,
        }
    }
}

impl SimpOpts {
    /// Check that options are valid.
    pub fn check(&self) -> bool {
        0 <= self.grow
            && -1 <= self.clause_lim
            && -1 <= self.subsumption_lim
            && (0.0 < self.simp_garbage_frac && self.simp_garbage_frac < f64::INFINITY)
    }
}

/// A solver with preprocessing.
///
/// Dereferences to the core `Solver`, which owns the clauses; the
/// preprocessor keeps occurrence lists into the same clause allocator and
/// is notified of removals and relocations through `Hooks`.
pub struct SimpSolver<Cb: Callbacks> {
    core: Solver<Cb>,
    simp: SimpData,
}

/// State of the preprocessor.
pub(crate) struct SimpData {
    grow: i32,
    clause_lim: i32,
    subsumption_lim: i32,
    simp_garbage_frac: f64,
    use_asymm: bool,
    use_rcheck: bool,
    use_elim: bool,
    extend_model: bool,

    // Statistics:
    merges: u64,
    asymm_lits: u64,
    eliminated_vars: u64,

    use_simplification: bool,
    /// Clauses of eliminated variables, as runs of literal indices each
    /// followed by its length. The eliminated literal comes first in its run.
    elimclauses: Vec<u32>,
    touched: VMap<bool>,
    occurs: OccListsData<Var, CRef>,
    n_occ: LMap<i32>,
    elim_heap: HeapData<Var>,
    subsumption_queue: ClauseQueue,
    frozen: VMap<bool>,
    eliminated: VMap<bool>,
    bwdsub_assigns: usize,
    n_touched: usize,
    /// Unit clause used to check level 0 literals for subsumption.
    bwdsub_tmpunit: CRef,
}

/// Variables with fewer potential resolvents come first.
struct ElimOrder<'a> {
    n_occ: &'a LMap<i32>,
}

impl<'a> ElimOrder<'a> {
    #[inline]
    fn cost(&self, v: Var) -> u64 {
        let pos = self.n_occ[Lit::new(v, true)].max(0) as u64;
        let neg = self.n_occ[Lit::new(v, false)].max(0) as u64;
        pos * neg
    }
}

impl<'a> Comparator<Var> for ElimOrder<'a> {
    fn cmp(&self, lhs: &Var, rhs: &Var) -> cmp::Ordering {
        self.cost(*lhs).cmp(&self.cost(*rhs))
    }
}

struct ClauseDeleted<'a> {
    ca: &'a ClauseAllocator,
}

impl<'a> DeletePred<CRef> for ClauseDeleted<'a> {
    #[inline]
    fn deleted(&self, cr: &CRef) -> bool {
        self.ca[*cr].mark() == 1
    }
}

impl SimpData {
    fn new(opts: &SimpOpts) -> Self {
        SimpData {
            grow: opts.grow,
            clause_lim: opts.clause_lim,
            subsumption_lim: opts.subsumption_lim,
            simp_garbage_frac: opts.simp_garbage_frac,
            use_asymm: opts.use_asymm,
            use_rcheck: opts.use_rcheck,
            use_elim: opts.use_elim,
            extend_model: opts.extend_model,
            merges: 0,
            asymm_lits: 0,
            eliminated_vars: 0,
            use_simplification: true,
            elimclauses: vec![],
            touched: VMap::new(),
            occurs: OccListsData::new(),
            n_occ: LMap::new(),
            elim_heap: HeapData::new(),
            subsumption_queue: ClauseQueue::new(),
            frozen: VMap::new(),
            eliminated: VMap::new(),
            bwdsub_assigns: 0,
            n_touched: 0,
            bwdsub_tmpunit: CRef::UNDEF,
        }
    }

    fn elim_heap(&mut self) -> Heap<Var, ElimOrder> {
        self.elim_heap.promote(ElimOrder { n_occ: &self.n_occ })
    }

    fn update_elim_heap(&mut self, v: Var, assigns: &VMap<LBool>) {
        debug_assert!(self.use_simplification);
        if self.elim_heap.in_heap(v)
            || (!self.frozen[v] && !self.eliminated[v] && assigns[v] == LBool::UNDEF)
        {
            self.elim_heap().update(v);
        }
    }
}

impl Hooks for SimpData {
    fn on_remove_clause(&mut self, c: &Clause, assigns: &VMap<LBool>) {
        if !self.use_simplification || c.learnt() {
            return;
        }
        for &lit in c.iter() {
            self.n_occ[lit] -= 1;
            self.update_elim_heap(lit.var(), assigns);
            self.occurs.smudge(lit.var());
        }
    }

    fn reloc_all(&mut self, from: &mut ClauseAllocator, to: &mut ClauseAllocator) {
        if !self.use_simplification {
            return;
        }

        // All occurrence lists:
        self.occurs.clean_all_pred(&ClauseDeleted { ca: from });
        for (_, cs) in self.occurs.iter_mut() {
            for cr in cs.iter_mut() {
                from.reloc(cr, to);
            }
        }

        // Subsumption queue:
        self.subsumption_queue.retain_map(|mut cr| {
            if from[cr].mark() != 0 {
                None
            } else {
                from.reloc(&mut cr, to);
                Some(cr)
            }
        });

        // Temporary clause:
        from.reloc(&mut self.bwdsub_tmpunit, to);
    }
}

impl<Cb: Callbacks> ops::Deref for SimpSolver<Cb> {
    type Target = Solver<Cb>;
    fn deref(&self) -> &Solver<Cb> {
        &self.core
    }
}

impl<Cb: Callbacks> ops::DerefMut for SimpSolver<Cb> {
    fn deref_mut(&mut self) -> &mut Solver<Cb> {
        &mut self.core
    }
}

impl<Cb: Callbacks + Default> Default for SimpSolver<Cb> {
    fn default() -> Self {
        SimpSolver::new(SolverOpts::default(), SimpOpts::default(), Default::default())
    }
}

impl<Cb: Callbacks> SolverInterface for SimpSolver<Cb> {
    fn num_vars(&self) -> u32 {
        self.core.num_vars()
    }
    fn num_clauses(&self) -> u64 {
        self.core.num_clauses()
    }
    fn num_conflicts(&self) -> u64 {
        self.core.num_conflicts()
    }
    fn num_propagations(&self) -> u64 {
        self.core.num_propagations()
    }
    fn num_decisions(&self) -> u64 {
        self.core.num_decisions()
    }
    fn num_restarts(&self) -> u64 {
        self.core.num_restarts()
    }
    fn is_ok(&self) -> bool {
        self.core.is_ok()
    }

    fn print_stats(&self) {
        self.core.print_stats();
        println!("c eliminated vars       : {}", self.simp.eliminated_vars);
        println!("c merges                : {}", self.simp.merges);
        println!("c asymm lits            : {}", self.simp.asymm_lits);
    }

    fn new_var(&mut self, upol: LBool, dvar: bool) -> Var {
        let v = self.core.new_var(upol, dvar);
        self.simp.frozen.insert_default(v, false);
        self.simp.eliminated.insert_default(v, false);

        if self.simp.use_simplification {
            self.simp.n_occ.insert_default(Lit::new(v, true), 0);
            self.simp.n_occ.insert_default(Lit::new(v, false), 0);
            self.simp.occurs.init(v);
            self.simp.touched.insert_default(v, false);
            if !self.simp.elim_heap.in_heap(v) {
                self.simp.elim_heap().insert(v);
            }
        }
        v
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

    fn add_clause_reuse(&mut self, clause: &mut Vec<Lit>) -> bool {
        assert_eq!(
            self.core.decision_level(),
            0,
            "clauses can only be added at level 0"
        );
        for &lit in clause.iter() {
            assert!(
                !self.is_eliminated(lit.var()),
                "clause {:?} mentions eliminated variable {:?}",
                clause,
                lit.var()
            );
        }
        clause.sort_unstable();
        self.add_clause_(clause)
    }

    fn simplify(&mut self) -> bool {
        self.core.simplify_internal(&mut self.simp)
    }

    fn solve_limited(&mut self, assumps: &[Lit]) -> LBool {
        self.solve_limited_simp(assumps, true, false)
    }

    fn solve(&mut self, assumps: &[Lit]) -> bool {
        self.core.budget_off();
        self.solve_limited(assumps) == LBool::TRUE
    }

    fn interrupt(&self) {
        self.core.interrupt()
    }
    fn clear_interrupt(&self) {
        self.core.clear_interrupt()
    }
    fn proved_at_lvl_0(&self) -> &[Lit] {
        self.core.proved_at_lvl_0()
    }
    fn get_model(&self) -> &[LBool] {
        self.core.get_model()
    }
    fn value_var(&self, v: Var) -> LBool {
        self.core.value_var(v)
    }
    fn value_lit(&self, lit: Lit) -> LBool {
        self.core.value_lit(lit)
    }
    fn value_lvl_0(&self, lit: Lit) -> LBool {
        self.core.value_lvl_0(lit)
    }
    fn unsat_core(&self) -> &[Lit] {
        self.core.unsat_core()
    }
    fn unsat_core_contains_lit(&self, lit: Lit) -> bool {
        self.core.unsat_core_contains_lit(lit)
    }
}

impl<Cb: Callbacks> SimpSolver<Cb> {
    /// Create a new preprocessing solver.
    ///
    /// Panics if the options are out of range.
    pub fn new(opts: SolverOpts, simp_opts: SimpOpts, cb: Cb) -> Self {
        assert!(simp_opts.check(), "invalid options {:?}", simp_opts);
        let mut core = Solver::new(opts, cb);
        let mut simp = SimpData::new(&simp_opts);
        core.v.ca.set_extra_clause_field(true); // NOTE: must happen before allocating the dummy clause below.
        core.v.remove_satisfied = false;
        simp.bwdsub_tmpunit = core
            .v
            .ca
            .alloc_with_learnt(&[Lit::new(Var::from_idx(1), true)], false);
        SimpSolver { core, simp }
    }

    /// Is the variable eliminated (and thus absent from the residual problem)?
    pub fn is_eliminated(&self, v: Var) -> bool {
        self.simp.eliminated.has(v) && self.simp.eliminated[v]
    }

    pub fn is_frozen(&self, v: Var) -> bool {
        self.simp.frozen.has(v) && self.simp.frozen[v]
    }

    /// A frozen variable is never eliminated.
    pub fn set_frozen(&mut self, v: Var, b: bool) {
        self.simp.frozen[v] = b;
        if self.simp.use_simplification && !b {
            self.simp.update_elim_heap(v, &self.core.v.vars.ass);
        }
    }

    /// Protect `v` from elimination, so it can be used in later
    /// assumptions or clauses.
    pub fn freeze(&mut self, v: Var) {
        self.set_frozen(v, true)
    }

    pub fn num_eliminated_vars(&self) -> u64 {
        self.simp.eliminated_vars
    }

    pub fn num_merges(&self) -> u64 {
        self.simp.merges
    }

    pub fn num_asymm_lits(&self) -> u64 {
        self.simp.asymm_lits
    }

    /// Is the preprocessor still active?
    pub fn use_simplification(&self) -> bool {
        self.simp.use_simplification
    }

    /// Solve under `assumps`. With `do_simp`, run `eliminate` first, with
    /// the assumption variables frozen; with `turn_off_simp`, the
    /// preprocessor is disabled for good afterwards.
    pub fn solve_limited_simp(
        &mut self,
        assumps: &[Lit],
        do_simp: bool,
        turn_off_simp: bool,
    ) -> LBool {
        let mut extra_frozen: Vec<Var> = vec![];
        let mut result = LBool::TRUE;
        let do_simp = do_simp && self.simp.use_simplification;

        if do_simp {
            // Assumptions must be temporarily frozen to run variable elimination:
            for &lit in assumps {
                let v = lit.var();
                assert!(!self.is_eliminated(v), "assumption on eliminated variable {:?}", v);
                if !self.simp.frozen[v] {
                    // Freeze and store.
                    self.set_frozen(v, true);
                    extra_frozen.push(v);
                }
            }
            result = LBool::from(self.eliminate(turn_off_simp));
        }

        if result == LBool::TRUE {
            self.core.v.assumptions.clear();
            self.core.v.assumptions.extend_from_slice(assumps);
            result = self.core.solve_internal(&mut self.simp);
        } else {
            self.core.model.clear();
            self.core.conflict.clear();
            debug!("unsat during preprocessing");
        }

        if result == LBool::TRUE && self.simp.extend_model {
            self.extend_model();
        }

        if do_simp {
            // Unfreeze the assumptions that were frozen:
            for v in extra_frozen {
                self.set_frozen(v, false);
            }
        }

        result
    }

    /// Perform variable elimination based simplification.
    ///
    /// With `turn_off_elim`, all preprocessing data is released and the
    /// preprocessor is disabled afterwards. Returns `false` if the problem
    /// was found unsatisfiable.
    pub fn eliminate(&mut self, turn_off_elim: bool) -> bool {
        if !self.simplify() {
            return false;
        } else if !self.simp.use_simplification {
            return true;
        }

        if !self.eliminate_loop() {
            self.core.v.ok = false;
        }

        // If no more simplification is needed, free all simplification-related data structures:
        if turn_off_elim {
            self.turn_off_simp();
        } else {
            // Cheaper cleanup:
            self.core.check_garbage(&mut self.simp);
        }

        if !self.simp.elimclauses.is_empty() {
            info!(
                "eliminated {} vars, {} literals kept for model extension",
                self.simp.eliminated_vars,
                self.simp.elimclauses.len()
            );
        }

        self.core.v.ok
    }

    /// Main simplification loop; `false` means unsat.
    fn eliminate_loop(&mut self) -> bool {
        while self.simp.n_touched > 0
            || self.simp.bwdsub_assigns < self.core.v.vars.trail.len()
            || !self.simp.elim_heap.is_empty()
        {
            self.gather_touched_clauses();

            trace!(
                "subsumption queue: {}, elim heap: {}",
                self.simp.subsumption_queue.len(),
                self.simp.elim_heap.len()
            );
            if (!self.simp.subsumption_queue.is_empty()
                || self.simp.bwdsub_assigns < self.core.v.vars.trail.len())
                && !self.backward_subsumption_check(true)
            {
                return false;
            }

            // Empty elim_heap and return immediately on user-interrupt:
            if self.core.interrupted() {
                debug_assert_eq!(self.simp.bwdsub_assigns, self.core.v.vars.trail.len());
                debug_assert!(self.simp.subsumption_queue.is_empty());
                debug_assert_eq!(self.simp.n_touched, 0);
                self.simp.elim_heap.clear(false);
                return true;
            }

            let mut cnt = 0;
            while !self.core.interrupted() {
                let elim = match self.simp.elim_heap().remove_min() {
                    Some(v) => v,
                    None => break,
                };

                if self.simp.eliminated[elim] || self.core.v.value(elim) != LBool::UNDEF {
                    continue;
                }

                if cnt % 100 == 0 {
                    trace!("elimination left: {}", self.simp.elim_heap.len());
                }

                if self.simp.use_asymm {
                    // Temporarily freeze variable. Otherwise, it would immediately end up on the queue again:
                    let was_frozen = self.simp.frozen[elim];
                    self.simp.frozen[elim] = true;
                    if !self.asymm_var(elim) {
                        return false;
                    }
                    self.simp.frozen[elim] = was_frozen;
                }

                // At this point, the variable may have been set by assymetric branching, so check it
                // again. Also, don't eliminate frozen variables:
                if self.simp.use_elim
                    && self.core.v.value(elim) == LBool::UNDEF
                    && !self.simp.frozen[elim]
                    && !self.eliminate_var(elim)
                {
                    return false;
                }

                let gf = self.simp.simp_garbage_frac;
                self.core.check_garbage_frac(gf, &mut self.simp);
                cnt += 1;
            }

            debug_assert!(self.simp.subsumption_queue.is_empty());
        }
        true
    }

    /// Release the preprocessing data, and make the core solver behave
    /// as a plain solver again.
    fn turn_off_simp(&mut self) {
        self.simp.touched.free();
        self.simp.occurs.clear(true);
        self.simp.n_occ.free();
        self.simp.elim_heap.clear(true);
        self.simp.subsumption_queue.clear();

        self.simp.use_simplification = false;
        self.simp.bwdsub_tmpunit = CRef::UNDEF;
        self.core.v.remove_satisfied = true;
        self.core.v.ca.set_extra_clause_field(false);

        // Force full cleanup (this is safe and desirable since it only happens once):
        self.core.v.rebuild_order_heap();
        self.core.garbage_collect(&mut self.simp);
    }

    /// Add a sorted clause at level 0, registering it in the occurrence
    /// lists if it is actually stored.
    fn add_clause_(&mut self, clause: &mut Vec<Lit>) -> bool {
        let nclauses = self.core.clauses.len();

        if self.simp.use_rcheck && self.implied(clause) {
            return true;
        }

        if !self.core.add_clause_(clause) {
            return false;
        }

        if self.simp.use_simplification && self.core.clauses.len() == nclauses + 1 {
            let cr = self.core.clauses[nclauses];
            // Queued now and again by `gather_touched_clauses`; the mark
            // trick there avoids checking it twice if nothing changed.
            self.simp.subsumption_queue.insert(cr);
            for &lit in self.core.v.ca[cr].lits() {
                let v = lit.var();
                self.simp.occurs.push(v, cr);
                self.simp.n_occ[lit] += 1;
                self.simp.touched[v] = true;
                self.simp.n_touched += 1;
                if self.simp.elim_heap.in_heap(v) {
                    self.simp.elim_heap().increase(v);
                }
            }
        }

        true
    }

    fn remove_clause(&mut self, cr: CRef) {
        self.core.v.remove_clause(cr, &mut self.simp);
    }

    /// Remove `l` from clause `cr`; `false` if this leads to a conflict.
    fn strengthen_clause(&mut self, cr: CRef, l: Lit) -> bool {
        debug_assert_eq!(self.core.decision_level(), 0);
        debug_assert!(self.simp.use_simplification);

        // may queue `cr` twice
        self.simp.subsumption_queue.insert(cr);

        if self.core.v.ca[cr].size() == 2 {
            self.remove_clause(cr);
            self.core.v.ca[cr].strengthen(l);
        } else {
            self.core.v.detach_clause(cr, true);
            self.core.v.ca[cr].strengthen(l);
            self.core.v.ca.free_amount(1);
            self.core.v.attach_clause(cr);
            self.simp.occurs.remove(l.var(), &cr);
            self.simp.n_occ[l] -= 1;
            self.simp.update_elim_heap(l.var(), &self.core.v.vars.ass);
        }

        if self.core.v.ca[cr].size() == 1 {
            let unit = self.core.v.ca[cr][0];
            self.core.v.enqueue(unit, CRef::UNDEF) && self.core.v.propagate().is_none()
        } else {
            true
        }
    }

    /// Resolve the clauses `ps` and `qs` on `v` into `out`. Returns `false`
    /// if the resolvent is a tautology.
    fn merge(&mut self, ps: CRef, qs: CRef, v: Var, out: &mut Vec<Lit>) -> bool {
        self.simp.merges += 1;
        out.clear();

        let ca = &self.core.v.ca;
        let (ps, qs) = if ca[ps].size() < ca[qs].size() {
            (&ca[qs], &ca[ps])
        } else {
            (&ca[ps], &ca[qs])
        };

        'qs: for &q in qs.iter() {
            if q.var() != v {
                for &p in ps.iter() {
                    if p.var() == q.var() {
                        if p == !q {
                            return false;
                        } else {
                            continue 'qs;
                        }
                    }
                }
                out.push(q);
            }
        }

        for &p in ps.iter() {
            if p.var() != v {
                out.push(p);
            }
        }

        true
    }

    /// Like `merge`, but only computes the size of the resolvent.
    fn merge_size(&mut self, ps: CRef, qs: CRef, v: Var, size: &mut usize) -> bool {
        self.simp.merges += 1;

        let ca = &self.core.v.ca;
        let (ps, qs) = if ca[ps].size() < ca[qs].size() {
            (&ca[qs], &ca[ps])
        } else {
            (&ca[ps], &ca[qs])
        };

        *size = ps.size() as usize - 1;

        'qs: for &q in qs.iter() {
            if q.var() != v {
                for &p in ps.iter() {
                    if p.var() == q.var() {
                        if p == !q {
                            return false;
                        } else {
                            continue 'qs;
                        }
                    }
                }
                *size += 1;
            }
        }

        true
    }

    /// Put all the clauses of touched variables in the subsumption queue.
    fn gather_touched_clauses(&mut self) {
        if self.simp.n_touched == 0 {
            return;
        }

        let num_vars = self.core.v.num_vars();
        let ca = &mut self.core.v.ca;
        for cr in self.simp.subsumption_queue.iter() {
            if ca[cr].mark() == 0 {
                ca[cr].set_mark(2);
            }
        }

        for v in (1..=num_vars).map(Var::from_idx) {
            if self.simp.touched[v] {
                let cs = self
                    .simp
                    .occurs
                    .lookup_mut_pred(v, &ClauseDeleted { ca: &*ca });
                for &cr in cs.iter() {
                    if ca[cr].mark() == 0 {
                        self.simp.subsumption_queue.insert(cr);
                        ca[cr].set_mark(2);
                    }
                }
                self.simp.touched[v] = false;
            }
        }

        for cr in self.simp.subsumption_queue.iter() {
            if ca[cr].mark() == 2 {
                ca[cr].set_mark(0);
            }
        }

        self.simp.n_touched = 0;
    }

    /// Is the clause `c` implied by unit propagation?
    fn implied(&mut self, c: &[Lit]) -> bool {
        debug_assert_eq!(self.core.decision_level(), 0);

        self.core.v.vars.new_decision_level();
        for &lit in c {
            let val = self.core.v.value_lit(lit);
            if val == LBool::TRUE {
                self.core.v.cancel_until(0);
                return true;
            } else if val != LBool::FALSE {
                self.core.v.vars.unchecked_enqueue(!lit, CRef::UNDEF);
            }
        }

        let result = self.core.v.propagate().is_some();
        self.core.v.cancel_until(0);
        result
    }

    /// Backward subsumption + backward subsumption resolution.
    ///
    /// Returns `false` if the problem became unsatisfiable.
    fn backward_subsumption_check(&mut self, verbose: bool) -> bool {
        let mut cnt = 0;
        let mut subsumed = 0;
        let mut deleted_literals = 0;
        debug_assert_eq!(self.core.decision_level(), 0);

        while !self.simp.subsumption_queue.is_empty()
            || self.simp.bwdsub_assigns < self.core.v.vars.trail.len()
        {
            // Empty subsumption queue and return immediately on user-interrupt:
            if self.core.interrupted() {
                self.simp.subsumption_queue.clear();
                self.simp.bwdsub_assigns = self.core.v.vars.trail.len();
                break;
            }

            // Check top-level assignments by creating a dummy clause and placing it in the queue:
            if self.simp.subsumption_queue.is_empty()
                && self.simp.bwdsub_assigns < self.core.v.vars.trail.len()
            {
                let l = self.core.v.vars.trail[self.simp.bwdsub_assigns];
                self.simp.bwdsub_assigns += 1;
                let tmp = &mut self.core.v.ca[self.simp.bwdsub_tmpunit];
                tmp[0] = l;
                tmp.calc_abstraction();
                self.simp.subsumption_queue.insert(self.simp.bwdsub_tmpunit);
            }

            let cr = self.simp.subsumption_queue.pop();
            if self.core.v.ca[cr].mark() != 0 {
                continue;
            }

            if verbose && cnt % 1000 == 0 {
                trace!(
                    "subsumption left: {:10} ({:10} subsumed, {:10} deleted literals)",
                    self.simp.subsumption_queue.len(),
                    subsumed,
                    deleted_literals
                );
            }
            cnt += 1;

            // Unit-clauses should have been propagated before this point.
            debug_assert!(
                self.core.v.ca[cr].size() > 1
                    || self.core.v.value_lit(self.core.v.ca[cr][0]) == LBool::TRUE
            );

            // Find best variable to scan:
            let best = {
                let c = &self.core.v.ca[cr];
                let mut best = c[0].var();
                for &lit in &c.lits()[1..] {
                    if self.simp.occurs[lit.var()].len() < self.simp.occurs[best].len() {
                        best = lit.var();
                    }
                }
                best
            };

            // Search all candidates:
            self.simp
                .occurs
                .lookup_mut_pred(best, &ClauseDeleted { ca: &self.core.v.ca });
            let mut j = 0;
            while j < self.simp.occurs[best].len() {
                if self.core.v.ca[cr].mark() != 0 {
                    break;
                }
                let other = self.simp.occurs[best][j];
                let ca = &self.core.v.ca;
                if ca[other].mark() == 0
                    && other != cr
                    && (self.simp.subsumption_lim == -1
                        || (ca[other].size() as i32) < self.simp.subsumption_lim)
                {
                    match ca[cr].subsumes(&ca[other]) {
                        Subsumption::No => (),
                        Subsumption::Full => {
                            subsumed += 1;
                            self.remove_clause(other);
                        }
                        Subsumption::Strengthen(l) => {
                            deleted_literals += 1;
                            if !self.strengthen_clause(other, !l) {
                                return false;
                            }
                            // Did current candidate get deleted from cs? Then check candidate at index j again:
                            if l.var() == best {
                                continue;
                            }
                        }
                    }
                }
                j += 1;
            }
        }

        debug!(
            "backward subsumption: {} subsumed, {} deleted literals",
            subsumed, deleted_literals
        );
        true
    }

    /// Asymmetric branching on `v` in clause `cr`: if the negation of the
    /// other literals of `cr` propagates to a conflict, the literal of `v`
    /// is redundant.
    fn asymm(&mut self, v: Var, cr: CRef) -> bool {
        debug_assert_eq!(self.core.decision_level(), 0);

        if self.core.v.ca[cr].mark() != 0 || self.core.v.satisfied(cr) {
            return true;
        }

        self.core.v.vars.new_decision_level();
        let mut l = Lit::UNDEF;
        let lits = self.core.v.ca[cr].lits().to_vec();
        for lit in lits {
            if lit.var() != v && self.core.v.value_lit(lit) != LBool::FALSE {
                self.core.v.vars.unchecked_enqueue(!lit, CRef::UNDEF);
            } else {
                l = lit;
            }
        }

        if self.core.v.propagate().is_some() {
            self.core.v.cancel_until(0);
            self.simp.asymm_lits += 1;
            if !self.strengthen_clause(cr, l) {
                return false;
            }
        } else {
            self.core.v.cancel_until(0);
        }

        true
    }

    fn asymm_var(&mut self, v: Var) -> bool {
        debug_assert!(self.simp.use_simplification);

        // strengthening may modify the occurrence list
        let cls = self
            .simp
            .occurs
            .lookup_mut_pred(v, &ClauseDeleted { ca: &self.core.v.ca })
            .clone();
        if self.core.v.value(v) != LBool::UNDEF || cls.is_empty() {
            return true;
        }

        for cr in cls {
            if !self.asymm(v, cr) {
                return false;
            }
        }

        self.backward_subsumption_check(false)
    }

    /// Try to eliminate `v` by clause distribution. Returns `false` if the
    /// problem became unsatisfiable; a variable that is not worth
    /// eliminating is left alone.
    fn eliminate_var(&mut self, v: Var) -> bool {
        assert!(!self.simp.frozen[v], "cannot eliminate frozen {:?}", v);
        assert!(!self.simp.eliminated[v], "{:?} is already eliminated", v);
        assert_eq!(self.core.v.value(v), LBool::UNDEF);

        // Split the occurrences into positive and negative:
        let cls = self
            .simp
            .occurs
            .lookup_mut_pred(v, &ClauseDeleted { ca: &self.core.v.ca })
            .clone();
        let mut pos = vec![];
        let mut neg = vec![];
        for &cr in &cls {
            let c = &self.core.v.ca[cr];
            if let Some(lit) = c.iter().find(|lit| lit.var() == v) {
                if lit.sign() {
                    pos.push(cr);
                } else {
                    neg.push(cr);
                }
            }
        }

        // Check wether the increase in number of clauses stays within the allowed ('grow'). Moreover, no
        // clause must exceed the limit on the maximal clause size (if it is set):
        let mut cnt = 0;
        let mut clause_size = 0;
        for &p in &pos {
            for &n in &neg {
                if self.merge_size(p, n, v, &mut clause_size) {
                    cnt += 1;
                    if cnt > cls.len() + self.simp.grow as usize
                        || (self.simp.clause_lim != -1
                            && clause_size > self.simp.clause_lim as usize)
                    {
                        return true;
                    }
                }
            }
        }

        // Delete and store old clauses:
        self.simp.eliminated[v] = true;
        self.core.set_decision_var(v, false);
        self.simp.eliminated_vars += 1;
        trace!("eliminate {:?} ({} pos, {} neg)", v, pos.len(), neg.len());

        {
            let ca = &self.core.v.ca;
            let elimclauses = &mut self.simp.elimclauses;
            if pos.len() > neg.len() {
                for &cr in &neg {
                    mk_elim_clause(elimclauses, v, &ca[cr]);
                }
                mk_elim_clause_unit(elimclauses, Lit::new(v, true));
            } else {
                for &cr in &pos {
                    mk_elim_clause(elimclauses, v, &ca[cr]);
                }
                mk_elim_clause_unit(elimclauses, Lit::new(v, false));
            }
        }

        for &cr in &cls {
            self.remove_clause(cr);
        }

        // Produce clauses in cross product:
        let mut resolvent = vec![];
        for &p in &pos {
            for &n in &neg {
                if self.merge(p, n, v, &mut resolvent) {
                    resolvent.sort_unstable();
                    if !self.add_clause_(&mut resolvent) {
                        return false;
                    }
                }
            }
        }

        // Free occurs list for this variable:
        self.simp.occurs[v] = Vec::new();

        self.backward_subsumption_check(false)
    }

    /// Give a value to the eliminated variables in the model, such that
    /// the clauses they were eliminated from are satisfied.
    fn extend_model(&mut self) {
        let elimclauses = &self.simp.elimclauses;
        let model = &mut self.core.model;
        let model_value = |model: &Vec<LBool>, lit: Lit| model[lit.var().idx() as usize] ^ !lit.sign();

        let mut i = elimclauses.len() as isize - 1;
        while i > 0 {
            let mut j = elimclauses[i as usize] as isize;
            i -= 1;
            let mut satisfied = false;
            while j > 1 {
                let lit = Lit::from_index(elimclauses[i as usize] as usize);
                if model_value(&*model, lit) != LBool::FALSE {
                    satisfied = true;
                    break;
                }
                j -= 1;
                i -= 1;
            }
            if !satisfied {
                let x = Lit::from_index(elimclauses[i as usize] as usize);
                model[x.var().idx() as usize] = LBool::new(x.sign());
            }
            i -= j;
        }
    }
}

fn mk_elim_clause_unit(elimclauses: &mut Vec<u32>, x: Lit) {
    elimclauses.push(x.idx());
    elimclauses.push(1);
}

fn mk_elim_clause(elimclauses: &mut Vec<u32>, v: Var, c: &Clause) {
    let first = elimclauses.len();
    let mut v_pos = None;

    // Copy clause to elimclauses-vector. Remember position where the
    // variable 'v' occurs:
    for (i, &lit) in c.iter().enumerate() {
        elimclauses.push(lit.idx());
        if lit.var() == v {
            v_pos = Some(first + i);
        }
    }
    let v_pos = match v_pos {
        Some(i) => i,
        None => panic!("{:?} does not occur in {:?}", v, c.lits()),
    };

    // Swap the first literal with the 'v' literal, so that the literal
    // containing 'v' will occur first in the clause:
    elimclauses.swap(first, v_pos);

    // Store the length of the clause last:
    elimclauses.push(c.size());
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::callbacks::Basic;

    type S = SimpSolver<Basic>;

    fn lits(xs: &[i32]) -> Vec<Lit> {
        xs.iter().map(|&i| Lit::from_dimacs(i)).collect()
    }

    fn mk(opts: SimpOpts, n: u32, cs: &[&[i32]]) -> S {
        let mut s = S::new(SolverOpts::default(), opts, Basic::new());
        for _ in 0..n {
            s.new_var_default();
        }
        for c in cs {
            assert!(s.add_clause(&lits(c)));
        }
        s
    }

    fn live_clauses(s: &S) -> Vec<Vec<i32>> {
        let mut res: Vec<Vec<i32>> = s
            .core
            .clauses
            .iter()
            .filter(|&&cr| s.core.v.ca[cr].mark() == 0)
            .map(|&cr| {
                let mut c: Vec<i32> = s.core.v.ca[cr].iter().map(|l| l.to_dimacs()).collect();
                c.sort_unstable();
                c
            })
            .collect();
        res.sort();
        res
    }

    fn check_model(s: &S, cs: &[&[i32]]) {
        for c in cs {
            assert!(
                c.iter()
                    .any(|&i| s.value_lit(Lit::from_dimacs(i)) == LBool::TRUE),
                "clause {:?} not satisfied",
                c
            );
        }
    }

    fn no_elim() -> SimpOpts {
        SimpOpts {
            use_elim: false,
            ..SimpOpts::default()
        }
    }

    #[test]
    fn test_subsumption() {
        let mut s = mk(no_elim(), 3, &[&[1, 2, 3], &[1, 2]]);
        assert!(s.eliminate(false));
        assert_eq!(live_clauses(&s), vec![vec![1, 2]]);
        assert_eq!(s.num_clauses(), 1);
    }

    #[test]
    fn test_self_subsuming_resolution() {
        let mut s = mk(no_elim(), 3, &[&[1, 2], &[-1, 2, 3]]);
        assert!(s.eliminate(false));
        assert_eq!(live_clauses(&s), vec![vec![1, 2], vec![2, 3]]);
    }

    #[test]
    fn test_unit_subsumes() {
        let mut s = mk(no_elim(), 3, &[&[1, 2, 3], &[-1, 2, 3, 4]]);
        assert!(s.add_clause(&lits(&[1])));
        assert!(s.eliminate(false));
        // `1` removes the first clause and strengthens the second one
        assert_eq!(live_clauses(&s), vec![vec![2, 3, 4]]);
    }

    #[test]
    fn test_strengthen_to_unit_conflict() {
        let mut s = mk(no_elim(), 2, &[&[1, 2], &[1, -2], &[-1, 2], &[-1, -2]]);
        assert!(!s.eliminate(false));
        assert!(!s.is_ok());
    }

    #[test]
    fn test_eliminate_and_extend_model() {
        let cs: &[&[i32]] = &[&[1, 2], &[-1, 3], &[-2, -3, 4], &[-4, 1]];
        let mut s = mk(SimpOpts::default(), 4, cs);
        assert!(s.eliminate(true));
        assert!(s.num_eliminated_vars() > 0);
        assert!((1..=4).any(|i| s.is_eliminated(Var::new(i))));
        assert!(!s.use_simplification());
        assert!(s.solve(&[]));
        check_model(&s, cs);
    }

    #[test]
    fn test_frozen_vars_are_kept() {
        let cs: &[&[i32]] = &[&[1, 2], &[-1, 3]];
        let mut s = mk(SimpOpts::default(), 3, cs);
        for i in 1..=3 {
            s.freeze(Var::new(i));
        }
        assert!(s.eliminate(false));
        for i in 1..=3 {
            assert!(!s.is_eliminated(Var::new(i)));
        }
        assert_eq!(s.num_eliminated_vars(), 0);
        assert!(s.solve(&[]));
        check_model(&s, cs);
    }

    #[test]
    fn test_assumptions_are_frozen() {
        let cs: &[&[i32]] = &[&[-1, 2], &[-2, 3]];
        let mut s = mk(SimpOpts::default(), 3, cs);
        let a = Lit::from_dimacs(1);
        let b = Lit::from_dimacs(-3);
        assert_eq!(s.solve_limited(&[a, b]), LBool::FALSE);
        assert!(s.is_ok());
        assert!(!s.is_eliminated(a.var()));
        assert!(!s.is_eliminated(b.var()));
        assert!(!s.is_frozen(a.var()));
        assert!(s.unsat_core_contains_lit(!a));
        assert!(s.unsat_core_contains_lit(!b));
    }

    #[test]
    fn test_asymmetric_branching() {
        let opts = SimpOpts {
            use_asymm: true,
            use_elim: false,
            ..SimpOpts::default()
        };
        let cs: &[&[i32]] = &[&[1, 2, 3], &[1, 5], &[2, -5]];
        let mut s = mk(opts, 5, cs);
        assert!(s.eliminate(false));
        assert!(s.num_asymm_lits() > 0);
        assert!(live_clauses(&s).contains(&vec![1, 2]));
        assert!(s.solve(&[]));
        check_model(&s, cs);
    }

    #[test]
    fn test_rcheck_skips_implied() {
        let opts = SimpOpts {
            use_rcheck: true,
            ..no_elim()
        };
        let mut s = mk(opts, 3, &[&[-1, 2], &[-2, 3]]);
        // implied by the two clauses above
        assert!(s.add_clause(&lits(&[-1, 3])));
        assert_eq!(s.num_clauses(), 2);
    }

    #[test]
    fn test_gc_during_simplification() {
        let opts = SimpOpts {
            simp_garbage_frac: 0.01,
            ..SimpOpts::default()
        };
        let mut cs: Vec<Vec<i32>> = vec![];
        for i in 1..20 {
            cs.push(vec![-i, i + 1]);
            cs.push(vec![i, -(i + 1), 25]);
        }
        let cs: Vec<&[i32]> = cs.iter().map(|c| &c[..]).collect();
        let mut s = mk(opts, 25, &cs);
        s.freeze(Var::new(25));
        assert!(s.eliminate(false));
        assert!(s.solve(&[]));
        check_model(&s, &cs);
    }

    #[test]
    fn test_elim_order() {
        let mut n_occ: LMap<i32> = LMap::new();
        let (x, y) = (Var::new(1), Var::new(2));
        n_occ.insert_default(Lit::new(x, true), 3);
        n_occ.insert_default(Lit::new(x, false), 2);
        n_occ.insert_default(Lit::new(y, true), 5);
        n_occ.insert_default(Lit::new(y, false), 0);
        let ord = ElimOrder { n_occ: &n_occ };
        assert_eq!(ord.cost(x), 6);
        assert_eq!(ord.cmp(&y, &x), cmp::Ordering::Less);
    }

    #[test]
    #[should_panic]
    fn test_clause_on_eliminated_var() {
        let mut s = mk(SimpOpts::default(), 2, &[&[1, 2]]);
        assert!(s.eliminate(false));
        let v = (1..=2)
            .map(Var::new)
            .find(|&v| s.is_eliminated(v))
            .expect("some variable is eliminated");
        s.add_clause(&[Lit::new(v, true)]);
    }
}
