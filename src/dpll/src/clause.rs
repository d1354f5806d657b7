/*****************************************************************************************[clause.rs]
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
    crate::{
        alloc::{self, RegionAllocator},
        intmap::{AsIndex, IntMap, IntMapBool, IntSet},
    },
    std::{fmt, mem, ops, slice},
};

/// A propositional variable.
///
/// Variables are numbered from 1, as in DIMACS; `Var::UNDEF` (0) is never
/// a real variable, so slot 0 of any `VMap` is unused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Var(u32);

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if *self == Var::UNDEF {
            write!(f, "UNDEF")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Var {
    pub const UNDEF: Var = Var(0);

    /// Build the variable with DIMACS identifier `id`.
    ///
    /// ```
    /// use dpll::Var;
    /// let v = Var::new(3);
    /// assert_eq!(v.idx(), 3);
    /// assert_ne!(v, Var::UNDEF);
    /// ```
    #[inline]
    pub fn new(id: u32) -> Self {
        assert!(id > 0, "variable identifiers start at 1");
        Var::from_idx(id)
    }

    #[inline(always)]
    pub(crate) fn from_idx(idx: u32) -> Self {
        debug_assert!(idx < u32::MAX / 2, "Var::from_idx: index too large");
        Var(idx)
    }

    #[inline(always)]
    pub fn idx(&self) -> u32 {
        self.0
    }

    /// Bit of this variable in a clause abstraction.
    #[inline(always)]
    pub(crate) fn abstraction_bit(&self) -> u32 {
        1 << (self.0.wrapping_sub(1) & 31)
    }
}

impl AsIndex for Var {
    #[inline(always)]
    fn as_index(self) -> usize {
        self.0 as usize
    }
    #[inline(always)]
    fn from_index(index: usize) -> Self {
        Var(index as u32)
    }
}

pub type VMap<V> = IntMap<Var, V>;

/// A literal: a variable with a polarity, packed as `2*var + negated`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Lit(u32);

impl Lit {
    pub const UNDEF: Lit = Lit(0);
    pub const ERROR: Lit = Lit(1);

    /// `Lit::new(v, true)` is the positive literal of `v`.
    #[inline(always)]
    pub fn new(var: Var, sign: bool) -> Self {
        Lit(var.0 * 2 + (!sign) as u32)
    }

    /// Literal from its DIMACS integer representation.
    ///
    /// ```
    /// use dpll::Lit;
    /// let l = Lit::from_dimacs(-4);
    /// assert!(!l.sign());
    /// assert_eq!(l.var().idx(), 4);
    /// assert_eq!(l.to_dimacs(), -4);
    /// assert_eq!(!l, Lit::from_dimacs(4));
    /// ```
    pub fn from_dimacs(i: i32) -> Self {
        assert!(i != 0, "0 is not a DIMACS literal");
        Lit::new(Var::from_idx(i.unsigned_abs()), i > 0)
    }

    pub fn to_dimacs(&self) -> i32 {
        let v = self.var().idx() as i32;
        if self.sign() {
            v
        } else {
            -v
        }
    }

    #[inline(always)]
    pub fn idx(&self) -> u32 {
        self.0
    }
    #[inline(always)]
    pub fn sign(&self) -> bool {
        (self.0 & 1) == 0
    }
    #[inline(always)]
    pub fn var(&self) -> Var {
        Var(self.0 >> 1)
    }

    /// `lit.apply_sign(b)` keeps the same sign if `b==true`, flips sign otherwise
    ///
    /// ```
    /// use dpll::*;
    /// let mut sat = BasicSolver::default();
    /// let lit1 = Lit::new(sat.new_var_default(), true);
    /// assert_eq!(lit1, lit1.apply_sign(true));
    /// assert_eq!(!lit1, lit1.apply_sign(false));
    /// ```
    #[inline(always)]
    pub fn apply_sign(&self, sign: bool) -> Lit {
        if sign {
            *self
        } else {
            !*self
        }
    }
}

impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Lit::UNDEF => write!(f, "UNDEF"),
            Lit::ERROR => write!(f, "ERROR"),
            _ => write!(f, "{}", self.to_dimacs()),
        }
    }
}

impl ops::Not for Lit {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        Lit(self.0 ^ 1)
    }
}
impl ops::BitXor<bool> for Lit {
    type Output = Self;
    #[inline(always)]
    fn bitxor(self, rhs: bool) -> Self {
        Lit(self.0 ^ rhs as u32)
    }
}

impl AsIndex for Lit {
    #[inline(always)]
    fn as_index(self) -> usize {
        self.0 as usize
    }
    #[inline(always)]
    fn from_index(index: usize) -> Self {
        Lit(index as u32)
    }
}

pub type LMap<V> = IntMap<Lit, V>;
pub type LSet = IntSet<Lit>;

/// A ternary boolean (true, false, undefined) used for partial assignments.
///
/// Every code with bit 1 set stands for "undefined".
#[derive(Clone, Copy)]
pub struct LBool(u8);

impl fmt::Debug for LBool {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            0 => write!(f, "TRUE"),
            1 => write!(f, "FALSE"),
            2 | 3 => write!(f, "UNDEF"),
            n => write!(f, "LBool({})", n),
        }
    }
}
impl Default for LBool {
    fn default() -> Self {
        LBool::UNDEF
    }
}

impl LBool {
    pub const TRUE: LBool = LBool(0);
    pub const FALSE: LBool = LBool(1);
    pub const UNDEF: LBool = LBool(2);

    pub fn from_u8(v: u8) -> Self {
        debug_assert!(v == (v & 3), "LBool::from_u8: invalid value");
        LBool(v)
    }
    #[inline(always)]
    pub fn new(v: bool) -> Self {
        LBool((!v) as u8)
    }
    #[inline(always)]
    pub fn to_u8(&self) -> u8 {
        self.0
    }
    #[inline(always)]
    pub fn is_true(&self) -> bool {
        self.0 == 0
    }
    #[inline(always)]
    pub fn is_false(&self) -> bool {
        self.0 == 1
    }
    #[inline(always)]
    pub fn is_undef(&self) -> bool {
        (self.0 & 2) != 0
    }
}

// two undefined codes are equal regardless of their low bit
impl PartialEq for LBool {
    #[inline(always)]
    fn eq(&self, rhs: &Self) -> bool {
        self.0 == rhs.0 || (self.0 & rhs.0 & 2) != 0
    }
}

impl Eq for LBool {}

impl ops::Neg for LBool {
    type Output = LBool;
    #[inline(always)]
    fn neg(self) -> Self {
        LBool(self.0 ^ 1)
    }
}

impl ops::BitXor<bool> for LBool {
    type Output = LBool;
    #[inline(always)]
    fn bitxor(self, rhs: bool) -> Self {
        LBool(self.0 ^ rhs as u8)
    }
}

impl ops::BitAnd for LBool {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        let sel = (self.0 << 1) | (rhs.0 << 3);
        LBool(((0xF7F7_55F4_u32 >> sel) & 3) as u8)
    }
}

impl ops::BitOr for LBool {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        let sel = (self.0 << 1) | (rhs.0 << 3);
        LBool(((0xFCFC_F400_u32 >> sel) & 3) as u8)
    }
}

impl From<bool> for LBool {
    fn from(x: bool) -> Self {
        LBool::new(x)
    }
}

/// Metadata of a clause
///
/// Layout:
/// unsigned mark      : 2;
/// unsigned learnt    : 1;
/// unsigned has_extra : 1;
/// unsigned reloced   : 1;
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ClauseHeader(u8);

impl fmt::Debug for ClauseHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ClauseHeader")
            .field("mark", &self.mark())
            .field("learnt", &self.learnt())
            .field("has_extra", &self.has_extra())
            .field("reloced", &self.reloced())
            .finish()
    }
}

impl ClauseHeader {
    pub fn new(mark: u32, learnt: bool, has_extra: bool, reloced: bool) -> Self {
        debug_assert!(mark < 4);
        ClauseHeader(
            (mark as u8) | ((learnt as u8) << 2) | ((has_extra as u8) << 3) | ((reloced as u8) << 4),
        )
    }
    #[inline(always)]
    pub fn mark(&self) -> u32 {
        (self.0 & 3) as u32
    }
    #[inline(always)]
    pub fn learnt(&self) -> bool {
        (self.0 & (1 << 2)) != 0
    }
    #[inline(always)]
    pub fn has_extra(&self) -> bool {
        (self.0 & (1 << 3)) != 0
    }
    #[inline(always)]
    pub fn reloced(&self) -> bool {
        (self.0 & (1 << 4)) != 0
    }
    pub fn set_mark(&mut self, mark: u32) {
        debug_assert!(mark < 4);
        self.0 = (self.0 & !3) | mark as u8;
    }
    pub fn set_has_extra(&mut self, has_extra: bool) {
        self.0 = (self.0 & !(1 << 3)) | ((has_extra as u8) << 3);
    }
    pub fn set_reloced(&mut self, reloced: bool) {
        self.0 = (self.0 & !(1 << 4)) | ((reloced as u8) << 4);
    }
}

/// Optional per-clause payload.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Extra {
    None,
    /// Bumped by conflict analysis, learnt clauses only.
    Activity(f32),
    /// One bit per variable (modulo 32), for cheap subsumption rejection.
    Abstraction(u32),
}

/// Result of `Clause::subsumes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsumption {
    /// The other clause is not subsumed.
    No,
    /// Every literal of this clause occurs in the other one.
    Full,
    /// Same as `Full`, except that the negation of `p` occurs in the
    /// other clause instead of `p`; `!p` can be removed from it.
    Strengthen(Lit),
}

/// A disjunction of literals, stored in a `ClauseAllocator`.
///
/// The first two literals are the watched ones.
#[derive(Debug, Clone)]
pub struct Clause {
    header: ClauseHeader,
    lits: Vec<Lit>,
    extra: Extra,
    forward: CRef,
}

impl Clause {
    fn new(lits: &[Lit], learnt: bool, has_extra: bool) -> Self {
        let extra = if !has_extra {
            Extra::None
        } else if learnt {
            Extra::Activity(0.0)
        } else {
            Extra::Abstraction(calc_abstraction(lits))
        };
        Clause {
            header: ClauseHeader::new(0, learnt, has_extra, false),
            lits: lits.to_vec(),
            extra,
            forward: CRef::UNDEF,
        }
    }

    /// Number of allocator units used by this clause.
    #[inline]
    fn units(&self) -> u32 {
        1 + self.lits.len() as u32 + self.has_extra() as u32
    }

    #[inline(always)]
    pub fn mark(&self) -> u32 {
        self.header.mark()
    }
    #[inline(always)]
    pub fn set_mark(&mut self, mark: u32) {
        self.header.set_mark(mark)
    }
    #[inline(always)]
    pub fn learnt(&self) -> bool {
        self.header.learnt()
    }
    #[inline(always)]
    pub fn has_extra(&self) -> bool {
        self.header.has_extra()
    }
    #[inline(always)]
    pub fn reloced(&self) -> bool {
        self.header.reloced()
    }
    #[inline(always)]
    pub fn size(&self) -> u32 {
        self.lits.len() as u32
    }
    #[inline(always)]
    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }
    #[inline(always)]
    pub fn lits_mut(&mut self) -> &mut [Lit] {
        &mut self.lits
    }
    #[inline(always)]
    pub fn iter(&self) -> slice::Iter<Lit> {
        self.lits.iter()
    }

    pub fn activity(&self) -> f32 {
        match self.extra {
            Extra::Activity(a) => a,
            _ => panic!("clause has no activity"),
        }
    }
    pub fn set_activity(&mut self, activity: f32) {
        debug_assert!(self.learnt());
        self.extra = Extra::Activity(activity);
    }

    /// The abstraction of this clause, if it carries one.
    pub fn abstraction(&self) -> Option<u32> {
        match self.extra {
            Extra::Abstraction(abs) => Some(abs),
            _ => None,
        }
    }

    /// Recompute the cached abstraction after the literals changed.
    pub fn calc_abstraction(&mut self) {
        if let Extra::Abstraction(_) = self.extra {
            self.extra = Extra::Abstraction(calc_abstraction(&self.lits));
        }
    }

    /// Keep only the first `new_size` literals.
    pub fn shrink(&mut self, new_size: u32) {
        debug_assert!(new_size <= self.size());
        self.lits.truncate(new_size as usize);
    }

    /// Remove `p` from the clause, keeping the order of the other literals.
    ///
    /// Panics if `p` does not occur in the clause.
    pub fn strengthen(&mut self, p: Lit) {
        match self.lits.iter().position(|&q| q == p) {
            Some(i) => {
                self.lits.remove(i);
            }
            None => panic!("cannot strengthen {:?} with absent literal {:?}", self.lits, p),
        }
        self.calc_abstraction();
    }

    /// Does `self` subsume `other`, possibly up to one literal of
    /// opposite polarity (self-subsuming resolution)?
    pub fn subsumes(&self, other: &Clause) -> Subsumption {
        debug_assert!(!self.learnt());
        debug_assert!(!other.learnt());
        if other.size() < self.size() {
            return Subsumption::No;
        }
        if let (Some(a), Some(b)) = (self.abstraction(), other.abstraction()) {
            if a & !b != 0 {
                return Subsumption::No;
            }
        }

        let mut res = Subsumption::Full;
        'outer: for &p in &self.lits {
            for &q in &other.lits {
                if p == q {
                    continue 'outer;
                } else if res == Subsumption::Full && p == !q {
                    res = Subsumption::Strengthen(p);
                    continue 'outer;
                }
            }
            return Subsumption::No;
        }
        res
    }

    pub fn relocation(&self) -> CRef {
        debug_assert!(self.reloced());
        self.forward
    }
}

fn calc_abstraction(lits: &[Lit]) -> u32 {
    lits.iter().fold(0, |abs, lit| abs | lit.var().abstraction_bit())
}

impl ops::Index<u32> for Clause {
    type Output = Lit;
    #[inline(always)]
    fn index(&self, index: u32) -> &Self::Output {
        &self.lits[index as usize]
    }
}
impl ops::IndexMut<u32> for Clause {
    #[inline(always)]
    fn index_mut(&mut self, index: u32) -> &mut Self::Output {
        &mut self.lits[index as usize]
    }
}

/// Anything that can be considered as a list of literals.
pub trait ClauseIterable: fmt::Debug {
    fn items(&self) -> &[Lit];
}

/// Any iterable clause can be printed in DIMACS
impl<T: ClauseIterable> display::Print for T {
    fn fmt_dimacs(&self, out: &mut fmt::Formatter) -> fmt::Result {
        for lit in self.items() {
            write!(out, "{} ", lit.to_dimacs())?;
        }
        write!(out, "0")
    }
}

impl ClauseIterable for Clause {
    fn items(&self) -> &[Lit] {
        &self.lits
    }
}
impl<'a> ClauseIterable for &'a [Lit] {
    fn items(&self) -> &[Lit] {
        self
    }
}
impl ClauseIterable for Vec<Lit> {
    fn items(&self) -> &[Lit] {
        self
    }
}
impl ClauseIterable for IntSet<Lit> {
    fn items(&self) -> &[Lit] {
        self.as_slice()
    }
}

pub type CRef = alloc::Ref<Clause>;

#[derive(Debug)]
/// Main clause allocator. Clauses are addressed by `CRef`.
pub struct ClauseAllocator {
    ra: RegionAllocator<Clause>,
    extra_clause_field: bool,
}

impl ClauseAllocator {
    pub fn with_start_cap(start_cap: u32) -> Self {
        Self {
            ra: RegionAllocator::new(start_cap),
            extra_clause_field: false,
        }
    }
    pub fn new() -> Self {
        Self::with_start_cap(1024)
    }
    /// Total units allocated (literals plus per-clause overhead).
    #[inline(always)]
    pub fn len(&self) -> u32 {
        self.ra.len()
    }
    pub fn wasted(&self) -> u32 {
        self.ra.wasted()
    }
    pub fn extra_clause_field(&self) -> bool {
        self.extra_clause_field
    }
    /// When set, non-learnt clauses carry their abstraction.
    pub fn set_extra_clause_field(&mut self, b: bool) {
        self.extra_clause_field = b;
    }

    pub fn alloc_with_learnt(&mut self, lits: &[Lit], learnt: bool) -> CRef {
        let use_extra = learnt | self.extra_clause_field;
        let c = Clause::new(lits, learnt, use_extra);
        let units = c.units();
        self.ra.alloc(c, units)
    }

    /// Allocate a copy of `c` (typically living in another allocator).
    pub fn alloc_copy(&mut self, c: &Clause) -> CRef {
        let cr = self.alloc_with_learnt(c.lits(), c.learnt());
        if c.learnt() {
            self.ra[cr].set_activity(c.activity());
        }
        self.ra[cr].set_mark(c.mark());
        cr
    }

    /// Account for a clause that becomes garbage.
    pub fn free(&mut self, cr: CRef) {
        let units = self.ra[cr].units();
        self.ra.free(units);
    }

    pub fn free_amount(&mut self, units: u32) {
        self.ra.free(units);
    }

    /// Move clause `cr` into allocator `to`.
    ///
    /// post condition: `*cr` now contains the index of the copy in `to`;
    /// the old clause keeps a forwarding reference.
    pub fn reloc(&mut self, cr: &mut CRef, to: &mut ClauseAllocator) {
        let c = &mut self.ra[*cr];
        if c.reloced() {
            *cr = c.relocation();
            return;
        }

        let use_extra = c.learnt() | to.extra_clause_field;
        let mut header = c.header;
        header.set_has_extra(use_extra);
        let extra = match c.extra {
            e @ Extra::Activity(_) => e,
            _ if use_extra => Extra::Abstraction(calc_abstraction(&c.lits)),
            _ => Extra::None,
        };
        let moved = Clause {
            header,
            lits: mem::take(&mut c.lits),
            extra,
            forward: CRef::UNDEF,
        };
        let units = moved.units();
        let new_cr = to.ra.alloc(moved, units);
        c.header.set_reloced(true);
        c.forward = new_cr;
        *cr = new_cr;
    }

    #[inline(always)]
    pub fn get_ref(&self, cr: CRef) -> &Clause {
        &self.ra[cr]
    }
    #[inline(always)]
    pub fn get_mut(&mut self, cr: CRef) -> &mut Clause {
        &mut self.ra[cr]
    }
}

impl Default for ClauseAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ops::Index<CRef> for ClauseAllocator {
    type Output = Clause;
    #[inline(always)]
    fn index(&self, cr: CRef) -> &Clause {
        &self.ra[cr]
    }
}
impl ops::IndexMut<CRef> for ClauseAllocator {
    #[inline(always)]
    fn index_mut(&mut self, cr: CRef) -> &mut Clause {
        &mut self.ra[cr]
    }
}

/// Predicate that decides whether a value `V` is deleted or not
pub trait DeletePred<V> {
    fn deleted(&self, v: &V) -> bool;
}

pub type OccVec<V> = Vec<V>;

#[derive(Debug, Clone)]
/// List of occurrences of objects of type `K` (e.g. literals) in values
/// of type `V` (e.g. clauses)
///
/// Deletion is lazy: a key is `smudge`d when some of its entries may have
/// become stale, and its list is compacted on the next `lookup` of that key.
pub struct OccListsData<K: AsIndex, V> {
    occs: IntMap<K, OccVec<V>>,
    dirty: IntMapBool<K>,
    dirties: Vec<K>, // keys to examine in `clean_all_pred`
}

impl<K: AsIndex, V> Default for OccListsData<K, V> {
    fn default() -> Self {
        Self {
            occs: IntMap::new(),
            dirty: IntMapBool::new(),
            dirties: Vec::new(),
        }
    }
}

impl<K: AsIndex, V> OccListsData<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize occurrence list for the given `idx`
    pub fn init(&mut self, idx: K) {
        self.occs.reserve_default(idx);
        self.occs[idx].clear();
        self.dirty.reserve(idx);
    }

    pub fn push(&mut self, idx: K, v: V) {
        self.occs[idx].push(v);
    }

    /// Remove the first entry equal to `v`, compacting immediately.
    pub fn remove(&mut self, idx: K, v: &V)
    where
        V: PartialEq,
    {
        let occs = &mut self.occs[idx];
        if let Some(i) = occs.iter().position(|x| x == v) {
            occs.remove(i);
        }
    }

    /// Obtain a fully usable occurrence list using the given predicate
    pub fn promote<P: DeletePred<V>>(&mut self, pred: P) -> OccLists<K, V, P> {
        OccLists { data: self, pred }
    }

    /// `oclist.lookup_mut_pred(idx, p)` returns an up-to-date list of occurrences
    /// for `idx`. It will clean up the occurrence list with `p` if it's dirty.
    pub fn lookup_mut_pred<P: DeletePred<V>>(&mut self, idx: K, pred: &P) -> &mut OccVec<V> {
        if self.dirty[idx] {
            self.clean_pred(idx, pred);
        }
        &mut self.occs[idx]
    }

    /// Cleanup entries marked as `dirty` (remove elements for which the predicate
    /// specifies they're deleted)
    pub fn clean_all_pred<P: DeletePred<V>>(&mut self, pred: &P) {
        for &x in &self.dirties {
            // `dirties` may contain keys already cleaned by a lookup
            if self.dirty[x] {
                self.occs[x].retain(|v| !pred.deleted(v));
                self.dirty.set(x, false);
            }
        }
        self.dirties.clear();
    }

    /// Cleanup entry at `idx`. Nothing to do on an empty list.
    pub fn clean_pred<P: DeletePred<V>>(&mut self, idx: K, pred: &P) {
        if !self.occs[idx].is_empty() {
            self.occs[idx].retain(|v| !pred.deleted(v));
        }
        self.dirty.set(idx, false);
    }

    /// Mark index `K` as dirty, so it can be cleaned up later
    pub fn smudge(&mut self, idx: K) {
        if !self.dirty[idx] {
            self.dirty.set(idx, true);
            self.dirties.push(idx);
        }
    }

    pub fn is_dirty(&self, idx: K) -> bool {
        self.dirty[idx]
    }

    /// Reset internal data; with `free`, also release memory
    pub fn clear(&mut self, free: bool) {
        if free {
            self.occs.free();
            self.dirty.free();
            self.dirties = Vec::new();
        } else {
            self.occs.clear();
            self.dirty.clear();
            self.dirties.clear();
        }
    }

    /// Raw read access, may contain deleted entries.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (K, &mut OccVec<V>)> {
        self.occs.iter_mut()
    }
}

impl<K: AsIndex, V> ops::Index<K> for OccListsData<K, V> {
    type Output = OccVec<V>;
    fn index(&self, index: K) -> &Self::Output {
        &self.occs[index]
    }
}
impl<K: AsIndex, V> ops::IndexMut<K> for OccListsData<K, V> {
    fn index_mut(&mut self, index: K) -> &mut Self::Output {
        &mut self.occs[index]
    }
}

/// Packs together an occurrence list and the filtering predicate
pub struct OccLists<'a, K: AsIndex + 'a, V: 'a, P: DeletePred<V>> {
    data: &'a mut OccListsData<K, V>,
    pred: P,
}

impl<'a, K: AsIndex + 'a, V: 'a, P: DeletePred<V>> OccLists<'a, K, V, P> {
    pub fn lookup_mut(&mut self, idx: K) -> &mut OccVec<V> {
        self.data.lookup_mut_pred(idx, &self.pred)
    }

    pub fn lookup(&mut self, idx: K) -> &OccVec<V> {
        self.data.lookup_mut_pred(idx, &self.pred)
    }

    pub fn clean_all(&mut self) {
        self.data.clean_all_pred(&self.pred)
    }

    pub fn clean(&mut self, idx: K) {
        self.data.clean_pred(idx, &self.pred)
    }
}

impl<'a, K: AsIndex + 'a, V: 'a, P: DeletePred<V>> ops::Deref for OccLists<'a, K, V, P> {
    type Target = OccListsData<K, V>;
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<'a, K: AsIndex + 'a, V: 'a, P: DeletePred<V>> ops::DerefMut for OccLists<'a, K, V, P> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

/// Generic interface for objects printable in DIMACS
pub mod display {
    use std::fmt;

    /// Objects that can be printed in DIMACS syntax
    pub trait Print: Sized {
        fn fmt_dimacs(&self, out: &mut fmt::Formatter) -> fmt::Result;

        /// Any type implementing `T` can  be used in a format string by
        /// just using `x.pp_dimacs()` instead of `x`.
        ///
        /// ```
        /// use dpll::*;
        /// let v: Vec<Lit> = vec![Lit::from_dimacs(1), Lit::from_dimacs(-2)];
        /// assert_eq!(format!("{}", v.pp_dimacs()), "1 -2 0");
        /// ```
        fn pp_dimacs(&self) -> PrintWrapper<Self> {
            PrintWrapper(&self)
        }
    }

    /// A wrapper that can be used to display objects in format strings
    pub struct PrintWrapper<'a, T: 'a + Print>(&'a T);

    impl<'a, T: Print> fmt::Display for PrintWrapper<'a, T> {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            self.0.fmt_dimacs(out)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lits(xs: &[i32]) -> Vec<Lit> {
        xs.iter().map(|&i| Lit::from_dimacs(i)).collect()
    }

    #[test]
    fn test_lit_encoding() {
        let v = Var::new(5);
        let p = Lit::new(v, true);
        assert_eq!(p.idx(), 10);
        assert_eq!((!p).idx(), 11);
        assert_eq!(!!p, p);
        assert_eq!(p ^ true, !p);
        assert_eq!(Lit::UNDEF.var(), Var::UNDEF);
        assert_eq!(Lit::ERROR.var(), Var::UNDEF);
        assert!(Lit::from_dimacs(1) < Lit::from_dimacs(-1));
        assert!(Lit::from_dimacs(-1) < Lit::from_dimacs(2));
    }

    #[test]
    fn test_eq() {
        for i in 0..4 {
            let a = LBool::from_u8(i);
            for j in 0..4 {
                let b = LBool::from_u8(j);
                let are_eq = (i == 0 && j == 0) || (i == 1 && j == 1) || (i >= 2 && j >= 2);
                assert_eq!(are_eq, a == b, "{:?}[{}] == {:?}[{}]", a, i, b, j);
            }
        }
    }

    #[test]
    fn test_not() {
        assert_eq!(-LBool::TRUE, LBool::FALSE);
        assert_eq!(-LBool::FALSE, LBool::TRUE);
        assert_eq!(-LBool::UNDEF, LBool::UNDEF);
    }

    #[test]
    fn test_bitxor() {
        assert_eq!(LBool::TRUE ^ true, LBool::FALSE);
        assert_eq!(LBool::TRUE ^ false, LBool::TRUE);
        assert_eq!(LBool::FALSE ^ true, LBool::TRUE);
        assert_eq!(LBool::FALSE ^ false, LBool::FALSE);
        assert_eq!(LBool::UNDEF ^ true, LBool::UNDEF);
        assert_eq!(LBool::UNDEF ^ false, LBool::UNDEF);
    }

    #[test]
    fn test_bitand() {
        assert_eq!(LBool::TRUE & LBool::TRUE, LBool::TRUE);
        assert_eq!(LBool::TRUE & LBool::FALSE, LBool::FALSE);
        assert_eq!(LBool::FALSE & LBool::TRUE, LBool::FALSE);
        assert_eq!(LBool::FALSE & LBool::FALSE, LBool::FALSE);
        assert_eq!(LBool::UNDEF & LBool::FALSE, LBool::FALSE);
        assert_eq!(LBool::FALSE & LBool::UNDEF, LBool::FALSE);
        assert_eq!(LBool::UNDEF & LBool::TRUE, LBool::UNDEF);
        assert_eq!(LBool::TRUE & LBool::UNDEF, LBool::UNDEF);
        assert_eq!(LBool::UNDEF & LBool::UNDEF, LBool::UNDEF);
    }

    #[test]
    fn test_bitor() {
        assert_eq!(LBool::TRUE | LBool::TRUE, LBool::TRUE);
        assert_eq!(LBool::TRUE | LBool::FALSE, LBool::TRUE);
        assert_eq!(LBool::FALSE | LBool::TRUE, LBool::TRUE);
        assert_eq!(LBool::FALSE | LBool::FALSE, LBool::FALSE);
        assert_eq!(LBool::UNDEF | LBool::FALSE, LBool::UNDEF);
        assert_eq!(LBool::FALSE | LBool::UNDEF, LBool::UNDEF);
        assert_eq!(LBool::UNDEF | LBool::TRUE, LBool::TRUE);
        assert_eq!(LBool::TRUE | LBool::UNDEF, LBool::TRUE);
        assert_eq!(LBool::UNDEF | LBool::UNDEF, LBool::UNDEF);
    }

    #[test]
    fn test_subsumes() {
        let mut ca = ClauseAllocator::new();
        ca.set_extra_clause_field(true);
        let ab = ca.alloc_with_learnt(&lits(&[1, 2]), false);
        let abc = ca.alloc_with_learnt(&lits(&[1, 2, 3]), false);
        let nabc = ca.alloc_with_learnt(&lits(&[-1, 2, 3]), false);
        let cd = ca.alloc_with_learnt(&lits(&[3, 4]), false);

        assert_eq!(ca[ab].subsumes(&ca[abc]), Subsumption::Full);
        assert_eq!(ca[abc].subsumes(&ca[ab]), Subsumption::No);
        assert_eq!(
            ca[ab].subsumes(&ca[nabc]),
            Subsumption::Strengthen(Lit::from_dimacs(1))
        );
        assert_eq!(ca[cd].subsumes(&ca[abc]), Subsumption::No);
    }

    #[test]
    fn test_strengthen() {
        let mut ca = ClauseAllocator::new();
        ca.set_extra_clause_field(true);
        let cr = ca.alloc_with_learnt(&lits(&[1, -2, 3, 33]), false);
        let before = ca[cr].abstraction().unwrap();
        assert_eq!(before, 0b111);
        ca[cr].strengthen(Lit::from_dimacs(-2));
        assert_eq!(ca[cr].lits(), &lits(&[1, 3, 33])[..]);
        assert_eq!(ca[cr].abstraction(), Some(0b101));
    }

    #[test]
    #[should_panic]
    fn test_strengthen_absent() {
        let mut ca = ClauseAllocator::new();
        let cr = ca.alloc_with_learnt(&lits(&[1, 2]), false);
        ca[cr].strengthen(Lit::from_dimacs(3));
    }

    #[test]
    fn test_reloc() {
        let mut ca = ClauseAllocator::new();
        let c1 = ca.alloc_with_learnt(&lits(&[1, 2]), false);
        let mut c2 = ca.alloc_with_learnt(&lits(&[1, 2, 3]), true);
        ca[c2].set_activity(2.5);
        ca.free(c1);
        assert_eq!(ca.wasted(), 3);

        let mut to = ClauseAllocator::new();
        let old = c2;
        ca.reloc(&mut c2, &mut to);
        assert!(ca[old].reloced());
        assert_eq!(to[c2].lits(), &lits(&[1, 2, 3])[..]);
        assert_eq!(to[c2].activity(), 2.5);
        assert!(to[c2].learnt());

        // a second relocation follows the forwarding reference
        let mut again = old;
        ca.reloc(&mut again, &mut to);
        assert_eq!(again, c2);
        assert_eq!(to.len(), 5);
    }

    #[test]
    fn test_alloc_copy() {
        let mut ca = ClauseAllocator::new();
        let c = ca.alloc_with_learnt(&lits(&[1, -2, 3]), true);
        ca[c].set_activity(4.0);
        let mut to = ClauseAllocator::new();
        to.set_extra_clause_field(true);
        let d = to.alloc_copy(&ca[c]);
        assert_eq!(to[d].lits(), ca[c].lits());
        assert_eq!(to[d].activity(), 4.0);
        // the original is untouched
        assert!(!ca[c].reloced());
        assert_eq!(ca[c].size(), 3);
    }

    #[derive(Clone, Copy)]
    struct Odd;
    impl DeletePred<u32> for Odd {
        fn deleted(&self, v: &u32) -> bool {
            v % 2 == 1
        }
    }

    #[test]
    fn test_occ_lazy_delete() {
        let mut occ: OccListsData<Var, u32> = OccListsData::new();
        let (x, y) = (Var::new(1), Var::new(2));
        occ.init(x);
        occ.init(y);
        for i in 0..6 {
            occ.push(x, i);
            occ.push(y, i);
        }
        occ.smudge(x);
        occ.smudge(x);
        // raw access still sees stale entries
        assert_eq!(occ[x].len(), 6);
        let mut occ = occ.promote(Odd);
        assert_eq!(occ.lookup(x), &vec![0, 2, 4]);
        assert!(!occ.is_dirty(x));
        occ.smudge(y);
        occ.clean_all();
        assert_eq!(occ[y], vec![0, 2, 4]);
        occ.remove(y, &2);
        assert_eq!(occ[y], vec![0, 4]);
    }

    #[test]
    fn test_occ_clean_empty() {
        let mut occ: OccListsData<Lit, u32> = OccListsData::new();
        let p = Lit::from_dimacs(3);
        occ.init(p);
        occ.smudge(p);
        let mut occ = occ.promote(Odd);
        occ.clean(p);
        assert!(occ[p].is_empty());
        occ.clear(true);
    }
}
