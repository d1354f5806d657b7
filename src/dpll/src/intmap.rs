/*****************************************************************************************[intmap.rs]
Copyright (c) 2003-2006, Niklas Een, Niklas Sorensson (MiniSat)
Copyright (c) 2007-2011, Niklas Sorensson (MiniSat)
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

//! Dense maps keyed by small integers (variables, literals), and the
//! indexed binary heap used for decision and elimination ordering.

use bit_vec::BitVec;
use std::cmp;
use std::iter;
use std::marker::PhantomData;
use std::ops;

pub trait AsIndex: Copy {
    fn as_index(self) -> usize;
    fn from_index(index: usize) -> Self;
}

#[derive(Debug, Clone)]
pub struct IntMap<K: AsIndex, V> {
    map: Vec<V>,
    _marker: PhantomData<fn(K)>, // contravariance
}

impl<K: AsIndex, V> Default for IntMap<K, V> {
    fn default() -> Self {
        Self {
            map: Vec::new(),
            _marker: PhantomData,
        }
    }
}

impl<K: AsIndex, V> IntMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }
    #[inline]
    pub fn has(&self, k: K) -> bool {
        k.as_index() < self.map.len()
    }
    pub fn len(&self) -> usize {
        self.map.len()
    }
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
    /// Make sure `key` is a valid index, padding with `pad`.
    pub fn reserve(&mut self, key: K, pad: V)
    where
        V: Clone,
    {
        let index = key.as_index();
        if index >= self.map.len() {
            self.map.resize(index + 1, pad);
        }
    }
    pub fn reserve_default(&mut self, key: K)
    where
        V: Default,
    {
        let index = key.as_index();
        if index >= self.map.len() {
            self.map.resize_with(index + 1, V::default);
        }
    }
    #[inline]
    pub fn insert(&mut self, key: K, val: V, pad: V)
    where
        V: Clone,
    {
        self.reserve(key, pad);
        self[key] = val;
    }
    pub fn insert_default(&mut self, key: K, val: V)
    where
        V: Default,
    {
        self.reserve_default(key);
        self[key] = val;
    }

    /// Clear content, keep internal buffers. Does not allocate.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Clear content, free memory
    pub fn free(&mut self) {
        self.map = Vec::new();
    }
    pub fn iter(&self) -> impl iter::Iterator<Item = (K, &V)> {
        self.map.iter().enumerate().map(|(k, v)| (K::from_index(k), v))
    }
    pub fn iter_mut(&mut self) -> impl iter::Iterator<Item = (K, &mut V)> {
        self.map
            .iter_mut()
            .enumerate()
            .map(|(k, v)| (K::from_index(k), v))
    }
    pub fn as_slice(&self) -> &[V] {
        &self.map
    }
}

impl<K: AsIndex, V> ops::Index<K> for IntMap<K, V> {
    type Output = V;
    #[inline]
    fn index(&self, index: K) -> &Self::Output {
        &self.map[index.as_index()]
    }
}
impl<K: AsIndex, V> ops::IndexMut<K> for IntMap<K, V> {
    #[inline]
    fn index_mut(&mut self, index: K) -> &mut Self::Output {
        &mut self.map[index.as_index()]
    }
}

/// A map from keys to booleans, packed in a bit vector.
#[derive(Debug, Clone)]
pub struct IntMapBool<K: AsIndex> {
    map: BitVec,
    _marker: PhantomData<fn(K)>, // contravariance
}

impl<K: AsIndex> Default for IntMapBool<K> {
    fn default() -> Self {
        IntMapBool::new()
    }
}

impl<K: AsIndex> ops::Index<K> for IntMapBool<K> {
    type Output = bool;
    #[inline]
    fn index(&self, index: K) -> &Self::Output {
        &self.map[index.as_index()]
    }
}

impl<K: AsIndex> IntMapBool<K> {
    pub fn new() -> Self {
        Self {
            map: BitVec::new(),
            _marker: PhantomData,
        }
    }
    #[inline]
    pub fn has(&self, k: K) -> bool {
        k.as_index() < self.map.len()
    }
    #[inline]
    pub fn set(&mut self, k: K, b: bool) {
        self.map.set(k.as_index(), b);
    }
    pub fn reserve(&mut self, key: K) {
        let index = key.as_index();
        let len = self.map.len();
        if index >= len {
            self.map.grow(index - len + 1, false);
        }
    }
    pub fn clear(&mut self) {
        self.map.truncate(0);
    }
    pub fn free(&mut self) {
        self.map = BitVec::new();
    }
    #[inline]
    pub fn insert(&mut self, key: K) {
        self.reserve(key);
        self.map.set(key.as_index(), true);
    }
}

/// A set of keys that remembers insertion order.
#[derive(Debug, Clone)]
pub struct IntSet<K: AsIndex> {
    in_set: IntMapBool<K>,
    xs: Vec<K>,
}
impl<K: AsIndex> Default for IntSet<K> {
    fn default() -> Self {
        Self {
            in_set: IntMapBool::default(),
            xs: vec![],
        }
    }
}

impl<K: AsIndex> IntSet<K> {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn len(&self) -> usize {
        self.xs.len()
    }
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
    pub fn clear(&mut self) {
        for &x in &self.xs {
            self.in_set.set(x, false);
        }
        self.xs.clear()
    }
    pub fn as_slice(&self) -> &[K] {
        &self.xs
    }
    pub fn insert(&mut self, k: K) {
        self.in_set.reserve(k);
        if !self.in_set[k] {
            self.in_set.set(k, true);
            self.xs.push(k);
        }
    }
    pub fn has(&self, k: K) -> bool {
        self.in_set.has(k) && self.in_set[k]
    }
}
impl<K: AsIndex> ops::Index<usize> for IntSet<K> {
    type Output = K;
    fn index(&self, index: usize) -> &Self::Output {
        &self.xs[index]
    }
}

impl<K: AsIndex> ops::Deref for IntSet<K> {
    type Target = [K];
    fn deref(&self) -> &Self::Target {
        &self.xs
    }
}

/// Storage for a binary heap of keys, with the reverse index
/// `key -> position in heap` (`-1` when absent).
///
/// The ordering lives outside: `promote` pairs the data with a
/// `Comparator` borrowed from the current scores.
#[derive(Debug, Clone)]
pub struct HeapData<K: AsIndex> {
    heap: Vec<K>,
    indices: IntMap<K, i32>,
}

impl<K: AsIndex> Default for HeapData<K> {
    fn default() -> Self {
        Self {
            heap: Vec::new(),
            indices: IntMap::new(),
        }
    }
}

impl<K: AsIndex> HeapData<K> {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn len(&self) -> usize {
        self.heap.len()
    }
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
    pub fn in_heap(&self, k: K) -> bool {
        self.indices.has(k) && self.indices[k] >= 0
    }
    pub fn as_slice(&self) -> &[K] {
        &self.heap
    }

    pub fn promote<Comp: Comparator<K>>(&mut self, comp: Comp) -> Heap<K, Comp> {
        Heap { data: self, comp }
    }

    /// Empty the heap; with `dispose`, also release the index.
    pub fn clear(&mut self, dispose: bool) {
        for &x in &self.heap {
            self.indices[x] = -1;
        }
        self.heap.clear();
        if dispose {
            self.heap = Vec::new();
            self.indices.free();
        }
    }
}

impl<K: AsIndex> ops::Index<usize> for HeapData<K> {
    type Output = K;
    fn index(&self, index: usize) -> &Self::Output {
        &self.heap[index]
    }
}

/// Total order used by a heap: the smallest element is on top.
pub trait Comparator<T: ?Sized> {
    fn cmp(&self, lhs: &T, rhs: &T) -> cmp::Ordering;

    fn lt(&self, lhs: &T, rhs: &T) -> bool {
        self.cmp(lhs, rhs) == cmp::Ordering::Less
    }
    fn le(&self, lhs: &T, rhs: &T) -> bool {
        self.cmp(lhs, rhs) != cmp::Ordering::Greater
    }
    #[inline]
    fn gt(&self, lhs: &T, rhs: &T) -> bool {
        self.lt(rhs, lhs)
    }
    #[inline]
    fn ge(&self, lhs: &T, rhs: &T) -> bool {
        self.le(rhs, lhs)
    }
}

#[derive(Debug)]
pub struct Heap<'a, K: AsIndex + 'a, Comp: Comparator<K>> {
    data: &'a mut HeapData<K>,
    comp: Comp,
}

impl<'a, K: AsIndex + 'a, Comp: Comparator<K>> ops::Deref for Heap<'a, K, Comp> {
    type Target = HeapData<K>;
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
impl<'a, K: AsIndex + 'a, Comp: Comparator<K>> ops::DerefMut for Heap<'a, K, Comp> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl<'a, K: AsIndex + 'a, Comp: Comparator<K>> Heap<'a, K, Comp> {
    fn percolate_up(&mut self, mut i: usize) {
        let x = self.data.heap[i];
        while i != 0 {
            let p = parent_index(i);
            let px = self.data.heap[p];
            if !self.comp.lt(&x, &px) {
                break;
            }
            self.data.heap[i] = px;
            self.data.indices[px] = i as i32;
            i = p;
        }
        self.data.heap[i] = x;
        self.data.indices[x] = i as i32;
    }

    fn percolate_down(&mut self, mut i: usize) {
        let x = self.data.heap[i];
        let len = self.data.heap.len();
        while left_index(i) < len {
            let (l, r) = (left_index(i), right_index(i));
            let child = if r < len && self.comp.lt(&self.data.heap[r], &self.data.heap[l]) {
                r
            } else {
                l
            };
            let cx = self.data.heap[child];
            if !self.comp.lt(&cx, &x) {
                break;
            }
            self.data.heap[i] = cx;
            self.data.indices[cx] = i as i32;
            i = child;
        }
        self.data.heap[i] = x;
        self.data.indices[x] = i as i32;
    }

    /// `k` moved towards the top (its key became "smaller").
    pub fn decrease(&mut self, k: K) {
        debug_assert!(self.in_heap(k));
        let pos = self.data.indices[k] as usize;
        self.percolate_up(pos);
    }

    /// `k` moved towards the bottom (its key became "larger").
    pub fn increase(&mut self, k: K) {
        debug_assert!(self.in_heap(k));
        let pos = self.data.indices[k] as usize;
        self.percolate_down(pos);
    }

    /// Safe variant of insert/decrease/increase
    pub fn update(&mut self, k: K) {
        if !self.in_heap(k) {
            self.insert(k);
        } else {
            let pos = self.data.indices[k] as usize;
            self.percolate_up(pos);
            let pos = self.data.indices[k] as usize;
            self.percolate_down(pos);
        }
    }

    pub fn insert(&mut self, k: K) {
        self.data.indices.reserve(k, -1);
        debug_assert!(!self.in_heap(k));

        let pos = self.data.heap.len();
        self.data.indices[k] = pos as i32;
        self.data.heap.push(k);
        self.percolate_up(pos);
    }

    pub fn remove(&mut self, k: K) {
        debug_assert!(self.in_heap(k));
        let pos = self.data.indices[k] as usize;
        self.data.indices[k] = -1;
        let last = self.data.heap.len() - 1;
        if pos < last {
            let moved = self.data.heap[last];
            self.data.heap.swap_remove(pos);
            self.data.indices[moved] = pos as i32;
            self.update(moved);
        } else {
            self.data.heap.pop();
        }
    }

    /// Remove and return the smallest element, if any.
    pub fn remove_min(&mut self) -> Option<K> {
        if self.data.heap.is_empty() {
            return None;
        }
        let x = self.data.heap.swap_remove(0);
        self.data.indices[x] = -1;
        if !self.data.heap.is_empty() {
            let top = self.data.heap[0];
            self.data.indices[top] = 0;
            self.percolate_down(0);
        }
        Some(x)
    }

    /// Smallest element, if any.
    pub fn peek(&self) -> Option<K> {
        self.data.heap.first().copied()
    }

    /// Rebuild the heap from scratch, using the elements in `ns`
    pub fn build(&mut self, ns: &[K]) {
        self.data.clear(false);
        for (i, &x) in ns.iter().enumerate() {
            self.data.indices.reserve(x, -1);
            self.data.indices[x] = i as i32;
            self.data.heap.push(x);
        }
        for i in (0..self.data.heap.len() / 2).rev() {
            self.percolate_down(i);
        }
    }
}

#[inline(always)]
fn left_index(i: usize) -> usize {
    i * 2 + 1
}
#[inline(always)]
fn right_index(i: usize) -> usize {
    (i + 1) * 2
}
#[inline(always)]
fn parent_index(i: usize) -> usize {
    (i - 1) >> 1
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct K(usize);
    impl AsIndex for K {
        fn as_index(self) -> usize {
            self.0
        }
        fn from_index(i: usize) -> Self {
            K(i)
        }
    }

    /// Max-heap on a score array, like the decision order.
    struct ByScore<'a>(&'a [f64]);
    impl<'a> Comparator<K> for ByScore<'a> {
        fn cmp(&self, a: &K, b: &K) -> cmp::Ordering {
            self.0[b.0].partial_cmp(&self.0[a.0]).unwrap_or(cmp::Ordering::Equal)
        }
    }

    fn drain(h: &mut Heap<K, ByScore>) -> Vec<K> {
        let mut res = vec![];
        while let Some(k) = h.remove_min() {
            res.push(k);
        }
        res
    }

    #[test]
    fn test_heap_order() {
        let mut scores = vec![3.0, 1.0, 4.0, 1.5, 9.0, 2.6, 5.0];
        let mut data = HeapData::new();
        {
            let mut h = data.promote(ByScore(&scores));
            for i in 0..scores.len() {
                h.insert(K(i));
            }
            h.remove(K(2));
            assert!(!h.in_heap(K(2)));
            assert_eq!(h.peek(), Some(K(4)));
        }

        // bump a score and fix the heap
        scores[1] = 100.0;
        {
            let mut h = data.promote(ByScore(&scores));
            h.decrease(K(1));
            let order = drain(&mut h);
            let got: Vec<f64> = order.iter().map(|k| scores[k.0]).collect();
            assert_eq!(got, vec![100.0, 9.0, 5.0, 3.0, 2.6, 1.5]);
            assert!(h.is_empty());
        }
    }

    #[test]
    fn test_heap_build_same_order() {
        let scores = vec![0.5, 7.0, 7.5, 0.1, 3.3, 2.0, 8.8, 1.1];
        let all: Vec<K> = (0..scores.len()).map(K).collect();
        let mut data = HeapData::new();

        let mut h = data.promote(ByScore(&scores));
        for &k in &all {
            h.insert(k);
        }
        let first = drain(&mut h);
        for w in first.windows(2) {
            assert!(scores[w[0].0] >= scores[w[1].0]);
        }

        h.build(&all);
        assert_eq!(h.len(), all.len());
        let second = drain(&mut h);
        assert_eq!(first, second);
    }

    #[test]
    fn test_intset() {
        let mut s: IntSet<K> = IntSet::new();
        s.insert(K(4));
        s.insert(K(1));
        s.insert(K(4));
        assert_eq!(s.as_slice(), &[K(4), K(1)]);
        assert!(s.has(K(1)));
        assert!(!s.has(K(100)));
        s.clear();
        assert!(!s.has(K(4)));
        assert!(s.is_empty());
    }
}
