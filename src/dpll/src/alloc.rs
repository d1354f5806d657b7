/*****************************************************************************************[alloc.rs]
Copyright (c) 2008-2010, Niklas Sorensson (MiniSat)
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

//! Append-only arena with typed references.
//!
//! Objects are never freed individually: `free` only records how many
//! units became garbage, and the owner compacts by moving the live
//! objects into a fresh arena once the waste grows too large.

use std::cmp;
use std::fmt;
use std::marker::PhantomData;
use std::ops;

#[derive(Debug)]
pub struct RegionAllocator<T> {
    slots: Vec<T>,
    units: usize,
    wasted: usize,
}

impl<T> RegionAllocator<T> {
    pub fn new(start_cap: u32) -> Self {
        Self {
            slots: Vec::with_capacity(start_cap as usize),
            units: 0,
            wasted: 0,
        }
    }

    /// Total number of units ever allocated in this arena.
    pub fn len(&self) -> u32 {
        self.units as u32
    }

    /// Number of units that belong to freed objects.
    pub fn wasted(&self) -> u32 {
        self.wasted as u32
    }

    /// Number of objects stored (live or freed).
    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    /// Store `value`, accounted as `units` units.
    pub fn alloc(&mut self, value: T, units: u32) -> Ref<T> {
        debug_assert!(units > 0);
        let r = Ref(self.slots.len() as u32, PhantomData);
        self.slots.push(value);
        self.units += units as usize;
        r
    }

    pub fn free(&mut self, units: u32) {
        self.wasted += units as usize;
        debug_assert!(self.wasted <= self.units);
    }

    pub fn get(&self, r: Ref<T>) -> Option<&T> {
        self.slots.get(r.0 as usize)
    }
}

impl<T> ops::Index<Ref<T>> for RegionAllocator<T> {
    type Output = T;
    #[inline(always)]
    fn index(&self, index: Ref<T>) -> &Self::Output {
        &self.slots[index.0 as usize]
    }
}
impl<T> ops::IndexMut<Ref<T>> for RegionAllocator<T> {
    #[inline(always)]
    fn index_mut(&mut self, index: Ref<T>) -> &mut Self::Output {
        &mut self.slots[index.0 as usize]
    }
}

/// A reference to a `T` value living in the allocator.
///
/// The reference is invariant in `T`.
pub struct Ref<T>(u32, PhantomData<fn(T) -> T>);

impl<T> Clone for Ref<T> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Ref<T> {}

impl<T> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if *self == Self::UNDEF {
            write!(f, "Ref(undef)")
        } else {
            f.debug_tuple("Ref").field(&self.0).finish()
        }
    }
}
impl<T> PartialEq for Ref<T> {
    #[inline(always)]
    fn eq(&self, rhs: &Self) -> bool {
        self.0 == rhs.0
    }
}
impl<T> Eq for Ref<T> {}
impl<T> PartialOrd for Ref<T> {
    fn partial_cmp(&self, rhs: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(rhs))
    }
}
impl<T> Ord for Ref<T> {
    #[inline(always)]
    fn cmp(&self, rhs: &Self) -> cmp::Ordering {
        Ord::cmp(&self.0, &rhs.0)
    }
}
impl<T> std::hash::Hash for Ref<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}
impl<T> Default for Ref<T> {
    fn default() -> Self {
        Self::UNDEF
    }
}

impl<T> Ref<T> {
    pub const UNDEF: Self = Ref(!0, PhantomData);

    #[inline(always)]
    pub fn idx(&self) -> u32 {
        self.0
    }
}
