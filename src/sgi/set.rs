use allocator_api2::alloc::{ AllocError, Allocator, Global };
use crate::sgi::{
    compare::{ CompareLess, Identity, KeyCompare },
    cursor::{ Cursor, IntoIter as TreeIntoIter, Iter },
    tree::RbTree
};
use std::fmt::Debug;

// std::set
pub struct Set<T, C = CompareLess, A = Global>
where C: KeyCompare<T>,
      A: Allocator
{
    _impl: RbTree<T, T, Identity, C, A>
}

impl<T> Set<T, CompareLess, Global>
where T: PartialOrd
{
    pub fn new() -> Self { Self::with_compare(CompareLess) }
}

impl<T, C> Set<T, C, Global>
where C: KeyCompare<T>
{
    pub fn with_compare(compare: C) -> Self { Self { _impl: RbTree::new(Identity, compare) } }
}

impl<T, C, A> Set<T, C, A>
where C: KeyCompare<T>,
      A: Allocator
{
    pub fn new_in(compare: C, alloc: A) -> Self { Self { _impl: RbTree::new_in(Identity, compare, alloc) } }
    pub fn try_new_in(compare: C, alloc: A) -> Result<Self, AllocError> {
        Ok(Self { _impl: RbTree::try_new_in(Identity, compare, alloc)? })
    }

    pub fn len(&self) -> usize { self._impl.len() }
    pub fn is_empty(&self) -> bool { self._impl.is_empty() }
    pub fn as_tree(&self) -> &RbTree<T, T, Identity, C, A> { &self._impl }

    // Returns false, leaving the set untouched, when an equivalent value is present
    pub fn insert(&mut self, value: T) -> bool { self._impl.insert_unique(value).1 }
    pub fn try_insert(&mut self, value: T) -> Result<bool, AllocError> {
        Ok(self._impl.try_insert_unique(value)?.1)
    }

    pub fn contains(&self, value: &T) -> bool { self._impl.contains(value) }
    pub fn get(&self, value: &T) -> Option<&T> { self._impl.get(value) }
    pub fn remove(&mut self, value: &T) -> bool { self._impl.erase(value).is_some() }
    pub fn take(&mut self, value: &T) -> Option<T> { self._impl.erase(value) }
    pub fn retain<F>(&mut self, mut f: F)
    where F: FnMut(&T) -> bool
    {
        let mut c = self._impl.begin_mut();
        while let Some(v) = c.get() {
            match f(v) {
                true => c.move_next(),
                false => drop(c.remove_current())
            }
        }
    }
    pub fn clear(&mut self) { self._impl.clear() }

    pub fn find(&self, value: &T) -> Cursor<'_, T> { self._impl.find(value) }
    pub fn lower_bound(&self, value: &T) -> Cursor<'_, T> { self._impl.lower_bound(value) }
    pub fn upper_bound(&self, value: &T) -> Cursor<'_, T> { self._impl.upper_bound(value) }
    pub fn begin(&self) -> Cursor<'_, T> { self._impl.begin() }
    pub fn end(&self) -> Cursor<'_, T> { self._impl.end() }

    pub fn first(&self) -> Option<&T> { self._impl.first() }
    pub fn last(&self) -> Option<&T> { self._impl.last() }
    pub fn pop_first(&mut self) -> Option<T> { self._impl.pop_first() }
    pub fn pop_last(&mut self) -> Option<T> { self._impl.pop_last() }

    pub fn iter(&self) -> Iter<'_, T> { self._impl.iter() }
}

impl<T, C> Default for Set<T, C, Global>
where C: KeyCompare<T> + Default
{
    fn default() -> Self { Self::with_compare(C::default()) }
}

impl<T, C, A> Debug for Set<T, C, A>
where C: KeyCompare<T>,
      A: Allocator,
      T: Debug
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C, A> PartialEq for Set<T, C, A>
where C: KeyCompare<T>,
      A: Allocator,
      T: PartialEq
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T, C, A> Extend<T> for Set<T, C, A>
where C: KeyCompare<T>,
      A: Allocator
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for v in iter { self.insert(v); }
    }
}

impl<T, C> FromIterator<T> for Set<T, C, Global>
where C: KeyCompare<T> + Default
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<'a, T, C, A> IntoIterator for &'a Set<T, C, A>
where C: KeyCompare<T>,
      A: Allocator
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

impl<T, C, A> IntoIterator for Set<T, C, A>
where C: KeyCompare<T>,
      A: Allocator
{
    type Item = T;
    type IntoIter = TreeIntoIter<T, T, Identity, C, A>;
    fn into_iter(self) -> Self::IntoIter { self._impl.into_iter() }
}
