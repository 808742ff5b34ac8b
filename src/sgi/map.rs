use allocator_api2::alloc::{ AllocError, Allocator, Global };
use crate::sgi::{
    compare::{ CompareLess, KeyCompare, SelectFirst },
    cursor::{ self, Cursor, CursorMut },
    node::{ is_header, Node },
    tree::MapTree
};
use std::{
    alloc::{ handle_alloc_error, Layout },
    fmt::Debug,
    iter::FusedIterator,
    mem
};

// std::map. Entries are stored as (key, value) pairs and ordered by the key.
pub struct Map<K, T, C = CompareLess, A = Global>
where C: KeyCompare<K>,
      A: Allocator
{
    _impl: MapTree<K, T, C, A>
}

impl<K, T> Map<K, T, CompareLess, Global>
where K: PartialOrd
{
    pub fn new() -> Self { Self::with_compare(CompareLess) }
}

impl<K, T, C> Map<K, T, C, Global>
where C: KeyCompare<K>
{
    pub fn with_compare(compare: C) -> Self { Self { _impl: MapTree::new(SelectFirst, compare) } }
}

impl<K, T, C, A> Map<K, T, C, A>
where C: KeyCompare<K>,
      A: Allocator
{
    pub fn new_in(compare: C, alloc: A) -> Self { Self { _impl: MapTree::new_in(SelectFirst, compare, alloc) } }
    pub fn try_new_in(compare: C, alloc: A) -> Result<Self, AllocError> {
        Ok(Self { _impl: MapTree::try_new_in(SelectFirst, compare, alloc)? })
    }

    pub fn len(&self) -> usize { self._impl.len() }
    pub fn is_empty(&self) -> bool { self._impl.is_empty() }
    pub fn as_tree(&self) -> &MapTree<K, T, C, A> { &self._impl }

    // Like std::map::insert, an existing entry wins and the new one is dropped
    pub fn insert(&mut self, key: K, value: T) -> bool { self._impl.insert_unique((key, value)).1 }
    pub fn try_insert(&mut self, key: K, value: T) -> Result<bool, AllocError> {
        Ok(self._impl.try_insert_unique((key, value))?.1)
    }

    // Overwrites the value of an existing entry, returning the old one
    pub fn insert_or_assign(&mut self, key: K, value: T) -> Option<T> {
        if let Some(entry) = self._impl.find_mut(&key).into_value_mut() {
            return Some(mem::replace(&mut entry.1, value));
        }
        self._impl.insert_unique((key, value));
        None
    }

    // map[key]
    pub fn get_or_insert_default(&mut self, key: K) -> &mut T
    where T: Default
    {
        let mut n = self._impl.find(&key).position().as_ptr();
        if unsafe { is_header(n) } {
            n = match self._impl.insert_unique_node((key, T::default())) {
                Ok((n, _)) => n,
                Err(_) => handle_alloc_error(Layout::new::<Node<(K, T)>>())
            };
        }
        // SAFETY: n is a live node of this map and the borrow of self covers it
        &mut unsafe { Node::<(K, T)>::value_of_mut(n) }.1
    }

    pub fn get(&self, key: &K) -> Option<&T> { self._impl.get(key).map(|e| &e.1) }
    pub fn get_mut(&mut self, key: &K) -> Option<&mut T> {
        self._impl.find_mut(key).into_value_mut().map(|e| &mut e.1)
    }
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &T)> {
        self._impl.get(key).map(|e| (&e.0, &e.1))
    }
    pub fn contains_key(&self, key: &K) -> bool { self._impl.contains(key) }

    pub fn remove(&mut self, key: &K) -> Option<T> { self._impl.erase(key).map(|e| e.1) }
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, T)> { self._impl.erase(key) }
    pub fn clear(&mut self) { self._impl.clear() }

    pub fn find(&self, key: &K) -> Cursor<'_, (K, T)> { self._impl.find(key) }
    pub fn find_mut(&mut self, key: &K) -> CursorMut<'_, K, (K, T), SelectFirst, C, A> { self._impl.find_mut(key) }
    pub fn lower_bound(&self, key: &K) -> Cursor<'_, (K, T)> { self._impl.lower_bound(key) }
    pub fn upper_bound(&self, key: &K) -> Cursor<'_, (K, T)> { self._impl.upper_bound(key) }
    pub fn begin(&self) -> Cursor<'_, (K, T)> { self._impl.begin() }
    pub fn end(&self) -> Cursor<'_, (K, T)> { self._impl.end() }

    pub fn first_key_value(&self) -> Option<(&K, &T)> { self._impl.first().map(|e| (&e.0, &e.1)) }
    pub fn last_key_value(&self) -> Option<(&K, &T)> { self._impl.last().map(|e| (&e.0, &e.1)) }
    pub fn pop_first(&mut self) -> Option<(K, T)> { self._impl.pop_first() }
    pub fn pop_last(&mut self) -> Option<(K, T)> { self._impl.pop_last() }

    pub fn iter(&self) -> Iter<'_, K, T> { Iter(self._impl.iter()) }
    pub fn iter_mut(&mut self) -> IterMut<'_, K, T> { IterMut(self._impl.iter_mut()) }
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator + '_ {
        self.iter().map(|(k, _)| k)
    }
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        self.iter().map(|(_, v)| v)
    }
    pub fn values_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut T> + ExactSizeIterator + '_ {
        self.iter_mut().map(|(_, v)| v)
    }
}

pub struct Iter<'a, K, T>(cursor::Iter<'a, (K, T)>);

impl<'a, K, T> Clone for Iter<'a, K, T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<'a, K, T> Iterator for Iter<'a, K, T> {
    type Item = (&'a K, &'a T);
    fn next(&mut self) -> Option<Self::Item> { self.0.next().map(|e| (&e.0, &e.1)) }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<'a, K, T> DoubleEndedIterator for Iter<'a, K, T> {
    fn next_back(&mut self) -> Option<Self::Item> { self.0.next_back().map(|e| (&e.0, &e.1)) }
}

impl<'a, K, T> ExactSizeIterator for Iter<'a, K, T> {}
impl<'a, K, T> FusedIterator for Iter<'a, K, T> {}

// Keys stay behind a shared reference, only the mapped half is writable
pub struct IterMut<'a, K, T>(cursor::IterMut<'a, (K, T)>);

impl<'a, K, T> Iterator for IterMut<'a, K, T> {
    type Item = (&'a K, &'a mut T);
    fn next(&mut self) -> Option<Self::Item> { self.0.next().map(|e| (&e.0, &mut e.1)) }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<'a, K, T> DoubleEndedIterator for IterMut<'a, K, T> {
    fn next_back(&mut self) -> Option<Self::Item> { self.0.next_back().map(|e| (&e.0, &mut e.1)) }
}

impl<'a, K, T> ExactSizeIterator for IterMut<'a, K, T> {}
impl<'a, K, T> FusedIterator for IterMut<'a, K, T> {}

impl<K, T, C> Default for Map<K, T, C, Global>
where C: KeyCompare<K> + Default
{
    fn default() -> Self { Self::with_compare(C::default()) }
}

impl<K, T, C, A> Debug for Map<K, T, C, A>
where C: KeyCompare<K>,
      A: Allocator,
      K: Debug,
      T: Debug
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, T, C, A> PartialEq for Map<K, T, C, A>
where C: KeyCompare<K>,
      A: Allocator,
      K: PartialEq,
      T: PartialEq
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, T, C, A> Extend<(K, T)> for Map<K, T, C, A>
where C: KeyCompare<K>,
      A: Allocator
{
    // later duplicates overwrite, same as BTreeMap
    fn extend<I: IntoIterator<Item = (K, T)>>(&mut self, iter: I) {
        for (k, v) in iter { self.insert_or_assign(k, v); }
    }
}

impl<K, T, C> FromIterator<(K, T)> for Map<K, T, C, Global>
where C: KeyCompare<K> + Default
{
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<'a, K, T, C, A> IntoIterator for &'a Map<K, T, C, A>
where C: KeyCompare<K>,
      A: Allocator
{
    type Item = (&'a K, &'a T);
    type IntoIter = Iter<'a, K, T>;
    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

impl<'a, K, T, C, A> IntoIterator for &'a mut Map<K, T, C, A>
where C: KeyCompare<K>,
      A: Allocator
{
    type Item = (&'a K, &'a mut T);
    type IntoIter = IterMut<'a, K, T>;
    fn into_iter(self) -> Self::IntoIter { self.iter_mut() }
}

impl<K, T, C, A> IntoIterator for Map<K, T, C, A>
where C: KeyCompare<K>,
      A: Allocator
{
    type Item = (K, T);
    type IntoIter = cursor::IntoIter<K, (K, T), SelectFirst, C, A>;
    fn into_iter(self) -> Self::IntoIter { self._impl.into_iter() }
}
