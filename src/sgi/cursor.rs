// Positions into a tree. A cursor sits either on an element or on the header, which
// stands for end(). Moving forward from end() wraps to the first element and moving
// backwards from end() lands on the last one.

use allocator_api2::alloc::Allocator;
use crate::sgi::{
    compare::{ KeyCompare, KeyOf },
    node::{ is_header, predecessor, successor, BasePtr, Node, NodeBase, NodeColor },
    tree::RbTree
};
use std::{
    fmt::Debug,
    iter::FusedIterator,
    marker::PhantomData,
    ptr::{ self, NonNull }
};

// Opaque identity of a node (or of end()). Only good for comparisons, it keeps no
// borrow on the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position(NonNull<NodeBase>);

impl Position {
    // SAFETY: n comes from a live tree, which never hands out null links as positions
    pub(crate) unsafe fn new(n: BasePtr) -> Self { Self(NonNull::new_unchecked(n)) }
    pub(crate) fn as_ptr(&self) -> BasePtr { self.0.as_ptr() }
}

pub struct Cursor<'a, V> {
    node: BasePtr,
    header: BasePtr,
    _marker: PhantomData<&'a V>
}

impl<'a, V> Clone for Cursor<'a, V> {
    fn clone(&self) -> Self { *self }
}
impl<'a, V> Copy for Cursor<'a, V> {}

impl<'a, V> Cursor<'a, V> {
    pub(crate) fn new(node: BasePtr, header: BasePtr) -> Self {
        Self { node, header, _marker: PhantomData }
    }

    pub fn is_end(&self) -> bool { ptr::eq(self.node, self.header) }

    pub fn get(&self) -> Option<&'a V> {
        match self.is_end() {
            true => None,
            false => Some(unsafe { Node::value_of(self.node) })
        }
    }

    pub fn color(&self) -> Option<NodeColor> {
        match self.is_end() {
            true => None,
            false => Some(unsafe { (*self.node).color })
        }
    }

    pub fn move_next(&mut self) { self.node = unsafe { successor(self.node) }; }
    pub fn move_prev(&mut self) { self.node = unsafe { predecessor(self.node) }; }

    pub fn successor(mut self) -> Self {
        self.move_next();
        self
    }
    pub fn predecessor(mut self) -> Self {
        self.move_prev();
        self
    }

    pub fn position(&self) -> Position { unsafe { Position::new(self.node) } }
}

impl<'a, V> PartialEq for Cursor<'a, V> {
    fn eq(&self, other: &Self) -> bool { ptr::eq(self.node, other.node) }
}
impl<'a, V> Eq for Cursor<'a, V> {}

impl<'a, V> Debug for Cursor<'a, V>
where V: Debug
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.get() {
            Some(v) => write!(f, "Cursor({:?})", v),
            None => write!(f, "Cursor(end)")
        }
    }
}

// A cursor holding the tree mutably, so it can remove the element under it.
pub struct CursorMut<'a, K, V, X, C, A>
where X: KeyOf<V, K>,
      C: KeyCompare<K>,
      A: Allocator
{
    node: BasePtr,
    tree: &'a mut RbTree<K, V, X, C, A>
}

impl<'a, K, V, X, C, A> CursorMut<'a, K, V, X, C, A>
where X: KeyOf<V, K>,
      C: KeyCompare<K>,
      A: Allocator
{
    pub(crate) fn new(node: BasePtr, tree: &'a mut RbTree<K, V, X, C, A>) -> Self {
        Self { node, tree }
    }

    pub fn is_end(&self) -> bool { ptr::eq(self.node, self.tree.header_ptr()) }

    pub fn get(&self) -> Option<&V> { self.as_cursor().get() }

    pub fn move_next(&mut self) { self.node = unsafe { successor(self.node) }; }
    pub fn move_prev(&mut self) { self.node = unsafe { predecessor(self.node) }; }

    pub fn position(&self) -> Position { unsafe { Position::new(self.node) } }

    pub fn as_cursor(&self) -> Cursor<'_, V> { Cursor::new(self.node, self.tree.header_ptr()) }

    pub fn into_cursor(self) -> Cursor<'a, V> {
        let tree: &'a RbTree<K, V, X, C, A> = self.tree;
        Cursor::new(self.node, tree.header_ptr())
    }

    // Only for callers that can't disturb the key (map values)
    pub(crate) fn into_value_mut(self) -> Option<&'a mut V> {
        match unsafe { is_header(self.node) } {
            true => None,
            false => Some(unsafe { Node::value_of_mut(self.node) })
        }
    }

    // Erases the current element and moves on to its successor. Nothing happens at end().
    pub fn remove_current(&mut self) -> Option<V> {
        if self.is_end() { return None; }
        let removed = self.node;
        self.node = unsafe { successor(removed) };
        Some(unsafe { self.tree.erase_node(removed) })
    }
}

pub struct Iter<'a, V> {
    head: BasePtr,
    tail: BasePtr,
    len: usize,
    _marker: PhantomData<&'a V>
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(head: BasePtr, tail: BasePtr, len: usize) -> Self {
        Self { head, tail, len, _marker: PhantomData }
    }
}

impl<'a, V> Clone for Iter<'a, V> {
    fn clone(&self) -> Self { Self::new(self.head, self.tail, self.len) }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;
    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 { return None; }
        let out = unsafe { Node::value_of(self.head) };
        self.head = unsafe { successor(self.head) };
        self.len -= 1;
        Some(out)
    }
    fn size_hint(&self) -> (usize, Option<usize>) { (self.len, Some(self.len)) }
}

impl<'a, V> DoubleEndedIterator for Iter<'a, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 { return None; }
        let out = unsafe { Node::value_of(self.tail) };
        self.tail = unsafe { predecessor(self.tail) };
        self.len -= 1;
        Some(out)
    }
}

impl<'a, V> ExactSizeIterator for Iter<'a, V> {}
impl<'a, V> FusedIterator for Iter<'a, V> {}

pub struct IterMut<'a, V> {
    head: BasePtr,
    tail: BasePtr,
    len: usize,
    _marker: PhantomData<&'a mut V>
}

impl<'a, V> IterMut<'a, V> {
    pub(crate) fn new(head: BasePtr, tail: BasePtr, len: usize) -> Self {
        Self { head, tail, len, _marker: PhantomData }
    }
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;
    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 { return None; }
        let out = unsafe { Node::value_of_mut(self.head) };
        self.head = unsafe { successor(self.head) };
        self.len -= 1;
        Some(out)
    }
    fn size_hint(&self) -> (usize, Option<usize>) { (self.len, Some(self.len)) }
}

impl<'a, V> DoubleEndedIterator for IterMut<'a, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 { return None; }
        let out = unsafe { Node::value_of_mut(self.tail) };
        self.tail = unsafe { predecessor(self.tail) };
        self.len -= 1;
        Some(out)
    }
}

impl<'a, V> ExactSizeIterator for IterMut<'a, V> {}
impl<'a, V> FusedIterator for IterMut<'a, V> {}

// Owning iterator, drains the tree from both ends
pub struct IntoIter<K, V, X, C, A>
where X: KeyOf<V, K>,
      C: KeyCompare<K>,
      A: Allocator
{
    tree: RbTree<K, V, X, C, A>
}

impl<K, V, X, C, A> IntoIter<K, V, X, C, A>
where X: KeyOf<V, K>,
      C: KeyCompare<K>,
      A: Allocator
{
    pub(crate) fn new(tree: RbTree<K, V, X, C, A>) -> Self { Self { tree } }
}

impl<K, V, X, C, A> Iterator for IntoIter<K, V, X, C, A>
where X: KeyOf<V, K>,
      C: KeyCompare<K>,
      A: Allocator
{
    type Item = V;
    fn next(&mut self) -> Option<Self::Item> { self.tree.pop_first() }
    fn size_hint(&self) -> (usize, Option<usize>) { (self.tree.len(), Some(self.tree.len())) }
}

impl<K, V, X, C, A> DoubleEndedIterator for IntoIter<K, V, X, C, A>
where X: KeyOf<V, K>,
      C: KeyCompare<K>,
      A: Allocator
{
    fn next_back(&mut self) -> Option<Self::Item> { self.tree.pop_last() }
}

impl<K, V, X, C, A> ExactSizeIterator for IntoIter<K, V, X, C, A>
where X: KeyOf<V, K>,
      C: KeyCompare<K>,
      A: Allocator
{}
