use allocator_api2::alloc::{ AllocError, Allocator, Global };
use crate::sgi::{
    compare::{ CompareLess, Identity, KeyCompare, KeyOf, SelectFirst },
    cursor::{ Cursor, CursorMut, IntoIter, Iter, IterMut, Position },
    node::{ is_header, predecessor, successor, BasePtr, Node, NodeBase },
    rebalance::{ rebalance_after_insert, rebalance_for_erase }
};
use log::{ debug, trace };
use std::{
    alloc::{ handle_alloc_error, Layout },
    fmt::Debug,
    marker::PhantomData,
    ptr::{ self, NonNull }
};

// See https://github.com/gcc-mirror/gcc/blob/master/libstdc%2B%2B-v3/include/bits/stl_tree.h
// (SGI STL lineage: red header, null leaves)

// Red-black tree storing V, ordered by the K that X projects out of each V.
#[repr(C)]
pub struct RbTree<K, V, X, C = CompareLess, A = Global>
where X: KeyOf<V, K>,
      C: KeyCompare<K>,
      A: Allocator
{
    header: BasePtr,
    node_count: usize,
    key_of: X,
    compare: C,
    _allocator: A,
    _data: PhantomData<Box<Node<V>>>,
    _key_ty: PhantomData<K>
}

pub type SetTree<T, C = CompareLess, A = Global> = RbTree<T, T, Identity, C, A>;
pub type MapTree<K, T, C = CompareLess, A = Global> = RbTree<K, (K, T), SelectFirst, C, A>;

impl<K, V, X, C> RbTree<K, V, X, C, Global>
where X: KeyOf<V, K>,
      C: KeyCompare<K>
{
    pub fn new(key_of: X, compare: C) -> Self { Self::new_in(key_of, compare, Global) }
}

impl<K, V, X, C, A> RbTree<K, V, X, C, A>
where X: KeyOf<V, K>,
      C: KeyCompare<K>,
      A: Allocator
{
    pub fn new_in(key_of: X, compare: C, alloc: A) -> Self {
        match Self::try_new_in(key_of, compare, alloc) {
            Ok(v) => v,
            Err(_) => handle_alloc_error(Layout::new::<NodeBase>())
        }
    }

    pub fn try_new_in(key_of: X, compare: C, alloc: A) -> Result<Self, AllocError> {
        let header = alloc.allocate(Layout::new::<NodeBase>())?.cast::<NodeBase>().as_ptr();
        unsafe {
            ptr::write(header, NodeBase::new_header());
            (*header).left = header;
            (*header).right = header;
        }
        trace!("allocated tree header @ 0x{:x}", header as usize);
        Ok(Self {
            header,
            node_count: 0,
            key_of,
            compare,
            _allocator: alloc,
            _data: PhantomData,
            _key_ty: PhantomData
        })
    }

    pub fn len(&self) -> usize { self.node_count }
    pub fn is_empty(&self) -> bool { self.node_count == 0 }
    pub fn key_comp(&self) -> &C { &self.compare }
    pub fn key_of(&self) -> &X { &self.key_of }
    pub fn allocator(&self) -> &A { &self._allocator }

    pub(crate) fn header_ptr(&self) -> BasePtr { self.header }
    // SAFETY: self.header always points to the sentinel node
    pub(crate) fn root(&self) -> BasePtr { unsafe { (*self.header).parent } }
    pub(crate) fn leftmost(&self) -> BasePtr { unsafe { (*self.header).left } }
    pub(crate) fn rightmost(&self) -> BasePtr { unsafe { (*self.header).right } }

    // SAFETY: n must be a live node of this tree, never the header
    pub(crate) unsafe fn key_at(&self, n: BasePtr) -> &K {
        self.key_of.key(Node::<V>::value_of(n))
    }

    fn create_node(&self, value: V, parent: BasePtr) -> Result<BasePtr, AllocError> {
        let layout = Layout::new::<Node<V>>();
        let node = match self._allocator.allocate(layout) {
            Ok(v) => v.cast::<Node<V>>().as_ptr(),
            Err(e) => {
                debug!("failed to allocate tree node ({} bytes), tree left unchanged", layout.size());
                return Err(e);
            }
        };
        unsafe { ptr::write(node, Node::new(value, parent)) };
        Ok(node.cast::<NodeBase>())
    }

    // SAFETY: n must already be unlinked from the tree
    unsafe fn destroy_node(&self, n: BasePtr) -> V {
        let node = n.cast::<Node<V>>();
        let value = ptr::read(&raw const (*node).value);
        self._allocator.deallocate(NonNull::new_unchecked(node.cast::<u8>()), Layout::new::<Node<V>>());
        value
    }

    pub fn begin(&self) -> Cursor<'_, V> { Cursor::new(self.leftmost(), self.header) }
    pub fn end(&self) -> Cursor<'_, V> { Cursor::new(self.header, self.header) }
    pub fn begin_mut(&mut self) -> CursorMut<'_, K, V, X, C, A> {
        let first = self.leftmost();
        CursorMut::new(first, self)
    }
    pub fn end_mut(&mut self) -> CursorMut<'_, K, V, X, C, A> {
        let header = self.header;
        CursorMut::new(header, self)
    }

    pub fn first(&self) -> Option<&V> { self.begin().get() }
    pub fn last(&self) -> Option<&V> { self.end().predecessor().get() }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(self.leftmost(), self.rightmost(), self.node_count)
    }

    // Handing out &mut V lets callers break the ordering, so only the map (which
    // exposes the mapped half of the pair) gets this.
    pub(crate) fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut::new(self.leftmost(), self.rightmost(), self.node_count)
    }

    // First node whose key is not less than key, or the header
    fn lower_bound_node(&self, key: &K) -> BasePtr {
        let mut y = self.header;
        let mut x = self.root();
        while !x.is_null() {
            if !self.compare.less(unsafe { self.key_at(x) }, key) {
                y = x;
                x = unsafe { (*x).left };
            } else {
                x = unsafe { (*x).right };
            }
        }
        y
    }

    // First node whose key is greater than key, or the header
    fn upper_bound_node(&self, key: &K) -> BasePtr {
        let mut y = self.header;
        let mut x = self.root();
        while !x.is_null() {
            if self.compare.less(key, unsafe { self.key_at(x) }) {
                y = x;
                x = unsafe { (*x).left };
            } else {
                x = unsafe { (*x).right };
            }
        }
        y
    }

    fn find_node(&self, key: &K) -> BasePtr {
        let y = self.lower_bound_node(key);
        match ptr::eq(y, self.header) || self.compare.less(key, unsafe { self.key_at(y) }) {
            true => self.header,
            false => y
        }
    }

    pub fn find(&self, key: &K) -> Cursor<'_, V> { Cursor::new(self.find_node(key), self.header) }
    pub fn find_mut(&mut self, key: &K) -> CursorMut<'_, K, V, X, C, A> {
        let n = self.find_node(key);
        CursorMut::new(n, self)
    }
    pub fn lower_bound(&self, key: &K) -> Cursor<'_, V> { Cursor::new(self.lower_bound_node(key), self.header) }
    pub fn upper_bound(&self, key: &K) -> Cursor<'_, V> { Cursor::new(self.upper_bound_node(key), self.header) }
    pub fn equal_range(&self, key: &K) -> (Cursor<'_, V>, Cursor<'_, V>) {
        (self.lower_bound(key), self.upper_bound(key))
    }

    pub fn count(&self, key: &K) -> usize {
        let (mut first, last) = self.equal_range(key);
        let mut count = 0;
        while first != last {
            count += 1;
            first.move_next();
        }
        count
    }

    pub fn contains(&self, key: &K) -> bool { !ptr::eq(self.find_node(key), self.header) }
    pub fn get(&self, key: &K) -> Option<&V> { self.find(key).get() }

    // Parent to link a new node under, and whether it goes on the left. Equal keys
    // descend right, so duplicates keep their insertion order.
    fn insert_point(&self, key: &K) -> (BasePtr, bool) {
        let mut y = self.header;
        let mut x = self.root();
        let mut go_left = true;
        while !x.is_null() {
            y = x;
            go_left = self.compare.less(key, unsafe { self.key_at(x) });
            x = unsafe { if go_left { (*x).left } else { (*x).right } };
        }
        (y, go_left)
    }

    fn link_new(&mut self, parent: BasePtr, go_left: bool, value: V) -> Result<BasePtr, AllocError> {
        // nothing is touched until the node exists
        let z = self.create_node(value, parent)?;
        let header = self.header;
        unsafe {
            if go_left {
                // header.left becomes z when the tree was empty
                (*parent).left = z;
                if ptr::eq(parent, header) {
                    (*header).parent = z;
                    (*header).right = z;
                } else if ptr::eq(parent, (*header).left) {
                    (*header).left = z;
                }
            } else {
                (*parent).right = z;
                if ptr::eq(parent, (*header).right) {
                    (*header).right = z;
                }
            }
            rebalance_after_insert(z, header);
        }
        self.node_count += 1;
        Ok(z)
    }

    // Returns the inserted node, or the node already holding an equivalent key
    pub(crate) fn insert_unique_node(&mut self, value: V) -> Result<(BasePtr, bool), AllocError> {
        let (parent, go_left) = self.insert_point(self.key_of.key(&value));
        let mut j = parent;
        if go_left {
            // covers the empty tree, where parent is the header
            if ptr::eq(j, self.leftmost()) {
                return Ok((self.link_new(parent, go_left, value)?, true));
            }
            j = unsafe { predecessor(j) };
        }
        // j is the largest key not greater than the new one
        if self.compare.less(unsafe { self.key_at(j) }, self.key_of.key(&value)) {
            return Ok((self.link_new(parent, go_left, value)?, true));
        }
        Ok((j, false))
    }

    pub fn try_insert_unique(&mut self, value: V) -> Result<(CursorMut<'_, K, V, X, C, A>, bool), AllocError> {
        let (n, inserted) = self.insert_unique_node(value)?;
        Ok((CursorMut::new(n, self), inserted))
    }

    pub fn insert_unique(&mut self, value: V) -> (CursorMut<'_, K, V, X, C, A>, bool) {
        match self.try_insert_unique(value) {
            Ok(v) => v,
            Err(_) => handle_alloc_error(Layout::new::<Node<V>>())
        }
    }

    pub fn try_insert_equal(&mut self, value: V) -> Result<CursorMut<'_, K, V, X, C, A>, AllocError> {
        let (parent, go_left) = self.insert_point(self.key_of.key(&value));
        let n = self.link_new(parent, go_left, value)?;
        Ok(CursorMut::new(n, self))
    }

    pub fn insert_equal(&mut self, value: V) -> CursorMut<'_, K, V, X, C, A> {
        match self.try_insert_equal(value) {
            Ok(v) => v,
            Err(_) => handle_alloc_error(Layout::new::<Node<V>>())
        }
    }

    // SAFETY: n must be a live node of this tree, never the header
    pub(crate) unsafe fn erase_node(&mut self, n: BasePtr) -> V {
        let removed = rebalance_for_erase(n, self.header);
        self.node_count -= 1;
        // only deallocate once every link is rewritten
        self.destroy_node(removed)
    }

    // Removes the first element equivalent to key. Absent keys are a no-op.
    pub fn erase(&mut self, key: &K) -> Option<V> {
        let n = self.find_node(key);
        match ptr::eq(n, self.header) {
            true => None,
            false => Some(unsafe { self.erase_node(n) })
        }
    }

    pub fn erase_all(&mut self, key: &K) -> usize {
        let mut n = self.lower_bound_node(key);
        // erasing never moves the other nodes, so the bound stays valid
        let last = self.upper_bound_node(key);
        let mut count = 0;
        while !ptr::eq(n, last) {
            let next = unsafe { successor(n) };
            drop(unsafe { self.erase_node(n) });
            n = next;
            count += 1;
        }
        count
    }

    // SAFETY: pos must come from this tree and its node must not have been erased
    // since. Erasing end() returns None.
    pub unsafe fn erase_at(&mut self, pos: Position) -> Option<V> {
        let n = pos.as_ptr();
        match is_header(n) {
            true => None,
            false => Some(self.erase_node(n))
        }
    }

    pub fn pop_first(&mut self) -> Option<V> {
        match self.is_empty() {
            true => None,
            false => Some(unsafe { self.erase_node(self.leftmost()) })
        }
    }

    pub fn pop_last(&mut self) -> Option<V> {
        match self.is_empty() {
            true => None,
            false => Some(unsafe { self.erase_node(self.rightmost()) })
        }
    }

    pub fn clear(&mut self) {
        let root = self.root();
        let count = self.node_count;
        // detach everything first, a panicking destructor then only leaks
        unsafe {
            (*self.header).parent = ptr::null_mut();
            (*self.header).left = self.header;
            (*self.header).right = self.header;
        }
        self.node_count = 0;
        if !root.is_null() {
            unsafe {
                (*root).parent = ptr::null_mut();
                self.destroy_subtree(root);
            }
        }
        trace!("cleared {} tree nodes", count);
    }

    // Post-order teardown over parent links, no recursion. root.parent must be null.
    unsafe fn destroy_subtree(&self, root: BasePtr) {
        let mut x = root;
        while !x.is_null() {
            if !(*x).left.is_null() {
                x = (*x).left;
            } else if !(*x).right.is_null() {
                x = (*x).right;
            } else {
                let p = (*x).parent;
                if !p.is_null() {
                    match ptr::eq((*p).left, x) {
                        true => (*p).left = ptr::null_mut(),
                        false => (*p).right = ptr::null_mut()
                    }
                }
                drop(self.destroy_node(x));
                x = p;
            }
        }
    }
}

impl<K, V, X, C, A> Drop for RbTree<K, V, X, C, A>
where X: KeyOf<V, K>,
      C: KeyCompare<K>,
      A: Allocator
{
    fn drop(&mut self) {
        self.clear();
        // SAFETY: This is the last time that the header can be accessed
        unsafe {
            self._allocator.deallocate(NonNull::new_unchecked(self.header.cast::<u8>()), Layout::new::<NodeBase>());
        }
    }
}

// The tree owns its nodes outright, so it's as thread safe as its parts
unsafe impl<K, V, X, C, A> Send for RbTree<K, V, X, C, A>
where X: KeyOf<V, K> + Send,
      C: KeyCompare<K> + Send,
      A: Allocator + Send,
      K: Send,
      V: Send
{}

unsafe impl<K, V, X, C, A> Sync for RbTree<K, V, X, C, A>
where X: KeyOf<V, K> + Sync,
      C: KeyCompare<K> + Sync,
      A: Allocator + Sync,
      K: Sync,
      V: Sync
{}

impl<K, V, X, C, A> Debug for RbTree<K, V, X, C, A>
where X: KeyOf<V, K>,
      C: KeyCompare<K>,
      A: Allocator,
      V: Debug
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, K, V, X, C, A> IntoIterator for &'a RbTree<K, V, X, C, A>
where X: KeyOf<V, K>,
      C: KeyCompare<K>,
      A: Allocator
{
    type Item = &'a V;
    type IntoIter = Iter<'a, V>;
    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

impl<K, V, X, C, A> IntoIterator for RbTree<K, V, X, C, A>
where X: KeyOf<V, K>,
      C: KeyCompare<K>,
      A: Allocator
{
    type Item = V;
    type IntoIter = IntoIter<K, V, X, C, A>;
    fn into_iter(self) -> Self::IntoIter { IntoIter::new(self) }
}
