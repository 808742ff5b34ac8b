// Structural validation of a tree: header links, coloring, black heights, ordering
// and the cached extremes. Used heavily by the tests, but cheap enough to call from
// a debug build of anything sitting on top of the tree.

use allocator_api2::alloc::Allocator;
use crate::sgi::{
    compare::{ KeyCompare, KeyOf },
    node::{ is_red, maximum, minimum, successor, BasePtr },
    tree::RbTree
};
use log::debug;
use std::{
    error::Error,
    fmt::Display,
    ptr
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeViolation {
    HeaderCorrupted,
    RedRoot,
    BrokenParentLink,
    RedRedPair,
    BlackHeightMismatch { left: usize, right: usize },
    OutOfOrder,
    StaleMinimum,
    StaleMaximum,
    CountMismatch { expected: usize, found: usize }
}

impl Display for TreeViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HeaderCorrupted => write!(f, "Tree header is not a red sentinel"),
            Self::RedRoot => write!(f, "Root node is red"),
            Self::BrokenParentLink => write!(f, "Child does not point back at its parent"),
            Self::RedRedPair => write!(f, "Red node has a red child"),
            Self::BlackHeightMismatch { left, right } =>
                write!(f, "Black height differs between subtrees ({} vs {})", left, right),
            Self::OutOfOrder => write!(f, "In-order walk is not ascending"),
            Self::StaleMinimum => write!(f, "Header does not cache the minimum"),
            Self::StaleMaximum => write!(f, "Header does not cache the maximum"),
            Self::CountMismatch { expected, found } =>
                write!(f, "Tree reports {} elements but holds {}", expected, found)
        }
    }
}

impl Error for TreeViolation {}

// Black nodes on every path from n down to a null leaf
unsafe fn black_height(n: BasePtr) -> Result<usize, TreeViolation> {
    if n.is_null() { return Ok(0); }
    for c in [(*n).left, (*n).right] {
        if c.is_null() { continue; }
        if !ptr::eq((*c).parent, n) { return Err(TreeViolation::BrokenParentLink); }
        if is_red(n) && is_red(c) { return Err(TreeViolation::RedRedPair); }
    }
    let left = black_height((*n).left)?;
    let right = black_height((*n).right)?;
    if left != right {
        return Err(TreeViolation::BlackHeightMismatch { left, right });
    }
    Ok(left + if is_red(n) { 0 } else { 1 })
}

impl<K, V, X, C, A> RbTree<K, V, X, C, A>
where X: KeyOf<V, K>,
      C: KeyCompare<K>,
      A: Allocator
{
    /// Checks every red-black property and the header bookkeeping. Returns the black
    /// height of the tree (black nodes from the root down to any leaf).
    pub fn validate(&self) -> Result<usize, TreeViolation> {
        let result = unsafe { self.validate_inner() };
        if let Err(e) = &result {
            debug!("tree validation failed: {}", e);
        }
        result
    }

    unsafe fn validate_inner(&self) -> Result<usize, TreeViolation> {
        let header = self.header_ptr();
        if !(*header).nil || !is_red(header) {
            return Err(TreeViolation::HeaderCorrupted);
        }
        let root = self.root();
        if root.is_null() {
            if !ptr::eq(self.leftmost(), header) { return Err(TreeViolation::StaleMinimum); }
            if !ptr::eq(self.rightmost(), header) { return Err(TreeViolation::StaleMaximum); }
            return match self.len() {
                0 => Ok(0),
                n => Err(TreeViolation::CountMismatch { expected: n, found: 0 })
            };
        }
        if !ptr::eq((*root).parent, header) { return Err(TreeViolation::BrokenParentLink); }
        if is_red(root) { return Err(TreeViolation::RedRoot); }
        let height = black_height(root)?;
        if !ptr::eq(self.leftmost(), minimum(root)) { return Err(TreeViolation::StaleMinimum); }
        if !ptr::eq(self.rightmost(), maximum(root)) { return Err(TreeViolation::StaleMaximum); }
        // equal keys are allowed next to each other, but never descending
        let mut found = 1;
        let mut prev = self.leftmost();
        let mut n = successor(prev);
        while !ptr::eq(n, header) {
            if self.key_comp().less(self.key_at(n), self.key_at(prev)) {
                return Err(TreeViolation::OutOfOrder);
            }
            found += 1;
            prev = n;
            n = successor(n);
        }
        if found != self.len() {
            return Err(TreeViolation::CountMismatch { expected: self.len(), found });
        }
        Ok(height)
    }
}
