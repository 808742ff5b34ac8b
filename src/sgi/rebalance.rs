// Value-independent red-black tree restructuring. Everything here works on NodeBase
// links and the tree header; header.parent is the root, header.left/right the
// cached minimum/maximum.

use crate::sgi::node::{
    child,
    is_red,
    maximum,
    minimum,
    BasePtr,
    NodeColor,
    NodeDirection
};
use log::trace;
use std::ptr;

unsafe fn replace_child(header: BasePtr, old: BasePtr, new: BasePtr) {
    let p = (*old).parent;
    if ptr::eq(old, (*header).parent) {
        (*header).parent = new;
    } else if ptr::eq(old, (*p).left) {
        (*p).left = new;
    } else {
        (*p).right = new;
    }
}

//
//      p           p
//     /           /
//    n           r
//   / \    =>   / \
//  x   r       n   y
//     / \     / \
//    o  y    x   o
//
// NOTE: n->right must be non-null
pub(crate) unsafe fn rotate_left(n: BasePtr, header: BasePtr) {
    let r = (*n).right;
    let o = (*r).left;
    (*n).right = o;
    if !o.is_null() { (*o).parent = n; }
    (*r).parent = (*n).parent;
    replace_child(header, n, r);
    (*r).left = n;
    (*n).parent = r;
}

//
//        p           p
//       /           /
//      n           r
//     / \    =>   / \
//    r   y       x   n
//   / \             / \
//  x  o            o  y
//
// NOTE: n->left must be non-null
pub(crate) unsafe fn rotate_right(n: BasePtr, header: BasePtr) {
    let r = (*n).left;
    let o = (*r).right;
    (*n).left = o;
    if !o.is_null() { (*o).parent = n; }
    (*r).parent = (*n).parent;
    replace_child(header, n, r);
    (*r).right = n;
    (*n).parent = r;
}

// Rotating towards `dir` moves n down on that side
pub(crate) unsafe fn rotate(n: BasePtr, dir: NodeDirection, header: BasePtr) {
    match dir {
        NodeDirection::Left => rotate_left(n, header),
        NodeDirection::Right => rotate_right(n, header)
    }
}

unsafe fn side_of(n: BasePtr, parent: BasePtr) -> NodeDirection {
    match ptr::eq(n, (*parent).left) {
        true => NodeDirection::Left,
        false => NodeDirection::Right
    }
}

// x is a freshly linked red leaf. The only possible violation is a red x under a red
// parent; walk it upwards and finish by forcing the root black.
pub(crate) unsafe fn rebalance_after_insert(mut x: BasePtr, header: BasePtr) {
    (*x).color = NodeColor::Red;
    while !ptr::eq(x, (*header).parent) && is_red((*x).parent) {
        // a red parent is never the root, so the grandparent is a real node
        let parent = (*x).parent;
        let grandparent = (*parent).parent;
        let side = side_of(parent, grandparent);
        let uncle = child(grandparent, side.opposite());
        if is_red(uncle) {
            (*parent).color = NodeColor::Black;
            (*uncle).color = NodeColor::Black;
            (*grandparent).color = NodeColor::Red;
            // travel up 2 tree levels
            x = grandparent;
        } else {
            // inner grandchild, straighten the line first
            if ptr::eq(x, child(parent, side.opposite())) {
                x = parent;
                rotate(x, side, header);
            }
            let parent = (*x).parent;
            let grandparent = (*parent).parent;
            (*parent).color = NodeColor::Black;
            (*grandparent).color = NodeColor::Red;
            rotate(grandparent, side.opposite(), header);
        }
    }
    (*(*header).parent).color = NodeColor::Black;
}

// Unlinks z from the tree and restores the red-black properties. Returns the node
// that has left the tree, which is always z: when z has two children its successor
// takes over z's place and color. Nothing is deallocated here.
pub(crate) unsafe fn rebalance_for_erase(z: BasePtr, header: BasePtr) -> BasePtr {
    let mut y = z;
    let x: BasePtr;
    let x_parent: BasePtr;
    if (*y).left.is_null() {
        // at most one child, x may be null
        x = (*y).right;
    } else if (*y).right.is_null() {
        x = (*y).left;
    } else {
        // two children, y is the minimum of the right subtree and has no left child
        y = minimum((*y).right);
        x = (*y).right;
    }
    if !ptr::eq(y, z) {
        // relink y in place of z
        (*(*z).left).parent = y;
        (*y).left = (*z).left;
        if !ptr::eq(y, (*z).right) {
            x_parent = (*y).parent;
            if !x.is_null() { (*x).parent = (*y).parent; }
            // y is a left child here
            (*(*y).parent).left = x;
            (*y).right = (*z).right;
            (*(*z).right).parent = y;
        } else {
            x_parent = y;
        }
        replace_child(header, z, y);
        (*y).parent = (*z).parent;
        std::mem::swap(&mut (*y).color, &mut (*z).color);
        // y now refers to the node that actually left the tree
        y = z;
    } else {
        x_parent = (*y).parent;
        if !x.is_null() { (*x).parent = (*y).parent; }
        replace_child(header, z, x);
        // z may be an extreme, which can only happen with at most one child
        if ptr::eq((*header).left, z) {
            (*header).left = match (*z).right.is_null() {
                true => (*z).parent,
                false => minimum(x)
            };
        }
        if ptr::eq((*header).right, z) {
            (*header).right = match (*z).left.is_null() {
                true => (*z).parent,
                false => maximum(x)
            };
        }
    }
    if (*y).color != NodeColor::Red {
        erase_fixup(x, x_parent, header);
    }
    y
}

// A black node was removed above x, so every path through x is one black short.
// The sibling always exists, otherwise the tree was unbalanced before the removal.
unsafe fn erase_fixup(mut x: BasePtr, mut x_parent: BasePtr, header: BasePtr) {
    while !ptr::eq(x, (*header).parent) && !is_red(x) {
        // x may be null, so find its side from the parent's links
        let side = match ptr::eq(x, (*x_parent).left) {
            true => NodeDirection::Left,
            false => NodeDirection::Right
        };
        let far = side.opposite();
        let mut w = child(x_parent, far);
        if is_red(w) {
            // red sibling: rotate it above the parent to get a black sibling
            (*w).color = NodeColor::Black;
            (*x_parent).color = NodeColor::Red;
            rotate(x_parent, side, header);
            w = child(x_parent, far);
        }
        if !is_red((*w).left) && !is_red((*w).right) {
            // push the missing black upwards
            (*w).color = NodeColor::Red;
            x = x_parent;
            x_parent = (*x_parent).parent;
        } else {
            if !is_red(child(w, far)) {
                // near child red, far child black
                let near = child(w, side);
                if !near.is_null() { (*near).color = NodeColor::Black; }
                (*w).color = NodeColor::Red;
                rotate(w, far, header);
                w = child(x_parent, far);
            }
            // far child red
            (*w).color = (*x_parent).color;
            (*x_parent).color = NodeColor::Black;
            let far_child = child(w, far);
            if !far_child.is_null() { (*far_child).color = NodeColor::Black; }
            rotate(x_parent, side, header);
            trace!("erase fixup resolved by rotation");
            break;
        }
    }
    if !x.is_null() { (*x).color = NodeColor::Black; }
}
