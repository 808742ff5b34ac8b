// SGI-style red-black tree cells.
// The header is a bare NodeBase: header.parent is the root (null when empty),
// header.left/right cache the minimum/maximum node (the header itself when empty),
// and it's colored red. Leaves are null links.

use std::ptr;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeColor {
    Red = 0,
    Black
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeDirection {
    Left = 0,
    Right
}

impl NodeDirection {
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left
        }
    }
}

pub(crate) type BasePtr = *mut NodeBase;

#[repr(C)]
#[derive(Debug)]
pub(crate) struct NodeBase {
    pub(crate) left: BasePtr,
    pub(crate) parent: BasePtr,
    pub(crate) right: BasePtr,
    pub(crate) color: NodeColor,
    pub(crate) nil: bool
}

// Node<V> starts with its NodeBase, so a *mut Node<V> can be used as a BasePtr and
// any non-header BasePtr handed out by a tree of V can be cast back.
#[repr(C)]
pub(crate) struct Node<V> {
    pub(crate) base: NodeBase,
    pub(crate) value: V
}

impl NodeBase {
    pub(crate) fn new_header() -> Self {
        Self {
            left: ptr::null_mut(),
            parent: ptr::null_mut(),
            right: ptr::null_mut(),
            color: NodeColor::Red,
            nil: true
        }
    }

    // New nodes are always red, a red leaf can't change any path's black count
    pub(crate) fn new_leaf(parent: BasePtr) -> Self {
        Self {
            left: ptr::null_mut(),
            parent,
            right: ptr::null_mut(),
            color: NodeColor::Red,
            nil: false
        }
    }
}

impl<V> Node<V> {
    pub(crate) fn new(value: V, parent: BasePtr) -> Self {
        Self { base: NodeBase::new_leaf(parent), value }
    }

    // SAFETY: n must be a live, non-header node of a tree storing V
    pub(crate) unsafe fn value_of<'a>(n: BasePtr) -> &'a V {
        &(*(n as *mut Self)).value
    }

    pub(crate) unsafe fn value_of_mut<'a>(n: BasePtr) -> &'a mut V {
        &mut (*(n as *mut Self)).value
    }
}

// Null links count as black
pub(crate) unsafe fn is_red(n: BasePtr) -> bool {
    !n.is_null() && (*n).color == NodeColor::Red
}

pub(crate) unsafe fn is_header(n: BasePtr) -> bool {
    (*n).nil
}

pub(crate) unsafe fn child(n: BasePtr, dir: NodeDirection) -> BasePtr {
    match dir {
        NodeDirection::Left => (*n).left,
        NodeDirection::Right => (*n).right
    }
}

pub(crate) unsafe fn minimum(mut n: BasePtr) -> BasePtr {
    while !(*n).left.is_null() { n = (*n).left; }
    n
}

pub(crate) unsafe fn maximum(mut n: BasePtr) -> BasePtr {
    while !(*n).right.is_null() { n = (*n).right; }
    n
}

// In-order next node. The maximum's successor is the header, and the header's
// successor is the minimum (or the header again when the tree is empty).
pub(crate) unsafe fn successor(mut n: BasePtr) -> BasePtr {
    if is_header(n) { return (*n).left; }
    if !(*n).right.is_null() { return minimum((*n).right); }
    let mut p = (*n).parent;
    while !is_header(p) && ptr::eq(n, (*p).right) {
        n = p;
        p = (*p).parent;
    }
    p
}

// Mirror of successor. --end() is the cached maximum.
pub(crate) unsafe fn predecessor(mut n: BasePtr) -> BasePtr {
    if is_header(n) { return (*n).right; }
    if !(*n).left.is_null() { return maximum((*n).left); }
    let mut p = (*n).parent;
    while !is_header(p) && ptr::eq(n, (*p).left) {
        n = p;
        p = (*p).parent;
    }
    p
}

#[cfg(test)]
pub mod tests {
    use super::{
        maximum,
        minimum,
        predecessor,
        successor,
        BasePtr,
        Node,
        NodeBase,
        NodeColor,
        NodeDirection
    };
    use std::error::Error;

    type TestReturn = Result<(), Box<dyn Error>>;

    // Hand-wired tree on the stack:
    //
    //        4
    //       / \
    //      2   6
    //     / \
    //    1   3
    //
    struct Fixture {
        header: Box<NodeBase>,
        nodes: Vec<Box<Node<u32>>>
    }

    impl Fixture {
        fn new() -> Self {
            let mut header = Box::new(NodeBase::new_header());
            let mut nodes: Vec<Box<Node<u32>>> = [1, 2, 3, 4, 6].iter()
                .map(|v| Box::new(Node::new(*v, std::ptr::null_mut()))).collect();
            let p: Vec<BasePtr> = nodes.iter_mut().map(|n| &raw mut n.base).collect();
            let h = &raw mut *header;
            unsafe {
                let (n1, n2, n3, n4, n6) = (p[0], p[1], p[2], p[3], p[4]);
                (*h).parent = n4;
                (*h).left = n1;
                (*h).right = n6;
                (*n4).parent = h;
                (*n4).left = n2;
                (*n4).right = n6;
                (*n2).parent = n4;
                (*n2).left = n1;
                (*n2).right = n3;
                (*n6).parent = n4;
                (*n1).parent = n2;
                (*n3).parent = n2;
            }
            Self { header, nodes }
        }
        fn header(&mut self) -> BasePtr { &raw mut *self.header }
        fn node(&mut self, value: u32) -> BasePtr {
            &raw mut self.nodes.iter_mut().find(|n| n.value == value).unwrap().base
        }
    }

    #[test]
    pub fn direction_opposite() -> TestReturn {
        assert_eq!(NodeDirection::Left.opposite(), NodeDirection::Right);
        assert_eq!(NodeDirection::Right.opposite(), NodeDirection::Left);
        Ok(())
    }

    #[test]
    pub fn header_starts_red() -> TestReturn {
        let header = NodeBase::new_header();
        assert!(header.color == NodeColor::Red, "Header should be red");
        assert!(header.nil, "Header should be flagged as nil");
        let leaf = NodeBase::new_leaf(std::ptr::null_mut());
        assert!(leaf.color == NodeColor::Red, "New leaves should be red");
        Ok(())
    }

    #[test]
    pub fn walk_forwards_and_backwards() -> TestReturn {
        let mut fx = Fixture::new();
        let header = fx.header();
        let mut out = vec![];
        unsafe {
            let mut n = successor(header);
            while n != header {
                out.push(*Node::<u32>::value_of(n));
                n = successor(n);
            }
        }
        assert_eq!(out, vec![1, 2, 3, 4, 6]);
        let mut back = vec![];
        unsafe {
            let mut n = predecessor(header);
            while n != header {
                back.push(*Node::<u32>::value_of(n));
                n = predecessor(n);
            }
        }
        assert_eq!(back, vec![6, 4, 3, 2, 1]);
        Ok(())
    }

    #[test]
    pub fn extremes_of_subtrees() -> TestReturn {
        let mut fx = Fixture::new();
        let n2 = fx.node(2);
        let n4 = fx.node(4);
        unsafe {
            assert_eq!(*Node::<u32>::value_of(minimum(n4)), 1);
            assert_eq!(*Node::<u32>::value_of(maximum(n4)), 6);
            assert_eq!(*Node::<u32>::value_of(maximum(n2)), 3);
            // 3 has no right child, its successor is the nearest right-ancestor
            let n3 = fx.node(3);
            assert_eq!(*Node::<u32>::value_of(successor(n3)), 4);
            let n6 = fx.node(6);
            assert!(successor(n6) == fx.header(), "Maximum should be followed by the header");
        }
        Ok(())
    }
}
