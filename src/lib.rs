pub mod sgi {
    pub mod check;
    pub mod compare;
    pub mod cursor;
    pub mod map;
    pub mod node;
    pub mod rebalance;
    pub mod set;
    pub mod tree;
}

#[cfg(test)]
pub(crate) mod test_utils;
