// Ordering predicates and key projections for the tree. A comparator answers
// "does a sort before b" (std::less style strict weak ordering), and two keys are
// considered equal when neither sorts before the other.

pub trait KeyCompare<K> {
    fn less(&self, a: &K, b: &K) -> bool;

    fn equivalent(&self, a: &K, b: &K) -> bool {
        !self.less(a, b) && !self.less(b, a)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompareLess; // std::less
impl<K> KeyCompare<K> for CompareLess
where K: PartialOrd
{
    fn less(&self, a: &K, b: &K) -> bool { a < b }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompareGreater; // std::greater
impl<K> KeyCompare<K> for CompareGreater
where K: PartialOrd
{
    fn less(&self, a: &K, b: &K) -> bool { a > b }
}

impl<K, F> KeyCompare<K> for F
where F: Fn(&K, &K) -> bool
{
    fn less(&self, a: &K, b: &K) -> bool { self(a, b) }
}

// Pulls the ordering key out of a stored value
pub trait KeyOf<V, K> {
    fn key<'a>(&self, value: &'a V) -> &'a K;
}

// Sets: the value is its own key
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Identity;
impl<V> KeyOf<V, V> for Identity {
    fn key<'a>(&self, value: &'a V) -> &'a V { value }
}

// Maps: key/value pairs ordered by the first field
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SelectFirst;
impl<K, T> KeyOf<(K, T), K> for SelectFirst {
    fn key<'a>(&self, value: &'a (K, T)) -> &'a K { &value.0 }
}

impl<V, K, F> KeyOf<V, K> for F
where F: Fn(&V) -> &K
{
    fn key<'a>(&self, value: &'a V) -> &'a K { self(value) }
}

#[cfg(test)]
pub mod tests {
    use super::{ CompareGreater, CompareLess, Identity, KeyCompare, KeyOf, SelectFirst };
    use std::error::Error;

    type TestReturn = Result<(), Box<dyn Error>>;

    struct Entity {
        id: u32,
        _name: &'static str
    }

    fn entity_id(e: &Entity) -> &u32 { &e.id }

    #[test]
    pub fn builtin_comparators() -> TestReturn {
        assert!(CompareLess.less(&1, &2), "1 < 2 under std::less");
        assert!(!CompareLess.less(&2, &2), "Equal keys are not less");
        assert!(CompareGreater.less(&2, &1), "2 sorts before 1 under std::greater");
        assert!(CompareLess.equivalent(&5, &5), "5 should be equivalent to itself");
        assert!(!CompareGreater.equivalent(&5, &6), "5 and 6 are not equivalent");
        Ok(())
    }

    #[test]
    pub fn closure_comparator() -> TestReturn {
        // order by absolute value
        let by_abs = |a: &i32, b: &i32| a.abs() < b.abs();
        assert!(by_abs.less(&1, &-2), "|1| < |-2|");
        assert!(by_abs.equivalent(&-3, &3), "-3 and 3 share a key under abs");
        Ok(())
    }

    #[test]
    pub fn key_projections() -> TestReturn {
        assert_eq!(*Identity.key(&7u8), 7);
        let pair = (3u32, "three");
        assert_eq!(*SelectFirst.key(&pair), 3);
        let e = Entity { id: 42, _name: "Player" };
        assert_eq!(*KeyOf::<Entity, u32>::key(&entity_id, &e), 42);
        Ok(())
    }
}
