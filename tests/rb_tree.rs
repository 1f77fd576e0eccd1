use std::collections::BTreeMap;

use akakuro::{Color, NodeId, RbTree};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use simplelog::{Config, LevelFilter, TestLogger};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

fn init_logging() {
    // Another test may have installed the logger already.
    let _ = TestLogger::init(LevelFilter::Trace, Config::default());
}

/// Keys drawn from a narrow range so duplicates are common.
fn key_strategy() -> impl Strategy<Value = i64> {
    -500i64..500i64
}

/// A multiset model of the tree: key -> number of copies.
#[derive(Default)]
struct Model {
    counts: BTreeMap<i64, usize>,
}

impl Model {
    fn insert(&mut self, key: i64) {
        *self.counts.entry(key).or_default() += 1;
    }

    fn remove(&mut self, key: i64) {
        let count = self.counts.get_mut(&key).expect("key missing from model");
        *count -= 1;
        if *count == 0 {
            self.counts.remove(&key);
        }
    }

    fn sorted(&self) -> Vec<i64> {
        self.counts.iter().flat_map(|(&key, &count)| std::iter::repeat_n(key, count)).collect()
    }
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum TreeOp {
    Insert(i64),
    Remove(i64),
    EraseNth(usize),
    Find(i64),
    Min,
    Max,
}

fn tree_op_strategy() -> impl Strategy<Value = TreeOp> {
    prop_oneof![
        6 => key_strategy().prop_map(TreeOp::Insert),
        2 => key_strategy().prop_map(TreeOp::Remove),
        2 => any::<usize>().prop_map(TreeOp::EraseNth),
        2 => key_strategy().prop_map(TreeOp::Find),
        1 => Just(TreeOp::Min),
        1 => Just(TreeOp::Max),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays random operations against the tree and a multiset model, validating the
    /// red-black invariants after every step.
    #[test]
    fn tree_ops_match_model(ops in proptest::collection::vec(tree_op_strategy(), TEST_SIZE)) {
        let mut tree: RbTree<i64> = RbTree::new();
        let mut model = Model::default();

        for op in &ops {
            match *op {
                TreeOp::Insert(key) => {
                    let node = tree.insert(key);
                    prop_assert_eq!(*tree.key(node), key);
                    model.insert(key);
                }
                TreeOp::Remove(key) => {
                    let removed = tree.remove(&key);
                    prop_assert_eq!(removed.is_some(), model.counts.contains_key(&key), "remove({})", key);
                    if removed.is_some() {
                        model.remove(key);
                    }
                }
                TreeOp::EraseNth(which) => {
                    if tree.is_empty() {
                        continue;
                    }
                    let node = tree.node_ids().nth(which % tree.len()).unwrap();
                    let key = tree.erase(node);
                    prop_assert!(!tree.contains_node(node));
                    model.remove(key);
                }
                TreeOp::Find(key) => {
                    let found = tree.find(&key);
                    prop_assert_eq!(found.is_some(), model.counts.contains_key(&key), "find({})", key);
                    if let Some(node) = found {
                        prop_assert_eq!(*tree.key(node), key);
                    }
                }
                TreeOp::Min => {
                    prop_assert_eq!(tree.first(), model.counts.keys().next());
                }
                TreeOp::Max => {
                    prop_assert_eq!(tree.last(), model.counts.keys().next_back());
                }
            }

            prop_assert_eq!(tree.validate(), Ok(()));
            prop_assert_eq!(tree.len(), model.counts.values().sum::<usize>());
        }

        prop_assert_eq!(tree.iter().copied().collect::<Vec<_>>(), model.sorted());
    }

    /// `export_sorted` yields a non-decreasing prefix of length `min(len, capacity)`.
    #[test]
    fn export_sorted_is_bounded_prefix(
        keys in proptest::collection::vec(key_strategy(), 0..TEST_SIZE),
        capacity in 0usize..TEST_SIZE,
    ) {
        let tree: RbTree<i64> = keys.iter().copied().collect();
        let exported = tree.export_sorted(capacity);

        let mut expected = keys.clone();
        expected.sort_unstable();
        expected.truncate(capacity);

        prop_assert_eq!(exported.len(), keys.len().min(capacity));
        prop_assert!(exported.windows(2).all(|pair| pair[0] <= pair[1]));
        prop_assert_eq!(exported, expected);
    }

    /// Erasing every node, in any order, leaves a tree equal to a fresh one.
    #[test]
    fn erase_all_in_any_order(
        keys in proptest::collection::vec(key_strategy(), 1..TEST_SIZE),
        order in proptest::collection::vec(any::<usize>(), TEST_SIZE),
    ) {
        let mut tree = RbTree::new();
        let mut nodes: Vec<NodeId> = keys.iter().map(|&key| tree.insert(key)).collect();

        for pick in order.iter().take(keys.len()) {
            let node = nodes.swap_remove(pick % nodes.len());
            tree.erase(node);
            prop_assert_eq!(tree.validate(), Ok(()));
        }

        prop_assert!(tree.is_empty());
        prop_assert_eq!(tree.root(), None);
        prop_assert_eq!(tree, RbTree::new());
    }

    /// Inserting then finding returns the key; erasing it makes it unfindable unless a copy remains.
    #[test]
    fn insert_find_erase_round_trip(
        keys in proptest::collection::vec(key_strategy(), 0..200),
        probe in key_strategy(),
    ) {
        let mut tree: RbTree<i64> = keys.iter().copied().collect();
        let node = tree.insert(probe);
        let found = tree.find(&probe).unwrap();
        prop_assert_eq!(*tree.key(found), probe);

        prop_assert_eq!(tree.erase(node), probe);
        let copies = keys.iter().filter(|&&key| key == probe).count();
        prop_assert_eq!(tree.find(&probe).is_some(), copies > 0);
    }

    /// Walking successors from `min` visits every key in order; predecessors from `max` reverse it.
    #[test]
    fn successor_and_predecessor_walks(keys in proptest::collection::vec(key_strategy(), 0..500)) {
        let tree: RbTree<i64> = keys.iter().copied().collect();

        let mut forward = Vec::new();
        let mut current = tree.min();
        while let Some(node) = current {
            forward.push(*tree.key(node));
            current = tree.successor(node);
        }

        let mut backward = Vec::new();
        let mut current = tree.max();
        while let Some(node) = current {
            backward.push(*tree.key(node));
            current = tree.predecessor(node);
        }
        backward.reverse();

        let mut expected = keys.clone();
        expected.sort_unstable();
        prop_assert_eq!(&forward, &expected);
        prop_assert_eq!(&backward, &expected);
    }
}

// ─── Concrete scenarios ──────────────────────────────────────────────────────

#[test]
fn ascending_three_rotates_middle_to_root() {
    init_logging();
    let mut tree = RbTree::new();
    let ten = tree.insert(10);
    let twenty = tree.insert(20);
    let thirty = tree.insert(30);

    assert_eq!(tree.root(), Some(twenty));
    assert_eq!(tree.color(twenty), Color::Black);
    assert_eq!(tree.left(twenty), Some(ten));
    assert_eq!(tree.right(twenty), Some(thirty));
    assert_eq!(tree.color(ten), Color::Red);
    assert_eq!(tree.color(thirty), Color::Red);
    assert_eq!(tree.validate(), Ok(()));
}

#[test]
fn erase_root_with_two_children_uses_successor() {
    init_logging();
    let mut tree = RbTree::new();
    let ten = tree.insert(10);
    let twenty = tree.insert(20);
    let thirty = tree.insert(30);

    assert_eq!(tree.erase(twenty), 20);

    assert_eq!(tree.root(), Some(thirty));
    assert_eq!(tree.color(thirty), Color::Black);
    assert_eq!(tree.left(thirty), Some(ten));
    assert_eq!(tree.right(thirty), None);
    assert_eq!(tree.color(ten), Color::Red);
    assert_eq!(tree.parent(ten), Some(thirty));
    assert_eq!(tree.validate(), Ok(()));
}

#[test]
fn export_sorted_truncates_silently() {
    let tree = RbTree::from([40, 10, 50, 20, 30]);
    assert_eq!(tree.export_sorted(3), vec![10, 20, 30]);
    assert_eq!(tree.export_sorted(0), Vec::<i32>::new());
    assert_eq!(tree.len(), 5);
}

#[test]
fn empty_tree_queries() {
    let tree: RbTree<i64> = RbTree::new();
    assert_eq!(tree.min(), None);
    assert_eq!(tree.max(), None);
    assert_eq!(tree.first(), None);
    assert_eq!(tree.find(&0), None);
    assert_eq!(tree.export_sorted(4), Vec::<i64>::new());
    assert_eq!(tree.iter().len(), 0);
    assert_eq!(tree.validate(), Ok(()));
}

#[test]
fn duplicates_are_kept_in_insertion_order() {
    let mut tree = RbTree::new();
    let ids: Vec<NodeId> = (0..8).map(|_| tree.insert(1)).collect();
    assert_eq!(tree.validate(), Ok(()));
    assert_eq!(tree.node_ids().collect::<Vec<_>>(), ids);
    assert!(tree.contains(&1));

    while tree.remove(&1).is_some() {
        assert_eq!(tree.validate(), Ok(()));
    }
    assert!(tree.is_empty());
}

#[test]
fn clear_then_reuse() {
    init_logging();
    let mut tree: RbTree<i64> = (0..1_000).collect();
    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.root(), None);
    assert_eq!(tree.validate(), Ok(()));

    tree.extend([3, 1, 2]);
    assert_eq!(tree.export_sorted(10), vec![1, 2, 3]);
    assert_eq!(tree.validate(), Ok(()));
}

#[test]
fn borrowed_lookup() {
    let mut tree: RbTree<String> = RbTree::new();
    tree.insert("pear".to_string());
    tree.insert("apple".to_string());

    assert!(tree.contains("apple"));
    assert_eq!(tree.remove("pear"), Some("pear".to_string()));
    assert!(!tree.contains("pear"));
}

#[test]
fn export_into_fills_prefix() {
    let tree = RbTree::from([5, 3, 9, 1]);
    let mut out = [0; 3];
    assert_eq!(tree.export_into(&mut out), 3);
    assert_eq!(out, [1, 3, 5]);
}

#[test]
fn clone_is_independent() {
    let original = RbTree::from([1, 2, 3]);
    let mut copy = original.clone();
    copy.remove(&2);

    assert_eq!(original.export_sorted(10), vec![1, 2, 3]);
    assert_eq!(copy.export_sorted(10), vec![1, 3]);
    assert_ne!(original, copy);
}

#[test]
fn debug_lists_keys_in_order() {
    let tree = RbTree::from([2, 1, 3]);
    assert_eq!(format!("{tree:?}"), "{1, 2, 3}");
}

#[test]
#[should_panic(expected = "`node` has been erased!")]
fn erasing_twice_panics() {
    let mut tree = RbTree::new();
    tree.insert(1);
    let node = tree.insert(2);
    tree.erase(node);
    tree.erase(node);
}

#[test]
fn stale_id_is_rejected_after_slot_reuse() {
    let mut tree = RbTree::new();
    tree.insert(1);
    let stale = tree.insert(2);
    tree.erase(stale);
    let nine = tree.insert(9);

    assert!(!tree.contains_node(stale));
    assert!(tree.contains_node(nine));
    assert_ne!(stale, nine);
    assert_eq!(tree.export_sorted(4), vec![1, 9]);
}

#[test]
#[should_panic(expected = "`node` has been erased!")]
fn erasing_stale_id_after_slot_reuse_panics() {
    let mut tree = RbTree::new();
    tree.insert(1);
    let stale = tree.insert(2);
    tree.erase(stale);
    tree.insert(9);
    tree.erase(stale);
}

#[test]
fn ids_from_before_clear_stay_dead() {
    let mut tree = RbTree::new();
    let old = tree.insert(5);
    tree.clear();
    let new = tree.insert(5);

    assert!(!tree.contains_node(old));
    assert!(tree.contains_node(new));
    assert_eq!(tree.find(&5), Some(new));
}

// ─── Insertion patterns ──────────────────────────────────────────────────────

/// Deterministic pseudo-random values using an LCG.
fn random_values_deterministic(n: usize) -> Vec<i64> {
    let mut values = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        values.push((x >> 33) as i64);
    }
    values
}

mod insertion_pattern_tests {
    use super::{RbTree, random_values_deterministic};
    use pretty_assertions::assert_eq;

    const N: usize = 10_000;

    fn check_pattern(keys: &[i64]) {
        let mut tree = RbTree::new();
        for &key in keys {
            tree.insert(key);
        }
        assert_eq!(tree.validate(), Ok(()));

        let mut expected = keys.to_vec();
        expected.sort_unstable();
        assert_eq!(tree.export_sorted(N), expected);
        assert_eq!(tree.first(), expected.first());
        assert_eq!(tree.last(), expected.last());

        for &key in keys {
            let node = tree.find(&key).unwrap();
            tree.erase(node);
        }
        assert_eq!(tree.validate(), Ok(()));
        assert!(tree.is_empty());
    }

    #[test]
    fn ordered_inserts() {
        check_pattern(&(0..N as i64).collect::<Vec<_>>());
    }

    #[test]
    fn reverse_ordered_inserts() {
        check_pattern(&(0..N as i64).rev().collect::<Vec<_>>());
    }

    #[test]
    fn random_inserts() {
        check_pattern(&random_values_deterministic(N));
    }
}
