use super::*;

use crate::pointer::Node;
use crate::succinct::{BitVecBuilder, BitVector};

use proptest::prelude::*;
use std::collections::BTreeMap;
use std::convert::Infallible;

fn validate_trie<V>(t: &PointerTrie<V>) {
    let mut stack: Vec<(bool, &Node<V>)> = vec![(true, t.root())];
    let mut value_count = 0usize;
    while let Some((is_root, node)) = stack.pop() {
        if node.value.is_some() {
            value_count += 1;
        }
        if let Some(children) = &node.children {
            assert!(!children.is_empty(), "empty child map must collapse to None");
            stack.extend(children.values().map(|c| (false, c)));
        }
        if !is_root {
            assert!(
                node.value.is_some() || node.children.is_some(),
                "reachable non-root node must hold a value or children"
            );
        }
    }
    assert_eq!(value_count, t.len(), "value count must match PointerTrie::len");
}

fn collect_all<T: Trie<u64>>(t: &T) -> BTreeMap<String, u64> {
    let mut out = BTreeMap::new();
    t.iterate_all(|k, v| {
        assert!(out.insert(k.to_owned(), *v).is_none(), "key {k:?} visited twice");
        Ok::<_, Infallible>(())
    })
    .unwrap();
    out
}

fn check_against_model<T: Trie<u64>>(t: &T, m: &BTreeMap<String, u64>, queries: &[String]) {
    assert_eq!(t.len(), m.len());
    assert_eq!(&collect_all(t), m);
    for query in queries {
        assert_eq!(t.get(query), m.get(query));

        let mut found = t.prefix_search(query);
        found.sort();
        let expected: Vec<String> = m
            .range(query.clone()..)
            .take_while(|(k, _)| k.starts_with(query.as_str()))
            .map(|(k, _)| k.clone())
            .collect();
        assert_eq!(found, expected, "prefix {query:?}");

        let mut along = Vec::new();
        t.iterate(query, |k, v| {
            along.push((k.to_owned(), *v));
            Ok::<_, Infallible>(())
        })
        .unwrap();
        let expected: Vec<(String, u64)> = query
            .char_indices()
            .map(|(i, _)| &query[..i])
            .chain(std::iter::once(query.as_str()))
            .filter_map(|k| m.get(k).map(|v| (k.to_owned(), *v)))
            .collect();
        assert_eq!(along, expected, "path {query:?}");
    }
}

#[derive(Clone, Debug)]
enum Op<V> {
    Put(String, V),
    Delete(String),
    Get(String),
    Clear,
}

fn key_strategy() -> impl Strategy<Value = String> + Clone {
    // A small alphabet mixing one-, two-, three- and four-byte code points so
    // keys share prefixes often.
    let ch = prop::sample::select(vec!['a', 'b', 'c', 'é', 'ß', '日', '本', '🦀']);
    prop::collection::vec(ch, 0..=8).prop_map(|cs| cs.into_iter().collect())
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op<u64>>> {
    let key = key_strategy();
    let op = prop_oneof![
        50 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Put(k, v)),
        25 => key.clone().prop_map(Op::Delete),
        24 => key.clone().prop_map(Op::Get),
        1 => Just(Op::Clear),
    ];
    prop::collection::vec(op, 0..=1000)
}

fn bits_strategy() -> impl Strategy<Value = Vec<bool>> {
    prop_oneof![
        prop::collection::vec(any::<bool>(), 0..=3000),
        // Sparse and dense runs stress the select samples.
        prop::collection::vec(prop::bool::weighted(0.02), 0..=5000),
        prop::collection::vec(prop::bool::weighted(0.98), 0..=5000),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_u64(ops in ops_strategy()) {
        let mut t: PointerTrie<u64> = PointerTrie::new();
        let mut m: BTreeMap<String, u64> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Put(key, value) => {
                    let fresh_t = t.put(&key, value);
                    let fresh_m = m.insert(key, value).is_none();
                    prop_assert_eq!(fresh_t, fresh_m);
                }
                Op::Delete(key) => {
                    let gone_t = t.delete(&key);
                    let gone_m = m.remove(&key).is_some();
                    prop_assert_eq!(gone_t, gone_m);
                }
                Op::Get(key) => {
                    prop_assert_eq!(t.get(&key), m.get(&key));
                }
                Op::Clear => {
                    t.clear();
                    m.clear();
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        validate_trie(&t);
        let got: Vec<(String, u64)> = t.iter().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(String, u64)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_succinct_matches_pointer(
        entries in prop::collection::btree_map(key_strategy(), any::<u64>(), 0..=200),
        queries in prop::collection::vec(key_strategy(), 0..=32),
    ) {
        let t: PointerTrie<u64> = entries.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        validate_trie(&t);
        let frozen = SuccinctBuilder::build(&t).unwrap();
        prop_assert_eq!(frozen.node_count(), t.node_count());

        let mut queries = queries;
        queries.extend(entries.keys().take(16).cloned());
        queries.push(String::new());

        check_against_model(&t, &entries, &queries);
        check_against_model(&frozen, &entries, &queries);

        let sorted = SuccinctBuilder::from_sorted_iter(entries.iter().map(|(k, v)| (k, *v))).unwrap();
        check_against_model(&sorted, &entries, &queries);
    }

    #[test]
    fn prop_rank_select_naive(bits in bits_strategy()) {
        let mut b = BitVecBuilder::with_capacity(bits.len());
        for &bit in &bits {
            b.push(bit);
        }
        let bv: BitVector = b.finish();
        prop_assert_eq!(bv.len(), bits.len());

        let mut ones = Vec::new();
        let mut zeros = Vec::new();
        for (i, &bit) in bits.iter().enumerate() {
            prop_assert_eq!(bv.get(i), bit);
            prop_assert_eq!(bv.rank1(i), ones.len());
            prop_assert_eq!(bv.rank0(i), zeros.len());
            if bit { ones.push(i) } else { zeros.push(i) }
        }
        prop_assert_eq!(bv.rank1(bits.len()), ones.len());
        prop_assert_eq!(bv.count_ones(), ones.len());
        prop_assert_eq!(bv.count_zeros(), zeros.len());

        for (k, &pos) in ones.iter().enumerate() {
            prop_assert_eq!(bv.select1(k), Some(pos));
        }
        for (k, &pos) in zeros.iter().enumerate() {
            prop_assert_eq!(bv.select0(k), Some(pos));
        }
        prop_assert_eq!(bv.select1(ones.len()), None);
        prop_assert_eq!(bv.select0(zeros.len()), None);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

fn small_key_set() -> Vec<String> {
    ["", "a", "ab", "abc", "b", "日", "日本"]
        .iter()
        .map(|k| k.to_string())
        .collect()
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys = small_key_set();

    for_each_permutation(&keys, |perm| {
        let mut t: PointerTrie<u64> = PointerTrie::new();
        let mut m: BTreeMap<String, u64> = BTreeMap::new();

        for (i, k) in perm.into_iter().enumerate() {
            let v = i as u64;
            assert_eq!(t.insert(&k, v), m.insert(k, v));
        }

        validate_trie(&t);
        // Shape depends only on the key set: "", a, ab, abc, b, 日, 日本.
        assert_eq!(t.node_count(), 7);
        let got: Vec<(String, u64)> = t.iter().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(String, u64)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        assert_eq!(got, expected);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys = small_key_set();

    // Insert in a fixed order, then remove in all permutations.
    let mut base_trie: PointerTrie<u64> = PointerTrie::new();
    let mut base_map: BTreeMap<String, u64> = BTreeMap::new();
    for (i, k) in keys.iter().enumerate() {
        let v = i as u64;
        assert_eq!(base_trie.insert(k, v), base_map.insert(k.clone(), v));
    }

    for_each_permutation(&keys, |perm| {
        let mut t = base_trie.clone();
        let mut m = base_map.clone();

        for k in perm {
            assert_eq!(t.remove(&k), m.remove(&k));
            assert_eq!(t.len(), m.len());
            validate_trie(&t);
            let frozen = SuccinctBuilder::build(&t).unwrap();
            assert_eq!(frozen.node_count(), t.node_count());
            assert_eq!(collect_all(&frozen), m);
        }
        assert_eq!(t.len(), 0);
        assert_eq!(t.node_count(), 1);
        assert!(t.root().children.is_none());
    });
}
