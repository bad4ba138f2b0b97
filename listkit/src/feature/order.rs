//! Feature order resolution.
//!
//! Edge `A -> B` means "A runs before B". `after: [X]` on `F` adds `X -> F`;
//! `before: [Y]` on `F` adds `F -> Y`. The sort is a Kahn topological sort
//! that always places the earliest-registered ready feature next, so
//! unconstrained features keep registration order and the result is
//! reproducible.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::ListError;

use super::{FeatureId, FeatureOrder};

/// Resolve an execution order for `features`, given in registration order.
///
/// Returns indices into `features`. Constraints naming unregistered features
/// are ignored. Fails with [`ListError::OrderCycle`] naming the features of
/// one offending cycle.
pub fn resolve_order(features: &[(&FeatureId, &FeatureOrder)]) -> Result<Vec<usize>, ListError> {
    let index: HashMap<&FeatureId, usize> = features
        .iter()
        .enumerate()
        .map(|(i, (id, _))| (*id, i))
        .collect();

    let n = features.len();
    let mut edges: HashSet<(usize, usize)> = HashSet::new();
    for (i, (id, order)) in features.iter().enumerate() {
        for dep in &order.after {
            match index.get(dep) {
                Some(&j) => {
                    edges.insert((j, i));
                }
                None => log::debug!("feature '{id}' runs after unregistered '{dep}'; ignored"),
            }
        }
        for next in &order.before {
            match index.get(next) {
                Some(&j) => {
                    edges.insert((i, j));
                }
                None => log::debug!("feature '{id}' runs before unregistered '{next}'; ignored"),
            }
        }
    }

    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_degree = vec![0usize; n];
    for &(from, to) in &edges {
        successors[from].push(to);
        predecessors[to].push(from);
        in_degree[to] += 1;
    }

    let mut ready: BTreeSet<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut placed = Vec::with_capacity(n);
    while let Some(next) = ready.pop_first() {
        placed.push(next);
        for &succ in &successors[next] {
            in_degree[succ] -= 1;
            if in_degree[succ] == 0 {
                ready.insert(succ);
            }
        }
    }

    if placed.len() == n {
        return Ok(placed);
    }

    let cycle = find_cycle(&in_degree, &predecessors);
    Err(ListError::OrderCycle {
        features: cycle.into_iter().map(|i| features[i].0.clone()).collect(),
    })
}

/// Find one cycle among the nodes Kahn's algorithm could not place.
///
/// Every unplaced node has an unplaced predecessor, so walking predecessors
/// from any of them must revisit a node.
fn find_cycle(in_degree: &[usize], predecessors: &[Vec<usize>]) -> Vec<usize> {
    let remaining = |i: usize| in_degree[i] > 0;
    let Some(start) = (0..in_degree.len()).find(|&i| remaining(i)) else {
        return Vec::new();
    };

    let mut path = vec![start];
    let mut seen: HashMap<usize, usize> = HashMap::from([(start, 0)]);
    let mut current = start;
    loop {
        let Some(prev) = predecessors[current]
            .iter()
            .copied()
            .filter(|&p| remaining(p))
            .min()
        else {
            return path;
        };
        if let Some(&pos) = seen.get(&prev) {
            // path walks backwards along edges; reverse into run order
            let mut cycle: Vec<usize> = path[pos..].to_vec();
            cycle.reverse();
            let min_pos = cycle
                .iter()
                .enumerate()
                .min_by_key(|(_, node)| **node)
                .map(|(pos, _)| pos)
                .unwrap_or(0);
            cycle.rotate_left(min_pos);
            return cycle;
        }
        seen.insert(prev, path.len());
        path.push(prev);
        current = prev;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&'static str]) -> Vec<FeatureId> {
        names.iter().map(|n| FeatureId::from_static(n)).collect()
    }

    fn order(after: &[&'static str], before: &[&'static str]) -> FeatureOrder {
        FeatureOrder {
            after: ids(after),
            before: ids(before),
        }
    }

    fn resolve(constraints: &[(&'static str, FeatureOrder)]) -> Result<Vec<&'static str>, ListError> {
        let owned: Vec<(FeatureId, FeatureOrder)> = constraints
            .iter()
            .map(|(id, o)| (FeatureId::from_static(id), o.clone()))
            .collect();
        let borrowed: Vec<(&FeatureId, &FeatureOrder)> =
            owned.iter().map(|(id, o)| (id, o)).collect();
        resolve_order(&borrowed).map(|idx| idx.into_iter().map(|i| constraints[i].0).collect())
    }

    #[test]
    fn test_unconstrained_keeps_registration_order() {
        let result = resolve(&[
            ("c", FeatureOrder::default()),
            ("a", FeatureOrder::default()),
            ("b", FeatureOrder::default()),
        ])
        .unwrap();
        assert_eq!(result, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_after_moves_feature_behind_dependencies() {
        let result = resolve(&[
            ("pagination", order(&["filters", "sorting"], &[])),
            ("sorting", FeatureOrder::default()),
            ("filters", FeatureOrder::default()),
        ])
        .unwrap();
        assert_eq!(result, vec!["sorting", "filters", "pagination"]);
    }

    #[test]
    fn test_before_moves_feature_ahead() {
        let result = resolve(&[
            ("sorting", FeatureOrder::default()),
            ("filters", order(&[], &["sorting"])),
        ])
        .unwrap();
        assert_eq!(result, vec!["filters", "sorting"]);
    }

    #[test]
    fn test_unknown_constraints_are_ignored() {
        let result = resolve(&[
            ("pagination", order(&["filters"], &["ghost"])),
            ("selection", FeatureOrder::default()),
        ])
        .unwrap();
        assert_eq!(result, vec!["pagination", "selection"]);
    }

    #[test]
    fn test_two_node_cycle_names_both() {
        let err = resolve(&[("a", order(&["b"], &[])), ("b", order(&["a"], &[]))]).unwrap_err();
        match err {
            ListError::OrderCycle { features } => {
                assert_eq!(features, ids(&["a", "b"]));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cycle_excludes_downstream_features() {
        // x depends on the cycle but is not part of it
        let err = resolve(&[
            ("x", order(&["a"], &[])),
            ("a", order(&["c"], &[])),
            ("b", order(&["a"], &[])),
            ("c", order(&["b"], &[])),
        ])
        .unwrap_err();
        match err {
            ListError::OrderCycle { features } => {
                assert_eq!(features.len(), 3);
                assert!(!features.contains(&FeatureId::from_static("x")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let err = resolve(&[("a", order(&["a"], &[]))]).unwrap_err();
        assert!(matches!(err, ListError::OrderCycle { ref features } if features == &ids(&["a"])));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let constraints = [
            ("e", order(&["a"], &[])),
            ("d", FeatureOrder::default()),
            ("c", order(&[], &["a"])),
            ("b", order(&["d"], &["e"])),
            ("a", FeatureOrder::default()),
        ];
        let first = resolve(&constraints).unwrap();
        for _ in 0..10 {
            assert_eq!(resolve(&constraints).unwrap(), first);
        }
        let pos = |n: &str| first.iter().position(|x| *x == n).unwrap();
        assert!(pos("a") < pos("e"));
        assert!(pos("c") < pos("a"));
        assert!(pos("d") < pos("b"));
        assert!(pos("b") < pos("e"));
    }
}
