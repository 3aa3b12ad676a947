//! Property-based tests for path mapping, diffing and substitution.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::fields::FieldMap;
    use crate::path::{is_within, normalize, rewrite_prefix};
    use crate::repository::RepositoryFile;
    use crate::substitution::Substituter;
    use crate::sync::{files_equal, plan, ChangeKind};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn segment() -> impl Strategy<Value = String> {
        "[a-z0-9_.-]{1,8}"
    }

    fn location() -> impl Strategy<Value = String> {
        prop::collection::vec(segment(), 1..4).prop_map(|parts| parts.join("/"))
    }

    /// File sets with unique paths
    fn file_set() -> impl Strategy<Value = Vec<RepositoryFile>> {
        prop::collection::btree_map(location(), "[a-c]{0,3}", 0..8).prop_map(|files| {
            files
                .into_iter()
                .map(|(path, content)| RepositoryFile::new(path, content, "sha"))
                .collect()
        })
    }

    // ============================================================================
    // path property tests
    // ============================================================================

    proptest! {
        /// Property: normalize is idempotent
        #[test]
        fn normalize_is_idempotent(input in "/{0,2}[a-z/]{0,12}/{0,2}") {
            let once = normalize(&input);
            prop_assert_eq!(normalize(once), once);
        }

        /// Property: a rewritten path lies below the target
        #[test]
        fn rewritten_path_lies_below_target(
            source in location(),
            target in location(),
            rest in location(),
        ) {
            let file = format!("{}/{}", source, rest);
            let rewritten = rewrite_prefix(&file, &source, &target);
            prop_assert!(is_within(&rewritten, &target));
            prop_assert_eq!(rewritten, format!("{}/{}", target, rest));
        }

        /// Property: rewriting back and forth restores the path
        #[test]
        fn rewrite_round_trips(source in location(), target in location(), rest in location()) {
            let file = format!("{}/{}", source, rest);
            let there = rewrite_prefix(&file, &source, &target);
            prop_assert_eq!(rewrite_prefix(&there, &target, &source), file);
        }
    }

    // ============================================================================
    // diff property tests
    // ============================================================================

    proptest! {
        /// Property: file set equality does not depend on order
        #[test]
        fn files_equal_ignores_order(files in file_set()) {
            let mut reversed = files.clone();
            reversed.reverse();
            prop_assert!(files_equal(&files, &reversed));
        }

        /// Property: an empty plan means the sets are equal
        #[test]
        fn empty_plan_iff_equal(current in file_set(), desired in file_set()) {
            prop_assert_eq!(plan(&current, &desired).is_empty(), files_equal(&current, &desired));
        }

        /// Property: applying a plan to the current set yields the desired set
        #[test]
        fn plan_reaches_desired_state(current in file_set(), desired in file_set()) {
            let mut state: BTreeMap<String, String> = current
                .iter()
                .map(|f| (f.path.clone(), f.content.clone()))
                .collect();
            for change in plan(&current, &desired) {
                match (change.kind, change.content) {
                    (ChangeKind::Delete, _) => {
                        state.remove(change.path);
                    }
                    (_, Some(content)) => {
                        state.insert(change.path.to_string(), content.to_string());
                    }
                    (_, None) => prop_assert!(false, "write without content"),
                }
            }
            let expected: BTreeMap<String, String> = desired
                .iter()
                .map(|f| (f.path.clone(), f.content.clone()))
                .collect();
            prop_assert_eq!(state, expected);
        }
    }

    // ============================================================================
    // substitution property tests
    // ============================================================================

    proptest! {
        /// Property: content without markers is returned unchanged
        #[test]
        fn content_without_markers_is_unchanged(content in "[^{}]*", value in ".*") {
            let mut fields = FieldMap::new();
            fields.insert("data.tag".to_string(), value);
            let result = Substituter::new("ns").substitute(&content, &fields).unwrap();
            prop_assert_eq!(result, content);
        }

        /// Property: only the value token of a marked line changes
        #[test]
        fn only_value_changes(
            key in "[a-z]{1,8}",
            old in "[a-zA-Z0-9.]{0,10}",
            new in "[a-zA-Z0-9.$]{0,10}",
        ) {
            let substituter = Substituter::new("ns");
            let marker = substituter.marker("data.tag");
            let content = format!("{}: {} # {}", key, old, marker);
            let mut fields = FieldMap::new();
            fields.insert("data.tag".to_string(), new.clone());

            let result = substituter.substitute(&content, &fields).unwrap();
            prop_assert_eq!(result, format!("{}: {} # {}", key, new, marker));
        }
    }
}
