//! Property-based tests for suite-filter using proptest.

use proptest::prelude::*;
use suite_filter::{FilterBuilder, FilterError, TestCase};

// ============================================================================
// Strategies
// ============================================================================

fn word() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_.]{0,12}"
}

fn maybe_empty_id() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[a-z0-9-]{1,6}"]
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Ids are the comma-join of the non-empty inputs, in order.
    #[test]
    fn id_is_join_of_non_empty(ids in prop::collection::vec(maybe_empty_id(), 0..8)) {
        let kept: Vec<&String> = ids.iter().filter(|id| !id.is_empty()).collect();
        let result = FilterBuilder::new().id(&ids);

        if kept.is_empty() {
            prop_assert!(matches!(result, Err(FilterError::InvalidArgument(_))));
        } else {
            let expected = kept.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(",");
            let xml = result.unwrap().build().unwrap().into_xml();
            prop_assert_eq!(xml, format!("<filter><id>{expected}</id></filter>"));
        }
    }

    /// A lone predicate compiles to its own fragment inside <filter>.
    #[test]
    fn single_predicate_is_bare(name in word(), regex in any::<bool>()) {
        let node = if regex {
            FilterBuilder::new().category_regex(name.clone())
        } else {
            FilterBuilder::new().category(name.clone())
        };
        let attr = if regex { " re=\"1\"" } else { "" };
        let xml = node.unwrap().build().unwrap().into_xml();
        prop_assert_eq!(xml, format!("<filter><cat{attr}>{name}</cat></filter>"));
    }

    /// Chains joined only by `or` put every predicate in one <or>.
    #[test]
    fn or_chain_is_flat(names in prop::collection::vec(word(), 2..6)) {
        let mut node = FilterBuilder::new().given_name(names[0].clone()).unwrap();
        for name in &names[1..] {
            node = node.or().unwrap().given_name(name.clone()).unwrap();
        }
        let xml = node.build().unwrap().into_xml();

        let inner: String = names.iter().map(|n| format!("<name>{n}</name>")).collect();
        prop_assert_eq!(xml, format!("<filter><or>{inner}</or></filter>"));
    }

    /// Chains joined only by `and` need no wrapper at all.
    #[test]
    fn and_chain_is_flat(names in prop::collection::vec(word(), 2..6)) {
        let mut node = FilterBuilder::new().method(names[0].clone()).unwrap();
        for name in &names[1..] {
            node = node.and().unwrap().method(name.clone()).unwrap();
        }
        let xml = node.build().unwrap().into_xml();

        let inner: String = names.iter().map(|n| format!("<method>{n}</method>")).collect();
        prop_assert_eq!(xml, format!("<filter>{inner}</filter>"));
    }

    /// Negating a predicate flips the selection of every test.
    #[test]
    fn not_inverts_selection(category in word(), tags in prop::collection::vec(word(), 0..4)) {
        let mut test = TestCase::new("1", "A.B");
        for tag in &tags {
            test = test.with_category(tag.clone());
        }

        let plain = FilterBuilder::new().category(category.clone()).unwrap().build().unwrap();
        let negated = FilterBuilder::new()
            .not()
            .unwrap()
            .category(category)
            .unwrap()
            .build()
            .unwrap();

        prop_assert_ne!(plain.pass(&test).unwrap(), negated.pass(&test).unwrap());
    }

    /// The parsed form of a compiled filter agrees with the fluent meaning.
    #[test]
    fn or_of_ands_matches_boolean_meaning(
        a in any::<bool>(),
        b in any::<bool>(),
        c in any::<bool>(),
    ) {
        let mut test = TestCase::new("1", "A.B");
        for (flag, tag) in [(a, "a"), (b, "b"), (c, "c")] {
            if flag {
                test = test.with_category(tag);
            }
        }

        let filter = FilterBuilder::new()
            .category("a")
            .unwrap()
            .and()
            .unwrap()
            .category("b")
            .unwrap()
            .or()
            .unwrap()
            .not()
            .unwrap()
            .category("c")
            .unwrap()
            .build()
            .unwrap();

        prop_assert_eq!(filter.pass(&test).unwrap(), (a && b) || !c);
    }
}
