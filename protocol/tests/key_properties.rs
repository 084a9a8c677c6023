//! Property tests for the composite key codec.
//!
//! The codec's one job is injectivity: distinct (namespace, attributes)
//! pairs must never produce the same key, no matter what the attributes
//! contain.

use proptest::prelude::*;

use transit_protocol::storage::key::{encode, split};

fn component() -> impl Strategy<Value = String> {
    // Printable text plus characters that look like separators.
    "[a-zA-Z0-9/:._ -]{0,8}"
}

fn namespace() -> impl Strategy<Value = String> {
    "[A-Za-z]{1,6}"
}

proptest! {
    #[test]
    fn encode_then_split_recovers_input(
        ns in namespace(),
        attrs in prop::collection::vec(component(), 0..5),
    ) {
        let key = encode(&ns, &attrs).unwrap();
        let (got_ns, got_attrs) = split(&key).unwrap();
        prop_assert_eq!(got_ns, ns);
        prop_assert_eq!(got_attrs, attrs);
    }

    #[test]
    fn distinct_inputs_distinct_keys(
        a_ns in namespace(),
        a_attrs in prop::collection::vec(component(), 0..4),
        b_ns in namespace(),
        b_attrs in prop::collection::vec(component(), 0..4),
    ) {
        prop_assume!((&a_ns, &a_attrs) != (&b_ns, &b_attrs));
        let a = encode(&a_ns, &a_attrs).unwrap();
        let b = encode(&b_ns, &b_attrs).unwrap();
        prop_assert_ne!(a, b);
    }

    #[test]
    fn delimiter_anywhere_is_rejected(
        prefix in component(),
        suffix in component(),
        position in 0usize..3,
    ) {
        let poisoned = format!("{prefix}\u{0}{suffix}");
        let mut attrs = vec!["1".to_string(), "2".to_string(), "3".to_string()];
        attrs[position] = poisoned;
        prop_assert!(encode("Card", &attrs).is_err());
    }
}
