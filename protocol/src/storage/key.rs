//! # Composite Keys
//!
//! Entities are stored under keys built from a namespace and an ordered list
//! of attributes:
//!
//! ```text
//! U+0000 namespace U+0000 attr_1 U+0000 attr_2 U+0000 ... attr_n U+0000
//! ```
//!
//! Every component is terminated by the `U+0000` delimiter and no component
//! may contain it, so the encoding is injective: an attribute cannot smuggle
//! in a boundary and pass itself off as two attributes. `U+10FFFF` is
//! reserved as well since it serves as the upper bound of range scans over
//! a key prefix.

use thiserror::Error;

/// Delimiter placed before the namespace and after every component.
pub const KEY_DELIMITER: char = '\u{0}';

/// Upper sentinel for prefix range scans. Never allowed inside a component.
pub const MAX_UNICODE_RUNE: char = '\u{10FFFF}';

/// Errors produced while encoding or splitting a composite key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The namespace is empty.
    #[error("composite key namespace must not be empty")]
    EmptyNamespace,

    /// A component contains a reserved code point.
    #[error("{component} contains reserved character U+{code:04X}: {value:?}")]
    ReservedCharacter {
        /// `"namespace"` or `"attribute N"`.
        component: String,
        /// The offending value.
        value: String,
        /// The reserved code point found.
        code: u32,
    },

    /// The string is not a composite key produced by [`encode`].
    #[error("malformed composite key: {0:?}")]
    Malformed(String),
}

/// Encodes `namespace` and `attributes` into a composite key.
///
/// # Errors
///
/// Returns [`KeyError::EmptyNamespace`] for an empty namespace and
/// [`KeyError::ReservedCharacter`] if any component contains `U+0000` or
/// `U+10FFFF`.
pub fn encode<S: AsRef<str>>(namespace: &str, attributes: &[S]) -> Result<String, KeyError> {
    if namespace.is_empty() {
        return Err(KeyError::EmptyNamespace);
    }
    check_component("namespace", namespace)?;

    let capacity = 2
        + namespace.len()
        + attributes
            .iter()
            .map(|a| a.as_ref().len() + 1)
            .sum::<usize>();
    let mut key = String::with_capacity(capacity);
    key.push(KEY_DELIMITER);
    key.push_str(namespace);
    key.push(KEY_DELIMITER);

    for (i, attribute) in attributes.iter().enumerate() {
        let attribute = attribute.as_ref();
        check_component(&format!("attribute {i}"), attribute)?;
        key.push_str(attribute);
        key.push(KEY_DELIMITER);
    }

    Ok(key)
}

/// Splits a composite key back into its namespace and attributes.
///
/// The contracts never need this; it exists for diagnostics (rendering keys
/// in CLI output and logs) and for tests.
pub fn split(key: &str) -> Result<(String, Vec<String>), KeyError> {
    let body = key
        .strip_prefix(KEY_DELIMITER)
        .and_then(|rest| rest.strip_suffix(KEY_DELIMITER))
        .ok_or_else(|| KeyError::Malformed(key.to_string()))?;

    let mut parts = body.split(KEY_DELIMITER);
    let namespace = match parts.next() {
        Some(ns) if !ns.is_empty() => ns.to_string(),
        _ => return Err(KeyError::Malformed(key.to_string())),
    };

    Ok((namespace, parts.map(str::to_string).collect()))
}

/// Renders a composite key with its delimiters made visible, e.g.
/// `Card/42/ns`. Only meant for humans; not an encoding.
pub fn display(key: &str) -> String {
    match split(key) {
        Ok((namespace, attributes)) => std::iter::once(namespace)
            .chain(attributes)
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => key.escape_default().to_string(),
    }
}

fn check_component(component: &str, value: &str) -> Result<(), KeyError> {
    match value
        .chars()
        .find(|c| *c == KEY_DELIMITER || *c == MAX_UNICODE_RUNE)
    {
        Some(reserved) => Err(KeyError::ReservedCharacter {
            component: component.to_string(),
            value: value.to_string(),
            code: reserved as u32,
        }),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_layout() {
        let key = encode("Card", &["42", "ns"]).unwrap();
        assert_eq!(key, "\u{0}Card\u{0}42\u{0}ns\u{0}");
    }

    #[test]
    fn encode_without_attributes() {
        assert_eq!(encode::<&str>("Card", &[]).unwrap(), "\u{0}Card\u{0}");
    }

    #[test]
    fn encode_is_deterministic() {
        assert_eq!(
            encode("Card", &["7"]).unwrap(),
            encode("Card", &[String::from("7")]).unwrap()
        );
    }

    #[test]
    fn attribute_boundaries_are_not_ambiguous() {
        let joined = encode("Card", &["ab"]).unwrap();
        let split_attrs = encode("Card", &["a", "b"]).unwrap();
        let empty_tail = encode("Card", &["ab", ""]).unwrap();
        assert_ne!(joined, split_attrs);
        assert_ne!(joined, empty_tail);
    }

    #[test]
    fn embedded_delimiter_rejected() {
        let err = encode("Card", &["1\u{0}ns"]).unwrap_err();
        assert!(matches!(err, KeyError::ReservedCharacter { code: 0, .. }));
    }

    #[test]
    fn max_rune_rejected() {
        let err = encode("Card", &["\u{10FFFF}"]).unwrap_err();
        assert!(matches!(
            err,
            KeyError::ReservedCharacter { code: 0x10FFFF, .. }
        ));
    }

    #[test]
    fn empty_namespace_rejected() {
        assert_eq!(encode("", &["1"]).unwrap_err(), KeyError::EmptyNamespace);
    }

    #[test]
    fn reserved_char_in_namespace_rejected() {
        assert!(encode("Ca\u{0}rd", &["1"]).is_err());
    }

    #[test]
    fn split_recovers_components() {
        let key = encode("Card", &["42", "", "veolia"]).unwrap();
        let (ns, attrs) = split(&key).unwrap();
        assert_eq!(ns, "Card");
        assert_eq!(attrs, vec!["42", "", "veolia"]);
    }

    #[test]
    fn split_rejects_plain_strings() {
        assert!(split("cardCounter").is_err());
        assert!(split("\u{0}\u{0}").is_err());
    }

    #[test]
    fn display_is_readable() {
        let key = encode("Card", &["42", "ns"]).unwrap();
        assert_eq!(display(&key), "Card/42/ns");
        assert_eq!(display("cardCounter"), "cardCounter");
    }
}
