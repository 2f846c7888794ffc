//! Compiled grammars of the declaration mini-languages.
//!
//! Patterns are compiled lazily on first use and cached for the lifetime of
//! the program.

use std::sync::OnceLock;

use regex::Regex;

/// Identifier: a letter or underscore followed by letters, digits or underscores.
/// Non-ASCII letters are accepted.
const IDENT: &str = r"[\p{L}_][\p{L}\p{N}_]*";

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        // Patterns are constants of this module; a failure is a programming error.
        Err(e) => panic!("invalid built-in grammar {pattern:?}: {e}"),
    }
}

/// `^IDENT$`
pub(crate) fn identifier() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(&format!("^{IDENT}$")))
}

/// `<TypeRef>::<prefix>*` with `TypeRef = self | static | parent | ::?IDENT(::IDENT)*`.
pub(crate) fn enumeration() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        compile(&format!(
            r"^(self|static|parent|(?:::)?{IDENT}(?:::{IDENT})*)::({IDENT})?\*$"
        ))
    })
}

/// Head of a property declaration: visibility keyword, type, name, remainder.
pub(crate) fn property_head() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        compile(&format!(
            r"^\s*@property(-read)?\s+(\S+)\s+\$?({IDENT})(?:\s+(.*?))?\s*$"
        ))
    })
}

/// One `m:flag` or `m:flag(arguments)` occurrence.
pub(crate) fn flag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"m:([A-Za-z]+)(?:\(([^)]*)\))?"))
}

/// A type reference such as `Author` or `::model::Author`.
pub(crate) fn type_reference() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(&format!(r"^(?:::)?{IDENT}(?:::{IDENT})*$")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_accepts_unicode_letters() {
        assert!(identifier().is_match("getName"));
        assert!(identifier().is_match("_private"));
        assert!(identifier().is_match("získejJméno"));
        assert!(!identifier().is_match("1abc"));
        assert!(!identifier().is_match("get-name"));
        assert!(!identifier().is_match(""));
    }

    #[test]
    fn test_enumeration_splits_type_and_prefix() {
        let caps = enumeration().captures("model::Status::ACTIVE_*").unwrap();
        assert_eq!(&caps[1], "model::Status");
        assert_eq!(&caps[2], "ACTIVE_");

        let caps = enumeration().captures("self::*").unwrap();
        assert_eq!(&caps[1], "self");
        assert!(caps.get(2).is_none());

        let caps = enumeration().captures("selfish::A*").unwrap();
        assert_eq!(&caps[1], "selfish");
    }

    #[test]
    fn test_enumeration_rejects_missing_star() {
        assert!(!enumeration().is_match("self::STATUS_"));
        assert!(!enumeration().is_match("STATUS_*"));
    }

    #[test]
    fn test_property_head() {
        let caps = property_head()
            .captures("@property-read Author|null $author m:hasOne")
            .unwrap();
        assert!(caps.get(1).is_some());
        assert_eq!(&caps[2], "Author|null");
        assert_eq!(&caps[3], "author");
        assert_eq!(&caps[4], "m:hasOne");

        let caps = property_head().captures("@property int id").unwrap();
        assert!(caps.get(1).is_none());
        assert!(caps.get(4).is_none());
    }
}
