//! Dart identifier legalization.
//!
//! FIDL names are converted to Dart casing and then checked against a table
//! of words that are reserved in the position the name will occupy. A name
//! that collides gets a `$` appended, which can never collide again because
//! `$` does not occur in FIDL identifiers.

use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};

/// Where a generated identifier is going to appear in Dart code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    BitsMember,
    EnumMember,
    StructMember,
    TableMember,
    UnionMember,
    UnionMemberTag,
    Constant,
    /// A top-level declaration other than a constant.
    Declaration,
    Method,
    Parameter,
}

pub const ESCAPE_SUFFIX: &str = "$";

const ALL_CONTEXTS: &[Context] = &[
    Context::BitsMember,
    Context::EnumMember,
    Context::StructMember,
    Context::TableMember,
    Context::UnionMember,
    Context::UnionMemberTag,
    Context::Constant,
    Context::Declaration,
    Context::Method,
    Context::Parameter,
];

use Context::*;

const MEMBERS_AND_METHODS: &[Context] = &[
    BitsMember, EnumMember, Method, UnionMember, Constant, TableMember, StructMember,
];

const OBJECT_MEMBERS: &[Context] = &[Method, EnumMember, UnionMember, StructMember, TableMember];

lazy_static! {
    static ref RESERVED_WORDS: HashMap<Context, HashSet<&'static str>> = {
        let table: &[(&str, &[Context])] = &[
            ("assert",       ALL_CONTEXTS),
            ("async",        ALL_CONTEXTS),
            ("await",        ALL_CONTEXTS),
            ("break",        ALL_CONTEXTS),
            ("bool",         &[StructMember, TableMember]),
            ("case",         ALL_CONTEXTS),
            ("catch",        ALL_CONTEXTS),
            ("class",        ALL_CONTEXTS),
            ("const",        ALL_CONTEXTS),
            ("continue",     ALL_CONTEXTS),
            ("default",      ALL_CONTEXTS),
            ("do",           ALL_CONTEXTS),
            ("double",       &[StructMember, TableMember]),
            ("dynamic",      MEMBERS_AND_METHODS),
            ("else",         ALL_CONTEXTS),
            ("enum",         ALL_CONTEXTS),
            ("extends",      ALL_CONTEXTS),
            ("false",        ALL_CONTEXTS),
            ("final",        ALL_CONTEXTS),
            ("finally",      ALL_CONTEXTS),
            ("for",          ALL_CONTEXTS),
            ("hashCode",     &[Method, BitsMember, EnumMember, UnionMember, StructMember, TableMember]),
            ("noSuchMethod", OBJECT_MEMBERS),
            ("runtimeType",  OBJECT_MEMBERS),
            ("index",        &[UnionMemberTag]),
            ("if",           ALL_CONTEXTS),
            ("in",           ALL_CONTEXTS),
            ("int",          MEMBERS_AND_METHODS),
            ("is",           ALL_CONTEXTS),
            ("List",         &[Declaration]),
            ("Map",          &[Declaration]),
            ("new",          ALL_CONTEXTS),
            ("null",         ALL_CONTEXTS),
            ("Null",         &[Declaration]),
            ("num",          &[EnumMember, Method, UnionMember, Constant, TableMember, StructMember]),
            ("Object",       &[Declaration]),
            ("override",     ALL_CONTEXTS),
            ("rethrow",      ALL_CONTEXTS),
            ("return",       ALL_CONTEXTS),
            ("String",       ALL_CONTEXTS),
            ("super",        ALL_CONTEXTS),
            ("switch",       ALL_CONTEXTS),
            ("this",         ALL_CONTEXTS),
            ("throw",        ALL_CONTEXTS),
            ("toString",     &[Method, BitsMember, EnumMember, StructMember, TableMember, UnionMember]),
            ("true",         ALL_CONTEXTS),
            ("try",          ALL_CONTEXTS),
            ("values",       &[UnionMemberTag]),
            ("var",          ALL_CONTEXTS),
            ("void",         ALL_CONTEXTS),
            ("while",        ALL_CONTEXTS),
            ("with",         ALL_CONTEXTS),
            ("yield",        ALL_CONTEXTS),
        ];

        let mut map: HashMap<Context, HashSet<&'static str>> = HashMap::new();
        for ctx in ALL_CONTEXTS {
            map.insert(*ctx, HashSet::new());
        }
        for (word, contexts) in table {
            for ctx in contexts.iter() {
                map.entry(*ctx).or_default().insert(*word);
            }
        }
        map
    };
}

impl Context {
    pub fn is_reserved(self, name: &str) -> bool {
        RESERVED_WORDS
            .get(&self)
            .map_or(false, |words| words.contains(name))
    }

    pub fn change_if_reserved(self, name: &str) -> String {
        if self.is_reserved(name) {
            format!("{}{}", name, ESCAPE_SUFFIX)
        } else {
            name.to_string()
        }
    }
}

/// Splits an identifier into words on underscores and on case changes.
/// A run of capitals followed by a lowercase letter ends one character early,
/// so `HTTPServer` splits as `HTTP`, `Server`.
fn split_words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for i in 0..chars.len() {
        let c = chars[i];
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().to_string() + &chars.as_str().to_lowercase(),
    }
}

/// `foo_bar`, `FOO_BAR` and `fooBar` all become `FooBar`.
pub fn to_upper_camel_case(s: &str) -> String {
    split_words(s).iter().map(|word| capitalize(word)).collect()
}

/// `foo_bar`, `FOO_BAR` and `FooBar` all become `fooBar`.
pub fn to_lower_camel_case(s: &str) -> String {
    let words = split_words(s);
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        if i == 0 {
            out.push_str(&word.to_lowercase());
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

pub fn legalize_upper(name: &str, ctx: Context) -> String {
    ctx.change_if_reserved(&to_upper_camel_case(name))
}

pub fn legalize_lower(name: &str, ctx: Context) -> String {
    ctx.change_if_reserved(&to_lower_camel_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn camel_case_conversions() {
        assert_eq!(to_upper_camel_case("foo_bar"), "FooBar");
        assert_eq!(to_upper_camel_case("FOO_BAR"), "FooBar");
        assert_eq!(to_upper_camel_case("fooBar"), "FooBar");
        assert_eq!(to_upper_camel_case("HTTPServer"), "HttpServer");
        assert_eq!(to_upper_camel_case("Uint8Thing"), "Uint8Thing");
        assert_eq!(to_lower_camel_case("FOO_BAR"), "fooBar");
        assert_eq!(to_lower_camel_case("SomeStruct"), "someStruct");
        assert_eq!(to_lower_camel_case("x"), "x");
        assert_eq!(to_lower_camel_case(""), "");
    }

    #[test]
    fn reserved_words_are_context_sensitive() {
        assert_eq!(legalize_lower("bool", Context::StructMember), "bool$");
        assert_eq!(legalize_lower("bool", Context::Parameter), "bool");
        assert_eq!(legalize_lower("index", Context::UnionMemberTag), "index$");
        assert_eq!(legalize_lower("index", Context::UnionMember), "index");
        assert_eq!(legalize_upper("list", Context::Declaration), "List$");
        assert_eq!(legalize_upper("list", Context::Method), "List");
        assert_eq!(legalize_lower("CLASS", Context::EnumMember), "class$");
    }

    #[test]
    fn num_is_reserved_for_constants_and_members() {
        assert_eq!(legalize_lower("num", Context::Constant), "num$");
        assert_eq!(legalize_lower("NUM", Context::Constant), "num$");
        assert_eq!(legalize_lower("num", Context::StructMember), "num$");
        assert_eq!(legalize_lower("num", Context::Method), "num$");
        assert_eq!(legalize_lower("num", Context::BitsMember), "num");
        assert_eq!(legalize_lower("num", Context::Parameter), "num");
    }

    #[test]
    fn string_is_reserved_everywhere() {
        for ctx in ALL_CONTEXTS {
            assert!(ctx.is_reserved("String"), "{:?}", ctx);
        }
    }

    fn any_context() -> impl Strategy<Value = Context> {
        prop::sample::select(ALL_CONTEXTS.to_vec())
    }

    proptest! {
        #[test]
        fn legalization_is_deterministic(name in "[A-Za-z][A-Za-z0-9_]{0,16}", ctx in any_context()) {
            prop_assert_eq!(legalize_lower(&name, ctx), legalize_lower(&name, ctx));
            prop_assert_eq!(legalize_upper(&name, ctx), legalize_upper(&name, ctx));
        }

        #[test]
        fn legalized_names_are_never_reserved(name in "[A-Za-z][A-Za-z0-9_]{0,16}", ctx in any_context()) {
            prop_assert!(!ctx.is_reserved(&legalize_lower(&name, ctx)));
            prop_assert!(!ctx.is_reserved(&legalize_upper(&name, ctx)));
        }

        #[test]
        fn reserved_words_always_escape(ctx in any_context()) {
            for word in ["class", "while", "void", "String"] {
                let legal = ctx.change_if_reserved(word);
                prop_assert!(legal.ends_with(ESCAPE_SUFFIX));
            }
        }
    }
}
