use brine_fidl_schema::Attributed;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DOC_LINK: Regex = Regex::new(r"\|([^|]+)\|").unwrap();
}

/// Lines of the `Doc` attribute, with `|name|` references turned into Dart
/// doc links (`[name]`).
pub fn doc_string<T: Attributed + ?Sized>(node: &T) -> Vec<String> {
    let attribute = match node.lookup_attribute("Doc") {
        Some(attr) => attr,
        None => return Vec::new(),
    };
    let mut lines: Vec<&str> = attribute.value.split('\n').collect();
    if lines.last().map_or(false, |line| line.is_empty()) {
        lines.pop();
    }
    lines
        .into_iter()
        .map(|line| DOC_LINK.replace_all(line, "[$1]").into_owned())
        .collect()
}

pub fn format_bool(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

pub fn format_int(value: Option<u32>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brine_fidl_schema::{Attribute, Struct};

    #[test]
    fn doc_links_are_rewritten() {
        let decl = Struct {
            name:             "fidl.test/S".to_string(),
            members:          Vec::new(),
            size:             1,
            maybe_attributes: vec![Attribute {
                name:  "Doc".to_string(),
                value: " Holds a |Point| and a |Size|.\n Second line.\n".to_string(),
            }],
        };
        assert_eq!(
            doc_string(&decl),
            vec![" Holds a [Point] and a [Size].", " Second line."]
        );
    }

    #[test]
    fn missing_doc_is_empty() {
        let decl = Struct {
            name:             "fidl.test/S".to_string(),
            members:          Vec::new(),
            size:             1,
            maybe_attributes: Vec::new(),
        };
        assert!(doc_string(&decl).is_empty());
    }
}
