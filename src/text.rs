use log::warn;
use regex::{NoExpand, RegexBuilder};
use std::collections::BTreeMap;

const PLACEHOLDER: &str = "key";

/// Literal text to search for: the first `key` in the template replaced by `key`.
pub fn search_text(format_key: &str, key: &str) -> String {
    format_key.replacen(PLACEHOLDER, key, 1)
}

/// Replace every case-insensitive literal occurrence of each wrapped key.
///
/// Entries are applied in key order and each pass sees the output of the
/// previous one, so a value containing another key's search text is itself
/// replaced when that key sorts later.
pub fn apply_replacements(
    text: &str,
    replacements: &BTreeMap<String, String>,
    format_key: &str,
) -> String {
    let mut result = text.to_string();
    for (key, value) in replacements {
        let needle = search_text(format_key, key);
        let pattern = match RegexBuilder::new(&regex::escape(&needle))
            .case_insensitive(true)
            .size_limit(usize::MAX)
            .dfa_size_limit(usize::MAX)
            .build()
        {
            Ok(pattern) => pattern,
            Err(e) => {
                warn!("skipping substitution {key:?}: {e}");
                continue;
            }
        };
        result = pattern
            .replace_all(&result, NoExpand(value.as_str()))
            .into_owned();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_search_text() {
        assert_eq!(search_text("{{key}}", "NAME"), "{{NAME}}");
        assert_eq!(search_text("key", "NAME"), "NAME");
        assert_eq!(search_text("key-key", "A"), "A-key");
        assert_eq!(search_text("<>", "NAME"), "<>");
        assert_eq!(search_text("KEY", "NAME"), "KEY");
    }

    #[test]
    fn test_empty_map_is_identity() {
        let text = "Hello {{NAME}}, $1 and $& stay";
        assert_eq!(apply_replacements(text, &map(&[]), "key"), text);
    }

    #[test]
    fn test_wrapped_key() {
        let result = apply_replacements("Hello {{NAME}}!", &map(&[("NAME", "World")]), "{{key}}");
        assert_eq!(result, "Hello World!");
    }

    #[test]
    fn test_case_insensitive_all_occurrences() {
        let result = apply_replacements(
            "name, Name, NAME and nAmE; names",
            &map(&[("NAME", "x")]),
            "key",
        );
        assert_eq!(result, "x, x, x and x; xs");
    }

    #[test]
    fn test_only_matching_text_changes() {
        let result = apply_replacements("a {{b}} c {b} d", &map(&[("b", "B")]), "{{key}}");
        assert_eq!(result, "a B c {b} d");
    }

    #[test]
    fn test_value_is_literal() {
        let result = apply_replacements(
            "x KEY y",
            &map(&[("KEY", "$& $1 ${name} $$")]),
            "key",
        );
        assert_eq!(result, "x $& $1 ${name} $$ y");
    }

    #[test]
    fn test_key_is_literal() {
        let replacements = map(&[("a.b*(c", "hit")]);
        assert_eq!(apply_replacements("a.b*(c", &replacements, "key"), "hit");
        assert_eq!(apply_replacements("axbbb(c", &replacements, "key"), "axbbb(c");

        let result = apply_replacements("[x] + x", &map(&[("x", "y")]), "[key]");
        assert_eq!(result, "y + x");
    }

    #[test]
    fn test_template_without_placeholder() {
        let result = apply_replacements("a <> b <>", &map(&[("A", "1"), ("B", "2")]), "<>");
        assert_eq!(result, "a 1 b 1");
    }

    #[test]
    fn test_sequential_application_in_key_order() {
        // "A" runs first and introduces "{B}", which "B" then replaces.
        let replacements = map(&[("A", "{B}"), ("B", "done")]);
        assert_eq!(apply_replacements("{A}", &replacements, "{key}"), "done");

        // Reversed dependency: "B" runs before "A" introduces "{B}".
        let replacements = map(&[("A", "done"), ("B", "{A}")]);
        assert_eq!(apply_replacements("{B}", &replacements, "{key}"), "{A}");
    }

    #[test]
    fn test_long_key_is_replaced() {
        let key = "ä".repeat(200_000);
        let text = format!("x {} y", key.to_uppercase());
        let result = apply_replacements(&text, &map(&[(key.as_str(), "V")]), "key");
        assert_eq!(result, "x V y");
    }

    #[test]
    fn test_unicode_case_folding() {
        let result = apply_replacements("Grüße ÄPFEL", &map(&[("äpfel", "apples")]), "key");
        assert_eq!(result, "Grüße apples");
    }
}
