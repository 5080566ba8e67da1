/// Canonicalises a raw type string so every edge and label uses the same class
/// identifier.
///
/// Generic segments are removed in a single left-to-right pass: each `<` is
/// dropped together with everything up to the first `>` that follows it. The
/// pass is not bracket-balanced, so `Map<String, List<Foo>>` becomes `Map>`.
/// Afterwards every `[]` is stripped and anything from the first `@` onward is
/// cut off (annotation text leaking into type strings).
pub fn normalize_type(raw: &str) -> String {
    let without_generics = strip_generic_segments(raw);
    let without_arrays = strip_array_markers(&without_generics);
    match without_arrays.find('@') {
        Some(at) => without_arrays[..at].to_string(),
        None => without_arrays,
    }
}

fn strip_generic_segments(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(open) = rest.find('<') {
        let Some(close) = rest[open..].find('>') else {
            break;
        };
        out.push_str(&rest[..open]);
        rest = &rest[open + close + 1..];
    }

    out.push_str(rest);
    out
}

fn strip_array_markers(s: &str) -> String {
    let mut current = s.to_string();
    // `[[]]` collapses to `[]` after one replacement.
    while current.contains("[]") {
        current = current.replace("[]", "");
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_simple_generics() {
        assert_eq!(normalize_type("List<Foo>"), "List");
        assert_eq!(normalize_type("Map<String, Foo>"), "Map");
    }

    #[test]
    fn nested_generics_leave_trailing_bracket() {
        assert_eq!(normalize_type("Map<String, List<Foo>>"), "Map>");
    }

    #[test]
    fn strips_array_markers() {
        assert_eq!(normalize_type("int[]"), "int");
        assert_eq!(normalize_type("String[][]"), "String");
        assert_eq!(normalize_type("byte[[]]"), "byte");
    }

    #[test]
    fn cuts_annotation_leakage() {
        assert_eq!(normalize_type("Foo@Bar"), "Foo");
        assert_eq!(normalize_type("@NonNull String"), "");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(normalize_type(""), "");
    }

    #[test]
    fn unclosed_generic_is_left_alone() {
        assert_eq!(normalize_type("Foo<Bar"), "Foo<Bar");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(raw in "[A-Za-z<>\\[\\]@, ]{0,24}") {
            let once = normalize_type(&raw);
            prop_assert_eq!(normalize_type(&once), once);
        }
    }
}
