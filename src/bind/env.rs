//! Environment-variable substitution inside dynamic values.

use crate::value::Value;

// Bounds resolution of self-referencing environment values; on hitting the
// cap the string is returned as resolved so far.
const MAX_SUBSTITUTIONS: usize = 64;

/// Substitutes `${NAME}` / `${NAME:default}` placeholders in every string
/// reachable from `value`, recursing through sequences and mappings.
///
/// Scalars other than strings are returned unchanged.
pub(crate) fn resolve(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(resolve_string(s)),
        Value::Sequence(items) => Value::Sequence(items.iter().map(resolve).collect()),
        Value::Mapping(mapping) => Value::Mapping(
            mapping
                .iter()
                .map(|(key, val)| (key.clone(), resolve(val)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Scans left-to-right for `${`, closing each token at the first `}` (the
/// syntax is not nesting-aware). The token splits on the first `:` into the
/// variable name and a fallback; the fallback is used when the variable is
/// unset or empty. Substituted text is rescanned, so a placeholder produced
/// by a substitution resolves too. A placeholder with no closing `}` stops
/// resolution for the rest of the string.
fn resolve_string(s: &str) -> String {
    let mut out = s.to_owned();
    let mut from = 0;
    let mut substitutions = 0;

    while substitutions < MAX_SUBSTITUTIONS {
        let Some(start) = out[from..].find("${").map(|i| i + from) else {
            break;
        };
        let Some(end) = out[start..].find('}').map(|i| i + start) else {
            break;
        };

        let token = out[start + 2..end].to_owned();
        let (name, fallback) = match token.split_once(':') {
            Some((name, fallback)) => (name, fallback),
            None => (token.as_str(), ""),
        };
        let replacement = match std::env::var(name) {
            Ok(val) if !val.is_empty() => val,
            _ => fallback.to_owned(),
        };

        out.replace_range(start..=end, &replacement);
        from = start;
        substitutions += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_variable_is_substituted() {
        std::env::set_var("METACFG_TEST_ENV_SET", "8080");
        assert_eq!(
            resolve_string("port=${METACFG_TEST_ENV_SET}"),
            "port=8080"
        );
    }

    #[test]
    fn test_unset_variable_uses_fallback() {
        assert_eq!(
            resolve_string("port=${METACFG_TEST_ENV_UNSET:9090}"),
            "port=9090"
        );
    }

    #[test]
    fn test_unset_variable_without_fallback_is_empty() {
        assert_eq!(resolve_string("port=${METACFG_TEST_ENV_UNSET2}"), "port=");
    }

    #[test]
    fn test_empty_variable_counts_as_unset() {
        std::env::set_var("METACFG_TEST_ENV_EMPTY", "");
        assert_eq!(
            resolve_string("${METACFG_TEST_ENV_EMPTY:fallback}"),
            "fallback"
        );
    }

    #[test]
    fn test_fallback_keeps_everything_after_first_colon() {
        assert_eq!(
            resolve_string("${METACFG_TEST_ENV_UNSET3:http://host:80}"),
            "http://host:80"
        );
    }

    #[test]
    fn test_multiple_placeholders() {
        std::env::set_var("METACFG_TEST_ENV_A", "a");
        std::env::set_var("METACFG_TEST_ENV_B", "b");
        assert_eq!(
            resolve_string("${METACFG_TEST_ENV_A}/${METACFG_TEST_ENV_B}"),
            "a/b"
        );
    }

    #[test]
    fn test_unclosed_placeholder_leaves_tail_untouched() {
        std::env::set_var("METACFG_TEST_ENV_C", "c");
        assert_eq!(
            resolve_string("${METACFG_TEST_ENV_C} and ${broken"),
            "c and ${broken"
        );
    }

    #[test]
    fn test_substituted_text_is_rescanned() {
        std::env::set_var("METACFG_TEST_ENV_OUTER", "${METACFG_TEST_ENV_INNER:deep}");
        assert_eq!(resolve_string("${METACFG_TEST_ENV_OUTER}"), "deep");
    }

    #[test]
    fn test_self_referencing_value_terminates() {
        std::env::set_var("METACFG_TEST_ENV_LOOP", "${METACFG_TEST_ENV_LOOP}");
        let resolved = resolve_string("${METACFG_TEST_ENV_LOOP}");
        assert_eq!(resolved, "${METACFG_TEST_ENV_LOOP}");
    }

    #[test]
    fn test_recurses_through_sequences_and_mappings() {
        std::env::set_var("METACFG_TEST_ENV_D", "d");
        let mut mapping = crate::value::Mapping::new();
        mapping.insert("key".into(), Value::from("${METACFG_TEST_ENV_D}"));
        let value = Value::Sequence(vec![
            Value::from("${METACFG_TEST_ENV_D}!"),
            Value::Mapping(mapping),
            Value::Integer(1),
        ]);

        let Value::Sequence(resolved) = resolve(&value) else {
            panic!("expected sequence");
        };
        assert_eq!(resolved[0], Value::from("d!"));
        assert_eq!(resolved[1].as_mapping().unwrap()["key"], Value::from("d"));
        assert_eq!(resolved[2], Value::Integer(1));
    }
}
