//! Parsing of per-field binding annotations.

use crate::value::Value;

/// The parsed constraints of one field's binding annotation.
///
/// Annotation grammar:
///
/// ```text
/// [targetName][,default=<literal>][,range=[<int>:<int>]][,options=<v1>|<v2>|...][,optional]
/// ```
///
/// Unrecognized segments are ignored so annotations stay forward
/// compatible. A target name of `-` tells the binder to skip the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSpec {
    pub default: Option<Value>,
    pub range: Option<(i64, i64)>,
    pub options: Option<Vec<String>>,
    pub optional: bool,
}

impl FieldSpec {
    /// Parses an annotation into the target key name and its constraints.
    ///
    /// An empty name means the caller should fall back to the structure
    /// field's own name.
    pub fn parse(annotation: &str) -> (&str, FieldSpec) {
        let mut segments = annotation.split(',');
        let name = segments.next().unwrap_or("");

        let mut spec = FieldSpec::default();
        for segment in segments {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            if let Some(literal) = segment.strip_prefix("default=") {
                spec.default = Some(parse_default(literal));
            } else if let Some(raw) = segment.strip_prefix("range=") {
                match parse_range(raw) {
                    Some(bounds) => spec.range = Some(bounds),
                    // malformed ranges are dropped, not fatal
                    None => tracing::warn!(range = raw, "ignoring malformed range constraint"),
                }
            } else if let Some(raw) = segment.strip_prefix("options=") {
                spec.options = Some(raw.split('|').map(str::to_owned).collect());
            } else if segment == "optional" {
                spec.optional = true;
            }
        }

        (name, spec)
    }
}

/// Parses a default literal. `{a;b;c}` is a sequence of strings; anything
/// else takes the first successful parse of integer, float, boolean, and
/// falls back to the literal string. The ordering is a contract: a default
/// of `1` is the integer 1, never the string `"1"`.
fn parse_default(literal: &str) -> Value {
    if let Some(body) = literal.strip_prefix('{').and_then(|rest| rest.strip_suffix('}')) {
        return Value::Sequence(body.split(';').map(Value::from).collect());
    }
    if let Ok(i) = literal.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = literal.parse::<f64>() {
        return Value::Float(f);
    }
    if let Some(b) = parse_bool_token(literal) {
        return Value::Bool(b);
    }
    Value::from(literal)
}

fn parse_range(raw: &str) -> Option<(i64, i64)> {
    let body = raw.strip_prefix('[')?.strip_suffix(']')?;
    let (lo, hi) = body.split_once(':')?;
    let min = lo.parse::<i64>().ok()?;
    let max = hi.parse::<i64>().ok()?;
    (min <= max).then_some((min, max))
}

/// The permissive boolean token set: `1/t/T/TRUE/true/True` and the
/// corresponding false spellings.
pub(crate) fn parse_bool_token(token: &str) -> Option<bool> {
    match token {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_only() {
        let (name, spec) = FieldSpec::parse("host");
        assert_eq!(name, "host");
        assert_eq!(spec, FieldSpec::default());
    }

    #[test]
    fn test_empty_annotation_falls_back_to_field_name() {
        let (name, spec) = FieldSpec::parse(",optional");
        assert_eq!(name, "");
        assert!(spec.optional);
    }

    #[test]
    fn test_default_literal_precedence() {
        let parse = |tag: &str| FieldSpec::parse(tag).1.default.unwrap();
        assert_eq!(parse("x,default=5"), Value::Integer(5));
        assert_eq!(parse("x,default=2.5"), Value::Float(2.5));
        assert_eq!(parse("x,default=true"), Value::Bool(true));
        assert_eq!(parse("x,default=hello"), Value::from("hello"));
        // "1" parses as an integer before the boolean rule can see it
        assert_eq!(parse("x,default=1"), Value::Integer(1));
    }

    #[test]
    fn test_default_sequence_literal() {
        let (_, spec) = FieldSpec::parse("x,default={a;b;c}");
        assert_eq!(
            spec.default,
            Some(Value::Sequence(vec![
                Value::from("a"),
                Value::from("b"),
                Value::from("c"),
            ]))
        );
    }

    #[test]
    fn test_range() {
        let (_, spec) = FieldSpec::parse("x,range=[1:10]");
        assert_eq!(spec.range, Some((1, 10)));
    }

    #[test]
    fn test_malformed_range_is_dropped() {
        for tag in [
            "x,range=1:10",
            "x,range=[1]",
            "x,range=[a:10]",
            "x,range=[10:1]",
            "x,range=[1:2:3]",
        ] {
            let (_, spec) = FieldSpec::parse(tag);
            assert_eq!(spec.range, None, "tag {tag:?} should drop its range");
        }
    }

    #[test]
    fn test_options_preserve_declaration_order() {
        let (_, spec) = FieldSpec::parse("x,options=c|a|b");
        assert_eq!(spec.options, Some(vec!["c".into(), "a".into(), "b".into()]));
    }

    #[test]
    fn test_unrecognized_segments_are_ignored() {
        let (name, spec) = FieldSpec::parse("x,future=stuff,optional");
        assert_eq!(name, "x");
        assert!(spec.optional);
        assert_eq!(spec.default, None);
    }

    #[test]
    fn test_segments_tolerate_whitespace() {
        let (_, spec) = FieldSpec::parse("x, optional , default=3");
        assert!(spec.optional);
        assert_eq!(spec.default, Some(Value::Integer(3)));
    }
}
