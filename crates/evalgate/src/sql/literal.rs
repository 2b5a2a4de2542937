use serde_json::{Map, Value};
use uuid::Uuid;

pub const SQL_NULL: &str = "NULL";

/// Single-quoted text literal with embedded quotes doubled.
#[must_use]
pub fn sql_text(value: Option<&str>) -> String {
    match value {
        Some(text) => format!("'{}'", text.replace('\'', "''")),
        None => SQL_NULL.to_string(),
    }
}

#[must_use]
pub const fn sql_bool(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

#[must_use]
pub fn sql_int(value: Option<i64>) -> String {
    value.map_or_else(|| SQL_NULL.to_string(), |number| number.to_string())
}

#[must_use]
pub fn sql_jsonb(value: &Value) -> String {
    format!("{}::jsonb", sql_text(Some(&canonical_json(value))))
}

/// `NULL::uuid` unless `value` is present.
#[must_use]
pub fn sql_uuid(value: Option<&str>) -> String {
    format!("{}::uuid", sql_text(value))
}

/// Compact JSON with object keys sorted at every depth.
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    sort_keys(value).to_string()
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(entries) => {
            let mut sorted = entries.iter().collect::<Vec<_>>();
            sorted.sort_by(|left, right| left.0.cmp(right.0));
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(key, nested)| (key.clone(), sort_keys(nested)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Outcome of checking a string that should hold a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UuidCheck {
    /// Canonical lowercase hyphenated form when the input parsed.
    pub value: Option<String>,
    /// The raw input when it was present but did not parse.
    pub invalid: Option<String>,
}

#[must_use]
pub fn check_uuid(raw: Option<&str>) -> UuidCheck {
    let Some(raw) = raw.filter(|candidate| !candidate.is_empty()) else {
        return UuidCheck::default();
    };

    match Uuid::try_parse(raw) {
        Ok(parsed) => UuidCheck {
            value: Some(parsed.hyphenated().to_string()),
            invalid: None,
        },
        Err(_) => UuidCheck {
            value: None,
            invalid: Some(raw.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use serde_json::json;
    use uuid::Uuid;

    use super::{UuidCheck, canonical_json, check_uuid, sql_bool, sql_int, sql_jsonb, sql_text};

    #[test]
    fn text_doubles_single_quotes() {
        assert_eq!(sql_text(Some("plain")), "'plain'");
        assert_eq!(sql_text(Some("it's")), "'it''s'");
        assert_eq!(
            sql_text(Some("'); DROP TABLE x; --")),
            "'''); DROP TABLE x; --'"
        );
        assert_eq!(sql_text(None), "NULL");
    }

    #[test]
    fn scalar_literals() {
        assert_eq!(sql_bool(true), "true");
        assert_eq!(sql_bool(false), "false");
        assert_eq!(sql_int(Some(-42)), "-42");
        assert_eq!(sql_int(None), "NULL");
    }

    #[test]
    fn jsonb_is_key_sorted_compact_and_escaped() {
        let value = json!({
            "zeta": 1,
            "alpha": { "y": true, "b": [ { "k2": null, "k1": "o'clock" } ] }
        });

        assert_snapshot!(
            sql_jsonb(&value),
            @r#"'{"alpha":{"b":[{"k1":"o''clock","k2":null}],"y":true},"zeta":1}'::jsonb"#
        );
    }

    #[test]
    fn canonical_json_is_insertion_order_independent() {
        let left = json!({ "a": 1, "b": 2 });
        let right = json!({ "b": 2, "a": 1 });

        assert_eq!(canonical_json(&left), canonical_json(&right));
    }

    #[test]
    fn uuid_round_trips_to_canonical_form() {
        let raw = "36F7EBCA-5661-4C0F-B215-175F9627B99E";
        let check = check_uuid(Some(raw));

        let canonical = check.value.expect("uppercase uuid parses");
        assert_eq!(canonical, "36f7ebca-5661-4c0f-b215-175f9627b99e");
        assert_eq!(
            Uuid::parse_str(&canonical).expect("canonical parses").to_string(),
            canonical
        );
        assert_eq!(check.invalid, None);
    }

    #[test]
    fn invalid_uuid_degrades_to_null_with_diagnostic() {
        assert_eq!(
            check_uuid(Some("not-a-uuid")),
            UuidCheck {
                value: None,
                invalid: Some("not-a-uuid".to_string()),
            }
        );
        assert_eq!(check_uuid(None), UuidCheck::default());
        assert_eq!(check_uuid(Some("")), UuidCheck::default());
    }
}
