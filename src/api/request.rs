//! # Request Validation
//!
//! Turns raw request input into [`NewEvent`] and [`ListQuery`] values.
//!
//! Field presence follows the browser clients' contract: `null`, `false`,
//! `0`, `""` and a missing key all count as absent. Bodies are parsed as
//! JSON whatever their `Content-Type`.

use serde_json::{Map, Value};

use crate::store::{ListQuery, NewEvent, DEFAULT_LIMIT, MAX_LIMIT};

use super::errors::{ApiError, ApiResult};

/// Parse a request body as JSON
pub fn parse_json_body(body: &[u8]) -> ApiResult<Value> {
    serde_json::from_slice(body).map_err(|_| ApiError::MalformedInput)
}

/// Validate a create-event body
///
/// `now` is the fallback timestamp in whole seconds.
pub fn parse_new_event(body: &[u8], now: i64) -> ApiResult<NewEvent> {
    let value = parse_json_body(body)?;
    let empty = Map::new();
    // A non-object body has no fields, so it fails the required check below.
    let fields = value.as_object().unwrap_or(&empty);

    let required = |name: &str| truthy_text(fields.get(name));
    let (app_name, user_id, action_name) =
        match (required("appName"), required("userId"), required("actionName")) {
            (Some(app), Some(user), Some(action)) => (app, user, action),
            _ => return Err(ApiError::MissingRequiredFields),
        };

    let url_params = fields
        .get("urlParams")
        .filter(|v| is_truthy(v))
        .map(Value::to_string);

    Ok(NewEvent {
        app_name,
        user_id,
        action_name,
        user_agent: truthy_text(fields.get("userAgent")),
        timezone: truthy_text(fields.get("timezone")),
        language: truthy_text(fields.get("language")),
        referrer: truthy_text(fields.get("referrer")),
        url_params,
        timestamp: timestamp_or(fields.get("timestamp"), now),
    })
}

/// Build a list query from URL query pairs
///
/// The first occurrence of a repeated key wins; empty filters are ignored.
pub fn parse_list_query(pairs: &[(String, String)]) -> ListQuery {
    let first = |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };
    let filter = |key: &str| first(key).filter(|v| !v.is_empty()).map(str::to_string);

    ListQuery {
        limit: parse_limit(first("limit")),
        app_name: filter("appName"),
        action_name: filter("actionName"),
        user_id: filter("userId"),
    }
}

/// Resolve the `limit` parameter
///
/// Missing, non-numeric, zero or negative → [`DEFAULT_LIMIT`]; larger than
/// [`MAX_LIMIT`] → [`MAX_LIMIT`].
pub fn parse_limit(raw: Option<&str>) -> u32 {
    match raw.and_then(parse_leading_int) {
        Some(n) if n > 0 => n.min(i64::from(MAX_LIMIT)) as u32,
        _ => DEFAULT_LIMIT,
    }
}

/// Integer prefix of a string: leading whitespace, optional sign, digits
///
/// `"50abc"` → 50, `"  -3"` → -3, `"abc"` → None. Saturates on overflow.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end]
        .bytes()
        .fold(0i64, |acc, b| acc.saturating_mul(10).saturating_add(i64::from(b - b'0')));
    Some(if negative { -magnitude } else { magnitude })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text form of a truthy value; strings stay as-is, anything else is JSON text
fn truthy_text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(v) if is_truthy(v) => Some(v.to_string()),
        _ => None,
    }
}

fn timestamp_or(value: Option<&Value>, now: i64) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .filter(|ts| *ts != 0)
            .unwrap_or(now),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok().filter(|ts| *ts != 0).unwrap_or(now),
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_760_000_000;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_minimal_event_defaults() {
        let body = br#"{"appName":"demo","userId":"u1","actionName":"click"}"#;
        let event = parse_new_event(body, NOW).unwrap();
        assert_eq!(event, NewEvent::new("demo", "u1", "click", NOW));
    }

    #[test]
    fn test_full_event() {
        let body = br#"{
            "appName": "demo",
            "userId": "u1",
            "actionName": "click",
            "userAgent": "Mozilla/5.0",
            "timezone": "Europe/Rome",
            "language": "it-IT",
            "referrer": "",
            "urlParams": {"utm_source": "mail"},
            "timestamp": 1700000000
        }"#;
        let event = parse_new_event(body, NOW).unwrap();
        assert_eq!(event.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(event.timezone.as_deref(), Some("Europe/Rome"));
        assert_eq!(event.language.as_deref(), Some("it-IT"));
        assert_eq!(event.referrer, None);
        assert_eq!(event.url_params.as_deref(), Some(r#"{"utm_source":"mail"}"#));
        assert_eq!(event.timestamp, 1_700_000_000);
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        assert_eq!(parse_new_event(b"{not json", NOW), Err(ApiError::MalformedInput));
        assert_eq!(parse_new_event(b"", NOW), Err(ApiError::MalformedInput));
    }

    #[test]
    fn test_missing_or_falsy_required_fields() {
        let bodies: [&[u8]; 6] = [
            br#"{"userId":"u1","actionName":"click"}"#,
            br#"{"appName":"","userId":"u1","actionName":"click"}"#,
            br#"{"appName":"demo","userId":null,"actionName":"click"}"#,
            br#"{"appName":"demo","userId":"u1","actionName":false}"#,
            br#"{"appName":"demo","userId":0,"actionName":"click"}"#,
            br#"["demo","u1","click"]"#,
        ];
        for body in bodies {
            assert_eq!(
                parse_new_event(body, NOW),
                Err(ApiError::MissingRequiredFields),
                "{}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_truthy_non_strings_are_stored_as_text() {
        let body = br#"{"appName":"demo","userId":42,"actionName":"click"}"#;
        let event = parse_new_event(body, NOW).unwrap();
        assert_eq!(event.user_id, "42");
    }

    #[test]
    fn test_url_params_encoding() {
        let empty_object = br#"{"appName":"a","userId":"u","actionName":"x","urlParams":{}}"#;
        assert_eq!(
            parse_new_event(empty_object, NOW).unwrap().url_params.as_deref(),
            Some("{}")
        );

        let string = br#"{"appName":"a","userId":"u","actionName":"x","urlParams":"q=1"}"#;
        assert_eq!(
            parse_new_event(string, NOW).unwrap().url_params.as_deref(),
            Some(r#""q=1""#)
        );

        let empty = br#"{"appName":"a","userId":"u","actionName":"x","urlParams":""}"#;
        assert_eq!(parse_new_event(empty, NOW).unwrap().url_params, None);
    }

    #[test]
    fn test_timestamp_coercion() {
        let with = |ts: &str| {
            let body = format!(
                r#"{{"appName":"a","userId":"u","actionName":"x","timestamp":{}}}"#,
                ts
            );
            parse_new_event(body.as_bytes(), NOW).unwrap().timestamp
        };
        assert_eq!(with("1700000000"), 1_700_000_000);
        assert_eq!(with("1700000000.9"), 1_700_000_000);
        assert_eq!(with(r#""1700000000""#), 1_700_000_000);
        assert_eq!(with("0"), NOW);
        assert_eq!(with("null"), NOW);
        assert_eq!(with(r#""yesterday""#), NOW);
    }

    #[test]
    fn test_limit_rules() {
        assert_eq!(parse_limit(None), 100);
        assert_eq!(parse_limit(Some("")), 100);
        assert_eq!(parse_limit(Some("abc")), 100);
        assert_eq!(parse_limit(Some("0")), 100);
        assert_eq!(parse_limit(Some("-5")), 100);
        assert_eq!(parse_limit(Some("25")), 25);
        assert_eq!(parse_limit(Some("50abc")), 50);
        assert_eq!(parse_limit(Some("1000")), 1000);
        assert_eq!(parse_limit(Some("1001")), 1000);
        assert_eq!(parse_limit(Some("99999999999999999999999")), 1000);
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("  42"), Some(42));
        assert_eq!(parse_leading_int("+7x"), Some(7));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("x1"), None);
    }

    #[test]
    fn test_list_query_filters() {
        let query = parse_list_query(&pairs(&[
            ("appName", "demo"),
            ("actionName", ""),
            ("userId", "u1"),
            ("appName", "ignored"),
            ("limit", "10"),
        ]));
        assert_eq!(query.limit, 10);
        assert_eq!(query.app_name.as_deref(), Some("demo"));
        assert_eq!(query.action_name, None);
        assert_eq!(query.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_list_query_defaults() {
        assert_eq!(parse_list_query(&[]), ListQuery::default());
    }
}
