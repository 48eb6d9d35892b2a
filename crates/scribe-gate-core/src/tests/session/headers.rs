use crate::{RequestError, session::adapter::merge_headers};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

fn headers(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(n, v)| (n.to_string(), v.to_string()))
        .collect()
}

/// WHAT: Injected headers are present with no caller headers
/// WHY: Every authenticated request carries them
#[test]
#[allow(clippy::unwrap_used)]
fn given_no_caller_headers_when_merging_then_auth_and_json_injected() {
    let merged = merge_headers("abc", &[]).unwrap();

    assert_eq!(merged.get(AUTHORIZATION).unwrap(), "Bearer abc");
    assert!(merged.get(AUTHORIZATION).unwrap().is_sensitive());
    assert_eq!(merged.get(CONTENT_TYPE).unwrap(), "application/json");
    assert_eq!(merged.len(), 2);
}

/// WHAT: Caller headers override injected ones case-insensitively
/// WHY: Header names are case-insensitive on the wire
#[test]
#[allow(clippy::unwrap_used)]
fn given_caller_authorization_when_merging_then_caller_value_kept() {
    let merged = merge_headers(
        "abc",
        &headers(&[("authorization", "Basic Zm9vOmJhcg=="), ("X-Request-Id", "r1")]),
    )
    .unwrap();

    assert_eq!(merged.get(AUTHORIZATION).unwrap(), "Basic Zm9vOmJhcg==");
    assert_eq!(merged.get("x-request-id").unwrap(), "r1");
    assert_eq!(merged.len(), 3);
}

/// WHAT: Later caller headers win over earlier ones with the same name
/// WHY: Options are applied in order
#[test]
#[allow(clippy::unwrap_used)]
fn given_duplicate_caller_headers_when_merging_then_last_wins() {
    let merged = merge_headers("abc", &headers(&[("Accept", "a"), ("accept", "b")])).unwrap();

    assert_eq!(merged.get_all("accept").iter().count(), 1);
    assert_eq!(merged.get("accept").unwrap(), "b");
}

/// WHAT: Invalid header names are rejected with the offending name
/// WHY: A malformed header must not silently drop
#[test]
fn given_invalid_header_name_when_merging_then_invalid_header_error() {
    let result = merge_headers("abc", &headers(&[("bad header", "x")]));

    assert!(matches!(
        result,
        Err(RequestError::InvalidHeader { ref name, .. }) if name == "bad header"
    ));
}

/// WHAT: Tokens with control characters are rejected
/// WHY: They would corrupt the request line
#[test]
fn given_token_with_newline_when_merging_then_invalid_header_error() {
    let result = merge_headers("abc\r\nInjected: yes", &[]);

    assert!(matches!(result, Err(RequestError::InvalidHeader { .. })));
}
