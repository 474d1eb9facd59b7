//! Path and query-string construction for resource endpoints.

use paypal_core::{PayPalError, PayPalResult};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

/// Unreserved characters (RFC 3986) stay literal; everything else is escaped
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Encode an identifier as a single path segment
pub(crate) fn segment(id: &str) -> String {
    utf8_percent_encode(id, SEGMENT).to_string()
}

/// Append a query string built from the supplied fields only
pub(crate) fn with_query<Q: Serialize>(path: &str, query: &Q) -> PayPalResult<String> {
    let encoded = serde_urlencoded::to_string(query)
        .map_err(|e| PayPalError::Serialization(format!("Failed to encode query: {e}")))?;

    if encoded.is_empty() {
        Ok(path.to_string())
    } else {
        Ok(format!("{path}?{encoded}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paypal_core::ListPlansParams;

    #[test]
    fn test_segment_escapes_separators() {
        assert_eq!(segment("5O190127TN364715T"), "5O190127TN364715T");
        assert_eq!(segment("I-BW452GLLEP1G"), "I-BW452GLLEP1G");
        assert_eq!(segment("a/b?c"), "a%2Fb%3Fc");
        assert_eq!(segment("id with space"), "id%20with%20space");
    }

    #[test]
    fn test_query_contains_only_supplied_fields() {
        let params = ListPlansParams {
            page: Some(2),
            ..Default::default()
        };
        assert_eq!(
            with_query("/v1/billing/plans", &params).unwrap(),
            "/v1/billing/plans?page=2"
        );
    }

    #[test]
    fn test_empty_query_is_omitted() {
        assert_eq!(
            with_query("/v1/billing/plans", &ListPlansParams::default()).unwrap(),
            "/v1/billing/plans"
        );
    }
}
