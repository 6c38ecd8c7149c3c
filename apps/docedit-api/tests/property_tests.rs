//! Property-based tests for docedit-api
//!
//! Tests caller identification and list pagination using proptest.

use docedit_api::handlers::parse_user_id;
use docedit_api::models::ListQuery;
use docedit_core::{PageRequest, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use proptest::prelude::*;
use uuid::Uuid;

/// Strings that can never parse as a UUID
fn invalid_user_id() -> impl Strategy<Value = String> {
    prop_oneof![
        "[g-z]{1,36}",        // Not hex
        "[0-9a-f]{1,20}",     // Too short
        "[!@#$%^&*]{10,20}",  // Invalid characters
        Just("".to_string()), // Empty
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ============================================================
    // Caller Identification
    // ============================================================

    #[test]
    fn any_uuid_header_identifies_the_caller(bytes in any::<[u8; 16]>()) {
        let id = Uuid::from_bytes(bytes);
        prop_assert_eq!(parse_user_id(&id.to_string()).unwrap(), id);
        prop_assert_eq!(parse_user_id(&format!("  {}  ", id)).unwrap(), id);
    }

    #[test]
    fn malformed_user_ids_are_rejected(value in invalid_user_id()) {
        prop_assert!(parse_user_id(&value).is_err());
    }

    // ============================================================
    // Pagination
    // ============================================================

    #[test]
    fn limits_are_always_within_bounds(
        limit in proptest::option::of(any::<i64>()),
        offset in proptest::option::of(any::<i64>())
    ) {
        let page: PageRequest = ListQuery { limit, offset }.into();
        prop_assert!(page.limit >= 1);
        prop_assert!(page.limit <= MAX_PAGE_LIMIT);
        if let Some(l) = limit {
            if l >= 1 && l <= MAX_PAGE_LIMIT as i64 {
                prop_assert_eq!(page.limit as i64, l);
            }
        }
    }

    #[test]
    fn non_positive_limits_use_the_default(limit in i64::MIN..=0) {
        let page: PageRequest = ListQuery { limit: Some(limit), offset: None }.into();
        prop_assert_eq!(page.limit, DEFAULT_PAGE_LIMIT);
        prop_assert_eq!(page.offset, 0);
    }

    #[test]
    fn offsets_are_never_negative(offset in any::<i64>()) {
        let page: PageRequest = ListQuery { limit: None, offset: Some(offset) }.into();
        if offset <= 0 {
            prop_assert_eq!(page.offset, 0);
        } else {
            prop_assert!(page.offset > 0);
        }
    }
}
