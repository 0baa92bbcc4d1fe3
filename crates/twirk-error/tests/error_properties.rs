// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property-based tests for the code table and error values.

use proptest::prelude::*;
use twirk_error::{ErrorCode, TwirkError, is_valid_error_code, server_http_status};

// ── Strategies ──────────────────────────────────────────────────────────

fn fast_config() -> ProptestConfig {
    ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    }
}

fn arb_code() -> BoxedStrategy<ErrorCode> {
    proptest::sample::select(ErrorCode::ALL.to_vec()).boxed()
}

fn arb_unknown_code() -> BoxedStrategy<String> {
    "[a-z_\\-]{1,24}"
        .prop_filter("must not be a known code", |s| ErrorCode::parse(s).is_none())
        .boxed()
}

fn arb_meta() -> BoxedStrategy<Vec<(String, String)>> {
    prop::collection::vec(("[a-z]{1,6}", "[ -~]{0,12}"), 0..8).boxed()
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(fast_config())]

    #[test]
    fn named_codes_are_valid_and_nonzero(code in arb_code()) {
        prop_assert!(is_valid_error_code(code));
        prop_assert_ne!(server_http_status(code), 0);
        prop_assert_ne!(server_http_status(code), 200);
    }

    #[test]
    fn unknown_codes_map_to_zero(raw in arb_unknown_code()) {
        prop_assert_eq!(server_http_status(&raw), 0);
        prop_assert!(!is_valid_error_code(&raw));
    }

    #[test]
    fn unknown_codes_become_internal(raw in arb_unknown_code(), msg in "[ -~]{0,32}") {
        let err = TwirkError::new(&raw, msg);
        prop_assert_eq!(err.code(), ErrorCode::Internal);
        prop_assert!(err.msg().contains(raw.as_str()));
    }

    #[test]
    fn display_follows_canonical_form(code in arb_code(), msg in "[ -~]{0,32}") {
        let err = TwirkError::new(code, msg.clone());
        prop_assert_eq!(err.to_string(), format!("twirk error {}: {}", code.as_str(), msg));
    }

    #[test]
    fn derivation_never_touches_the_source(pairs in arb_meta(), key in "[a-z]{1,6}") {
        let mut base = TwirkError::internal("base");
        for (k, v) in &pairs {
            base = base.with_meta(k.as_str(), v.as_str());
        }
        let before = base.meta_map().clone();
        let derived = base.with_meta(key.as_str(), "derived");
        prop_assert_eq!(base.meta_map(), &before);
        prop_assert_eq!(derived.meta(&key), "derived");
        for (k, v) in &before {
            if *k != key {
                prop_assert_eq!(derived.meta(k), v.as_str());
            }
        }
    }

    #[test]
    fn json_body_preserves_projection(code in arb_code(), msg in "[ -~]{0,32}", pairs in arb_meta()) {
        let mut err = TwirkError::new(code, msg);
        for (k, v) in &pairs {
            err = err.with_meta(k.as_str(), v.as_str());
        }
        let json = serde_json::to_string(&err).unwrap();
        let back: TwirkError = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, err);
    }
}
