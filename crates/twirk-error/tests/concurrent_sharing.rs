// SPDX-License-Identifier: MIT OR Apache-2.0
//! Many threads deriving from one shared error never observe each other.

use std::sync::Arc;
use std::thread;

use twirk_error::{ErrorCode, TwirkError};

#[test]
fn concurrent_derivations_leave_shared_value_unchanged() {
    let shared = Arc::new(
        TwirkError::new(ErrorCode::Unavailable, "backend down").with_meta("region", "eu"),
    );

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                let mut derived = (*shared).clone();
                for round in 0..100 {
                    derived = derived.with_meta("worker", i.to_string());
                    derived = derived.with_meta("round", round.to_string());
                }
                derived
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let derived = handle.join().expect("worker panicked");
        assert_eq!(derived.meta("worker"), i.to_string());
        assert_eq!(derived.meta("round"), "99");
        assert_eq!(derived.meta("region"), "eu");
    }

    assert_eq!(shared.meta_map().len(), 1);
    assert_eq!(shared.meta("region"), "eu");
    assert_eq!(shared.meta("worker"), "");
}

#[test]
fn clones_share_metadata_until_derived() {
    let a = TwirkError::not_found("gone").with_meta("k", "v");
    let b = a.clone();
    assert!(std::ptr::eq(a.meta_map(), b.meta_map()));

    let c = b.with_meta("k2", "v2");
    assert!(!std::ptr::eq(b.meta_map(), c.meta_map()));
    assert_eq!(a.meta("k2"), "");
}

#[test]
fn wrapped_error_crosses_threads_with_its_cause() {
    let err = TwirkError::internal_with(std::io::Error::other("socket reset"));
    let moved = thread::spawn(move || err.with_meta("thread", "worker"))
        .join()
        .expect("worker panicked");
    let cause = moved
        .cause()
        .and_then(|c| c.downcast_ref::<std::io::Error>())
        .expect("io cause");
    assert_eq!(cause.to_string(), "socket reset");
}
