//! Property-based invariants for composition, history and share links.
//!
//! 1. Composition is deterministic and embeds every fragment verbatim
//! 2. History never exceeds its capacity and stays newest-first
//! 3. Clear followed by select keeps history length and order
//! 4. Share links round-trip arbitrary printable text
//! 5. The relay never panics on arbitrary notification text

use playground_core::{
    ErrorHistory, ErrorRecord, FailurePath, ShareParams, SourceSet, Timestamp, compose,
    parse_notification, share,
};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ -~\t\n\r]{0,64}",
        "[<>&\"'=%+#?/ a-z]{0,32}",
        any::<String>(),
    ]
}

fn source_set() -> impl Strategy<Value = SourceSet> {
    (fragment(), fragment(), fragment()).prop_map(|(m, s, j)| SourceSet::new(m, s, j))
}

fn record(n: u64) -> ErrorRecord {
    ErrorRecord {
        message: format!("failure {n}"),
        stack: None,
        kind: "Error".to_owned(),
        occurred_at: Timestamp::from_millis(n),
        line: None,
        path: FailurePath::Trap,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Composition
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn compose_is_deterministic(sources in source_set()) {
        let a = compose(&sources);
        let b = compose(&sources);
        prop_assert_eq!(a.as_str(), b.as_str());
    }

    #[test]
    fn compose_embeds_fragments_verbatim(sources in source_set()) {
        let doc = compose(&sources);
        prop_assert!(doc.as_str().contains(&sources.markup));
        prop_assert!(doc.as_str().contains(&sources.style));
        prop_assert!(doc.as_str().contains(&sources.script));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2-3. History
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn history_is_bounded_and_newest_first(count in 0u64..40, capacity in 1usize..8) {
        let mut history = ErrorHistory::with_capacity(capacity);
        for n in 0..count {
            history.record(record(n));
            prop_assert!(history.len() <= capacity);
        }

        let stamps: Vec<u64> = history
            .entries()
            .map(|(_, r)| r.occurred_at.as_millis())
            .collect();
        let expected: Vec<u64> = (0..count).rev().take(capacity).collect();
        prop_assert_eq!(stamps, expected);
    }

    #[test]
    fn clear_then_select_preserves_history(count in 1u64..12, pick in any::<prop::sample::Index>()) {
        let mut history = ErrorHistory::default();
        for n in 0..count {
            history.record(record(n));
        }
        let before: Vec<_> = history.entries().map(|(id, _)| id).collect();
        let target = before[pick.index(before.len())];

        history.clear_current();
        prop_assert!(history.current().is_none());
        prop_assert!(history.select(target));

        let after: Vec<_> = history.entries().map(|(id, _)| id).collect();
        prop_assert_eq!(&before, &after);
        prop_assert_eq!(history.current_id(), Some(target));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Share links
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn share_link_round_trips(sources in source_set()) {
        let params = ShareParams::default();
        let link = share::encode_share_link("https://play.example/", &sources, &params).unwrap();
        let decoded = share::decode_share_link(&link, &params).unwrap();
        prop_assert_eq!(decoded, Some(sources));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5. Relay robustness
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn relay_never_panics(text in any::<String>()) {
        let _ = parse_notification(&text);
    }

    #[test]
    fn tagged_payloads_always_classify(message in any::<String>(), line in any::<i64>()) {
        let json = serde_json::json!({
            "type": "error",
            "error": { "message": message, "lineNumber": line }
        })
        .to_string();
        prop_assert!(parse_notification(&json).path().is_some());
    }
}
