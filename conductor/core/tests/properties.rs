//! Property tests for the stage invariants
//!
//! - The observed phase never moves backwards, whatever the operation order
//! - Typewriter snapshots only grow and never cut a tag in half

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use tokio::sync::mpsc;

use hydrant_conductor::typewriter::markup::{snapshots, visible_len};
use hydrant_conductor::{
    ManualClock, MotionPreference, PhaseSequencer, StageConfig, StarFieldConfig, Viewport,
};

#[derive(Clone, Debug)]
enum Op {
    Start,
    Skip,
    Hover(bool),
    Expand,
    Ask,
    Resize(u16, u16),
    Advance(u64),
    Dispose,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Start),
        Just(Op::Skip),
        any::<bool>().prop_map(Op::Hover),
        Just(Op::Expand),
        Just(Op::Ask),
        (1u16..200, 1u16..80).prop_map(|(w, h)| Op::Resize(w, h)),
        (0u64..4000).prop_map(Op::Advance),
        Just(Op::Dispose),
    ]
}

fn motion_strategy() -> impl Strategy<Value = MotionPreference> {
    prop_oneof![
        Just(MotionPreference::Full),
        Just(MotionPreference::Reduced),
        Just(MotionPreference::None),
    ]
}

/// Markup-ish text: letters, spaces, stray `<` and a few known tags
fn markup_strategy() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        "[a-z ]{1,6}",
        Just("<b>".to_string()),
        Just("</b>".to_string()),
        Just("<strong>".to_string()),
        Just("</strong>".to_string()),
        Just("<br>".to_string()),
        Just(" < ".to_string()),
        Just("<em".to_string()),
    ];
    prop::collection::vec(piece, 0..12).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn test_phase_never_decreases(
        motion in motion_strategy(),
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let clock = Arc::new(ManualClock::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let config = StageConfig::default()
            .with_motion(motion)
            .with_stars(StarFieldConfig::default().with_count(20));
        let mut sequencer = PhaseSequencer::new(&config, clock.clone(), tx);
        let observer = sequencer.subscribe();

        let mut last = sequencer.phase();
        for op in ops {
            match op {
                Op::Start => sequencer.start(),
                Op::Skip => sequencer.skip(),
                Op::Hover(entered) => sequencer.hover(entered),
                Op::Expand => sequencer.trigger_expand(),
                Op::Ask => sequencer.trigger_ask(),
                Op::Resize(w, h) => sequencer.resize(Viewport::new(f32::from(w), f32::from(h))),
                Op::Advance(ms) => {
                    clock.advance(Duration::from_millis(ms));
                    sequencer.tick();
                }
                Op::Dispose => sequencer.dispose(),
            }
            let now = sequencer.phase();
            prop_assert!(now >= last, "phase went from {} to {}", last, now);
            prop_assert_eq!(*observer.borrow(), now);
            last = now;
        }
    }

    #[test]
    fn test_snapshots_grow_and_keep_tags_whole(source in markup_strategy()) {
        let snaps = snapshots(&source);
        let visible = visible_len(&source);

        if visible == 0 {
            prop_assert!(snaps.len() <= 1);
        } else {
            prop_assert_eq!(snaps.len(), visible);
        }

        let mut previous = 0;
        for (i, snap) in snaps.iter().enumerate() {
            let count = visible_len(snap);
            prop_assert!(count >= previous);
            previous = count;

            prop_assert!(source.starts_with(snap.as_str()));
            if i + 1 < snaps.len() {
                // only the final snapshot may end in an unterminated tag
                let tail = snap.rfind('<').map(|at| &snap[at..]);
                if let Some(tail) = tail {
                    let opens = tail[1..].starts_with(|c: char| c.is_ascii_alphabetic() || c == '/');
                    prop_assert!(!opens || tail.contains('>'), "cut tag in {:?}", snap);
                }
            }
        }
        if let Some(last) = snaps.last() {
            prop_assert_eq!(last, &source);
        }
    }
}
