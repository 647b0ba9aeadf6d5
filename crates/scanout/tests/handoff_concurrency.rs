//! Frame hand-off between a producer task and a refresh task.
//!
//! Both sides run as futures on one tokio task (`tokio::join!`) so the test
//! can observe the in-flight count without extra synchronisation.
//!
//! Run with: cargo test -p scanout --test handoff_concurrency

#![allow(
    clippy::unwrap_used,
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing,
    clippy::cast_possible_truncation
)]

use std::cell::Cell;
use std::time::Duration;

use scanout::{Bank, FrameDescriptor, FrameHandoff, HandoffError, VideoMode};

const FRAMES: u8 = 40;

fn frame(i: u8) -> FrameDescriptor {
    FrameDescriptor {
        bank: Bank::from_index(i),
        mode: if i % 3 == 0 { VideoMode::Wipe } else { VideoMode::Single },
        overlay_index: i,
        scroll: None,
    }
}

#[tokio::test]
async fn producer_never_runs_more_than_two_frames_ahead() {
    static HANDOFF: FrameHandoff = FrameHandoff::new();
    let submitted = Cell::new(0u8);
    let consumed = Cell::new(0u8);

    let producer = async {
        for i in 0..FRAMES {
            HANDOFF.submit_frame(frame(i)).await;
            submitted.set(submitted.get() + 1);
            assert!(submitted.get() - consumed.get() <= 2, "third frame in flight");
        }
    };

    let refresh = async {
        let mut seen = Vec::new();
        while seen.len() < usize::from(FRAMES) {
            match HANDOFF.poll_frame() {
                Some(f) => {
                    consumed.set(consumed.get() + 1);
                    seen.push(f);
                }
                None => tokio::task::yield_now().await,
            }
        }
        seen
    };

    let (_, seen) = tokio::time::timeout(Duration::from_secs(5), async { tokio::join!(producer, refresh) })
        .await
        .unwrap();

    // The mirror holds the latest submission, so a frame may be shown more
    // than once, but its fields always come from a single submission.
    for f in &seen {
        assert_eq!(*f, frame(f.overlay_index));
    }
    assert!(seen.windows(2).all(|w| w[0].overlay_index <= w[1].overlay_index));
    assert_eq!(seen.last().unwrap().overlay_index, FRAMES - 1);
    assert!(HANDOFF.poll_frame().is_none());
}

#[tokio::test]
async fn third_submission_waits_for_refresh() {
    static HANDOFF: FrameHandoff = FrameHandoff::new();
    HANDOFF.try_submit_frame(frame(0)).unwrap();
    HANDOFF.try_submit_frame(frame(1)).unwrap();
    assert_eq!(HANDOFF.try_submit_frame(frame(2)), Err(HandoffError::Busy));

    let blocked = tokio::time::timeout(Duration::from_millis(20), HANDOFF.submit_frame(frame(2))).await;
    assert!(blocked.is_err(), "submission must wait while two frames are queued");

    assert_eq!(HANDOFF.poll_frame().unwrap().overlay_index, 1);
    tokio::time::timeout(Duration::from_secs(1), HANDOFF.submit_frame(frame(2)))
        .await
        .unwrap();
    assert_eq!(HANDOFF.poll_frame().unwrap(), frame(2));
}

#[test]
fn every_bank_round_trips() {
    let handoff = FrameHandoff::new();
    for bank in [Bank::Zero, Bank::One] {
        let sent = FrameDescriptor {
            bank,
            ..frame(7)
        };
        handoff.try_submit_frame(sent).unwrap();
        assert_eq!(handoff.poll_frame().unwrap().bank, bank);
    }
}
