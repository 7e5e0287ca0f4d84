//! Inactivity timeouts through the whole pipeline: screen timeout elapses,
//! the timer publishes a timeout intent, and the choreographer clears the
//! stack.

mod common;

use std::time::Duration;

use common::*;
use screenflow::{Command, LockReason};

const WAIT: Duration = Duration::from_secs(600);

#[tokio::test(start_paused = true)]
async fn screen_timeout_clears_back_to_root() {
    let mut h = start_plain(graph_with_timeout());

    h.user
        .navigate(route(SCREEN_A), push_options())
        .await
        .unwrap();
    assert!(matches!(
        expect_command(&mut h.commands, WAIT).await,
        Command::NavigateTo { .. }
    ));

    // No interaction: screen A's two-minute timeout elapses and the
    // choreographer clears the stack.
    assert_eq!(
        expect_command(&mut h.commands, WAIT).await,
        Command::ClearBackStack
    );

    let current = h.choreographer.current_node();
    assert_eq!(current.borrow().node.route_key(), ROOT);
    assert_eq!(current.borrow().depth, 1);
}

#[tokio::test(start_paused = true)]
async fn interaction_postpones_the_timeout() {
    let mut h = start_plain(graph_with_timeout());

    h.user
        .navigate(route(SCREEN_A), push_options())
        .await
        .unwrap();
    expect_command(&mut h.commands, WAIT).await;

    // Keep interacting once a minute; the two-minute timer never expires.
    for _ in 0..4 {
        tokio::time::sleep(Duration::from_secs(60)).await;
        h.choreographer.timer().touch();
        tokio::task::yield_now().await;
    }
    expect_silence(&mut h.commands, Duration::from_secs(60)).await;

    // Silence after the last touch lets the timeout land.
    assert_eq!(
        expect_command(&mut h.commands, WAIT).await,
        Command::ClearBackStack
    );
}

#[tokio::test(start_paused = true)]
async fn lock_suppresses_the_timeout_until_release() {
    let mut h = start_plain(graph_with_timeout());

    h.user
        .navigate(route(SCREEN_A), push_options())
        .await
        .unwrap();
    expect_command(&mut h.commands, WAIT).await;

    // Thirty seconds in, the system takes the lock.
    tokio::time::sleep(Duration::from_secs(30)).await;
    h.choreographer.timer().acquire(LockReason::new("ota-update"));
    tokio::task::yield_now().await;

    // Two minutes later (well past the original deadline) nothing fired.
    expect_silence(&mut h.commands, Duration::from_secs(120)).await;

    // Release re-arms a full-length timer.
    h.choreographer.timer().release();
    tokio::task::yield_now().await;
    expect_silence(&mut h.commands, Duration::from_secs(110)).await;
    assert_eq!(
        expect_command(&mut h.commands, WAIT).await,
        Command::ClearBackStack
    );

    let current = h.choreographer.current_node();
    assert_eq!(current.borrow().node.route_key(), ROOT);
}

#[tokio::test(start_paused = true)]
async fn navigating_resets_the_pending_timer() {
    let mut h = start_plain(graph_with_timeout());

    h.user
        .navigate(route(SCREEN_A), push_options())
        .await
        .unwrap();
    expect_command(&mut h.commands, WAIT).await;

    // Ninety seconds in, move to screen B (no explicit timeout: the
    // five-minute default applies from the node change).
    tokio::time::sleep(Duration::from_secs(90)).await;
    h.user
        .navigate(route(SCREEN_B), push_options())
        .await
        .unwrap();
    expect_command(&mut h.commands, WAIT).await;

    // Screen A's deadline (at 120 s) passes without a timeout.
    expect_silence(&mut h.commands, Duration::from_secs(240)).await;

    // The default timeout eventually clears the stack.
    assert_eq!(
        expect_command(&mut h.commands, WAIT).await,
        Command::ClearBackStack
    );
}
