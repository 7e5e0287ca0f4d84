//! Debounce-distinct behavior over the whole pipeline: equal intents
//! inside the window collapse to one validation and one command.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use common::*;
use screenflow::{
    ChoreographerConfig, Command, Intent, Node, Validation, ValidationCx, ValidationError,
    Validator,
};

const WAIT: Duration = Duration::from_secs(5);

/// Counts validation calls and passes everything.
struct CountingValidator {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Validator for CountingValidator {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn validate(
        &self,
        _intent: &Intent,
        _node: &Node,
        _cx: &ValidationCx,
    ) -> Result<Validation, ValidationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Validation::Valid)
    }
}

fn counting_harness() -> (Harness, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let harness = start(
        small_graph(),
        ChoreographerConfig::default(),
        vec![Box::new(CountingValidator {
            calls: calls.clone(),
        })],
    );
    (harness, calls)
}

#[tokio::test(start_paused = true)]
async fn burst_of_equal_intents_validates_once() {
    let (mut h, calls) = counting_harness();

    // Three identical intents, 20 ms apart, inside the 70 ms window.
    for _ in 0..3 {
        h.user
            .navigate(route(SCREEN_A), push_options())
            .await
            .unwrap();
        tokio::time::advance(Duration::from_millis(20)).await;
    }

    assert!(matches!(
        expect_command(&mut h.commands, WAIT).await,
        Command::NavigateTo { .. }
    ));
    expect_silence(&mut h.commands, Duration::from_millis(300)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn equal_intents_outside_the_window_produce_two_commands() {
    let (mut h, calls) = counting_harness();

    h.user
        .navigate(route(SCREEN_A), push_options())
        .await
        .unwrap();
    assert!(matches!(
        expect_command(&mut h.commands, WAIT).await,
        Command::NavigateTo { .. }
    ));

    tokio::time::advance(Duration::from_millis(200)).await;

    h.user
        .navigate(route(SCREEN_A), push_options())
        .await
        .unwrap();
    assert!(matches!(
        expect_command(&mut h.commands, WAIT).await,
        Command::NavigateTo { .. }
    ));

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn distinct_intents_inside_the_window_both_pass() {
    let (mut h, calls) = counting_harness();

    h.user
        .navigate(route(SCREEN_A), push_options())
        .await
        .unwrap();
    h.user
        .navigate(route(SCREEN_B), push_options())
        .await
        .unwrap();

    expect_command(&mut h.commands, WAIT).await;
    expect_command(&mut h.commands, WAIT).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn single_top_keeps_the_stack_flat_when_duplicates_slip_through() {
    let (mut h, _) = counting_harness();

    // Two equal single-top pushes far enough apart to both be admitted.
    h.user
        .navigate(route(SCREEN_A), push_options())
        .await
        .unwrap();
    expect_command(&mut h.commands, WAIT).await;

    tokio::time::advance(Duration::from_millis(200)).await;
    h.user
        .navigate(route(SCREEN_A), push_options())
        .await
        .unwrap();
    expect_command(&mut h.commands, WAIT).await;

    // The back stack holds screen A once.
    let current = h.choreographer.current_node();
    assert_eq!(current.borrow().node.route_key(), SCREEN_A);
    assert_eq!(current.borrow().depth, 2);
}
