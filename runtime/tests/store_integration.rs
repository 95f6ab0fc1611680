//! Integration tests for Store effect execution.

#![allow(clippy::unwrap_used)] // Test code

use rifa_core::effect::Effect;
use rifa_core::reducer::Reducer;
use rifa_core::{SmallVec, smallvec};
use rifa_runtime::{EffectHandle, Store, StoreError};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
struct LogState {
    entries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum LogAction {
    RunSequence,
    Append(String),
    Quiet,
}

#[derive(Clone)]
struct LogReducer;

impl Reducer for LogReducer {
    type State = LogState;
    type Action = LogAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            LogAction::RunSequence => {
                // Two delayed appends with the longer delay first: only
                // sequential execution preserves the declared order.
                smallvec![Effect::chain(vec![
                    Effect::Delay {
                        duration: Duration::from_millis(50),
                        action: Box::new(LogAction::Append("first".to_string())),
                    },
                    Effect::Delay {
                        duration: Duration::from_millis(5),
                        action: Box::new(LogAction::Append("second".to_string())),
                    },
                ])]
            },
            LogAction::Append(entry) => {
                state.entries.push(entry);
                smallvec![Effect::None]
            },
            LogAction::Quiet => smallvec![Effect::None],
        }
    }
}

#[tokio::test]
async fn sequential_effects_run_in_declared_order() {
    let store = Store::new(LogState::default(), LogReducer, ());

    let mut handle = store.send(LogAction::RunSequence).await.unwrap();
    handle
        .wait_with_timeout(Duration::from_secs(5))
        .await
        .unwrap();

    // Both appends ran through the reducer; poll briefly for the feedback
    // sends to settle.
    for _ in 0..100 {
        if store.state(|s| s.entries.len()).await == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let entries = store.state(|s| s.entries.clone()).await;
    assert_eq!(entries, vec!["first".to_string(), "second".to_string()]);
}

#[tokio::test]
async fn completed_handle_waits_without_blocking() {
    let mut handle = EffectHandle::completed();
    handle
        .wait_with_timeout(Duration::from_millis(10))
        .await
        .unwrap();
}

#[tokio::test]
async fn send_and_wait_for_times_out_without_a_match() {
    let store = Store::new(LogState::default(), LogReducer, ());

    let result = store
        .send_and_wait_for(
            LogAction::Quiet,
            |action| matches!(action, LogAction::Append(_)),
            Duration::from_millis(50),
        )
        .await;

    assert!(matches!(result, Err(StoreError::Timeout)));
}
