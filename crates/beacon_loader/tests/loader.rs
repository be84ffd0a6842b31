//! Integration tests for shared resource loading.
//!
//! Covers de-duplication across consumers, failure release, terminal
//! stability, inactive loaders and teardown while a load is in flight.

use beacon_loader::{
    Activation, LoadState, ManualEnvironment, ResourceLoadCache, ResourceLoader,
};
use std::sync::Arc;

fn setup() -> (ResourceLoadCache, Arc<ManualEnvironment>) {
    (ResourceLoadCache::new(), Arc::new(ManualEnvironment::new()))
}

fn mount(
    cache: &ResourceLoadCache,
    env: &Arc<ManualEnvironment>,
    key: &str,
) -> ResourceLoader<ManualEnvironment> {
    ResourceLoader::mount(cache.clone(), Arc::clone(env), key, Activation::Active)
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCENARIOS
// ═══════════════════════════════════════════════════════════════════════════════

/// A fresh key is claimed, attached and loaded.
#[tokio::test]
async fn unclaimed_key_loads() {
    let (cache, env) = setup();
    let mut loader = mount(&cache, &env, "a.js");

    assert_eq!(env.attach_count("a.js"), 1);
    assert_eq!(loader.state(), LoadState::PENDING);

    assert!(env.succeed("a.js"));

    assert_eq!(loader.settled().await, LoadState::LOADED);
}

/// Two consumers in the same turn share one attachment.
#[tokio::test]
async fn second_consumer_sees_already_present() {
    let (cache, env) = setup();
    let mut first = mount(&cache, &env, "b.js");
    let second = mount(&cache, &env, "b.js");

    assert_eq!(second.state(), LoadState::ALREADY_PRESENT);
    assert_eq!(env.attach_count("b.js"), 1);

    env.succeed("b.js");
    assert_eq!(first.settled().await, LoadState::LOADED);
}

/// A failed load reports an error, releases the key and detaches the script.
#[tokio::test]
async fn failure_releases_and_detaches() {
    let (cache, env) = setup();
    let mut loader = mount(&cache, &env, "c.js");

    env.fail("c.js", "404");

    assert_eq!(loader.settled().await, LoadState::ERRORED);
    assert!(!cache.contains("c.js"));
    assert!(!env.is_attached("c.js"));
    assert_eq!(env.detached().len(), 1);
}

/// An abandoned attachment is treated as a failure.
#[tokio::test]
async fn abandoned_attachment_is_a_failure() {
    let (cache, env) = setup();
    let mut loader = mount(&cache, &env, "d.js");

    env.abandon("d.js");

    assert_eq!(loader.settled().await, LoadState::ERRORED);
    assert!(!cache.contains("d.js"));
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════════

/// After a failure the next consumer attaches again instead of short-circuiting.
#[tokio::test]
async fn failure_reopens_for_new_consumer() {
    let (cache, env) = setup();
    let mut first = mount(&cache, &env, "k.js");
    env.fail("k.js", "timeout");
    assert_eq!(first.settled().await, LoadState::ERRORED);

    let mut retry = mount(&cache, &env, "k.js");

    assert_eq!(env.attach_count("k.js"), 2);
    assert_eq!(retry.state(), LoadState::PENDING);

    env.succeed("k.js");
    assert_eq!(retry.settled().await, LoadState::LOADED);
}

/// Inactive loaders never attach and never leave the pending state.
#[tokio::test]
async fn inactive_loader_has_no_effects() {
    let (cache, env) = setup();
    let mut loader =
        ResourceLoader::mount(cache.clone(), env.clone(), "p.js", Activation::Inactive);

    loader.load("q.js");

    assert_eq!(loader.settled().await, LoadState::PENDING);
    assert_eq!(env.attach_count("p.js"), 0);
    assert_eq!(env.attach_count("q.js"), 0);
    assert!(cache.is_empty());
}

/// A late claimant is reported as present even while the first load is
/// still in flight, and keeps that state if the first load then fails.
#[tokio::test]
async fn late_claimant_during_pending_load() {
    let (cache, env) = setup();
    let mut first = mount(&cache, &env, "race.js");
    let mut late = mount(&cache, &env, "race.js");

    assert_eq!(first.state(), LoadState::PENDING);
    assert_eq!(late.state(), LoadState::ALREADY_PRESENT);

    env.fail("race.js", "blocked");

    assert_eq!(first.settled().await, LoadState::ERRORED);
    assert_eq!(late.settled().await, LoadState::ALREADY_PRESENT);
    assert!(!cache.contains("race.js"));
}

/// A terminal state does not change when the environment reports again.
#[tokio::test]
async fn terminal_state_is_stable() {
    let (cache, env) = setup();
    let mut loader = mount(&cache, &env, "s.js");

    env.succeed("s.js");
    assert_eq!(loader.settled().await, LoadState::LOADED);

    // Nothing is pending any more, so nothing can be reported.
    assert!(!env.fail("s.js", "late error"));
    tokio::task::yield_now().await;

    assert_eq!(loader.state(), LoadState::LOADED);
    assert!(cache.contains("s.js"));
}

// ═══════════════════════════════════════════════════════════════════════════════
// TEARDOWN AND KEY CHANGES
// ═══════════════════════════════════════════════════════════════════════════════

/// Dropping the loader does not drop failure handling for its load.
#[tokio::test]
async fn teardown_keeps_failure_handling() {
    let (cache, env) = setup();
    let loader = mount(&cache, &env, "t.js");
    let mut observer = loader.subscribe();
    drop(loader);

    env.fail("t.js", "500");

    let state = *observer
        .wait_for(LoadState::is_terminal)
        .await
        .expect("completion task publishes its outcome");
    assert_eq!(state, LoadState::ERRORED);
    assert!(!cache.contains("t.js"));
    assert!(!env.is_attached("t.js"));
}

/// Dropping the loader leaves a successful script attached and claimed.
#[tokio::test]
async fn teardown_keeps_pending_resource() {
    let (cache, env) = setup();
    let loader = mount(&cache, &env, "u.js");
    drop(loader);

    assert!(env.is_attached("u.js"));
    assert!(cache.contains("u.js"));

    assert!(env.succeed("u.js"));
    tokio::task::yield_now().await;

    assert!(env.is_attached("u.js"));
    assert!(cache.contains("u.js"));
}

/// Switching keys discards the previous state and loads the new key.
#[tokio::test]
async fn key_change_restarts() {
    let (cache, env) = setup();
    let mut loader = mount(&cache, &env, "old.js");
    env.succeed("old.js");
    assert_eq!(loader.settled().await, LoadState::LOADED);

    loader.load("new.js");

    assert_eq!(loader.key().map(|key| key.as_str()), Some("new.js"));
    assert_eq!(loader.state(), LoadState::PENDING);
    assert_eq!(env.attach_count("new.js"), 1);

    env.succeed("new.js");
    assert_eq!(loader.settled().await, LoadState::LOADED);
}

/// Switching keys while the old load is pending still handles its failure.
#[tokio::test]
async fn key_change_keeps_old_failure_handling() {
    let (cache, env) = setup();
    let mut loader = mount(&cache, &env, "first.js");
    let mut old = loader.subscribe();

    loader.load("second.js");
    env.fail("first.js", "gone");

    let state = *old.wait_for(LoadState::is_terminal).await.expect("outcome");
    assert_eq!(state, LoadState::ERRORED);
    assert!(!cache.contains("first.js"));
    assert!(cache.contains("second.js"));
    assert_eq!(loader.state(), LoadState::PENDING);
}

/// Deactivating during a pending load resets to PENDING, and the old
/// attempt's failure still releases the key.
#[tokio::test]
async fn deactivation_keeps_old_failure_handling() {
    let (cache, env) = setup();
    let mut loader = mount(&cache, &env, "late.js");
    let mut old = loader.subscribe();

    loader.set_activation(Activation::Inactive);
    assert_eq!(loader.state(), LoadState::PENDING);
    assert_eq!(loader.settled().await, LoadState::PENDING);
    assert!(cache.contains("late.js"));

    assert!(env.fail("late.js", "offline"));
    let state = *old.wait_for(LoadState::is_terminal).await.expect("outcome");

    assert_eq!(state, LoadState::ERRORED);
    assert!(!cache.contains("late.js"));
    assert!(!env.is_attached("late.js"));
    assert_eq!(env.attach_count("late.js"), 1);
    assert_eq!(loader.state(), LoadState::PENDING);
}

/// `reset` lets a fresh consumer load a key again.
#[tokio::test]
async fn reset_isolates_tests() {
    let (cache, env) = setup();
    let _loader = mount(&cache, &env, "r.js");

    cache.reset();
    let _again = mount(&cache, &env, "r.js");

    assert_eq!(env.attach_count("r.js"), 2);
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROPERTY TESTS
// ═══════════════════════════════════════════════════════════════════════════════

mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// However many consumers claim a key in one turn, exactly one attaches
        /// and the rest settle as already present.
        #[test]
        fn prop_single_attachment_per_key(consumers in 1..16usize, succeed in any::<bool>()) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("tokio runtime");
            rt.block_on(async {
                let (cache, env) = setup();
                let mut loaders: Vec<_> = (0..consumers)
                    .map(|_| mount(&cache, &env, "shared.js"))
                    .collect();

                prop_assert_eq!(env.attach_count("shared.js"), 1);
                for loader in &loaders[1..] {
                    prop_assert_eq!(loader.state(), LoadState::ALREADY_PRESENT);
                }

                if succeed {
                    env.succeed("shared.js");
                } else {
                    env.fail("shared.js", "error");
                }

                let expected = if succeed { LoadState::LOADED } else { LoadState::ERRORED };
                prop_assert_eq!(loaders[0].settled().await, expected);
                prop_assert_eq!(cache.contains("shared.js"), succeed);
                Ok(())
            })?;
        }

        /// Every state a loader publishes after its first terminal one equals it.
        #[test]
        fn prop_terminal_states_never_change(outcomes in prop::collection::vec(any::<bool>(), 1..6)) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("tokio runtime");
            rt.block_on(async {
                let (cache, env) = setup();
                let mut loader = mount(&cache, &env, "stable.js");

                for &ok in &outcomes {
                    if ok {
                        env.succeed("stable.js");
                    } else {
                        env.fail("stable.js", "error");
                    }
                }

                let first = loader.settled().await;
                let expected = if outcomes[0] { LoadState::LOADED } else { LoadState::ERRORED };
                prop_assert_eq!(first, expected);

                tokio::task::yield_now().await;
                prop_assert_eq!(loader.state(), first);
                Ok(())
            })?;
        }
    }
}
