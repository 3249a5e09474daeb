// Immunity timers, level-up automation and shutdown
mod utils;

use std::sync::Barrier;
use std::thread;
use std::time::{Duration, Instant};

use rescue_effects_core::config::LevelUpTiming;
use rescue_effects_core::memory::addresses::{CAN_GO, CURRENT_HP, INPUT, MENU_INPUT_2};
use rescue_effects_core::{EffectStatus, MemoryConnector, PackConfig};
use utils::{fast_level_up, request, Faults, Harness};

#[test]
fn test_immunity_pins_hp_until_expiry() {
    let h = Harness::seeded(1, 0, 25, 40);
    let start = Instant::now();

    let response = h.pack.start_effect_at(&request(1, "immunity"), start).unwrap();
    assert_eq!(response.status, EffectStatus::Success);
    assert_eq!(response.time_remaining, Some(Duration::from_secs(45)));
    assert_eq!(h.pack.active_timed_effects(), 1);

    // Damage taken during the window is undone.
    h.wram.write8(CURRENT_HP.address, 3).unwrap();
    assert_eq!(h.current_hp(), 25);

    assert!(h.pack.tick(start + Duration::from_secs(44)).is_empty());
    assert!(h.wram.is_frozen(CURRENT_HP.address));

    let finished = h.pack.tick(start + Duration::from_secs(45));
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].id, 1);
    assert_eq!(finished[0].status, EffectStatus::Finished);
    assert!(!h.wram.is_frozen(CURRENT_HP.address));
    assert_eq!(h.pack.active_timed_effects(), 0);

    h.wram.write8(CURRENT_HP.address, 3).unwrap();
    assert_eq!(h.current_hp(), 3);

    assert_eq!(
        h.messenger.messages(),
        vec![
            "Ash gave you immunity!".to_string(),
            "Ash's immunity wore off.".to_string(),
        ]
    );
}

#[test]
fn test_immunity_stops_exactly_once() {
    let h = Harness::seeded(1, 0, 25, 40);
    let start = Instant::now();
    h.pack.start_effect_at(&request(1, "immunity"), start).unwrap();

    let later = start + Duration::from_secs(60);
    assert_eq!(h.pack.tick(later).len(), 1);
    assert!(h.pack.tick(later).is_empty());
    assert!(h.pack.shutdown().is_empty());
}

#[test]
fn test_second_immunity_while_active_fails() {
    let h = Harness::seeded(1, 0, 25, 40);
    let start = Instant::now();
    h.pack.start_effect_at(&request(1, "immunity"), start).unwrap();

    let response = h
        .pack
        .start_effect_at(&request(2, "immunity"), start + Duration::from_secs(10))
        .unwrap();

    assert_eq!(response.status, EffectStatus::FailTemporary);
    assert_eq!(response.message.as_deref(), Some("Immunity is already active (35s left)."));
    assert_eq!(h.pack.active_timed_effects(), 1);
}

#[test]
fn test_immunity_duration_follows_config() {
    let config = PackConfig {
        immunity_duration_secs: 5,
        ..PackConfig::default()
    };
    let h = Harness::with_config(config);
    let start = Instant::now();

    let response = h.pack.start_effect_at(&request(1, "immunity"), start).unwrap();

    assert_eq!(response.time_remaining, Some(Duration::from_secs(5)));
    assert_eq!(h.pack.tick(start + Duration::from_secs(5)).len(), 1);
}

#[test]
fn test_shutdown_releases_pins() {
    let h = Harness::seeded(1, 0, 25, 40);
    h.pack.start_effect(&request(4, "immunity")).unwrap();
    assert_eq!(h.wram.frozen_count(), 1);

    let stopped = h.pack.shutdown();

    assert_eq!(stopped.len(), 1);
    assert_eq!(stopped[0].id, 4);
    assert_eq!(h.wram.frozen_count(), 0);
    assert!(h.pack.cancellation_token().is_cancelled());
}

#[test]
fn test_level_up_runs_and_releases_input() {
    let config = PackConfig {
        level_up: fast_level_up(),
        ..PackConfig::default()
    };
    let h = Harness::with_config(config);
    h.wram.load_bytes(CAN_GO.address, &[1]).unwrap();

    let response = h.pack.start_effect(&request(1, "levelup")).unwrap();

    assert_eq!(response.status, EffectStatus::Success);
    assert_eq!(response.message.as_deref(), Some("Ash leveled you up!"));
    assert_eq!(h.wram.frozen_count(), 0);
    assert!(!h.wram.is_frozen(INPUT.address));
    // The last scripted press is left in place once released.
    assert_eq!(h.wram.read16(MENU_INPUT_2.address).unwrap(), 1);
}

#[test]
fn test_level_up_times_out_when_turn_never_comes() {
    let config = PackConfig {
        level_up: fast_level_up(),
        ..PackConfig::default()
    };
    let h = Harness::with_config(config);

    let response = h.pack.start_effect(&request(1, "levelup")).unwrap();

    assert_eq!(response.status, EffectStatus::FailTemporary);
    assert!(response.message.unwrap().contains("player turn"));
    assert_eq!(h.wram.frozen_count(), 0);
    assert!(h.messenger.messages().is_empty());
}

#[test]
fn test_concurrent_immunity_starts_once() {
    let h = Harness::with_faults(Faults {
        slow_read: Some((CURRENT_HP.address, Duration::from_millis(20))),
        ..Faults::default()
    });
    h.seed(1, 0, 25, 40);
    let start = Instant::now();
    let barrier = Barrier::new(2);

    let statuses: Vec<EffectStatus> = thread::scope(|scope| {
        let handles: Vec<_> = (1..=2u64)
            .map(|id| {
                let (pack, barrier) = (&h.pack, &barrier);
                scope.spawn(move || {
                    barrier.wait();
                    pack.start_effect_at(&request(id, "immunity"), start).unwrap().status
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert_eq!(statuses.iter().filter(|s| **s == EffectStatus::Success).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == EffectStatus::FailTemporary).count(), 1);
    assert_eq!(h.pack.active_timed_effects(), 1);
    assert_eq!(h.pack.tick(start + Duration::from_secs(45)).len(), 1);
    assert_eq!(
        h.messenger.messages(),
        vec!["Ash gave you immunity!".to_string(), "Ash's immunity wore off.".to_string()]
    );
}

#[test]
fn test_shutdown_interrupts_level_up() {
    let config = PackConfig {
        level_up: LevelUpTiming {
            poll_interval_ms: 1,
            step_timeout_ms: 50,
            turn_timeout_ms: 10_000,
        },
        ..PackConfig::default()
    };
    let h = Harness::with_config(config);
    let started = Instant::now();

    let response = thread::scope(|scope| {
        let pack = &h.pack;
        let worker = scope.spawn(move || pack.start_effect(&request(1, "levelup")).unwrap());

        // Input stays pinned while the driver waits for a turn that never comes.
        while h.wram.frozen_count() < 3 {
            thread::sleep(Duration::from_millis(1));
        }
        h.pack.shutdown();
        worker.join().unwrap()
    });

    assert_eq!(response.status, EffectStatus::FailTemporary);
    assert_eq!(
        response.message.as_deref(),
        Some("Effect cancelled: pack is shutting down.")
    );
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(h.wram.read8(CAN_GO.address).unwrap(), 0);
    assert_eq!(h.wram.frozen_count(), 0);
}
