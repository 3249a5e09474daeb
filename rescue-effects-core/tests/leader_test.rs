// Leader swaps resolved through the bid war
mod utils;

use std::sync::Arc;
use std::thread;

use rescue_effects_core::catalog::LEADER_GROUP;
use rescue_effects_core::effects::Leader;
use rescue_effects_core::host::LocalBidWar;
use rescue_effects_core::{
    EffectPack, EffectRequest, EffectStatus, MemoryConnector, PackConfig, RecordingMessenger,
    SimulatedWram,
};

fn leader_bytes(wram: &SimulatedWram) -> Vec<(u32, u8)> {
    Leader::First
        .writes()
        .map(|(address, _)| (address, wram.read8(address).unwrap()))
        .collect()
}

fn matching_profile(wram: &SimulatedWram) -> Option<Leader> {
    let bytes = leader_bytes(wram);
    Leader::ALL.into_iter().find(|leader| {
        leader
            .writes()
            .zip(&bytes)
            .all(|((_, expected), (_, actual))| expected == *actual)
    })
}

#[test]
fn test_first_bid_applies_leader() {
    let h = utils::Harness::new();

    let response = h.pack.start_effect(&utils::request(1, "leader_second")).unwrap();

    assert_eq!(response.status, EffectStatus::Success);
    assert_eq!(matching_profile(&h.wram), Some(Leader::Second));
    assert!(h.messenger.messages().is_empty());
}

#[test]
fn test_tie_keeps_applied_leader() {
    let h = utils::Harness::new();
    h.pack.start_effect(&utils::request(1, "leader_second")).unwrap();
    let writes = h.wram.write_count();

    let response = h.pack.start_effect(&utils::request(2, "leader_first")).unwrap();

    assert_eq!(response.status, EffectStatus::Success);
    assert_eq!(h.wram.write_count(), writes);
    assert_eq!(matching_profile(&h.wram), Some(Leader::Second));
}

#[test]
fn test_higher_bid_takes_over() {
    let h = utils::Harness::new();
    h.pack.start_effect(&utils::request(1, "leader_second")).unwrap();

    let request = EffectRequest::new(2, "Misty", "leader_first").with_bid(3);
    h.pack.start_effect(&request).unwrap();

    assert_eq!(matching_profile(&h.wram), Some(Leader::First));
}

#[test]
fn test_concurrent_swaps_never_mix_profiles() {
    let wram = Arc::new(SimulatedWram::new());
    let bid_war = Arc::new(LocalBidWar::new());
    let pack = EffectPack::new(
        wram.clone(),
        Arc::new(RecordingMessenger::new()),
        PackConfig::default(),
    )
    .with_bid_war(bid_war.clone());

    thread::scope(|scope| {
        for i in 0..16u64 {
            let pack = &pack;
            scope.spawn(move || {
                let code = if i % 2 == 0 { "leader_first" } else { "leader_second" };
                let request = EffectRequest::new(i, format!("viewer{}", i), code).with_bid(i + 1);
                let response = pack.start_effect(&request).unwrap();
                assert_eq!(response.status, EffectStatus::Success);
            });
        }
    });

    let applied = bid_war.applied(LEADER_GROUP).unwrap();
    let profile = matching_profile(&wram).unwrap();
    assert_eq!(profile.key(), applied);
}

#[test]
fn test_two_equal_bids_have_one_winner() {
    let wram = Arc::new(SimulatedWram::new());
    let bid_war = Arc::new(LocalBidWar::new());
    let pack = EffectPack::new(
        wram.clone(),
        Arc::new(RecordingMessenger::new()),
        PackConfig::default(),
    )
    .with_bid_war(bid_war.clone());

    thread::scope(|scope| {
        for (i, code) in ["leader_first", "leader_second"].into_iter().enumerate() {
            let pack = &pack;
            scope.spawn(move || {
                pack.start_effect(&EffectRequest::new(i as u64, "viewer", code)).unwrap();
            });
        }
    });

    assert_eq!(bid_war.total(LEADER_GROUP, "first"), 1);
    assert_eq!(bid_war.total(LEADER_GROUP, "second"), 1);
    let applied = bid_war.applied(LEADER_GROUP).unwrap();
    assert_eq!(matching_profile(&wram).map(|l| l.key().to_string()), Some(applied));
}
