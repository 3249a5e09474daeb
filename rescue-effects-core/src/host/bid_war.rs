//! Bid War Resolution
//!
//! Some effects compete for an exclusive resource: only one party leader can
//! be active at a time. Viewers bid on the option they want, and the option
//! with the highest running total is the one applied to the game.
//!
//! # Rules
//! - A request's bid is credited to the candidate key(s) it offers.
//! - An option becomes the winner only by leading strictly; ties keep the
//!   option that is currently applied.
//! - The winner's action runs at most once per change of leader, and at most
//!   one action runs at a time per group.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;

use super::EffectRequest;

/// Action run when a candidate takes the lead.
pub type BidAction<'a> = Box<dyn FnOnce() -> Result<()> + 'a>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BidOutcome {
    /// The request's option took the lead and its action ran.
    Won { key: String },
    /// The bid was recorded; another option still leads.
    Trailing { key: String, leader: Option<String> },
    /// The request offered nothing to bid on.
    NoCandidate,
}

/// Exclusive-choice resolver supplied by the host.
pub trait BidWar: Send + Sync {
    fn resolve<'a>(
        &self,
        group: &str,
        request: &EffectRequest,
        candidates: Vec<(&'a str, BidAction<'a>)>,
    ) -> Result<BidOutcome>;
}

#[derive(Debug, Default)]
struct Tally {
    totals: HashMap<String, u64>,
    applied: Option<String>,
}

impl Tally {
    /// Highest total, keeping the applied option on ties.
    fn leader(&self) -> Option<&str> {
        let best = self.totals.values().copied().max()?;
        if let Some(applied) = &self.applied {
            if self.totals.get(applied) == Some(&best) {
                return Some(applied.as_str());
            }
        }
        let mut leaders: Vec<&str> = self
            .totals
            .iter()
            .filter(|(_, total)| **total == best)
            .map(|(key, _)| key.as_str())
            .collect();
        if leaders.len() == 1 {
            leaders.pop()
        } else {
            // No strict leader and nothing applied yet.
            None
        }
    }
}

/// In-process bid war keeping running totals per group.
#[derive(Debug, Default)]
pub struct LocalBidWar {
    groups: Mutex<HashMap<String, Tally>>,
}

impl LocalBidWar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently applied option of a group.
    pub fn applied(&self, group: &str) -> Option<String> {
        let groups = self.groups.lock().ok()?;
        groups.get(group).and_then(|t| t.applied.clone())
    }

    /// Running total of one option.
    pub fn total(&self, group: &str, key: &str) -> u64 {
        self.groups
            .lock()
            .ok()
            .and_then(|g| g.get(group).and_then(|t| t.totals.get(key).copied()))
            .unwrap_or(0)
    }
}

impl BidWar for LocalBidWar {
    fn resolve<'a>(
        &self,
        group: &str,
        request: &EffectRequest,
        candidates: Vec<(&'a str, BidAction<'a>)>,
    ) -> Result<BidOutcome> {
        if candidates.is_empty() {
            return Ok(BidOutcome::NoCandidate);
        }

        // Held across the action so two winners cannot interleave writes.
        let mut groups = self
            .groups
            .lock()
            .map_err(|e| anyhow::anyhow!("bid war lock poisoned: {}", e))?;
        let tally = groups.entry(group.to_string()).or_default();

        for (key, _) in &candidates {
            *tally.totals.entry((*key).to_string()).or_insert(0) += request.bid;
        }
        let leader = tally.leader().map(str::to_string);
        log::debug!(
            "Bid war '{}': {} bid {} on {:?}, leader {:?}",
            group,
            request.viewer,
            request.bid,
            candidates.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            leader
        );

        let requested = candidates[0].0.to_string();
        let Some(leader) = leader else {
            return Ok(BidOutcome::Trailing {
                key: requested,
                leader: tally.applied.clone(),
            });
        };
        if tally.applied.as_deref() == Some(leader.as_str()) {
            return Ok(BidOutcome::Trailing {
                key: requested,
                leader: Some(leader),
            });
        }

        match candidates.into_iter().find(|(key, _)| *key == leader) {
            Some((key, action)) => {
                action()?;
                tally.applied = Some(key.to_string());
                log::info!("Bid war '{}' won by {}", group, key);
                Ok(BidOutcome::Won {
                    key: key.to_string(),
                })
            }
            None => Ok(BidOutcome::Trailing {
                key: requested,
                leader: tally.applied.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn request(bid: u64) -> EffectRequest {
        EffectRequest::new(1, "viewer", "leader_first").with_bid(bid)
    }

    fn action<'a>(f: impl FnOnce() -> Result<()> + 'a) -> BidAction<'a> {
        Box::new(f)
    }

    #[test]
    fn test_first_bid_wins() {
        let war = LocalBidWar::new();
        let ran = Cell::new(0);
        let outcome = war
            .resolve(
                "lead",
                &request(1),
                vec![(
                    "first",
                    action(|| {
                        ran.set(ran.get() + 1);
                        Ok(())
                    }),
                )],
            )
            .unwrap();
        assert_eq!(outcome, BidOutcome::Won { key: "first".into() });
        assert_eq!(ran.get(), 1);
        assert_eq!(war.applied("lead").as_deref(), Some("first"));
    }

    #[test]
    fn test_tie_keeps_applied_option() {
        let war = LocalBidWar::new();
        war.resolve("lead", &request(2), vec![("first", action(|| Ok(())))])
            .unwrap();
        let outcome = war
            .resolve("lead", &request(2), vec![("second", action(|| panic!("must not run")))])
            .unwrap();
        assert_eq!(
            outcome,
            BidOutcome::Trailing {
                key: "second".into(),
                leader: Some("first".into())
            }
        );
        assert_eq!(war.total("lead", "second"), 2);
    }

    #[test]
    fn test_overtaking_runs_action_once() {
        let war = LocalBidWar::new();
        let ran = Cell::new(0);
        war.resolve("lead", &request(1), vec![("first", action(|| Ok(())))])
            .unwrap();
        war.resolve(
            "lead",
            &request(5),
            vec![(
                "second",
                action(|| {
                    ran.set(ran.get() + 1);
                    Ok(())
                }),
            )],
        )
        .unwrap();
        // Extra bids on the applied leader do not re-run anything.
        let outcome = war
            .resolve("lead", &request(1), vec![("second", action(|| panic!("must not run")))])
            .unwrap();
        assert!(matches!(outcome, BidOutcome::Trailing { .. }));
        assert_eq!(ran.get(), 1);
        assert_eq!(war.applied("lead").as_deref(), Some("second"));
    }

    #[test]
    fn test_failed_action_is_not_applied() {
        let war = LocalBidWar::new();
        let result = war.resolve(
            "lead",
            &request(1),
            vec![("first", action(|| Err(anyhow::anyhow!("write failed"))))],
        );
        assert!(result.is_err());
        assert_eq!(war.applied("lead"), None);
    }

    #[test]
    fn test_no_candidates() {
        let war = LocalBidWar::new();
        assert_eq!(
            war.resolve("lead", &request(1), Vec::new()).unwrap(),
            BidOutcome::NoCandidate
        );
    }
}
