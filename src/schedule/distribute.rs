use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use super::types::{Assignee, Assignment, Diagnostic, Distribution, Pass, SlotInstance, UnassignedReason};
use crate::model::Participant;

/// Knobs for one distribution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributionRules {
    /// Skip slots whose key is in the participant's exclusion set.
    pub check_exclusions: bool,
    /// Hard cap on assignees per slot. `None` leaves slot load unbounded.
    pub per_slot_cap: Option<usize>,
}

impl DistributionRules {
    /// Exclusions honoured, no cap.
    pub fn weekdays() -> Self {
        Self {
            check_exclusions: true,
            per_slot_cap: None,
        }
    }

    /// Plain round-robin: no exclusion check, no cap.
    pub fn round_robin() -> Self {
        Self {
            check_exclusions: false,
            per_slot_cap: None,
        }
    }
}

/// Spreads `participants` over `slots`, at most one slot each.
///
/// The roster is shuffled uniformly, then the participant at position `k` is
/// offered slot `k mod N`, then `k+1 mod N`, ... until a permitted slot is
/// found. A participant with no permitted slot is left out and reported.
pub fn distribute<R: Rng + ?Sized>(
    slots: &[SlotInstance],
    participants: &[&Participant],
    rules: DistributionRules,
    pass: Pass,
    rng: &mut R,
) -> Distribution {
    let mut result = Distribution::default();

    if slots.is_empty() {
        let diagnostic = Diagnostic::NoSlots { pass };
        warn!("{}", diagnostic);
        result.diagnostics.push(diagnostic);
        return result;
    }

    let n = slots.len();
    let keys: Vec<String> = slots.iter().map(SlotInstance::key).collect();
    let mut load = vec![0usize; n];

    let mut deck: Vec<&Participant> = participants.to_vec();
    deck.shuffle(rng);

    for (position, participant) in deck.into_iter().enumerate() {
        let home = position % n;
        let allowed = |i: usize| !rules.check_exclusions || !participant.excludes(&keys[i]);
        let has_room = |i: usize| rules.per_slot_cap.map_or(true, |cap| load[i] < cap);

        let chosen = (0..n)
            .map(|offset| (home + offset) % n)
            .find(|&i| allowed(i) && has_room(i));

        match chosen {
            Some(i) => {
                if i != home {
                    debug!(
                        participant = %participant.id,
                        home = %slots[home],
                        assigned = %slots[i],
                        "moved off home slot"
                    );
                }
                load[i] += 1;
                result.assignments.push(Assignment {
                    slot: slots[i].clone(),
                    assignee: Assignee::Participant(participant.id.clone()),
                });
            }
            None => {
                let reason = if (0..n).any(allowed) {
                    UnassignedReason::Capacity
                } else {
                    UnassignedReason::Exclusions
                };
                let diagnostic = Diagnostic::Unassigned {
                    participant_id: participant.id.clone(),
                    name: participant.name.clone(),
                    pass,
                    reason,
                };
                warn!("{}", diagnostic);
                result.unassigned.push(participant.id.clone());
                result.diagnostics.push(diagnostic);
            }
        }
    }

    result
}
