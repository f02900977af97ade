//! Outcome rigging
//!
//! Whatever the player picks, the revealed envelope carries the jackpot:
//! on confirm the selected envelope exchanges prizes with the current
//! jackpot holder. The exchange preserves the prize multiset, so the
//! one-jackpot invariant survives every draw.

use super::state::{GameState, Prize};

/// Exchange prizes so that envelope `selected_id` holds [`Prize::JACKPOT`].
///
/// Requires the jackpot to be present exactly once on the board, which
/// board construction guarantees. No-op if the selected envelope already
/// holds it, or if the id is unknown.
pub fn apply_rig(state: &mut GameState, selected_id: u32) {
    let Some(sel_idx) = state.envelopes.iter().position(|e| e.id == selected_id) else {
        return;
    };
    if state.envelopes[sel_idx].prize == Prize::JACKPOT {
        return;
    }

    if let Some(holder_idx) = state
        .envelopes
        .iter()
        .position(|e| e.prize == Prize::JACKPOT)
    {
        let picked = state.envelopes[sel_idx].prize;
        state.envelopes[holder_idx].prize = picked;
        state.envelopes[sel_idx].prize = Prize::JACKPOT;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::PRIZE_TIERS;
    use proptest::prelude::*;

    fn jackpot_count(state: &GameState) -> usize {
        state
            .envelopes
            .iter()
            .filter(|e| e.prize == Prize::JACKPOT)
            .count()
    }

    #[test]
    fn test_rig_swaps_with_holder() {
        let mut state = GameState::new(1);
        // Envelope 1 starts on 100k, envelope 5 on the jackpot
        apply_rig(&mut state, 1);

        assert_eq!(state.envelopes[1].prize, Prize::JACKPOT);
        assert_eq!(state.envelopes[5].prize, Prize(100));
        assert_eq!(jackpot_count(&state), 1);

        // Bystanders keep their prizes
        assert_eq!(state.envelopes[0].prize, PRIZE_TIERS[0]);
        assert_eq!(state.envelopes[2].prize, PRIZE_TIERS[2]);
    }

    #[test]
    fn test_rig_noop_when_holder_selected() {
        let mut state = GameState::new(1);
        let before = state.envelopes.clone();
        apply_rig(&mut state, 5);
        assert_eq!(state.envelopes, before);
    }

    #[test]
    fn test_rig_unknown_id_is_ignored() {
        let mut state = GameState::new(1);
        let before = state.envelopes.clone();
        apply_rig(&mut state, 99);
        assert_eq!(state.envelopes, before);
    }

    proptest! {
        /// For any arrangement of the tiers over the board and any pick,
        /// rigging leaves the selected envelope on the jackpot and the
        /// overall prize multiset untouched.
        #[test]
        fn prop_rig_preserves_prize_multiset(
            perm in Just(PRIZE_TIERS.to_vec()).prop_shuffle(),
            selected in 0u32..PRIZE_TIERS.len() as u32,
        ) {
            let mut state = GameState::new(0);
            for (env, &prize) in state.envelopes.iter_mut().zip(perm.iter()) {
                env.prize = prize;
            }

            apply_rig(&mut state, selected);

            prop_assert_eq!(
                state.envelope(selected).unwrap().prize,
                Prize::JACKPOT
            );
            prop_assert_eq!(jackpot_count(&state), 1);

            let mut after: Vec<Prize> =
                state.envelopes.iter().map(|e| e.prize).collect();
            after.sort();
            let mut expected = PRIZE_TIERS.to_vec();
            expected.sort();
            prop_assert_eq!(after, expected);
        }
    }
}
