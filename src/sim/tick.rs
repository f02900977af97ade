//! Fixed timestep phase machine
//!
//! Advances a draw session deterministically. Every delay in the animation
//! schedule is a tick budget here; nothing depends on wall-clock timers.
//! Phase transitions happen only inside [`tick`], so external callers see a
//! strictly sequenced machine no matter how frames are scheduled.

use rand::Rng;

use super::layout::slot_origin;
use super::rig::apply_rig;
use super::state::{GameEvent, GamePhase, GameState};

/// Input commands for a single tick (deterministic, one-shot)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Start or replay the draw
    pub start: bool,
    /// Envelope id clicked this tick
    pub select: Option<u32>,
    /// Confirm the current selection
    pub confirm: bool,
    /// Close the celebration overlay
    pub close_overlay: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.time_ticks += 1;

    // Selection runs before the phase step so a mid-shuffle click raises the
    // abort flag ahead of this tick's step boundary.
    if let Some(id) = input.select {
        handle_select(state, id);
    }

    match state.phase {
        GamePhase::Idle => {
            if input.start {
                start_draw(state);
            }
        }

        GamePhase::Showing => {
            state.phase_ticks = state.phase_ticks.saturating_sub(1);
            if state.phase_ticks == 0 {
                flip_all(state);
            }
        }

        GamePhase::Flipping => {
            state.phase_ticks = state.phase_ticks.saturating_sub(1);
            if state.phase_ticks == 0 {
                begin_shuffle(state);
            }
        }

        GamePhase::Shuffling => {
            if state.abort_shuffle {
                // Selection wins over the remaining dance steps
                finish_shuffle(state);
            } else if state.phase_ticks > 0 {
                state.phase_ticks -= 1;
            } else if state.shuffle_steps_left > 0 {
                swap_step(state);
                state.shuffle_steps_left -= 1;
                state.phase_ticks = state.timings.shuffle_step_ticks;
            } else {
                finish_shuffle(state);
            }
        }

        GamePhase::AwaitingSelection => {
            if input.confirm {
                confirm_selection(state);
            }
        }

        GamePhase::Revealing => {
            state.phase_ticks = state.phase_ticks.saturating_sub(1);
            if state.phase_ticks == 0 {
                state.phase = GamePhase::Celebrating;
                state.push_event(GameEvent::OverlayShown);
            }
        }

        GamePhase::Celebrating => {
            if input.close_overlay {
                state.phase = GamePhase::Resetting;
                state.phase_ticks = state.timings.reset_ticks;
            }
        }

        GamePhase::Resetting => {
            state.phase_ticks = state.phase_ticks.saturating_sub(1);
            if state.phase_ticks == 0 {
                state.build_board();
                state.phase = GamePhase::Idle;
                state.push_event(GameEvent::BoardReset);
            }
        }
    }
}

/// Mark an envelope selected. Ignored while the game is inactive; a
/// mid-shuffle click additionally raises the abort flag.
fn handle_select(state: &mut GameState, id: u32) {
    if !state.is_active() || state.envelope(id).is_none() {
        return;
    }

    if state.is_shuffling() {
        state.abort_shuffle = true;
    }

    state.selected = Some(id);
    state.push_event(GameEvent::EnvelopeSelected);
}

/// Idle -> Showing: rebuild the board to its clean sorted state and start
/// the pre-flip display window.
fn start_draw(state: &mut GameState) {
    state.build_board();
    state.abort_shuffle = false;
    state.shuffle_steps_left = 0;
    state.phase = GamePhase::Showing;
    state.phase_ticks = state.timings.show_ticks;
}

/// Showing -> Flipping: all envelopes turn to their backs at once.
fn flip_all(state: &mut GameState) {
    for env in &mut state.envelopes {
        env.flipped = true;
        env.revealed = false;
    }
    state.phase = GamePhase::Flipping;
    state.phase_ticks = state.timings.flip_ticks;
    state.push_event(GameEvent::FlipStarted);
}

/// Flipping -> Shuffling: pin every envelope to its current slot
/// coordinates so the swap steps can move them independently.
fn begin_shuffle(state: &mut GameState) {
    for (slot, env) in state.envelopes.iter_mut().enumerate() {
        env.pos = slot_origin(slot);
    }
    state.phase = GamePhase::Shuffling;
    state.shuffle_steps_left = state.timings.shuffle_steps;
    state.phase_ticks = 0;
}

/// One swap step: draw two distinct indices uniformly (redraw on
/// collision) and exchange those envelopes' on-screen positions.
fn swap_step(state: &mut GameState) {
    let len = state.envelopes.len();
    if len < 2 {
        return;
    }

    let mut rng = state.rng_state.stream_rng();
    let (a, b) = loop {
        let a = rng.random_range(0..len);
        let b = rng.random_range(0..len);
        if a != b {
            break (a, b);
        }
    };

    let tmp = state.envelopes[a].pos;
    state.envelopes[a].pos = state.envelopes[b].pos;
    state.envelopes[b].pos = tmp;
    state.push_event(GameEvent::ShuffleStep);
}

/// Shuffling -> AwaitingSelection, whether the dance ran to completion or
/// was aborted by a selection.
fn finish_shuffle(state: &mut GameState) {
    state.abort_shuffle = false;
    state.shuffle_steps_left = 0;
    state.phase = GamePhase::AwaitingSelection;
}

/// AwaitingSelection -> Revealing: apply the rig, then show the winner.
fn confirm_selection(state: &mut GameState) {
    let Some(id) = state.selected else {
        return;
    };

    apply_rig(state, id);

    let Some(env) = state.envelope_mut(id) else {
        return;
    };
    env.flipped = false;
    env.revealed = true;
    let prize = env.prize;

    state.phase = GamePhase::Revealing;
    state.phase_ticks = state.timings.overlay_ticks;
    state.push_event(GameEvent::Revealed { prize });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Prize, PRIZE_TIERS};
    use glam::Vec2;

    fn run_ticks(state: &mut GameState, n: u32) {
        let input = TickInput::default();
        for _ in 0..n {
            tick(state, &input);
        }
    }

    fn run_until(state: &mut GameState, phase: GamePhase) {
        let input = TickInput::default();
        for _ in 0..20_000 {
            if state.phase == phase {
                return;
            }
            tick(state, &input);
        }
        panic!("phase {:?} not reached (stuck in {:?})", phase, state.phase);
    }

    fn start(state: &mut GameState) {
        let input = TickInput {
            start: true,
            ..Default::default()
        };
        tick(state, &input);
    }

    fn select(state: &mut GameState, id: u32) {
        let input = TickInput {
            select: Some(id),
            ..Default::default()
        };
        tick(state, &input);
    }

    fn confirm(state: &mut GameState) {
        let input = TickInput {
            confirm: true,
            ..Default::default()
        };
        tick(state, &input);
    }

    fn positions(state: &GameState) -> Vec<Vec2> {
        state.envelopes.iter().map(|e| e.pos).collect()
    }

    fn shuffle_step_count(state: &GameState) -> usize {
        state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::ShuffleStep))
            .count()
    }

    #[test]
    fn test_start_to_showing() {
        let mut state = GameState::new(1);

        // No input: stays idle
        run_ticks(&mut state, 10);
        assert_eq!(state.phase, GamePhase::Idle);

        start(&mut state);
        assert_eq!(state.phase, GamePhase::Showing);
        assert!(state.envelopes.iter().all(|e| !e.flipped));
    }

    #[test]
    fn test_showing_flips_after_delay() {
        let mut state = GameState::new(1);
        start(&mut state);

        let show = state.timings.show_ticks;
        run_ticks(&mut state, show - 1);
        assert_eq!(state.phase, GamePhase::Showing);

        run_ticks(&mut state, 1);
        assert_eq!(state.phase, GamePhase::Flipping);
        assert!(state.envelopes.iter().all(|e| e.flipped));
    }

    #[test]
    fn test_start_ignored_while_shuffling() {
        let mut state = GameState::new(2);
        start(&mut state);
        run_until(&mut state, GamePhase::Shuffling);

        let steps_left = state.shuffle_steps_left;
        let input = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &input);

        assert_eq!(state.phase, GamePhase::Shuffling);
        assert!(state.shuffle_steps_left <= steps_left);
    }

    #[test]
    fn test_full_shuffle_runs_all_steps() {
        let mut state = GameState::new(3);
        start(&mut state);
        run_until(&mut state, GamePhase::AwaitingSelection);

        assert_eq!(
            shuffle_step_count(&state),
            state.timings.shuffle_steps as usize
        );
        assert!(!state.abort_shuffle);

        // Swaps permute the slot origins, never invent new coordinates
        let mut got = positions(&state);
        let mut home: Vec<Vec2> = (0..state.envelopes.len()).map(slot_origin).collect();
        let key = |v: &Vec2| (v.x as i64, v.y as i64);
        got.sort_by_key(key);
        home.sort_by_key(key);
        assert_eq!(got, home);
    }

    #[test]
    fn test_selection_aborts_shuffle() {
        let mut state = GameState::new(4);
        start(&mut state);
        run_until(&mut state, GamePhase::Shuffling);

        // Let a few swaps happen first
        let ticks = 2 * (state.timings.shuffle_step_ticks + 1);
        run_ticks(&mut state, ticks);
        let swaps_before = shuffle_step_count(&state);
        assert!(swaps_before >= 2);
        let frozen = positions(&state);

        select(&mut state, 3);
        assert_eq!(state.phase, GamePhase::AwaitingSelection);
        assert_eq!(state.selected, Some(3));
        assert_eq!(positions(&state), frozen);

        // No swap ever happens after the abort
        run_ticks(&mut state, 1_000);
        assert_eq!(shuffle_step_count(&state), swaps_before);
        assert_eq!(positions(&state), frozen);
        assert_eq!(state.phase, GamePhase::AwaitingSelection);
    }

    #[test]
    fn test_select_ignored_when_inactive() {
        let mut state = GameState::new(5);
        select(&mut state, 2);
        assert_eq!(state.selected, None);
        assert_eq!(state.phase, GamePhase::Idle);
    }

    #[test]
    fn test_select_unknown_id_ignored() {
        let mut state = GameState::new(5);
        start(&mut state);
        run_until(&mut state, GamePhase::AwaitingSelection);

        select(&mut state, 42);
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_reselect_replaces_prior() {
        let mut state = GameState::new(6);
        start(&mut state);
        run_until(&mut state, GamePhase::AwaitingSelection);

        select(&mut state, 2);
        assert_eq!(state.selected, Some(2));
        select(&mut state, 4);
        assert_eq!(state.selected, Some(4));
    }

    #[test]
    fn test_confirm_without_selection_is_noop() {
        let mut state = GameState::new(7);
        start(&mut state);
        run_until(&mut state, GamePhase::AwaitingSelection);

        confirm(&mut state);
        assert_eq!(state.phase, GamePhase::AwaitingSelection);
    }

    #[test]
    fn test_confirm_rigs_the_reveal() {
        let mut state = GameState::new(8);
        start(&mut state);
        run_until(&mut state, GamePhase::AwaitingSelection);

        // Envelope 1 carries 100k; the jackpot sits on envelope 5
        select(&mut state, 1);
        confirm(&mut state);

        assert_eq!(state.phase, GamePhase::Revealing);
        let picked = state.envelope(1).unwrap();
        assert_eq!(picked.prize, Prize::JACKPOT);
        assert!(picked.revealed);
        assert!(!picked.flipped);
        assert_eq!(state.envelope(5).unwrap().prize, Prize(100));
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::Revealed { prize } if *prize == Prize::JACKPOT)));

        // Overlay appears after the reveal delay
        let ticks = state.timings.overlay_ticks;
        run_ticks(&mut state, ticks);
        assert_eq!(state.phase, GamePhase::Celebrating);
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::OverlayShown)));
    }

    #[test]
    fn test_select_ignored_while_celebrating() {
        let mut state = GameState::new(9);
        start(&mut state);
        run_until(&mut state, GamePhase::AwaitingSelection);
        select(&mut state, 0);
        confirm(&mut state);
        run_until(&mut state, GamePhase::Celebrating);

        select(&mut state, 4);
        assert_eq!(state.selected, Some(0));
    }

    #[test]
    fn test_overlay_close_resets_board() {
        let mut state = GameState::new(10);
        start(&mut state);
        run_until(&mut state, GamePhase::AwaitingSelection);
        select(&mut state, 2);
        confirm(&mut state);
        run_until(&mut state, GamePhase::Celebrating);

        let input = TickInput {
            close_overlay: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.phase, GamePhase::Resetting);

        let ticks = state.timings.reset_ticks;
        run_ticks(&mut state, ticks);
        assert_eq!(state.phase, GamePhase::Idle);
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::BoardReset)));

        // Back to the original sorted, unflipped, unselected board
        assert_eq!(state.selected, None);
        for (slot, env) in state.envelopes.iter().enumerate() {
            assert_eq!(env.prize, PRIZE_TIERS[slot]);
            assert!(!env.flipped);
            assert!(!env.revealed);
            assert_eq!(env.pos, slot_origin(slot));
        }
    }

    #[test]
    fn test_determinism() {
        // Two states with the same seed and input script end up identical
        let mut a = GameState::new(99_999);
        let mut b = GameState::new(99_999);

        let script = |state: &mut GameState| {
            start(state);
            run_ticks(state, 400);
            select(state, 2);
            run_ticks(state, 50);
            confirm(state);
            run_ticks(state, 300);
        };
        script(&mut a);
        script(&mut b);

        assert_eq!(a.phase, b.phase);
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.envelopes, b.envelopes);
        assert_eq!(a.rng_state, b.rng_state);
    }
}
