//! Game state and core simulation types
//!
//! Everything that must survive a phase transition lives here.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::layout::slot_origin;
use crate::ms_to_ticks;

/// A prize tier, stored as an amount in thousands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Prize(pub u32);

impl Prize {
    /// The value every draw is rigged to land on
    pub const JACKPOT: Prize = Prize(500);

    /// Display label, e.g. `500k`
    pub fn label(&self) -> String {
        format!("{}k", self.0)
    }
}

/// The fixed tier list, in board order.
///
/// Must contain [`Prize::JACKPOT`] exactly once and no duplicates: board
/// construction establishes the one-jackpot invariant from this list, and
/// the rigging step preserves it afterwards.
pub const PRIZE_TIERS: [Prize; 6] = [
    Prize(50),
    Prize(100),
    Prize(200),
    Prize(300),
    Prize(400),
    Prize(500),
];

/// Current phase of a draw session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GamePhase {
    /// Board face-up in tier order, waiting for start
    #[default]
    Idle,
    /// Values on display before the flip
    Showing,
    /// Envelopes flipping to their backs
    Flipping,
    /// Position swap animation running
    Shuffling,
    /// Waiting for the player to pick and confirm
    AwaitingSelection,
    /// Winner revealed, overlay pending
    Revealing,
    /// Celebration overlay visible
    Celebrating,
    /// Overlay closed, board rebuild pending
    Resetting,
}

/// One selectable envelope on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: u32,
    /// Prize currently bound to this envelope (rigging may exchange it)
    pub prize: Prize,
    /// Back face showing
    pub flipped: bool,
    /// Front face forced visible after the win
    pub revealed: bool,
    /// On-screen anchor, pinned to grid coordinates when shuffling starts
    pub pos: Vec2,
}

/// One-shot transition notifications for the platform layer (sound, logs,
/// history). Never gameplay-affecting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// All envelopes turned to their backs
    FlipStarted,
    /// One pair of envelopes exchanged positions
    ShuffleStep,
    /// An envelope was marked selected
    EnvelopeSelected,
    /// The selected envelope was revealed with this prize
    Revealed { prize: Prize },
    /// The celebration overlay became visible
    OverlayShown,
    /// The board was rebuilt to its initial state
    BoardReset,
}

/// Phase delays in simulation ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timings {
    /// Values on display before the flip
    pub show_ticks: u32,
    /// Flip animation length
    pub flip_ticks: u32,
    /// Pause between shuffle swaps
    pub shuffle_step_ticks: u32,
    /// Number of swap steps per shuffle
    pub shuffle_steps: u32,
    /// Reveal to overlay display
    pub overlay_ticks: u32,
    /// Overlay close to board rebuild
    pub reset_ticks: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            show_ticks: ms_to_ticks(1000),
            flip_ticks: ms_to_ticks(600),
            shuffle_step_ticks: ms_to_ticks(250),
            shuffle_steps: 12,
            overlay_ticks: ms_to_ticks(800),
            reset_ticks: ms_to_ticks(500),
        }
    }
}

impl Timings {
    /// Scale every delay (not the step count) by `factor`, keeping each
    /// window at least one tick long
    pub fn scaled(self, factor: f32) -> Self {
        let scale = |t: u32| ((t as f32 * factor).round() as u32).max(1);
        Self {
            show_ticks: scale(self.show_ticks),
            flip_ticks: scale(self.flip_ticks),
            shuffle_step_ticks: scale(self.shuffle_step_ticks),
            shuffle_steps: self.shuffle_steps,
            overlay_ticks: scale(self.overlay_ticks),
            reset_ticks: scale(self.reset_ticks),
        }
    }
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Fresh generator for one decision point. Advancing the PCG stream id
    /// keeps successive decision points decorrelated while the whole
    /// sequence stays a pure function of the seed.
    pub fn stream_rng(&mut self) -> Pcg32 {
        self.stream += 1;
        Pcg32::new(self.seed, self.stream)
    }
}

/// Complete draw-session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    /// RNG state
    pub rng_state: RngState,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Current phase
    pub phase: GamePhase,
    /// Ticks remaining in the current timed window
    pub phase_ticks: u32,
    /// Swap steps left in the current shuffle
    pub shuffle_steps_left: u32,
    /// Set by a mid-shuffle selection; checked at every step boundary
    pub abort_shuffle: bool,
    /// Currently selected envelope id, if any
    pub selected: Option<u32>,
    /// The board, in stable id order
    pub envelopes: Vec<Envelope>,
    /// Phase delay configuration
    pub timings: Timings,
    /// One-shot events since the last drain (render/audio only)
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new session with the given seed, board ready in tier order
    pub fn new(seed: u64) -> Self {
        let mut state = Self {
            seed,
            rng_state: RngState::new(seed),
            time_ticks: 0,
            phase: GamePhase::Idle,
            phase_ticks: 0,
            shuffle_steps_left: 0,
            abort_shuffle: false,
            selected: None,
            envelopes: Vec::new(),
            timings: Timings::default(),
            events: Vec::new(),
        };
        state.build_board();
        state
    }

    /// (Re)build the board: one envelope per tier, face-up, in tier order,
    /// each at its home grid slot. Replaces all prior envelopes.
    pub fn build_board(&mut self) {
        self.envelopes = PRIZE_TIERS
            .iter()
            .enumerate()
            .map(|(slot, &prize)| Envelope {
                id: slot as u32,
                prize,
                flipped: false,
                revealed: false,
                pos: slot_origin(slot),
            })
            .collect();
        self.selected = None;
    }

    /// Whether clicks on envelopes currently mean anything
    pub fn is_active(&self) -> bool {
        matches!(
            self.phase,
            GamePhase::Flipping | GamePhase::Shuffling | GamePhase::AwaitingSelection
        )
    }

    /// Whether the swap animation is running
    pub fn is_shuffling(&self) -> bool {
        self.phase == GamePhase::Shuffling
    }

    pub fn envelope(&self, id: u32) -> Option<&Envelope> {
        self.envelopes.iter().find(|e| e.id == id)
    }

    pub fn envelope_mut(&mut self, id: u32) -> Option<&mut Envelope> {
        self.envelopes.iter_mut().find(|e| e.id == id)
    }

    /// The envelope the player has picked, if any
    pub fn selected_envelope(&self) -> Option<&Envelope> {
        self.selected.and_then(|id| self.envelope(id))
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
