use super::goal::{Intent, Slot, SlotValues};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialoguePhase {
    /// No goal set yet.
    Idle,
    AwaitingFirstUtterance,
    InDialogue,
    /// A terminal frame was scored. Only a new goal leaves this phase.
    Ended,
}

/// Reward and success of a scored dialogue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialogueOutcome {
    pub turns: i32,
    pub reward: f64,
    pub success: bool,
}

/// Per-dialogue bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueRun {
    pub phase: DialoguePhase,
    /// Starts at -1; the opening utterance is turn 0.
    pub turn: i32,
    pub reward: f64,
    pub success: bool,
    pub ended: bool,
}

impl Default for DialogueRun {
    fn default() -> Self {
        DialogueRun {
            phase: DialoguePhase::Idle,
            turn: -1,
            reward: 0.0,
            success: false,
            ended: true,
        }
    }
}

impl DialogueRun {
    /// Fresh run for a newly set goal.
    pub fn armed() -> Self {
        DialogueRun { phase: DialoguePhase::AwaitingFirstUtterance, ..DialogueRun::default() }
    }

    pub fn begin_turn(&mut self) {
        self.ended = false;
        self.turn += 1;
        self.phase = DialoguePhase::InDialogue;
    }

    pub fn finish(&mut self, outcome: DialogueOutcome) {
        self.ended = true;
        self.reward = outcome.reward;
        self.success = outcome.success;
        self.phase = DialoguePhase::Ended;
    }
}

/// What the simulated user has actually said during the current dialogue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoicedState {
    pub intent: Option<Intent>,
    pub slots: SlotValues,
}

impl VoicedState {
    pub fn record_intent(&mut self, intent: Intent) {
        self.intent = Some(intent);
    }

    pub fn record_slot(&mut self, slot: Slot, value: &str) {
        self.slots.set(slot, Some(value.to_string()));
    }
}
