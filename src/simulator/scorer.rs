use super::frame::{BeliefState, SlotClaims};
use super::goal::{normalize_opt, Goal, Slot};
use super::session::{DialogueOutcome, VoicedState};
use crate::config::SimulatorConfig;

/// Turns a finished dialogue into a reward signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scorer {
    pub turn_penalty: f64,
    pub success_reward: f64,
}

impl Scorer {
    pub fn from_config(config: &SimulatorConfig) -> Self {
        Scorer { turn_penalty: config.turn_penalty, success_reward: config.success_reward }
    }

    /// `turn_penalty * turns`, plus the success bonus when the reported intent and every
    /// (whitespace-free) slot value equal the goal. Missing slots are reported as absent.
    pub fn finalize(
        &self,
        goal: &Goal,
        reported_intent: Option<&str>,
        reported: &SlotClaims,
        turns: i32,
    ) -> DialogueOutcome {
        let mut reward = self.turn_penalty * f64::from(turns);

        let intent_ok = reported_intent == Some(goal.intent.as_str());
        let slots_ok = Slot::ALL.into_iter().all(|slot| {
            let claimed = reported.get(&slot).and_then(|value| value.as_deref());
            normalize_opt(claimed) == normalize_opt(goal.slot(slot))
        });

        let success = intent_ok && slots_ok;
        if success {
            reward += self.success_reward;
        }
        return DialogueOutcome { turns, reward, success };
    }

    /// Per-turn reward: one turn penalty, plus the bonus once the dialogue has succeeded.
    pub fn step_reward(&self, success: bool) -> f64 {
        let mut value = self.turn_penalty;
        if success {
            value += self.success_reward;
        }
        return value;
    }

    /// Compares a tracker's belief against what the user has said so far, not against the goal.
    pub fn belief_matches(reported: &BeliefState, voiced: &VoicedState) -> bool {
        let intent_ok = reported.intent.as_deref() == voiced.intent.map(|intent| intent.as_str());
        return intent_ok
            && Slot::ALL
                .into_iter()
                .all(|slot| reported.normalized(slot) == normalize_opt(voiced.slots.get(slot)));
    }
}

/// Running accuracy over many simulated dialogues.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationStats {
    /// Turns whose belief state was checked.
    pub checked_turns: u64,
    pub correct_turns: u64,
    pub dialogues: u64,
    pub successful_dialogues: u64,
    pub dialogue_turns: u64,
}

impl EvaluationStats {
    pub fn record_turn(&mut self, belief_correct: bool) {
        self.checked_turns += 1;
        if belief_correct {
            self.correct_turns += 1;
        }
    }

    pub fn record_dialogue(&mut self, outcome: &DialogueOutcome) {
        self.dialogues += 1;
        self.dialogue_turns += u64::try_from(outcome.turns).unwrap_or(0);
        if outcome.success {
            self.successful_dialogues += 1;
        }
    }

    pub fn turn_accuracy(&self) -> f64 {
        ratio(self.correct_turns, self.checked_turns)
    }

    pub fn final_accuracy(&self) -> f64 {
        ratio(self.successful_dialogues, self.dialogues)
    }

    pub fn average_turns(&self) -> f64 {
        ratio(self.dialogue_turns, self.dialogues)
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    return numerator as f64 / denominator as f64;
}
