use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};
use serde_aux::field_attributes::deserialize_default_from_null;

use super::goal::{normalize_opt, Slot};
use crate::error::SimError;

/// Slot name -> value as reported by the dialogue policy. `null` means "not captured".
pub type SlotClaims = BTreeMap<Slot, Option<String>>;

/// What the dialogue policy sends the simulated user each turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ActionFrame {
    /// Ask the user for the listed slots, or for anything when `slot` is empty.
    Question {
        #[serde(default, deserialize_with = "deserialize_default_from_null")]
        slot: SlotClaims,
    },
    /// Ask the user to confirm the captured intent and values.
    Confirm {
        #[serde(default)]
        intent: Option<String>,
        #[serde(default, deserialize_with = "deserialize_default_from_null")]
        slot: SlotClaims,
    },
    /// Final answer; carries the policy's final belief.
    Response {
        #[serde(default)]
        intent: Option<String>,
        #[serde(default, deserialize_with = "deserialize_default_from_null")]
        slot: SlotClaims,
    },
    /// Final information answer; carries the policy's final belief.
    Info {
        #[serde(default)]
        intent: Option<String>,
        #[serde(default, deserialize_with = "deserialize_default_from_null")]
        slot: SlotClaims,
    },
}

impl ActionFrame {
    /// The synthetic frame that opens a dialogue.
    pub fn opening() -> Self {
        ActionFrame::Question { slot: SlotClaims::new() }
    }

    pub fn from_json(raw: &str) -> Result<Self, SimError> {
        serde_json::from_str(raw).map_err(SimError::InvalidFrame)
    }

    pub fn action(&self) -> &'static str {
        return match self {
            ActionFrame::Question { .. } => "question",
            ActionFrame::Confirm { .. } => "confirm",
            ActionFrame::Response { .. } => "response",
            ActionFrame::Info { .. } => "info",
        };
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ActionFrame::Response { .. } | ActionFrame::Info { .. })
    }

    pub fn slot(&self) -> &SlotClaims {
        return match self {
            ActionFrame::Question { slot }
            | ActionFrame::Confirm { slot, .. }
            | ActionFrame::Response { slot, .. }
            | ActionFrame::Info { slot, .. } => slot,
        };
    }

    pub fn intent(&self) -> Option<&str> {
        return match self {
            ActionFrame::Question { .. } => None,
            ActionFrame::Confirm { intent, .. }
            | ActionFrame::Response { intent, .. }
            | ActionFrame::Info { intent, .. } => intent.as_deref(),
        };
    }

    /// Slot names the frame asks about.
    pub fn slots_asked(&self) -> BTreeSet<Slot> {
        self.slot().keys().copied().collect()
    }
}

/// Intent and slot values a state tracker believes it has heard so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeliefState {
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default, deserialize_with = "lenient_slot_claims")]
    pub slot: SlotClaims,
}

impl BeliefState {
    pub fn from_json(raw: &str) -> Result<Self, SimError> {
        serde_json::from_str(raw).map_err(SimError::InvalidBelief)
    }

    /// Whitespace-free value for `slot`; missing keys read as absent.
    pub fn normalized(&self, slot: Slot) -> Option<String> {
        normalize_opt(self.slot.get(&slot).and_then(|value| value.as_deref()))
    }
}

// Trackers backed by data frames report empty cells as NaN.
// Anything that is not a string is absent.
fn lenient_slot_claims<'de, D>(deserializer: D) -> Result<SlotClaims, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<Slot, serde_json::Value>> = Option::deserialize(deserializer)?;
    let claims = raw
        .unwrap_or_default()
        .into_iter()
        .map(|(slot, value)| match value {
            serde_json::Value::String(s) => (slot, Some(s)),
            _ => (slot, None),
        })
        .collect();
    return Ok(claims);
}


#[cfg(test)]
mod tests {
    use crate::simulator::frame::*;

    #[test]
    fn test_parse_question_frame() {
        let raw = r#"{"action": "question", "slot": {"track": ""}}"#;
        let frame = ActionFrame::from_json(raw).unwrap();
        assert_eq!(frame.action(), "question");
        assert_eq!(frame.slots_asked(), BTreeSet::from([Slot::Track]));
        assert_eq!(frame.intent(), None);
    }

    #[test]
    fn test_parse_confirm_frame_with_intent() {
        let raw = r#"{"action": "confirm", "intent": "search", "slot": {"artist": "A", "track": null}}"#;
        let frame = ActionFrame::from_json(raw).unwrap();
        assert_eq!(frame.intent(), Some("search"));
        assert_eq!(frame.slot().get(&Slot::Artist), Some(&Some(String::from("A"))));
        assert_eq!(frame.slot().get(&Slot::Track), Some(&None));
    }

    #[test]
    fn test_missing_or_null_slot_map() {
        let frame = ActionFrame::from_json(r#"{"action": "response", "intent": "info"}"#).unwrap();
        assert!(frame.is_terminal());
        assert!(frame.slot().is_empty());

        let frame = ActionFrame::from_json(r#"{"action": "question", "slot": null}"#).unwrap();
        assert!(frame.slot().is_empty());
        assert_eq!(frame, ActionFrame::opening());
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result = ActionFrame::from_json(r#"{"action": "greet"}"#);
        assert!(matches!(result, Err(SimError::InvalidFrame(_))));

        let result = ActionFrame::from_json(r#"{"slot": {"artist": "A"}}"#);
        assert!(matches!(result, Err(SimError::InvalidFrame(_))));
    }

    #[test]
    fn test_unknown_slot_is_rejected() {
        let result = ActionFrame::from_json(r#"{"action": "confirm", "slot": {"album": "X"}}"#);
        assert!(matches!(result, Err(SimError::InvalidFrame(_))));
    }

    #[test]
    fn test_belief_state_reads_nan_as_absent() {
        let raw = r#"{"intent": "search", "slot": {"artist": "周 杰倫", "track": 1.5, "genre": null}}"#;
        let belief = BeliefState::from_json(raw).unwrap();
        assert_eq!(belief.normalized(Slot::Artist), Some(String::from("周杰倫")));
        assert_eq!(belief.normalized(Slot::Track), None);
        assert_eq!(belief.normalized(Slot::Genre), None);
    }
}
