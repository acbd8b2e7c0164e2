use std::collections::BTreeSet;
use std::sync::Arc;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::{debug, info, warn};

use super::frame::{ActionFrame, BeliefState, SlotClaims};
use super::goal::{normalize_opt, Goal, Slot};
use super::scorer::Scorer;
use super::session::{DialogueOutcome, DialoguePhase, DialogueRun, VoicedState};
use super::synthesizer::Synthesizer;
use crate::config::SimulatorConfig;
use crate::data::types::{load_resources, Catalog, TemplateIndex};
use crate::error::{LoadError, SimError};

/// What the simulated user returns for one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct UserTurn {
    pub utterance: String,
    pub ended: bool,
    /// Set on the turn that ends the dialogue.
    pub outcome: Option<DialogueOutcome>,
}

/// One simulated user, good for one dialogue at a time.
///
/// Catalog and templates are shared read-only; everything else belongs to this instance.
pub struct Simulator {
    catalog: Arc<Catalog>,
    templates: Arc<TemplateIndex>,
    config: SimulatorConfig,
    scorer: Scorer,
    rng: StdRng,

    goal: Option<Goal>,
    active_slots: BTreeSet<Slot>,
    run: DialogueRun,
    voiced: VoicedState,
}

impl Simulator {
    pub fn new(
        catalog: Arc<Catalog>,
        templates: Arc<TemplateIndex>,
        config: SimulatorConfig,
    ) -> Result<Self, LoadError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        return Ok(Simulator {
            catalog,
            templates,
            scorer: Scorer::from_config(&config),
            config,
            rng,
            goal: None,
            active_slots: BTreeSet::new(),
            run: DialogueRun::default(),
            voiced: VoicedState::default(),
        });
    }

    /// Loads catalog and templates from `config.data`.
    pub fn from_config(config: SimulatorConfig) -> Result<Self, LoadError> {
        let (catalog, templates) = load_resources(&config.data)?;
        return Simulator::new(Arc::new(catalog), Arc::new(templates), config);
    }

    /// Restarts the random stream, so the following draws repeat those of a fresh `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Starts a new dialogue with `goal`, dropping whatever the previous one left behind.
    pub fn set_goal(&mut self, goal: Goal) {
        self.run = DialogueRun::armed();
        self.voiced = VoicedState::default();
        self.active_slots = goal.active_slots();
        debug!(goal = %goal, "user goal set");
        self.goal = Some(goal);
    }

    pub fn set_random_goal(&mut self) -> Result<&Goal, SimError> {
        let goal = Goal::random(&self.catalog, &mut self.rng)?;
        self.set_goal(goal);
        return self.goal.as_ref().ok_or(SimError::NoGoal);
    }

    /// The user's opening line, as if asked an open question.
    pub fn start(&mut self) -> Result<UserTurn, SimError> {
        return self.respond(&ActionFrame::opening());
    }

    pub fn respond_json(&mut self, raw: &str) -> Result<UserTurn, SimError> {
        let frame = ActionFrame::from_json(raw)?;
        return self.respond(&frame);
    }

    pub fn respond(&mut self, frame: &ActionFrame) -> Result<UserTurn, SimError> {
        match self.run.phase {
            DialoguePhase::Idle => return Err(SimError::NoGoal),
            DialoguePhase::Ended => return Err(SimError::DialogueEnded),
            DialoguePhase::AwaitingFirstUtterance | DialoguePhase::InDialogue => {},
        }
        let goal = self.goal.clone().ok_or(SimError::NoGoal)?;

        self.run.begin_turn();
        let slots_asked = frame.slots_asked();

        let utterance = match frame {
            ActionFrame::Confirm { intent, slot } => {
                self.confirm(&goal, &slots_asked, intent.as_deref(), slot)?
            }
            ActionFrame::Question { .. } => self.question(&goal, &slots_asked)?,
            ActionFrame::Response { .. } | ActionFrame::Info { .. } => String::new(),
        };
        debug!(turn = self.run.turn, action = frame.action(), utterance = %utterance, "user turn");

        let mut outcome = None;
        if frame.is_terminal() {
            let scored = self.scorer.finalize(&goal, frame.intent(), frame.slot(), self.run.turn);
            self.run.finish(scored);
            info!(
                turns = scored.turns,
                reward = scored.reward,
                success = scored.success,
                "dialogue ended"
            );
            outcome = Some(scored);
        }

        return Ok(UserTurn { utterance, ended: self.run.ended, outcome });
    }

    fn confirm(
        &mut self,
        goal: &Goal,
        slots_asked: &BTreeSet<Slot>,
        intent_asked: Option<&str>,
        claimed: &SlotClaims,
    ) -> Result<String, SimError> {
        let mut sentence = None;
        if !slots_asked.is_subset(&self.active_slots) {
            // confirming a slot the goal never had
            sentence = Some(self.negate(String::new())?);
        } else {
            let wrong: BTreeSet<Slot> = claimed
                .iter()
                .filter(|(slot, value)| {
                    normalize_opt(value.as_deref()) != normalize_opt(goal.slot(**slot))
                })
                .map(|(slot, _)| *slot)
                .collect();
            if !wrong.is_empty() {
                let body = self.generate(goal, &wrong, false)?;
                sentence = Some(self.negate(body)?);
            }
        }

        if let Some(intent) = intent_asked.filter(|intent| !intent.is_empty()) {
            if intent != goal.intent.as_str() {
                sentence = Some(self.negate(String::new())?);
            }
        }

        return match sentence {
            Some(sentence) => Ok(sentence),
            None => self.affirm(),
        };
    }

    fn question(&mut self, goal: &Goal, slots_asked: &BTreeSet<Slot>) -> Result<String, SimError> {
        if !slots_asked.is_subset(&self.active_slots) {
            return self.negate(String::new());
        }
        return self.generate(goal, slots_asked, true);
    }

    fn generate(
        &mut self,
        goal: &Goal,
        asked: &BTreeSet<Slot>,
        strict: bool,
    ) -> Result<String, SimError> {
        let templates = self.templates.for_intent(goal.intent);
        let voiced = &mut self.voiced;
        return Synthesizer::generate(templates, goal, asked, strict, voiced, &mut self.rng)
            .map_err(|err| {
                warn!(
                    intent = goal.intent.as_str(),
                    ?asked,
                    strict,
                    "no template can voice the request"
                );
                err
            });
    }

    fn negate(&mut self, body: String) -> Result<String, SimError> {
        let prefix = self
            .config
            .negative_prefixes
            .choose(&mut self.rng)
            .ok_or(SimError::EmptyDrawPool("negative prefixes"))?;
        return Ok(format!("{}{}", prefix, body));
    }

    fn affirm(&mut self) -> Result<String, SimError> {
        let prefix = self
            .config
            .positive_prefixes
            .choose(&mut self.rng)
            .ok_or(SimError::EmptyDrawPool("positive prefixes"))?;
        return Ok(prefix.clone());
    }

    /// Reward for the latest turn, see `Scorer::step_reward`.
    pub fn step_reward(&self) -> f64 {
        self.scorer.step_reward(self.run.success)
    }

    pub fn check_belief_accuracy(&self, reported: &BeliefState) -> bool {
        Scorer::belief_matches(reported, &self.voiced)
    }

    pub fn check_belief_json(&self, raw: &str) -> Result<bool, SimError> {
        let reported = BeliefState::from_json(raw)?;
        return Ok(self.check_belief_accuracy(&reported));
    }

    pub fn goal(&self) -> Option<&Goal> {
        self.goal.as_ref()
    }

    pub fn active_slots(&self) -> &BTreeSet<Slot> {
        &self.active_slots
    }

    pub fn phase(&self) -> DialoguePhase {
        self.run.phase
    }

    pub fn dialogue_ended(&self) -> bool {
        self.run.ended
    }

    pub fn turns(&self) -> i32 {
        self.run.turn
    }

    pub fn reward(&self) -> f64 {
        self.run.reward
    }

    pub fn success(&self) -> bool {
        self.run.success
    }

    pub fn voiced(&self) -> &VoicedState {
        &self.voiced
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}
