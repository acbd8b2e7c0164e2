use std::collections::BTreeSet;

use rand::{seq::SliceRandom, Rng};

use super::goal::{Goal, Slot};
use super::session::VoicedState;
use crate::data::types::Template;
use crate::error::SimError;
use crate::parsers::template_parser::Segment;

pub struct Synthesizer {}

impl Synthesizer {
    /// Whether `template` may voice `asked` under the current goal.
    ///
    /// * nothing asked: mentions at least one active slot and no inactive one
    /// * strict: mentions every asked slot and nothing else
    /// * not strict: mentions at least one asked slot and nothing else
    pub fn matches(
        template: &Template,
        asked: &BTreeSet<Slot>,
        strict: bool,
        active: &BTreeSet<Slot>,
    ) -> bool {
        let all = Slot::all();
        if asked.is_empty() {
            return active.iter().any(|slot| template.mentions(*slot))
                && all.difference(active).all(|slot| !template.mentions(*slot));
        }

        let no_extra = all.difference(asked).all(|slot| !template.mentions(*slot));
        if strict {
            return no_extra && asked.iter().all(|slot| template.mentions(*slot));
        } else {
            return no_extra && asked.iter().any(|slot| template.mentions(*slot));
        }
    }

    /// First matching template in a fresh random order.
    pub fn select<'t, R: Rng + ?Sized>(
        templates: &'t [Template],
        asked: &BTreeSet<Slot>,
        strict: bool,
        active: &BTreeSet<Slot>,
        rng: &mut R,
    ) -> Option<&'t Template> {
        let mut order: Vec<&Template> = templates.iter().collect();
        order.shuffle(rng);
        return order
            .into_iter()
            .find(|template| Synthesizer::matches(template, asked, strict, active));
    }

    /// Splices the goal's raw values into the first occurrence of each placeholder
    /// and records what was voiced. Nothing is recorded when a value is missing.
    pub fn fill(
        template: &Template,
        goal: &Goal,
        voiced: &mut VoicedState,
    ) -> Result<String, SimError> {
        let mut filled: Vec<(Slot, &str)> = Vec::new();
        let mut sentence = String::new();
        for segment in template.segments() {
            match segment {
                Segment::Text(text) => sentence.push_str(text),
                Segment::Placeholder(slot) if filled.iter().any(|(done, _)| done == slot) => {
                    sentence.push_str(slot.token())
                }
                Segment::Placeholder(slot) => {
                    let value = goal
                        .slot(*slot)
                        .ok_or_else(|| SimError::MissingSlotValue { slot: slot.to_string() })?;
                    sentence.push_str(value);
                    filled.push((*slot, value));
                }
            }
        }

        voiced.record_intent(goal.intent);
        for (slot, value) in filled {
            voiced.record_slot(slot, value);
        }
        return Ok(sentence);
    }

    pub fn generate<R: Rng + ?Sized>(
        templates: &[Template],
        goal: &Goal,
        asked: &BTreeSet<Slot>,
        strict: bool,
        voiced: &mut VoicedState,
        rng: &mut R,
    ) -> Result<String, SimError> {
        let active = goal.active_slots();
        let template = Synthesizer::select(templates, asked, strict, &active, rng).ok_or_else(|| {
            SimError::NoMatchingTemplate {
                intent: goal.intent,
                asked: asked.iter().map(|slot| slot.to_string()).collect(),
                strict,
            }
        })?;
        return Synthesizer::fill(template, goal, voiced);
    }
}


#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    use crate::simulator::goal::Intent;
    use crate::simulator::synthesizer::*;

    fn templates(texts: &[&str]) -> Vec<Template> {
        texts.iter().map(|text| Template::parse(text).unwrap()).collect()
    }

    fn corpus() -> Vec<Template> {
        templates(&[
            "我想聽[s]的[t]",
            "播放[t]",
            "[s]的歌",
            "來點[g]",
            "[s]的[g]歌",
            "隨便放首歌",
            "[s]唱的[t]是[g]嗎",
        ])
    }

    fn slots(list: &[Slot]) -> BTreeSet<Slot> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_matches_opening() {
        let active = slots(&[Slot::Artist, Slot::Track]);
        let empty = BTreeSet::new();
        let opens = |text: &str| {
            Synthesizer::matches(&Template::parse(text).unwrap(), &empty, true, &active)
        };
        assert!(opens("播放[t]"));
        assert!(opens("我想聽[s]的[t]"));
        assert!(!opens("來點[g]"));
        assert!(!opens("隨便放首歌"));
    }

    #[test]
    fn test_matches_strict_and_loose() {
        let active = Slot::all();
        let asked = slots(&[Slot::Artist, Slot::Genre]);
        let both = Template::parse("[s]的[g]歌").unwrap();
        let artist_only = Template::parse("[s]的歌").unwrap();
        let with_track = Template::parse("[s]唱的[t]是[g]嗎").unwrap();

        assert!(Synthesizer::matches(&both, &asked, true, &active));
        assert!(!Synthesizer::matches(&artist_only, &asked, true, &active));
        assert!(Synthesizer::matches(&artist_only, &asked, false, &active));
        assert!(!Synthesizer::matches(&with_track, &asked, false, &active));
    }

    #[test]
    fn test_question_about_track_only() {
        let goal = Goal::new(Intent::Search, Some("A".into()), Some("T".into()), None);
        let mut voiced = VoicedState::default();
        let mut rng = StdRng::seed_from_u64(3);

        let asked = slots(&[Slot::Track]);
        let sentence =
            Synthesizer::generate(&corpus(), &goal, &asked, true, &mut voiced, &mut rng).unwrap();
        assert_eq!(sentence, "播放T");
        assert_eq!(voiced.slots.get(Slot::Track), Some("T"));
        assert_eq!(voiced.slots.get(Slot::Artist), None);
        assert_eq!(voiced.intent, Some(Intent::Search));
    }

    #[test]
    fn test_fill_only_first_occurrence() {
        let goal = Goal::new(Intent::Search, None, Some("T".into()), None);
        let mut voiced = VoicedState::default();
        let template = Template::parse("[t]還是[t]").unwrap();
        let sentence = Synthesizer::fill(&template, &goal, &mut voiced).unwrap();
        assert_eq!(sentence, "T還是[t]");
    }

    #[test]
    fn test_fill_keeps_raw_value() {
        let goal = Goal::new(Intent::Search, Some("Fall Out Boy".into()), None, None);
        let mut voiced = VoicedState::default();
        let template = Template::parse("[s]的歌").unwrap();
        let sentence = Synthesizer::fill(&template, &goal, &mut voiced).unwrap();
        assert_eq!(sentence, "Fall Out Boy的歌");
    }

    #[test]
    fn test_fill_records_nothing_on_missing_value() {
        let goal = Goal::new(Intent::Search, Some("A".into()), None, None);
        let mut voiced = VoicedState::default();
        let template = Template::parse("[s]的[t]").unwrap();

        let result = Synthesizer::fill(&template, &goal, &mut voiced);
        assert!(matches!(result, Err(SimError::MissingSlotValue { .. })));
        assert_eq!(voiced, VoicedState::default());
    }

    #[test]
    fn test_no_matching_template() {
        let goal = Goal::new(Intent::Search, Some("A".into()), None, None);
        let mut voiced = VoicedState::default();
        let mut rng = StdRng::seed_from_u64(0);

        let only_track = templates(&["播放[t]"]);
        let asked = BTreeSet::new();
        let result =
            Synthesizer::generate(&only_track, &goal, &asked, true, &mut voiced, &mut rng);
        assert!(matches!(result, Err(SimError::NoMatchingTemplate { strict: true, .. })));
        assert_eq!(voiced, VoicedState::default());
    }

    fn slot_set() -> impl Strategy<Value = BTreeSet<Slot>> {
        proptest::sample::subsequence(Slot::ALL.to_vec(), 1..=3)
            .prop_map(|list| list.into_iter().collect())
    }

    proptest! {
        #[test]
        fn test_strict_selection_never_leaks(asked in slot_set(), seed in any::<u64>()) {
            let corpus = corpus();
            let mut rng = StdRng::seed_from_u64(seed);
            let active = Slot::all();
            if let Some(template) = Synthesizer::select(&corpus, &asked, true, &active, &mut rng) {
                for slot in Slot::ALL {
                    prop_assert_eq!(template.mentions(slot), asked.contains(&slot));
                }
            }
        }

        #[test]
        fn test_loose_selection_never_leaks(asked in slot_set(), seed in any::<u64>()) {
            let corpus = corpus();
            let mut rng = StdRng::seed_from_u64(seed);
            let template = Synthesizer::select(&corpus, &asked, false, &Slot::all(), &mut rng);
            // every non-empty subset has at least one single-slot template here
            prop_assert!(template.is_some());
            let template = template.unwrap();
            prop_assert!(template.placeholders().is_subset(&asked));
            prop_assert!(!template.placeholders().is_empty());
        }
    }
}
