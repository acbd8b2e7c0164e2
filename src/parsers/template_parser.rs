use pest::Parser;

use crate::simulator::goal::Slot;

#[derive(Parser)]
#[grammar = "parsers/templateParser.pest"]
struct TemplateParser;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Placeholder(Slot),
}

pub struct UtteranceTemplate {}

impl UtteranceTemplate {
    /// Splits a template into literal text and slot placeholders.
    pub fn segments(input: &str) -> Result<Vec<Segment>, String> {
        let mut pairs = TemplateParser::parse(Rule::rules, input).map_err(|e| e.to_string())?;
        let rules = match pairs.next() {
            Some(pair) => pair,
            None => return Ok(Vec::new()),
        };

        let mut segments = Vec::new();
        for pair in rules.into_inner() {
            match pair.as_rule() {
                Rule::artist => segments.push(Segment::Placeholder(Slot::Artist)),
                Rule::track => segments.push(Segment::Placeholder(Slot::Track)),
                Rule::genre => segments.push(Segment::Placeholder(Slot::Genre)),
                Rule::text => segments.push(Segment::Text(pair.as_str().to_string())),
                Rule::EOI => {},
                other => return Err(format!("unexpected rule {:?} in '{}'", other, input)),
            }
        }
        return Ok(segments);
    }
}
