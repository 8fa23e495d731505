//! Text rendering of timeline events in the Dialogic timeline style (`.dtl`).

use crate::codec::timeline::Event;
use crate::model::Value;

const INDENT: &str = "\t";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Body of a choice option; only holds the option's jump
    Option,
    /// Body of a condition or its else branch
    Condition,
}

/// Render events as timeline text, one event per line.
///
/// Option and condition bodies are indented one tab. Labels always start at
/// the top level. A condition with only an else branch is written negated,
/// and one with no branch at all is dropped, so no `if` block is left empty.
pub fn render(events: &[Event]) -> String {
    let mut lines = Vec::with_capacity(events.len());
    let mut scopes: Vec<Scope> = Vec::new();
    // Line index and text of an `if` whose body is still empty
    let mut bare_condition: Option<(usize, &str)> = None;

    for event in events {
        // An option body ends at the next event that is not its jump
        if !matches!(event, Event::Jump { .. } | Event::EndBranch) {
            while scopes.last() == Some(&Scope::Option) {
                scopes.pop();
            }
        }

        let depth = scopes.len();
        let line = match event {
            Event::Label { id } => {
                scopes.clear();
                Some(format!("label {}", id))
            }
            Event::Text { speaker, text, .. } => Some(match speaker {
                Some(speaker) => format!("{}: {}", speaker, text),
                None => text.clone(),
            }),
            Event::Choice { text, condition } => {
                scopes.push(Scope::Option);
                Some(match condition {
                    Some(condition) => format!("- {} | [if {}]", text, condition),
                    None => format!("- {}", text),
                })
            }
            Event::Jump { target } => Some(format!("jump {}", target)),
            Event::EndBranch => {
                if let Some((index, _)) = bare_condition.take() {
                    if index + 1 == lines.len() {
                        lines.pop();
                    }
                }
                scopes.pop();
                None
            }
            Event::SetVariable { name, value } => {
                Some(format!("set {{{}}} = {}", name, render_value(value)))
            }
            Event::Condition { condition } => {
                scopes.push(Scope::Condition);
                bare_condition = Some((lines.len(), condition.as_str()));
                lines.push(indented(depth, &format!("if {}:", condition)));
                continue;
            }
            Event::Else => {
                // Printed at the level of its `if`
                let level = depth.saturating_sub(1);
                match bare_condition.take() {
                    Some((index, condition)) if index + 1 == lines.len() => {
                        lines[index] = indented(level, &format!("if not ({}):", condition));
                    }
                    _ => lines.push(indented(level, "else:")),
                }
                None
            }
            Event::Signal { name, .. } => Some(format!("[signal arg=\"{}\"]", name)),
            Event::End { outcome } if outcome.is_empty() => Some("[end_timeline]".to_string()),
            Event::End { outcome } => Some(format!("[end_timeline outcome=\"{}\"]", outcome)),
        };

        if let Some(line) = line {
            bare_condition = None;
            let depth = match event {
                Event::Label { .. } => 0,
                _ => depth,
            };
            lines.push(indented(depth, &line));
        }
    }

    lines.join("\n")
}

fn indented(depth: usize, line: &str) -> String {
    format!("{}{}", INDENT.repeat(depth), line)
}

/// Scalars are written bare; strings are quoted, collections inline
fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => format!("\"{}\"", text.replace('"', "\\\"")),
        other => serde_json::to_string(other).unwrap_or_else(|_| "null".to_string()),
    }
}
