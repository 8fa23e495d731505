//! Lowering of a dialogue graph into a flat timeline of events.
//!
//! The target runtime plays events in sequence and only knows labels and
//! jumps, so every node is emitted once behind a label carrying its id and
//! all branching is expressed with jumps. Linear runs of nodes (`next`
//! links) are emitted contiguously as chains; branch targets are deferred and
//! emitted later as chains of their own.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DialogueError;
use crate::model::{CharacterId, Dialogue, NodeId, NodeKind, Value, ValueMap};

/// One instruction of the runtime timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_name", rename_all = "snake_case")]
pub enum Event {
    /// Jump target; precedes the first event of every emitted node
    Label { id: NodeId },

    /// A spoken line
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        speaker: Option<CharacterId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        speaker_name: Option<String>,
        text: String,
    },

    /// One option of a choice prompt
    Choice {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<String>,
    },

    Jump { target: NodeId },

    /// Closes the scope opened by a choice option or a condition
    EndBranch,

    SetVariable { name: String, value: Value },

    /// Opens a conditional scope
    Condition { condition: String },

    /// Switches a conditional scope to its else branch
    Else,

    Signal {
        name: String,
        #[serde(default, skip_serializing_if = "ValueMap::is_empty")]
        args: ValueMap,
    },

    /// Ends the timeline
    End { outcome: String },
}

/// Options for [`generate_with`]
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Attach each speaker's display name to text events
    pub resolve_speaker_names: bool,
}

/// Lower a dialogue into timeline events with default options
pub fn generate(dialogue: &Dialogue) -> Vec<Event> {
    generate_with(dialogue, &GenerateOptions::default())
}

/// Lower a dialogue into timeline events.
///
/// Only nodes reachable from `start` are emitted, each exactly once, so
/// cyclic graphs terminate. The output depends only on the dialogue, never on
/// hash ordering.
pub fn generate_with(dialogue: &Dialogue, options: &GenerateOptions) -> Vec<Event> {
    let mut lowering = Lowering {
        dialogue,
        options,
        events: Vec::new(),
        visited: HashSet::with_capacity(dialogue.nodes.len()),
    };
    lowering.run();

    debug!(
        dialogue_id = %dialogue.id,
        events = lowering.events.len(),
        nodes = lowering.visited.len(),
        "Generated timeline"
    );
    lowering.events
}

struct Lowering<'a> {
    dialogue: &'a Dialogue,
    options: &'a GenerateOptions,
    events: Vec<Event>,
    visited: HashSet<&'a str>,
}

/// How a chain ended
struct ChainEnd<'a> {
    /// Playback can run off the end of the chain
    falls_through: bool,

    /// Branch targets to emit later, in reference order
    deferred: Vec<&'a str>,
}

impl<'a> Lowering<'a> {
    fn run(&mut self) {
        let Some(start) = self.dialogue.start.as_deref() else {
            return;
        };

        let mut pending = vec![start];
        let mut previous_falls_through = false;

        while let Some(node_id) = pending.pop() {
            if self.visited.contains(node_id) || !self.dialogue.contains_node(node_id) {
                continue;
            }

            // Never let playback run from one chain into an unrelated one
            if previous_falls_through {
                self.events.push(Event::End {
                    outcome: String::new(),
                });
            }

            let end = self.emit_chain(node_id);
            previous_falls_through = end.falls_through;
            pending.extend(end.deferred.into_iter().rev());
        }
    }

    /// Emit `first` and everything linked to it through `next`
    fn emit_chain(&mut self, first: &'a str) -> ChainEnd<'a> {
        let dialogue = self.dialogue;
        let mut current = first;

        loop {
            let Some((node_id, node)) = dialogue.nodes.get_key_value(current) else {
                return ChainEnd { falls_through: true, deferred: Vec::new() };
            };
            self.visited.insert(node_id.as_str());
            self.events.push(Event::Label { id: node_id.clone() });

            let next = match &node.kind {
                NodeKind::Say { speaker, text, next } => {
                    let speaker_name = match speaker {
                        Some(speaker) if self.options.resolve_speaker_names => {
                            dialogue.speaker_name(speaker).map(str::to_string)
                        }
                        _ => None,
                    };
                    self.events.push(Event::Text {
                        speaker: speaker.clone(),
                        speaker_name,
                        text: text.clone(),
                    });
                    next
                }
                NodeKind::Set { assignments, next } => {
                    for (name, value) in assignments {
                        self.events.push(Event::SetVariable {
                            name: name.clone(),
                            value: value.clone(),
                        });
                    }
                    next
                }
                NodeKind::Signal { name, args, next } => {
                    self.events.push(Event::Signal {
                        name: name.clone(),
                        args: args.clone(),
                    });
                    next
                }
                NodeKind::Choice { options } => {
                    let mut deferred = Vec::new();
                    for option in options {
                        self.events.push(Event::Choice {
                            text: option.text.clone(),
                            condition: option.condition.clone(),
                        });
                        if let Some(target) = &option.next {
                            self.events.push(Event::Jump { target: target.clone() });
                            self.events.push(Event::EndBranch);
                            deferred.push(target.as_str());
                        }
                    }
                    let falls_through =
                        options.is_empty() || options.iter().any(|option| option.next.is_none());
                    return ChainEnd { falls_through, deferred };
                }
                NodeKind::If { condition, then, otherwise } => {
                    let mut deferred = Vec::new();
                    self.events.push(Event::Condition {
                        condition: condition.clone(),
                    });
                    if let Some(then) = then {
                        self.events.push(Event::Jump { target: then.clone() });
                        deferred.push(then.as_str());
                    }
                    if let Some(otherwise) = otherwise {
                        self.events.push(Event::Else);
                        self.events.push(Event::Jump { target: otherwise.clone() });
                        deferred.push(otherwise.as_str());
                    }
                    self.events.push(Event::EndBranch);
                    return ChainEnd {
                        falls_through: then.is_none() || otherwise.is_none(),
                        deferred,
                    };
                }
                NodeKind::Jump { target } => {
                    return match target {
                        Some(target) => {
                            self.events.push(Event::Jump { target: target.clone() });
                            ChainEnd { falls_through: false, deferred: vec![target.as_str()] }
                        }
                        None => ChainEnd { falls_through: true, deferred: Vec::new() },
                    };
                }
                NodeKind::End { outcome } => {
                    self.events.push(Event::End {
                        outcome: outcome.clone().unwrap_or_default(),
                    });
                    return ChainEnd { falls_through: false, deferred: Vec::new() };
                }
            };

            match next {
                None => return ChainEnd { falls_through: true, deferred: Vec::new() },
                Some(next) if dialogue.contains_node(next) && !self.visited.contains(next.as_str()) => {
                    current = next.as_str();
                }
                // Already emitted (or missing): reach it through its label
                Some(next) => {
                    self.events.push(Event::Jump { target: next.clone() });
                    return ChainEnd { falls_through: false, deferred: Vec::new() };
                }
            }
        }
    }
}

/// A spoken line, as handed to the audio pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceLine {
    pub node_id: NodeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<CharacterId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_name: Option<String>,
    pub text: String,
}

/// Every reachable say node in playback order, with speakers resolved
pub fn voice_lines(dialogue: &Dialogue) -> Vec<VoiceLine> {
    let options = GenerateOptions {
        resolve_speaker_names: true,
    };

    let mut lines = Vec::new();
    let mut current_node: Option<NodeId> = None;
    for event in generate_with(dialogue, &options) {
        match event {
            Event::Label { id } => current_node = Some(id),
            Event::Text { speaker, speaker_name, text } => {
                if let Some(node_id) = current_node.clone() {
                    lines.push(VoiceLine { node_id, speaker, speaker_name, text });
                }
            }
            _ => {}
        }
    }
    lines
}

/// Encode events as a pretty-printed JSON array
pub fn to_json(events: &[Event]) -> Result<String, DialogueError> {
    Ok(serde_json::to_string_pretty(events)?)
}
