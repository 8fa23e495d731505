mod character;
mod dialogue;
mod node;

pub use character::Character;
pub use dialogue::Dialogue;
pub use node::{
    CharacterId, ChoiceOption, EdgeField, Node, NodeId, NodeKind, Position, Value, ValueMap,
};
