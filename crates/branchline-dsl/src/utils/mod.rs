pub mod color;
pub mod id;
