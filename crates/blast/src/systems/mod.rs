pub mod board;
pub mod bonus;
pub mod group;
