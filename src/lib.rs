pub mod config;
pub mod game;
pub mod input;
pub mod snake;
pub mod term;

/// Top-left corner of a box, in window units.
pub type Coords = (i32, i32);
