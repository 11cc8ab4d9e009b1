pub mod app;
pub mod codec;
pub mod config;
pub mod error;
pub mod food;
pub mod game;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod scores;
pub mod snake;
pub mod term;

pub type TermInt = u16;
pub type Coords = (u16, u16);
