pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod grid;
pub mod input;
pub mod logging;
pub mod obstacle;
pub mod placement;
pub mod renderer;
pub mod scheduler;
pub mod score;
pub mod snake;
pub mod sprites;
pub mod terminal_runtime;
pub mod ui;
