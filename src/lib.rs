pub mod audio;
pub mod cli;
pub mod config;
pub mod core;
pub mod roster;
pub mod run;
