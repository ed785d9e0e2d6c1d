pub mod algorithm;
pub mod common;
pub mod config;
pub mod error;
pub mod frontier;
pub mod map;
pub mod maze_file;
pub mod request;
pub mod solver;
pub mod stat;
