#![allow(dead_code)]

pub mod fixtures;

pub use fixtures::{command, harness, running_game, Harness, T0};
