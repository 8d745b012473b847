//! Backend test support utilities
//!
//! This crate provides utilities shared by the backend's unit and
//! integration tests: one-time logging initialization and assertions
//! over the problem-details error contract.

pub mod logging;
pub mod problem_details;
