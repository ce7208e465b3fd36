//! quizforge: adaptive question generation and persistence.
//!
//! Assembles layered guidance for a generative model, picks document- or text-grounded
//! generation, fans out one request per difficulty tier, saves the results while keeping
//! topic progress counters consistent, and turns loosely shaped model output into validated
//! visual scene descriptions.

pub mod cli;
pub mod config;
pub mod crib;
pub mod curriculum;
pub mod dedup;
pub mod error;
pub mod generation;
pub mod item;
pub mod logging;
pub mod mode;
pub mod persist;
pub mod pipeline;
pub mod provider;
pub mod store;
pub mod types;
pub mod visual;
