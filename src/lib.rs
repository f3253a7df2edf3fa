//! daybrief — a daily planning engine.
//!
//! Pulls items from email, tasks, and calendar sources, classifies them
//! (sender trust, content signal), merges related emails into threads,
//! deduplicates repeated event notices, scores and ranks what survives,
//! and emits a three-tier plan: do now, do soon, monitor. Reference
//! emails (account numbers, confirmation codes) are collected alongside.
//!
//! The engine itself is synchronous and pure; network sources, the AI
//! summarizer, and the scheduler are collaborators behind narrow traits.

pub mod auth;
pub mod bucketize;
pub mod classify;
pub mod config;
pub mod dedup;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod scheduler;
pub mod sources;
pub mod summarize;
pub mod threads;
pub mod types;
