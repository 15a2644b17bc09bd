//! Tabletop Grounding - free-text pick-and-place commands to robot actions

pub mod action;
pub mod command;
pub mod core;
pub mod embedding;
pub mod language;
pub mod matcher;
