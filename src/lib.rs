//! tactbot — a workspace bot that privately nudges authors when their
//! messages contain insensitive or inconsiderate phrasing.

pub mod analysis;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod slack;
