//! Scam Honeypot - decoy conversational agent for fraud engagement
//!
//! This crate engages suspected fraud senders through a persona-driven decoy,
//! classifies each conversation, harvests payment handles, links and phone
//! numbers, and reports the collected intelligence exactly once per session.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
