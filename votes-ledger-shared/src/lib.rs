//! # Votes Ledger Shared
//! This crate defines shared data structures and types used across the votes ledger.
//! It includes common definitions for targets, votes, vote transitions, vote counts,
//! interactions, operation parameters and the response envelope.
pub mod types;
