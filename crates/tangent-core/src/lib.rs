//! # tangent-core
//!
//! Foundation types, branded IDs, clock, and logging for the tangent
//! conversation routing engine.
//!
//! This crate provides the shared vocabulary that all other tangent crates depend on:
//!
//! - **Branded IDs**: `OwnerId`, `ThreadId`, `TransitionId` as newtypes for type safety
//! - **Entities**: [`thread::Thread`] and [`thread::Transition`] with their closed enums
//! - **State machine**: the legal edge table in [`thread::ThreadState::can_transition_to`]
//! - **Clock**: [`clock::Clock`] so expiry logic can run against simulated time
//! - **Errors**: [`errors::StateTransitionError`] via `thiserror`
//! - **Logging**: subscriber setup and log capture for tests

#![deny(unsafe_code)]

pub mod clock;
pub mod constants;
pub mod errors;
pub mod ids;
pub mod logging;
pub mod thread;
