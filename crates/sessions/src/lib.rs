//! Game session registry.
//!
//! Tracks which channel hosts a live game and which user sits in which game.
//! Every mutation goes through [`GameRegistry`], which keeps the channel and
//! user indices consistent under a single lock.

pub mod error;
mod index;
pub mod registry;
pub mod session;

pub use {
    error::{GameError, MoveFailure},
    registry::{DEFAULT_MAX_PLAYERS, GameRegistry, KickOutcome},
    session::{Participant, Session, SessionId},
};
