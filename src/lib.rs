//! Play-by-play American football simulation for dynasty leagues.
//!
//! [`roster`] holds the persistent team data; [`sim`] plays games against it.

pub mod roster;
pub mod sim;
