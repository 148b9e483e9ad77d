//! Core engine: the paginated container and the pieces it is built from.
//!
//! Nothing here draws anything or owns a clock.  The host feeds in input
//! and timing signals and reads back a render model.

pub mod container;
pub mod controller;
pub mod deck;
pub mod gate;
pub mod gesture;
pub mod listeners;
