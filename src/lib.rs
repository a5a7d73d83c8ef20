//! Directional Traffic Library
//!
//! Configures south-only traffic scenarios on grid road networks.

pub mod simulation;
