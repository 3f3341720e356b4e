//! Paperlens web server library (used by the `paperlens` binary and tests).

pub mod gateway;
