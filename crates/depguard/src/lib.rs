//! CLI plumbing for the `depguard` binary, split out as a library target so
//! integration tests can exercise argument parsing and rendering without
//! spawning a subprocess for every case.

pub mod cli;
pub mod output;
