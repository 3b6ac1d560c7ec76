//! Entry-point detection, reachability strategies S1-S4, and taint-flow
//! analysis (§4.4, §4.6, §4.7) — the layer the rest of the crate exists to
//! feed data into and read verdicts back out of.

pub mod entrypoint;
pub mod reachability;
pub mod taint;

pub use entrypoint::{apply_no_callers_signal, detect as detect_entry_point, passes_threshold, EntryPoint, Signal, SignalType};
pub use reachability::ReachabilityEngine;
pub use taint::TaintFlowEngine;
