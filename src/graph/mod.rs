pub mod builder;
pub mod circular;
pub mod trace;

pub use builder::{AddressGraph, FlowGraph};
pub use circular::{find_circular_patterns, CircularFinding};
pub use trace::{trace_taint, TaintTrace};
