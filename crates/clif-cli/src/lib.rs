//! CLI library components for the CLIF transforms.

pub mod logging;
pub mod output;
