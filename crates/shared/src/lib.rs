//! Process bootstrap shared by nudge binaries

pub mod bootstrap;
