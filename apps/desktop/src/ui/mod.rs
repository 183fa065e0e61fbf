//! Terminal rendering of the page and the interactive session loop.

pub mod render;
pub mod session;
