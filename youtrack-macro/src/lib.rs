pub mod block;
pub mod cache;
pub mod displayer;
mod execution;
pub mod parameters;
pub mod render;
pub mod source;
pub mod telemetry;

#[cfg(test)]
mod fixtures;

pub use block::{Block, Format};
pub use cache::{escape_source, render_id, AsyncPolicy};
pub use execution::{error_block, YouTrackMacro, ERROR_MESSAGE};
pub use parameters::MacroParameters;
