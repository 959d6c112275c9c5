pub mod classify;
pub mod columns;
pub mod config;
pub mod error;
pub mod export;
pub mod flatten;
pub mod ingest;
pub mod logging;
pub mod merge;
pub mod normalize;
pub mod overview;
pub mod pipeline;
pub mod series;
pub mod style;
pub mod summary;
pub mod table;

pub use error::{PipelineError, Result};
