//! Labelled sample reading for the cairn pipeline.

mod error;
mod reader;

pub use error::IoError;
pub use reader::SampleReader;
