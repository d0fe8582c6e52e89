// src/process/mod.rs
pub mod composite;
pub mod convert;
pub mod extract;
pub mod normalize;

pub use composite::{average, CompositeAverager};
pub use convert::{run_conversion, Conversion, ConversionReport, Converter, Outcome};
pub use extract::{Extraction, RawRow, RowExtractor};
pub use normalize::normalize_score;
