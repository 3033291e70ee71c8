// src/extractors/mod.rs
pub mod dates;
pub mod facts;
pub mod result;
pub mod section;
pub mod text;
pub mod vocabulary;

// Re-export key extraction types for convenience
pub use dates::{Clock, FixedClock, YearMonth};
pub use facts::FactExtractor;
pub use result::ExtractionResult;
pub use text::{extract_text, load_document, DocumentFormat};
pub use vocabulary::Vocabulary;
