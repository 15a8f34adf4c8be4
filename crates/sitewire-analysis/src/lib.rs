//! # sitewire-analysis
//!
//! Photo analysis for Sitewire: the pure text parser that turns free-form
//! analyzer output into structured results, the `PhotoAnalyzer` seam to the
//! external vision model, the deterministic fallback used when that model is
//! unreachable, and the strategy object that selects between them behind a
//! single failure boundary.

pub mod analyzer;
pub mod config;
pub mod fallback;
pub mod parser;
pub mod prompt;
pub mod strategy;

mod error;

pub use analyzer::{GeminiAnalyzer, PhotoAnalyzer};
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use fallback::fallback_analysis;
pub use parser::{parse_analysis, AnalysisResult};
pub use strategy::{AnalysisSource, AnalysisStrategy};
