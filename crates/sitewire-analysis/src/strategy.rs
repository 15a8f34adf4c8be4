//! Primary-plus-fallback analysis selection.
//!
//! `AnalysisStrategy` is the single failure boundary of the analysis step:
//! whatever happens at the analyzer seam, `run` returns a usable structured
//! result.  Failures are recorded, never propagated.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sitewire_shared::types::{ImageRef, ReportKind};

use crate::analyzer::PhotoAnalyzer;
use crate::fallback::fallback_analysis;
use crate::parser::{parse_analysis, AnalysisResult};

/// Where a result came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AnalysisSource {
    /// The external analyzer answered and its text was parsed.
    Analyzer,
    /// The deterministic canned result was substituted.
    Fallback,
}

/// Primary analyzer plus fallback generator behind one failure boundary.
pub struct AnalysisStrategy {
    primary: Option<Arc<dyn PhotoAnalyzer>>,
}

impl AnalysisStrategy {
    /// Strategy backed by a remote analyzer.
    pub fn new(primary: Arc<dyn PhotoAnalyzer>) -> Self {
        Self {
            primary: Some(primary),
        }
    }

    /// Strategy with no analyzer at all; every run yields the canned result.
    pub fn offline() -> Self {
        Self { primary: None }
    }

    /// Analyze an image.  Never fails: analyzer or parse trouble degrades to
    /// the deterministic fallback for the kind.
    pub async fn run(&self, image: &ImageRef, kind: ReportKind) -> (AnalysisResult, AnalysisSource) {
        let Some(analyzer) = &self.primary else {
            debug!(kind = %kind, "No analyzer configured, using canned analysis");
            return (fallback_analysis(kind), AnalysisSource::Fallback);
        };

        match analyzer.analyze(image, kind).await {
            Ok(text) => (parse_analysis(&text, kind), AnalysisSource::Analyzer),
            Err(error) => {
                warn!(kind = %kind, error = %error, "Analysis failed, substituting canned result");
                (fallback_analysis(kind), AnalysisSource::Fallback)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use crate::error::AnalysisError;

    struct FixedAnalyzer(&'static str);

    #[async_trait]
    impl PhotoAnalyzer for FixedAnalyzer {
        async fn analyze(
            &self,
            _image: &ImageRef,
            _kind: ReportKind,
        ) -> Result<String, AnalysisError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingAnalyzer;

    #[async_trait]
    impl PhotoAnalyzer for FailingAnalyzer {
        async fn analyze(
            &self,
            _image: &ImageRef,
            _kind: ReportKind,
        ) -> Result<String, AnalysisError> {
            Err(AnalysisError::Status(429))
        }
    }

    fn image() -> ImageRef {
        ImageRef::new("file:///tmp/site.jpg")
    }

    #[tokio::test]
    async fn test_offline_strategy_uses_fallback() {
        let strategy = AnalysisStrategy::offline();
        let (result, source) = strategy.run(&image(), ReportKind::Progress).await;
        assert_eq!(source, AnalysisSource::Fallback);
        assert_eq!(result, fallback_analysis(ReportKind::Progress));
    }

    #[tokio::test]
    async fn test_analyzer_failure_degrades_to_fallback() {
        let strategy = AnalysisStrategy::new(Arc::new(FailingAnalyzer));
        let (result, source) = strategy.run(&image(), ReportKind::Issue).await;
        assert_eq!(source, AnalysisSource::Fallback);
        assert_eq!(result.confidence, 0.92);
    }

    #[tokio::test]
    async fn test_analyzer_text_is_parsed() {
        let strategy =
            AnalysisStrategy::new(Arc::new(FixedAnalyzer("Severity: low\nConfidence: 0.5")));
        let (result, source) = strategy.run(&image(), ReportKind::Issue).await;
        assert_eq!(source, AnalysisSource::Analyzer);
        assert_eq!(result.confidence, 0.5);
        assert_eq!(
            result.severity,
            Some(sitewire_shared::types::Severity::Low)
        );
    }
}
