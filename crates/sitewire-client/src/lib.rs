//! # sitewire-client
//!
//! Composition root for the Sitewire core: wires the broker, the analysis
//! strategy and the photo-report pipeline together and hands the bundle to
//! whatever host embeds it.  Ownership is assembled here and nowhere else;
//! everything below receives injected `Arc`s.

pub mod history;
pub mod pipeline;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, EnvFilter};

use sitewire_analysis::{AnalysisConfig, AnalysisStrategy, GeminiAnalyzer};
use sitewire_broker::MessageBroker;

use crate::history::ReportHistory;
use crate::pipeline::ReportPipeline;

/// Initialise the tracing subscriber.  `RUST_LOG` overrides the default
/// per-crate filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("sitewire_client=debug,sitewire_broker=debug,sitewire_analysis=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// The assembled core, shared between the messaging surface and the
/// photo-capture surface.
pub struct AppCore {
    pub broker: Arc<MessageBroker>,
    pub pipeline: Arc<ReportPipeline>,
    pub history: Arc<ReportHistory>,
}

impl AppCore {
    /// Build the core from an explicit configuration.  Without an API key
    /// the pipeline runs offline: every analysis yields the canned fallback,
    /// mirroring how the app behaves before the key is provisioned.
    pub fn new(config: AnalysisConfig) -> anyhow::Result<Self> {
        let strategy = if config.is_configured() {
            let analyzer =
                GeminiAnalyzer::new(config).context("Failed to build analyzer HTTP client")?;
            AnalysisStrategy::new(Arc::new(analyzer))
        } else {
            tracing::warn!("No analyzer API key configured, photo analysis runs offline");
            AnalysisStrategy::offline()
        };

        let broker = Arc::new(MessageBroker::new());
        let history = Arc::new(ReportHistory::new());
        let pipeline = Arc::new(ReportPipeline::new(
            broker.clone(),
            strategy,
            history.clone(),
        ));

        Ok(Self {
            broker,
            pipeline,
            history,
        })
    }

    /// Build the core from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::new(AnalysisConfig::from_env())
    }
}
