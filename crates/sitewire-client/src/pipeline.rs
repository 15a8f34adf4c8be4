//! End-to-end orchestration from a captured image to a routed channel
//! message.
//!
//! The pipeline guarantees the user always receives a usable report: analysis
//! trouble degrades to the deterministic fallback inside the strategy, and
//! only two failures ever reach the caller — a submission already in flight,
//! and a report that was generated but could not be delivered.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use sitewire_analysis::{AnalysisSource, AnalysisStrategy};
use sitewire_broker::{BrokerError, MessageBroker};
use sitewire_shared::constants::DEFAULT_REPORT_DESCRIPTION;
use sitewire_shared::model::{Message, PhotoReport};
use sitewire_shared::types::{ImageRef, ProjectId, ReportKind};

use crate::history::ReportHistory;

/// Where a submission currently is.  Pushed through a watch channel so the
/// capture surface can render progress without polling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PipelinePhase {
    Idle,
    Analyzing,
    Routing,
}

/// A delivered submission.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    /// The generated report, as embedded in the message.
    pub report: PhotoReport,
    /// The message appended to the target channel.
    pub message: Arc<Message>,
    /// Whether the analysis came from the analyzer or the fallback.
    pub source: AnalysisSource,
}

/// The only failures that cross the pipeline boundary.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// Another submission is still pending; nothing was started.
    #[error("A photo report submission is already in flight")]
    InFlight,

    /// The report exists (and is recorded in the history) but could not be
    /// delivered to a channel.
    #[error("Report generated but not delivered: {source}")]
    Undelivered {
        report: PhotoReport,
        source: BrokerError,
    },
}

/// Orchestrates submit → analyze → parse/fallback → build report → route.
pub struct ReportPipeline {
    broker: Arc<MessageBroker>,
    strategy: AnalysisStrategy,
    history: Arc<ReportHistory>,
    in_flight: AtomicBool,
    phase: watch::Sender<PipelinePhase>,
}

impl ReportPipeline {
    pub fn new(
        broker: Arc<MessageBroker>,
        strategy: AnalysisStrategy,
        history: Arc<ReportHistory>,
    ) -> Self {
        let (phase, _) = watch::channel(PipelinePhase::Idle);
        Self {
            broker,
            strategy,
            history,
            in_flight: AtomicBool::new(false),
            phase,
        }
    }

    /// Subscribe to submission phase changes.
    pub fn watch_phase(&self) -> watch::Receiver<PipelinePhase> {
        self.phase.subscribe()
    }

    /// Submit a captured image as a photo report.
    ///
    /// At most one submission runs at a time; a second call while one is
    /// pending is rejected immediately without touching the analyzer.  The
    /// outstanding submission is never cancelled.
    pub async fn submit(
        &self,
        image: ImageRef,
        kind: ReportKind,
        description: &str,
        project_id: Option<ProjectId>,
    ) -> Result<SubmitOutcome, SubmitError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SubmitError::InFlight);
        }
        // Released on every exit path, including panics.
        let _guard = InFlightGuard { pipeline: self };

        // The routing target is fixed here, before the first suspension
        // point; a current-project change during a slow analysis cannot
        // redirect the report.
        let target = project_id.or_else(|| self.broker.current_project());

        info!(kind = %kind, project = ?target, image = %image, "Submitting photo report");

        self.set_phase(PipelinePhase::Analyzing);
        let (analysis, source) = self.strategy.run(&image, kind).await;

        let description = description.trim();
        let description = if description.is_empty() {
            DEFAULT_REPORT_DESCRIPTION
        } else {
            description
        };

        let report = PhotoReport::new(
            kind,
            image,
            description,
            &analysis.description,
            analysis.severity,
            Some(analysis.confidence),
            target,
        );
        self.history.record(report.clone());

        self.set_phase(PipelinePhase::Routing);
        let message = self
            .broker
            .post_photo_report(kind.target_channel_kind(), report.clone(), target)
            .map_err(|source| {
                warn!(report = %report.id, error = %source, "Report generated but not delivered");
                SubmitError::Undelivered {
                    report: report.clone(),
                    source,
                }
            })?;

        info!(
            report = %report.id,
            message = %message.id,
            source = ?source,
            "Photo report delivered"
        );
        Ok(SubmitOutcome {
            report,
            message,
            source,
        })
    }

    fn set_phase(&self, phase: PipelinePhase) {
        self.phase.send_replace(phase);
    }
}

struct InFlightGuard<'a> {
    pipeline: &'a ReportPipeline,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.pipeline.set_phase(PipelinePhase::Idle);
        self.pipeline.in_flight.store(false, Ordering::SeqCst);
    }
}
