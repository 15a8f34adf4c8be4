//! Domain model for projects, channels, messages and photo reports.
//!
//! Channels and messages are held behind `Arc` so the broker can perform
//! whole-collection functional replacement while keeping every untouched
//! sibling pointer-identical.  A UI surface diffing by reference therefore
//! only re-renders the one channel that actually changed.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_GENERAL_CHANNEL, DEFAULT_ISSUES_CHANNEL, DEFAULT_PROGRESS_CHANNEL, SYSTEM_SENDER_ID,
    SYSTEM_SENDER_NAME,
};
use crate::error::ModelError;
use crate::types::{
    ChannelId, ChannelKind, ImageRef, MessageId, MessageKind, ProjectId, ReportId, ReportKind,
    Severity,
};

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

/// A top-level workspace grouping channels for one field site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    /// Unique project identifier, assigned at creation.
    pub id: ProjectId,
    /// Human-readable project name.
    pub name: String,
    /// External project code entered by the user (e.g. `PROJ-001`).
    pub external_id: String,
    /// Ordered channel list.  Channel ids are unique within the project.
    pub channels: Vec<Arc<Channel>>,
    /// When the project was created.
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Create an empty project.  Name and code are trimmed; blank values are
    /// rejected rather than silently defaulted.
    pub fn new(name: &str, external_id: &str) -> Result<Self, ModelError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ModelError::EmptyProjectName);
        }
        let external_id = external_id.trim();
        if external_id.is_empty() {
            return Err(ModelError::EmptyProjectCode);
        }

        Ok(Self {
            id: ProjectId::new(),
            name: name.to_string(),
            external_id: external_id.to_string(),
            channels: Vec::new(),
            created_at: Utc::now(),
        })
    }

    /// Create a project with the standard channel set every new project
    /// starts with: `general`, `issues` and `progress` (kind `updates`).
    pub fn with_default_channels(name: &str, external_id: &str) -> Result<Self, ModelError> {
        let mut project = Self::new(name, external_id)?;
        project.channels = vec![
            Arc::new(Channel::named(
                DEFAULT_GENERAL_CHANNEL.to_string(),
                ChannelKind::General,
            )),
            Arc::new(Channel::named(
                DEFAULT_ISSUES_CHANNEL.to_string(),
                ChannelKind::Issues,
            )),
            Arc::new(Channel::named(
                DEFAULT_PROGRESS_CHANNEL.to_string(),
                ChannelKind::Updates,
            )),
        ];
        Ok(project)
    }

    /// First channel of the given kind, if any.
    pub fn channel_of_kind(&self, kind: ChannelKind) -> Option<&Arc<Channel>> {
        self.channels.iter().find(|c| c.kind == kind)
    }

    /// Channel lookup by id.
    pub fn channel(&self, id: ChannelId) -> Option<&Arc<Channel>> {
        self.channels.iter().find(|c| c.id == id)
    }
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// A named message stream within a project, tagged with a routing kind.
/// The message list is an append-only log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Channel {
    /// Unique within the owning project.
    pub id: ChannelId,
    /// Channel name, stored trimmed and lowercased.
    pub name: String,
    /// Routing kind.
    pub kind: ChannelKind,
    /// Ordered message log.  Message ids are unique within the channel.
    pub messages: Vec<Arc<Message>>,
}

impl Channel {
    /// Create an empty channel.  The name is trimmed and lowercased; blank
    /// names are rejected.
    pub fn new(name: &str, kind: ChannelKind) -> Result<Self, ModelError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ModelError::EmptyChannelName);
        }
        Ok(Self::named(name.to_lowercase(), kind))
    }

    pub(crate) fn named(name: String, kind: ChannelKind) -> Self {
        Self {
            id: ChannelId::new(),
            name,
            kind,
            messages: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// An immutable entry in a channel's log.  Messages are never edited or
/// deleted once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Unique within the owning channel.
    pub id: MessageId,
    /// Back-reference to the channel this message was appended to.
    /// Lookup only, not ownership.
    pub channel_id: ChannelId,
    /// What this message carries.
    pub kind: MessageKind,
    /// Sender identity.
    pub sender_id: String,
    /// Sender display name.
    pub sender_name: String,
    /// Text content.  Empty for photo-report messages.
    pub content: String,
    /// When the message was appended.
    pub timestamp: DateTime<Utc>,
    /// Thread this message belongs to, if any.
    pub thread_id: Option<MessageId>,
    /// Embedded photo report for `MessageKind::PhotoReport` messages.
    pub photo_report: Option<PhotoReport>,
}

impl Message {
    /// Create a user text message.  Content is trimmed; blank content is
    /// rejected.
    pub fn text(
        channel_id: ChannelId,
        sender_id: &str,
        sender_name: &str,
        content: &str,
    ) -> Result<Self, ModelError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ModelError::EmptyMessageContent);
        }
        Ok(Self {
            id: MessageId::new(),
            channel_id,
            kind: MessageKind::Text,
            sender_id: sender_id.to_string(),
            sender_name: sender_name.to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
            thread_id: None,
            photo_report: None,
        })
    }

    /// Create the system message that embeds a photo report.  The report is
    /// immutable from here on.
    pub fn photo_report(channel_id: ChannelId, report: PhotoReport) -> Self {
        Self {
            id: MessageId::new(),
            channel_id,
            kind: MessageKind::PhotoReport,
            sender_id: SYSTEM_SENDER_ID.to_string(),
            sender_name: SYSTEM_SENDER_NAME.to_string(),
            content: String::new(),
            timestamp: Utc::now(),
            thread_id: None,
            photo_report: Some(report),
        }
    }
}

// ---------------------------------------------------------------------------
// PhotoReport
// ---------------------------------------------------------------------------

/// Structured record produced from an analyzed photo.  Created once by the
/// pipeline and embedded into exactly one message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhotoReport {
    /// Unique report identifier.
    pub id: ReportId,
    /// Project the report was captured for.  `None` when no project was
    /// selected at submission time; routing such a report fails.
    pub project_id: Option<ProjectId>,
    /// The captured image.
    pub image: ImageRef,
    /// Report category.
    pub kind: ReportKind,
    /// User-entered description (or the fixed placeholder).
    pub description: String,
    /// Full analysis text as returned by the analyzer or fallback.
    pub analysis_text: String,
    /// Extracted severity; only present for issue reports.
    pub severity: Option<Severity>,
    /// Extracted analyzer confidence.  Stored as parsed; out-of-range values
    /// pass through unclamped.
    pub confidence: Option<f64>,
    /// Fixed per-kind tag set.
    pub tags: BTreeSet<String>,
    /// When the report was created.
    pub timestamp: DateTime<Utc>,
}

impl PhotoReport {
    pub fn new(
        kind: ReportKind,
        image: ImageRef,
        description: &str,
        analysis_text: &str,
        severity: Option<Severity>,
        confidence: Option<f64>,
        project_id: Option<ProjectId>,
    ) -> Self {
        Self {
            id: ReportId::new(),
            project_id,
            image,
            kind,
            description: description.to_string(),
            analysis_text: analysis_text.to_string(),
            severity,
            confidence,
            tags: Self::tags_for(kind),
            timestamp: Utc::now(),
        }
    }

    /// Fixed tag set per report kind.
    pub fn tags_for(kind: ReportKind) -> BTreeSet<String> {
        let tags: &[&str] = match kind {
            ReportKind::Progress => &["progress", "construction"],
            ReportKind::Issue => &["issue", "safety"],
        };
        tags.iter().map(|t| t.to_string()).collect()
    }
}
