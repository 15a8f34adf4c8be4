use thiserror::Error;

use sitewire_shared::types::{ChannelId, ChannelKind, ProjectId};
use sitewire_shared::ModelError;

/// Errors produced by broker operations.  Every failure is a strict no-op on
/// the project collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// A mutation was attempted before any state was bound.
    #[error("Broker has no registered project state")]
    NotRegistered,

    /// No explicit project id was given and no current project is selected.
    #[error("No project selected for delivery")]
    NoProjectSelected,

    /// The resolved project id does not exist in the collection.
    #[error("Project {0} not found")]
    ProjectNotFound(ProjectId),

    /// The target project has no channel of the requested kind.
    #[error("No {kind} channel in project {project}")]
    ChannelNotFound {
        kind: ChannelKind,
        project: ProjectId,
    },

    /// The referenced channel id does not exist in the target project.
    #[error("Channel {0} not found")]
    ChannelIdNotFound(ChannelId),

    /// A create operation failed domain validation.
    #[error(transparent)]
    Validation(#[from] ModelError),
}
