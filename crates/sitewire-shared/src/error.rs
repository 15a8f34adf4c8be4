use thiserror::Error;

/// Validation failures when creating domain records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Project name was empty or whitespace-only.
    #[error("Project name must not be empty")]
    EmptyProjectName,

    /// External project code was empty or whitespace-only.
    #[error("Project code must not be empty")]
    EmptyProjectCode,

    /// Channel name was empty or whitespace-only.
    #[error("Channel name must not be empty")]
    EmptyChannelName,

    /// Text message content was empty or whitespace-only.
    #[error("Message content must not be empty")]
    EmptyMessageContent,
}
