/// Application name
pub const APP_NAME: &str = "Sitewire";

/// Sender id stamped on machine-generated photo-report messages
pub const SYSTEM_SENDER_ID: &str = "ai-system";

/// Display name for machine-generated photo-report messages
pub const SYSTEM_SENDER_NAME: &str = "AI Assistant";

/// Description stored on a photo report when the user leaves the field blank
pub const DEFAULT_REPORT_DESCRIPTION: &str = "No description provided";

/// Name of the default general channel every project is created with
pub const DEFAULT_GENERAL_CHANNEL: &str = "general";

/// Name of the default issues channel every project is created with
pub const DEFAULT_ISSUES_CHANNEL: &str = "issues";

/// Name of the default progress channel (kind `updates`) every project is
/// created with
pub const DEFAULT_PROGRESS_CHANNEL: &str = "progress";
