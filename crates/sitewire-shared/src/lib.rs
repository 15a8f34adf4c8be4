//! # sitewire-shared
//!
//! Domain model for the Sitewire core: projects, channels, messages and
//! photo reports, plus the id newtypes and kind enums shared by every other
//! crate.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to a UI layer over IPC.  The model is memory-resident for the
//! process lifetime; nothing in this crate touches disk.

pub mod constants;
pub mod model;
pub mod types;

mod error;

pub use error::ModelError;
pub use model::{Channel, Message, PhotoReport, Project};
pub use types::{
    ChannelId, ChannelKind, ImageRef, MessageId, MessageKind, ProjectId, ReportId, ReportKind,
    Severity,
};
