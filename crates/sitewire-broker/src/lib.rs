//! # sitewire-broker
//!
//! The single authority over the live project collection shared by the
//! messaging surface and the photo-capture surface.  All mutation happens as
//! whole-collection functional replacement through one entry point, so a
//! reader always observes either the fully-old or the fully-new collection,
//! and untouched projects and channels stay pointer-identical across an
//! update.
//!
//! The broker is an explicitly constructed value owned by the composition
//! root and injected where needed; there is no global instance.

pub mod broker;

mod error;

pub use broker::{MessageBroker, ProjectsSnapshot};
pub use error::BrokerError;
