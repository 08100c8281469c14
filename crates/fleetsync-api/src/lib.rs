//! Async client for the device administration graph API.
//!
//! Three loosely-coupled backends sit behind one REST surface:
//! the registration system (zero-touch device identities), the
//! management system (enrolled devices), and the directory system
//! (device objects and groups). This crate provides the transport,
//! the paging client, and one stateless operation set per backend.
//! All reconciliation logic lives in `fleetsync-core`.

pub mod autopilot;
pub mod client;
pub mod directory;
pub mod error;
pub mod intune;
pub mod transport;
pub mod types;

pub use autopilot::AutopilotOps;
pub use client::{ApiSurface, GraphClient};
pub use directory::DirectoryOps;
pub use error::{ApiErrorKind, Error};
pub use intune::IntuneOps;
pub use transport::TransportConfig;
