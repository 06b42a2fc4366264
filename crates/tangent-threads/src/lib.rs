//! # tangent-threads
//!
//! Thread routing for the tangent engine: deciding which conversation thread
//! a message belongs to, keeping each owner's threads within capacity, and
//! reporting the outcome.
//!
//! - [`ConversationRouter`]: the entry point. One serialized slot per owner,
//!   `route_message`, the read accessors, and `reconcile`.
//! - [`router`]: the pure planning step and the infallible commit.
//! - [`store`]: [`ThreadStore`] and its in-memory implementation.
//! - [`priority`]: five-factor priority scoring.
//! - [`capacity`]: live/background limits and the inactivity timeout.
//! - [`providers`]: collaborator traits with bounded timeouts and local fallbacks.
//! - [`guidance`]: bridge text and response hints.
//! - [`replay`]: idempotent re-delivery.
//! - [`result`]: the read-only result bundle.

#![deny(unsafe_code)]

pub mod capacity;
pub mod config;
pub mod engine;
pub mod errors;
pub mod guidance;
pub mod priority;
pub mod providers;
pub mod replay;
pub mod result;
pub mod router;
pub mod store;

pub use capacity::{CapacityManager, ReconcileReport};
pub use config::{CapacityConfig, HistoryConfig, RouterConfig, RoutingConfig};
pub use engine::{ConversationRouter, RouteContext};
pub use errors::ProviderError;
pub use guidance::{ResponseGuidance, Tone};
pub use priority::{PriorityReport, PriorityScorer};
pub use providers::{EmotionalSignalProvider, RelationshipContext, RelationshipProvider};
pub use result::{ResultBundle, RouteDiagnostics, ThreadAnalysis, ThreadSummary};
pub use router::{RouteRule, RoutingEvent, ThreadRouter};
pub use store::{InMemoryThreadStore, ThreadStore};
