//! Conversation routing for the banking assistant
//!
//! Features:
//! - Bounded reasoning loop over an injected reasoning provider
//! - Ordered keyword fallback when reasoning cannot produce a tool selection
//! - Sessions owning an append-only conversation log

pub mod fallback;
pub mod router;
pub mod session;

pub use fallback::{FallbackClassifier, FallbackDecision, FallbackRoute, FallbackRule};
pub use router::{
    ConversationRouter, FallbackReason, RouteOutcome, RoutePath, RouterState, FALLBACK_FAILURE,
};
pub use session::Session;
