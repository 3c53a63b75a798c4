//! Chat session
//!
//! A session owns its conversation log; the router is shared read-only.
//! `&mut self` on [`Session::chat`] keeps turns strictly sequential.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use bank_assistant_core::{ConversationLog, Turn};
use bank_assistant_tools::WELCOME;

use crate::router::{ConversationRouter, RouteOutcome};

pub struct Session {
    id: String,
    log: ConversationLog,
    router: Arc<ConversationRouter>,
    created_at: DateTime<Utc>,
}

impl Session {
    /// New session opening with the default welcome message
    pub fn new(id: impl Into<String>, router: Arc<ConversationRouter>) -> Self {
        Self::with_greeting(id, router, WELCOME)
    }

    pub fn with_greeting(
        id: impl Into<String>,
        router: Arc<ConversationRouter>,
        greeting: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            log: ConversationLog::with_greeting(greeting),
            router,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn history(&self) -> &[Turn] {
        self.log.turns()
    }

    /// Opening assistant message
    pub fn greeting(&self) -> Option<&str> {
        self.log.turns().first().map(|t| t.content.as_str())
    }

    pub fn turn_count(&self) -> usize {
        self.log.len()
    }

    /// Run one turn and return the response text
    pub async fn chat(&mut self, input: &str) -> String {
        self.chat_traced(input).await.response
    }

    /// Run one turn and return the full routing trace
    pub async fn chat_traced(&mut self, input: &str) -> RouteOutcome {
        self.log.push_user(input);
        let turns = self.log.turns();
        let history = &turns[..turns.len() - 1];

        let outcome = self.router.route(history, input).await;
        tracing::debug!(
            session_id = %self.id,
            path = outcome.path.as_str(),
            turns = self.log.len() + 1,
            "Session turn complete"
        );

        self.log.push_assistant(outcome.response.clone());
        outcome
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("turns", &self.log.len())
            .field("created_at", &self.created_at)
            .finish()
    }
}
