//! Session management
//!
//! Sessions live in memory, bounded by `max_sessions`, and expire after
//! `session_timeout` without activity. Each session's conversation sits
//! behind an async mutex so its turns run one at a time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::sync::{watch, Mutex};

use bank_assistant_agent::{ConversationRouter, RouteOutcome, Session};
use bank_assistant_config::ServerConfig;
use bank_assistant_core::Turn;

use crate::ServerError;

/// A live chat session
pub struct ChatSession {
    /// Session ID
    pub id: String,
    conversation: Mutex<Session>,
    /// Creation time
    pub created_at: Instant,
    last_activity: RwLock<Instant>,
    active: RwLock<bool>,
}

impl ChatSession {
    fn new(id: String, conversation: Session) -> Self {
        Self {
            id,
            conversation: Mutex::new(conversation),
            created_at: Instant::now(),
            last_activity: RwLock::new(Instant::now()),
            active: RwLock::new(true),
        }
    }

    /// Run one turn; concurrent callers on the same session queue up
    pub async fn chat(&self, message: &str) -> (RouteOutcome, usize) {
        self.touch();
        let mut conversation = self.conversation.lock().await;
        let outcome = conversation.chat_traced(message).await;
        let turns = conversation.turn_count();
        drop(conversation);
        self.touch();
        (outcome, turns)
    }

    pub async fn history(&self) -> Vec<Turn> {
        self.conversation.lock().await.history().to_vec()
    }

    pub async fn turn_count(&self) -> usize {
        self.conversation.lock().await.turn_count()
    }

    pub async fn greeting(&self) -> Option<String> {
        self.conversation.lock().await.greeting().map(str::to_string)
    }

    /// Update last activity
    pub fn touch(&self) {
        *self.last_activity.write() = Instant::now();
    }

    /// Check if session is expired
    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.read().elapsed() > timeout
    }

    /// Close session
    pub fn close(&self) {
        *self.active.write() = false;
    }

    /// Is session active
    pub fn is_active(&self) -> bool {
        *self.active.read()
    }
}

/// Session manager
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<ChatSession>>>,
    router: Arc<ConversationRouter>,
    greeting: Option<String>,
    max_sessions: usize,
    session_timeout: Duration,
    cleanup_interval: Duration,
}

impl SessionManager {
    /// Create a new session manager with the default limits
    pub fn new(router: Arc<ConversationRouter>, max_sessions: usize) -> Self {
        Self::with_config(
            router,
            max_sessions,
            Duration::from_secs(3600),
            Duration::from_secs(300),
        )
    }

    /// Create a new session manager with custom timeout and cleanup interval
    pub fn with_config(
        router: Arc<ConversationRouter>,
        max_sessions: usize,
        session_timeout: Duration,
        cleanup_interval: Duration,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            router,
            greeting: None,
            max_sessions,
            session_timeout,
            cleanup_interval,
        }
    }

    pub fn from_config(router: Arc<ConversationRouter>, config: &ServerConfig) -> Self {
        Self::with_config(
            router,
            config.max_sessions,
            Duration::from_secs(config.session_timeout_secs),
            Duration::from_secs(config.cleanup_interval_secs),
        )
    }

    /// Replace the default welcome message for new sessions
    pub fn with_greeting(mut self, greeting: Option<String>) -> Self {
        self.greeting = greeting;
        self
    }

    /// Start a background task that periodically removes expired sessions.
    ///
    /// Sending `true` on the returned channel stops the task.
    pub fn start_cleanup_task(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let manager = Arc::clone(self);
        let interval = manager.cleanup_interval;

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let removed = manager.cleanup_expired();
                        if removed > 0 {
                            tracing::info!(
                                removed,
                                remaining = manager.count(),
                                "Session cleanup removed expired sessions"
                            );
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::info!("Session cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }

    /// Create a new session
    pub fn create(&self) -> Result<Arc<ChatSession>, ServerError> {
        let mut sessions = self.sessions.write();

        if sessions.len() >= self.max_sessions {
            self.cleanup_expired_internal(&mut sessions);

            if sessions.len() >= self.max_sessions {
                return Err(ServerError::Capacity(self.max_sessions));
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        let conversation = match &self.greeting {
            Some(greeting) => Session::with_greeting(&id, self.router.clone(), greeting.clone()),
            None => Session::new(&id, self.router.clone()),
        };
        let session = Arc::new(ChatSession::new(id.clone(), conversation));
        sessions.insert(id.clone(), session.clone());

        tracing::info!(session_id = %id, active = sessions.len(), "Created session");
        Ok(session)
    }

    /// Get a session by ID
    pub fn get(&self, id: &str) -> Option<Arc<ChatSession>> {
        self.sessions.read().get(id).cloned()
    }

    /// Remove a session; returns whether it existed
    pub fn remove(&self, id: &str) -> bool {
        match self.sessions.write().remove(id) {
            Some(session) => {
                session.close();
                tracing::info!(session_id = %id, "Removed session");
                true
            },
            None => false,
        }
    }

    /// Get active session count
    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Remove expired sessions; returns how many were dropped
    pub fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write();
        self.cleanup_expired_internal(&mut sessions)
    }

    fn cleanup_expired_internal(&self, sessions: &mut HashMap<String, Arc<ChatSession>>) -> usize {
        let timeout = self.session_timeout;
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, s)| s.is_expired(timeout))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            if let Some(session) = sessions.remove(id) {
                session.close();
                tracing::info!(session_id = %id, "Expired session");
            }
        }
        expired.len()
    }

    /// List all session IDs
    pub fn list(&self) -> Vec<String> {
        self.sessions.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bank_assistant_tools::{AgentTool, FinancialCalculatorTool, ToolRegistry, WELCOME};

    fn router() -> Arc<ConversationRouter> {
        let mut registry = ToolRegistry::new();
        registry
            .register(AgentTool::Calculator(FinancialCalculatorTool::new()))
            .unwrap();
        Arc::new(ConversationRouter::with_defaults(None, Arc::new(registry)))
    }

    #[tokio::test]
    async fn test_session_creation() {
        let manager = SessionManager::new(router(), 10);
        let session = manager.create().unwrap();

        assert!(session.is_active());
        assert!(!session.is_expired(Duration::from_secs(60)));
        assert_eq!(session.greeting().await.as_deref(), Some(WELCOME));
        assert_eq!(manager.get(&session.id).unwrap().id, session.id);
    }

    #[tokio::test]
    async fn test_custom_greeting() {
        let manager = SessionManager::new(router(), 10).with_greeting(Some("Hola".to_string()));
        let session = manager.create().unwrap();
        assert_eq!(session.greeting().await.as_deref(), Some("Hola"));
    }

    #[test]
    fn test_session_remove() {
        let manager = SessionManager::new(router(), 10);
        let session = manager.create().unwrap();
        let id = session.id.clone();

        assert!(manager.remove(&id));
        assert!(!manager.remove(&id));
        assert!(manager.get(&id).is_none());
        assert!(!session.is_active());
    }

    #[test]
    fn test_capacity_limit() {
        let manager = SessionManager::new(router(), 2);
        manager.create().unwrap();
        manager.create().unwrap();
        assert!(matches!(manager.create(), Err(ServerError::Capacity(2))));
    }

    #[test]
    fn test_expired_sessions_free_capacity() {
        let manager = SessionManager::with_config(
            router(),
            1,
            Duration::from_millis(0),
            Duration::from_secs(300),
        );
        manager.create().unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert!(manager.create().is_ok());
        assert_eq!(manager.count(), 1);
    }

    #[tokio::test]
    async fn test_chat_records_turns() {
        let manager = SessionManager::new(router(), 10);
        let session = manager.create().unwrap();

        let (outcome, turns) = session.chat("interes 10000 5 2").await;
        assert!(outcome.response.contains("Interés compuesto: $1,025.00"));
        assert_eq!(turns, 3);
        assert_eq!(session.history().await.len(), 3);
    }
}
