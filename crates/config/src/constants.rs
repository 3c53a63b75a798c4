//! Centralized constants for the banking assistant
//!
//! Single source of truth for endpoints, timeouts and limits. Serde
//! defaults in the settings modules read from here.

/// Service endpoints
pub mod endpoints {
    /// Student record service (MyrluxBack)
    pub const STUDENT_SERVICE_BASE: &str = "http://localhost:11002/api";

    /// DeepSeek OpenAI-compatible API
    pub const DEEPSEEK_DEFAULT: &str = "https://api.deepseek.com/v1";

    /// Local Ollama server
    pub const OLLAMA_DEFAULT: &str = "http://localhost:11434";
}

/// Timeouts (seconds unless noted)
pub mod timeouts {
    /// Student record reads
    pub const STUDENT_SERVICE_SECS: u64 = 10;

    /// Health probes
    pub const HEALTH_CHECK_SECS: u64 = 5;

    /// Reasoning provider requests
    pub const LLM_REQUEST_SECS: u64 = 30;

    /// Initial retry backoff, doubled on each attempt (ms)
    pub const LLM_INITIAL_BACKOFF_MS: u64 = 200;

    /// Single tool execution; longer than any adapter timeout below
    pub const TOOL_EXECUTION_SECS: u64 = 25;

    /// Knowledge system queries
    pub const KNOWLEDGE_QUERY_SECS: u64 = 20;
}

/// Limits
pub mod limits {
    /// Reasoning iterations per turn before falling back
    pub const MAX_REASONING_ITERATIONS: u32 = 3;

    /// Upper bound accepted by validation
    pub const MAX_REASONING_ITERATIONS_CEILING: u32 = 10;

    /// Students rendered by a full listing
    pub const MAX_LISTED_STUDENTS: usize = 10;

    /// Documents requested from the knowledge system
    pub const KNOWLEDGE_TOP_K: usize = 3;

    /// Retries for transient provider failures
    pub const LLM_MAX_RETRIES: u32 = 2;

    /// Concurrent chat sessions held by the server
    pub const MAX_SESSIONS: usize = 100;
}

/// Default model identifiers
pub mod models {
    pub const DEEPSEEK_CHAT: &str = "deepseek-chat";
    pub const OLLAMA_DEFAULT: &str = "qwen2.5:7b-instruct";
}
