//! Capability traits
//!
//! Every external collaborator sits behind one of these so the router and
//! tools can be exercised with in-process mocks.
//!
//! ```text
//! Tools:
//!   - Tool: named capability, `invoke(&str) -> String`, never fails
//!
//! Collaborators:
//!   - ReasoningProvider: `complete(prompt) -> String`
//!   - KnowledgeBase: `answer(question, top_k) -> KnowledgeAnswer`
//! ```

mod knowledge;
mod reasoning;
mod tool;

pub use knowledge::{KnowledgeAnswer, KnowledgeBase};
pub use reasoning::ReasoningProvider;
pub use tool::Tool;
