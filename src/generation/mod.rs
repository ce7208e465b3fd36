//! Question generation: the collaborator seam, prompt contract, and per-tier fan-out.

pub mod collaborator;
pub mod llm;
pub mod orchestrator;
pub mod prompt;

pub use collaborator::{GenerationCollaborator, GenerationContext, GenerationOptions, JsonPrompt};
pub use llm::ProviderCollaborator;
pub use orchestrator::{generate_multi_tier, generate_tier, GenerationRequest};
