// Résumé chat relay.
// Implements: fact pre-extraction, role prompts, provider selection, reply parsing.
// All provider calls go through llm_client, no direct HTTP calls here.

pub mod handlers;
pub mod prompts;
