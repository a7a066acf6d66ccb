// Shared prompt fragments for provider output formats.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments only.

/// Output contract for providers asked for a JSON-only reply.
pub const JSON_ONLY_INSTRUCTION: &str = "\
You MUST respond with a single valid JSON object and nothing else. \
Do NOT include any text outside the JSON object. \
Do NOT use markdown code fences.";

/// Output contract for providers that answer in prose plus one JSON block.
pub const FENCED_JSON_INSTRUCTION: &str = "\
First reply with one or two short, friendly plain-text sentences. \
Then end the reply with exactly one ```json code block and nothing after it.";

/// Marker placed before an injected facts block.
pub const KNOWN_FACTS_MARKER: &str = "---KNOWN FACTS---";
