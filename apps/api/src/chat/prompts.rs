// Résumé assistant prompt templates.
// All prompts for the chat module are defined here.

use crate::llm_client::prompts::{
    FENCED_JSON_INSTRUCTION, JSON_ONLY_INSTRUCTION, KNOWN_FACTS_MARKER,
};
use crate::models::chat::PromptRole;

const GENERAL_PREAMBLE: &str = "\
You are a friendly resume-builder assistant. Greet the user first and tell them \
you are a resume builder assistant, then help them turn a casual conversation \
into a complete resume.";

const HR_PREAMBLE: &str = "\
You are a resume-builder assistant working with an HR professional. Keep the \
tone concise and professional, favour role-relevant achievements, and flag \
anything a recruiter would consider missing.";

const EDUCATOR_PREAMBLE: &str = "\
You are a resume-builder assistant helping a student or early-career candidate \
alongside their educator. Be encouraging, explain why each section matters, and \
draw out coursework, projects and activities when work history is thin.";

/// Extraction rules shared by every role and provider.
const EXTRACTION_RULES: &str = r#"After every user message, extract as much structured resume data as you can.

The structured part of every reply has this shape:
{
  "extractedData": {
    "section": "profile|workExperience|educations|skills|projects|custom",
    "fields": { "fieldName": "extracted_value" }
  },
  "nextQuestion": "A single focused next question OR null if finished"
}

Rules:
1. Extract as much structured resume data as possible from every user message.
2. Identify which required fields are STILL missing and ask only for those.
3. If the user's message already answers a future question, extract it and SKIP that question.
4. Never repeat questions already answered in the conversation history.
5. Check the OBSERVED FACTS section if present: those fields are already collected, do not ask again.
6. If you cannot extract a field, return it as an empty string "".
7. Validate email-like strings (must contain '@' and a domain); if invalid, ask to confirm.
8. Ask ONE focused question at a time.

Question order (skip anything already known):
1. Personal details (name, email, phone, location)
2. Current or target job title
3. Most recent work experience (company, position, description)
4. Education (degree, school, graduation year)
5. Top 5 technical skills
6. Projects, certifications, or languages
7. Brief professional summary (2-3 sentences)

When the user says "create resume", "make resume", "generate resume", "done" or "finished",
stop asking questions and output the full combined resume instead:
{
  "profile": {"name": "", "email": "", "phone": "", "location": "", "summary": ""},
  "workExperience": [{"company": "", "position": "", "description": ""}],
  "educations": [{"degree": "", "school": "", "year": ""}],
  "skills": {"technical": [], "soft": []},
  "projects": [{"name": "", "description": ""}],
  "custom": {"certifications": [], "languages": [], "hobbies": []}
}
and tell the user: "Your resume is ready! You can edit any field in the form. Ask me any questions if you need help.""#;

/// System prompt for free-form chat with no structured extraction.
pub const PLAIN_CHAT_SYSTEM: &str = "\
You are a helpful, friendly career assistant. Answer in plain text. \
Do not output JSON or code blocks.";

/// How the provider is expected to shape its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyFormat {
    /// The whole reply is one JSON document (Gemini with a JSON mime type).
    JsonOnly,
    /// Friendly prose followed by a trailing ```json block (OpenRouter).
    ProseWithJsonBlock,
}

fn preamble(role: PromptRole) -> &'static str {
    match role {
        PromptRole::General => GENERAL_PREAMBLE,
        PromptRole::Hr => HR_PREAMBLE,
        PromptRole::Educator => EDUCATOR_PREAMBLE,
    }
}

/// Role prompt: role preamble, output contract, extraction rules.
pub fn role_prompt(role: PromptRole, format: ReplyFormat) -> String {
    let output = match format {
        ReplyFormat::JsonOnly => JSON_ONLY_INSTRUCTION,
        ReplyFormat::ProseWithJsonBlock => FENCED_JSON_INSTRUCTION,
    };
    format!("{}\n\n{}\n\n{}", preamble(role), output, EXTRACTION_RULES)
}

/// Full system text: the role prompt, then the facts block when there is one.
/// The conversation transcript is appended after this by the provider.
pub fn compose_system(role: PromptRole, format: ReplyFormat, facts_context: &str) -> String {
    let mut system = role_prompt(role, format);
    if !facts_context.is_empty() {
        system.push_str("\n\n");
        system.push_str(KNOWN_FACTS_MARKER);
        system.push('\n');
        system.push_str(facts_context);
        system.push('\n');
    }
    system
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_role_has_its_own_preamble() {
        let general = role_prompt(PromptRole::General, ReplyFormat::JsonOnly);
        let hr = role_prompt(PromptRole::Hr, ReplyFormat::JsonOnly);
        let educator = role_prompt(PromptRole::Educator, ReplyFormat::JsonOnly);
        assert_ne!(general, hr);
        assert_ne!(hr, educator);
        assert!(hr.contains("HR professional"));
        for prompt in [&general, &hr, &educator] {
            assert!(prompt.contains("\"extractedData\""));
        }
    }

    #[test]
    fn test_reply_format_selects_output_contract() {
        let json_only = role_prompt(PromptRole::General, ReplyFormat::JsonOnly);
        let prose = role_prompt(PromptRole::General, ReplyFormat::ProseWithJsonBlock);
        assert!(json_only.contains("Do NOT use markdown code fences"));
        assert!(prose.contains("exactly one ```json code block"));
    }

    #[test]
    fn test_compose_without_facts_is_role_prompt() {
        assert_eq!(
            compose_system(PromptRole::Hr, ReplyFormat::JsonOnly, ""),
            role_prompt(PromptRole::Hr, ReplyFormat::JsonOnly)
        );
    }

    #[test]
    fn test_facts_follow_role_prompt() {
        let facts = "---OBSERVED FACTS (already provided by user)---\nname: Jane Doe\n---\n";
        let system = compose_system(PromptRole::General, ReplyFormat::JsonOnly, facts);
        let role_end = role_prompt(PromptRole::General, ReplyFormat::JsonOnly).len();
        let marker_at = system.find(KNOWN_FACTS_MARKER).unwrap();
        assert!(marker_at > role_end);
        assert!(system.ends_with(&format!("{facts}\n")));
    }
}
