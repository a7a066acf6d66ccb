use tracing::debug;

use crate::facts::rules::{
    digits_only, email_exact_re, has_dotted_domain, is_phone_length, rules_for,
};
use crate::facts::{FactKey, FactSet};
use crate::models::chat::{ChatTurn, Role};

/// How many trailing turns of the conversation are scanned.
pub const RECENT_TURN_WINDOW: usize = 10;

/// Extracts high-confidence facts from the user turns among the last
/// [`RECENT_TURN_WINDOW`] turns of `history`.
///
/// Turns are scanned most-recent-first; once a key is set, older turns
/// cannot overwrite it. Never fails: a missing key is simply absent.
pub fn extract_facts(history: &[ChatTurn]) -> FactSet {
    let start = history.len().saturating_sub(RECENT_TURN_WINDOW);
    let mut facts = FactSet::new();

    for turn in history[start..]
        .iter()
        .rev()
        .filter(|t| t.role == Role::User)
    {
        if facts.is_complete() {
            break;
        }
        apply_rules(&turn.content, &mut facts);
    }

    debug!("Extracted {} facts from {} turns", facts.len(), history.len());
    facts
}

fn apply_rules(text: &str, facts: &mut FactSet) {
    for key in FactKey::ALL {
        if facts.contains(key) {
            continue;
        }
        for rule in rules_for(key) {
            if let Some(verdict) = rule.apply(text) {
                match verdict {
                    Some(value) => {
                        facts.insert_if_absent(key, value);
                    }
                    None => debug!("Rule {} matched but rejected its candidate", rule.label),
                }
                break;
            }
        }
    }
}

/// True when the whole string is an email address with a dotted domain.
pub fn validate_email(email: &str) -> bool {
    if email.is_empty() {
        return false;
    }
    email_exact_re().is_match(email) && has_dotted_domain(email)
}

/// True when the string carries between 10 and 15 digits, ignoring formatting.
pub fn validate_phone(phone: &str) -> bool {
    if phone.is_empty() {
        return false;
    }
    is_phone_length(&digits_only(phone.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users(messages: &[&str]) -> Vec<ChatTurn> {
        messages.iter().map(|m| ChatTurn::user(*m)).collect()
    }

    #[test]
    fn test_empty_history_yields_no_facts() {
        assert!(extract_facts(&[]).is_empty());
    }

    #[test]
    fn test_name_from_phrase() {
        let facts = extract_facts(&users(&["my name is Jane Doe"]));
        assert_eq!(facts.get(FactKey::Name), Some("Jane Doe"));
        assert_eq!(facts.len(), 1);
    }

    #[test]
    fn test_bare_capitalized_name() {
        let facts = extract_facts(&users(&["John Smith"]));
        assert_eq!(facts.get(FactKey::Name), Some("John Smith"));
        assert_eq!(facts.len(), 1);
    }

    #[test]
    fn test_email_only() {
        let facts = extract_facts(&users(&["reach me at jane.doe@example.com"]));
        assert_eq!(facts.get(FactKey::Email), Some("jane.doe@example.com"));
        assert_eq!(facts.len(), 1);
    }

    #[test]
    fn test_phone_digits_only() {
        let facts = extract_facts(&users(&["call +1 (555) 123-4567"]));
        assert_eq!(facts.get(FactKey::Phone), Some("15551234567"));
        assert_eq!(facts.len(), 1);
    }

    #[test]
    fn test_location_with_state_code() {
        let facts = extract_facts(&users(&["I'm from New York, NY"]));
        assert_eq!(facts.get(FactKey::Location), Some("New York, NY"));
    }

    #[test]
    fn test_newer_turn_wins() {
        let facts = extract_facts(&users(&["my name is Old Name", "my name is New Name"]));
        assert_eq!(facts.get(FactKey::Name), Some("New Name"));
    }

    #[test]
    fn test_keys_resolve_independently_across_turns() {
        let facts = extract_facts(&users(&[
            "my email is old@example.com and I live in Boston",
            "my name is Jane Doe",
            "new email: jane@example.org",
        ]));
        assert_eq!(facts.get(FactKey::Email), Some("jane@example.org"));
        assert_eq!(facts.get(FactKey::Name), Some("Jane Doe"));
        assert_eq!(facts.get(FactKey::Location), Some("Boston"));
    }

    #[test]
    fn test_insertion_order_follows_recency() {
        let facts = extract_facts(&users(&["my name is Jane Doe", "jane@example.org"]));
        let keys: Vec<_> = facts.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![FactKey::Email, FactKey::Name]);
    }

    #[test]
    fn test_assistant_turns_are_ignored() {
        let history = vec![
            ChatTurn::assistant("My name is Resume Bot, email bot@example.com"),
            ChatTurn::user("hello there"),
        ];
        assert!(extract_facts(&history).is_empty());
    }

    #[test]
    fn test_only_last_ten_turns_are_scanned() {
        let mut history = users(&["my name is Too Old"]);
        history.extend((0..10).map(|i| ChatTurn::user(format!("filler message number {i}"))));
        assert_eq!(history.len(), 11);
        assert!(extract_facts(&history).get(FactKey::Name).is_none());

        // Drop one filler so the name turn falls inside the window.
        history.pop();
        assert_eq!(extract_facts(&history).get(FactKey::Name), Some("Too Old"));
    }

    #[test]
    fn test_window_counts_assistant_turns() {
        let mut history = users(&["my name is Jane Doe"]);
        for _ in 0..5 {
            history.push(ChatTurn::assistant("ok"));
            history.push(ChatTurn::user("sure thing ok"));
        }
        assert_eq!(history.len(), 11);
        assert!(extract_facts(&history).is_empty());
    }

    #[test]
    fn test_rejected_phone_does_not_block_older_turn() {
        let facts = extract_facts(&users(&["my phone is 555 123 4567", "pin 1234 5678"]));
        assert_eq!(facts.get(FactKey::Phone), Some("5551234567"));
    }

    #[test]
    fn test_phrase_match_shadows_bare_name_fallback() {
        // The phrase pattern matches, so the capitalized-words fallback is never tried.
        let facts = extract_facts(&users(&["Call Me Maybe"]));
        assert_eq!(facts.get(FactKey::Name), Some("Maybe"));
    }

    #[test]
    fn test_extract_is_idempotent() {
        let history = users(&[
            "John Smith",
            "reach me at jane.doe@example.com",
            "call +1 (555) 123-4567",
        ]);
        assert_eq!(extract_facts(&history), extract_facts(&history));
    }

    #[test]
    fn test_validate_email() {
        assert!(!validate_email("not-an-email"));
        assert!(validate_email("a@b.co"));
        assert!(!validate_email(""));
        assert!(!validate_email("contact: a@b.co"));
        assert!(!validate_email("a@b.c"));
    }

    #[test]
    fn test_validate_phone() {
        assert!(!validate_phone("123"));
        assert!(validate_phone("+1 555 123 4567"));
        assert!(!validate_phone(""));
        assert!(validate_phone("123456789012345"));
        assert!(!validate_phone("1234567890123456"));
    }

    #[test]
    fn test_phone_digits_in_other_scripts() {
        assert!(validate_phone("٠١٢٣٤٥٦٧٨٩"));
        assert!(!validate_phone("٠١٢٣"));
        let facts = extract_facts(&users(&["call ٠١٢-٣٤٥-٦٧٨٩"]));
        assert_eq!(facts.get(FactKey::Phone), Some("٠١٢٣٤٥٦٧٨٩"));
    }
}
