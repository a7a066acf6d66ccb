//! Ordered extraction rules, one table for all fact keys.
//!
//! Each rule is `pattern → transform → validator`. For a given key the rules
//! are tried in table order; the first rule whose pattern matches decides the
//! key for that message, whether or not its validator accepts the value.

use std::sync::OnceLock;

use regex::Regex;

use crate::facts::FactKey;

const NAME_PHRASE: &str = r"(?i)(?:my name is|i am|i'm|call me)\s+([\w\s\-\.]+)";
const EMAIL: &str = r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}";
const EMAIL_EXACT: &str = r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$";
const PHONE: &str = r"\+?\d[\d\s\-\(\)]{6,}\d";
const NON_DIGIT: &str = r"\D";
const LOCATION: &str =
    r"(?:from|in|located in|city:?)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?(?:,\s*[A-Z]{2})?)";

pub const MIN_PHONE_DIGITS: usize = 10;
pub const MAX_PHONE_DIGITS: usize = 15;

static NAME_PHRASE_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_EXACT_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RE: OnceLock<Regex> = OnceLock::new();
static NON_DIGIT_RE: OnceLock<Regex> = OnceLock::new();
static LOCATION_RE: OnceLock<Regex> = OnceLock::new();

#[allow(clippy::expect_used)]
fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static fact pattern must compile"))
}

fn name_phrase_re() -> &'static Regex {
    compiled(&NAME_PHRASE_RE, NAME_PHRASE)
}

fn email_re() -> &'static Regex {
    compiled(&EMAIL_RE, EMAIL)
}

pub(crate) fn email_exact_re() -> &'static Regex {
    compiled(&EMAIL_EXACT_RE, EMAIL_EXACT)
}

fn phone_re() -> &'static Regex {
    compiled(&PHONE_RE, PHONE)
}

fn non_digit_re() -> &'static Regex {
    compiled(&NON_DIGIT_RE, NON_DIGIT)
}

fn location_re() -> &'static Regex {
    compiled(&LOCATION_RE, LOCATION)
}

/// One step of the extraction cascade for a single key.
pub struct FactRule {
    pub key: FactKey,
    pub label: &'static str,
    /// Finds a raw candidate in the message text.
    pub pattern: fn(&str) -> Option<String>,
    /// Normalizes the candidate before it is validated and stored.
    pub transform: fn(String) -> String,
    /// Final acceptance check on the transformed candidate.
    pub validator: fn(&str) -> bool,
}

impl FactRule {
    /// Runs the rule against `text`.
    ///
    /// `None` means the pattern did not match and the next rule for the key
    /// may be tried. `Some(None)` means the pattern matched but the value was
    /// rejected.
    pub fn apply(&self, text: &str) -> Option<Option<String>> {
        let candidate = (self.pattern)(text)?;
        let value = (self.transform)(candidate);
        Some((self.validator)(&value).then_some(value))
    }
}

pub static RULES: [FactRule; 5] = [
    FactRule {
        key: FactKey::Name,
        label: "name_phrase",
        pattern: match_name_phrase,
        transform: trimmed,
        validator: accept_any,
    },
    FactRule {
        key: FactKey::Name,
        label: "bare_name",
        pattern: match_bare_tokens,
        transform: identity,
        validator: looks_like_name,
    },
    FactRule {
        key: FactKey::Email,
        label: "email",
        pattern: match_email,
        transform: identity,
        validator: has_dotted_domain,
    },
    FactRule {
        key: FactKey::Phone,
        label: "phone",
        pattern: match_phone,
        transform: digits_only,
        validator: is_phone_length,
    },
    FactRule {
        key: FactKey::Location,
        label: "location",
        pattern: match_location,
        transform: trimmed,
        validator: accept_any,
    },
];

/// Rules for `key`, in precedence order.
pub fn rules_for(key: FactKey) -> impl Iterator<Item = &'static FactRule> {
    RULES.iter().filter(move |r| r.key == key)
}

// ────────────────────────────────────────────────────────────────────────────
// Patterns
// ────────────────────────────────────────────────────────────────────────────

fn match_name_phrase(text: &str) -> Option<String> {
    name_phrase_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// A message of two to four whitespace-separated tokens, re-joined.
fn match_bare_tokens(text: &str) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    (2..=4)
        .contains(&words.len())
        .then(|| words.join(" "))
}

fn match_email(text: &str) -> Option<String> {
    email_re().find(text).map(|m| m.as_str().to_string())
}

fn match_phone(text: &str) -> Option<String> {
    phone_re().find(text).map(|m| m.as_str().to_string())
}

fn match_location(text: &str) -> Option<String> {
    location_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Transforms
// ────────────────────────────────────────────────────────────────────────────

fn identity(value: String) -> String {
    value
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

/// Drops everything but decimal digits, in any script.
pub(crate) fn digits_only(value: String) -> String {
    non_digit_re().replace_all(&value, "").into_owned()
}

// ────────────────────────────────────────────────────────────────────────────
// Validators
// ────────────────────────────────────────────────────────────────────────────

fn accept_any(_: &str) -> bool {
    true
}

/// Every token starts uppercase and, ignoring `-` and `.`, is purely alphabetic.
fn looks_like_name(candidate: &str) -> bool {
    candidate.split(' ').all(|word| {
        let starts_upper = word.chars().next().is_some_and(char::is_uppercase);
        let letters: String = word.chars().filter(|c| *c != '-' && *c != '.').collect();
        starts_upper && !letters.is_empty() && letters.chars().all(char::is_alphabetic)
    })
}

pub(crate) fn has_dotted_domain(email: &str) -> bool {
    email
        .split_once('@')
        .is_some_and(|(_, domain)| domain.contains('.'))
}

pub(crate) fn is_phone_length(digits: &str) -> bool {
    (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.chars().count())
}
