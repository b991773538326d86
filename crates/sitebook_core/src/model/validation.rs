//! Input validation rules for project records.
//!
//! # Responsibility
//! - Decide whether a proposed project name is acceptable.
//! - Parse human-formatted currency/percentage text into numbers.
//!
//! # Invariants
//! - Every rule is a pure function; callers decide how to surface failures.
//! - Name uniqueness is exact and case-sensitive. Search elsewhere is
//!   case-insensitive; the two must not be unified.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Minimum accepted project name length, in characters.
pub const MIN_PROJECT_NAME_CHARS: usize = 5;

static CURRENCY_NOISE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\p{Sc}]+").expect("valid currency noise regex"));
static GROUPED_AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d{1,3}(?:,\d{3})+|\d*)(?:\.\d*)?$")
        .expect("valid grouped amount regex")
});
static DECIMAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)$").expect("valid decimal regex")
});

/// Caller-correctable violation of a project/task input rule.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Name is shorter than [`MIN_PROJECT_NAME_CHARS`].
    NameTooShort { name: String, min_chars: usize },
    /// Name does not start with a letter or digit.
    NameInvalidFirstCharacter { name: String },
    /// Another project already uses this exact name.
    DuplicateName { name: String },
    /// Currency text has non-numeric residue after stripping formatting.
    InvalidCurrency(String),
    /// Percentage text has non-numeric residue after stripping `%`.
    InvalidPercentage(String),
    /// Parsed percentage falls outside 0%..=100%.
    PercentageOutOfRange(String),
    /// Cost is negative or not a number.
    InvalidCost(f64),
    /// Progress is outside `[0, 1]` or not a number.
    InvalidProgress(f64),
    /// Identifier is empty after trim.
    BlankId,
    /// Two tasks in one project share an identifier.
    DuplicateTaskId(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameTooShort { name, min_chars } => write!(
                f,
                "project name `{name}` must be {min_chars} characters or longer"
            ),
            Self::NameInvalidFirstCharacter { name } => write!(
                f,
                "project name `{name}` must start with a letter or number"
            ),
            Self::DuplicateName { name } => {
                write!(f, "a project named `{name}` already exists")
            }
            Self::InvalidCurrency(text) => write!(f, "invalid currency amount: `{text}`"),
            Self::InvalidPercentage(text) => write!(f, "invalid percentage: `{text}`"),
            Self::PercentageOutOfRange(text) => {
                write!(f, "percentage `{text}` must be between 0% and 100%")
            }
            Self::InvalidCost(value) => {
                write!(f, "cost must be a non-negative number, got {value}")
            }
            Self::InvalidProgress(value) => {
                write!(f, "progress must be between 0 and 1, got {value}")
            }
            Self::BlankId => write!(f, "identifier must not be blank"),
            Self::DuplicateTaskId(id) => write!(f, "duplicate task id in project: {id}"),
        }
    }
}

impl Error for ValidationError {}

impl ValidationError {
    /// Stable machine-readable code, safe to log without user content.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NameTooShort { .. } => "name_too_short",
            Self::NameInvalidFirstCharacter { .. } => "name_invalid_first_character",
            Self::DuplicateName { .. } => "duplicate_name",
            Self::InvalidCurrency(_) => "invalid_currency",
            Self::InvalidPercentage(_) => "invalid_percentage",
            Self::PercentageOutOfRange(_) => "percentage_out_of_range",
            Self::InvalidCost(_) => "invalid_cost",
            Self::InvalidProgress(_) => "invalid_progress",
            Self::BlankId => "blank_id",
            Self::DuplicateTaskId(_) => "duplicate_task_id",
        }
    }
}

/// Returns whether `name` satisfies the length and first-character rules.
pub fn is_valid_project_name(name: &str) -> bool {
    check_project_name(name).is_ok()
}

/// Checks the length and first-character rules, naming the violated rule.
///
/// Length is checked first, so a short name with a bad first character
/// reports `NameTooShort`.
pub fn check_project_name(name: &str) -> Result<(), ValidationError> {
    if name.chars().count() < MIN_PROJECT_NAME_CHARS {
        return Err(ValidationError::NameTooShort {
            name: name.to_string(),
            min_chars: MIN_PROJECT_NAME_CHARS,
        });
    }

    match name.chars().next() {
        Some(first) if first.is_alphanumeric() => Ok(()),
        _ => Err(ValidationError::NameInvalidFirstCharacter {
            name: name.to_string(),
        }),
    }
}

/// Returns true iff no entry of `existing_names` equals `name` exactly.
pub fn is_name_unique<'a, I>(name: &str, existing_names: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    existing_names.into_iter().all(|existing| existing != name)
}

/// Parses a formatted currency amount such as `"$ 1,200.50"`.
///
/// Whitespace and currency symbols are stripped. Commas are accepted only as
/// thousands separators (`1,200`); `1,20` or `1.200,50` are rejected.
pub fn parse_currency(text: &str) -> Result<f64, ValidationError> {
    let stripped = CURRENCY_NOISE_RE.replace_all(text, "");
    if !GROUPED_AMOUNT_RE.is_match(&stripped) {
        return Err(ValidationError::InvalidCurrency(text.to_string()));
    }
    parse_decimal(&stripped.replace(',', ""))
        .ok_or_else(|| ValidationError::InvalidCurrency(text.to_string()))
}

/// Parses a percentage such as `"42%"` into a fraction (`0.42`).
///
/// The trailing `%` is optional. Values outside 0..=100 are rejected.
pub fn parse_percentage(text: &str) -> Result<f64, ValidationError> {
    let trimmed = text.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    let percent =
        parse_decimal(number).ok_or_else(|| ValidationError::InvalidPercentage(text.to_string()))?;

    if !(0.0..=100.0).contains(&percent) {
        return Err(ValidationError::PercentageOutOfRange(text.to_string()));
    }
    Ok(percent / 100.0)
}

fn parse_decimal(value: &str) -> Option<f64> {
    if !DECIMAL_RE.is_match(value) {
        return None;
    }
    value.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::{
        check_project_name, is_name_unique, is_valid_project_name, parse_currency,
        parse_percentage, ValidationError,
    };

    #[test]
    fn short_names_fail_length_rule_first() {
        assert!(matches!(
            check_project_name("#ab"),
            Err(ValidationError::NameTooShort { min_chars: 5, .. })
        ));
        assert!(!is_valid_project_name("Tree"));
        assert!(is_valid_project_name("Tower"));
    }

    #[test]
    fn first_character_must_be_letter_or_digit() {
        assert!(matches!(
            check_project_name("#Project"),
            Err(ValidationError::NameInvalidFirstCharacter { .. })
        ));
        assert!(matches!(
            check_project_name(" Tower A"),
            Err(ValidationError::NameInvalidFirstCharacter { .. })
        ));
        assert!(is_valid_project_name("9 Elms Street"));
        assert!(is_valid_project_name("Ébène tower"));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert!(!is_valid_project_name("Éléa"));
        assert!(is_valid_project_name("Éléas"));
    }

    #[test]
    fn uniqueness_is_case_sensitive() {
        let existing = ["Tower A", "Bridge B"];
        assert!(!is_name_unique("Tower A", existing));
        assert!(is_name_unique("tower a", existing));
        assert!(is_name_unique("Tower A", []));
    }

    #[test]
    fn currency_strips_symbols_and_separators() {
        assert_eq!(parse_currency("$ 1,200.50").unwrap(), 1200.50);
        assert_eq!(parse_currency("€3 000").unwrap(), 3000.0);
        assert_eq!(parse_currency("1000").unwrap(), 1000.0);
        assert_eq!(parse_currency(" .5 ").unwrap(), 0.5);
    }

    #[test]
    fn currency_rejects_non_numeric_residue() {
        for input in ["", "$", "12abc", "1.2.3", "USD 10"] {
            assert_eq!(
                parse_currency(input).unwrap_err(),
                ValidationError::InvalidCurrency(input.to_string()),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn currency_accepts_commas_only_as_thousands_separators() {
        assert_eq!(parse_currency("12,345,678").unwrap(), 12_345_678.0);
        assert_eq!(parse_currency("$1,000.5").unwrap(), 1000.5);
        for input in ["1,20", "1.200,50", ",100", "1,0000", "1,,000", "100,"] {
            assert_eq!(
                parse_currency(input).unwrap_err(),
                ValidationError::InvalidCurrency(input.to_string()),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn percentage_divides_by_hundred() {
        assert_eq!(parse_percentage("42%").unwrap(), 0.42);
        assert_eq!(parse_percentage(" 100 % ").unwrap(), 1.0);
        assert_eq!(parse_percentage("0").unwrap(), 0.0);
    }

    #[test]
    fn percentage_rejects_residue_and_out_of_range() {
        assert!(matches!(
            parse_percentage("forty%"),
            Err(ValidationError::InvalidPercentage(_))
        ));
        assert!(matches!(
            parse_percentage("%"),
            Err(ValidationError::InvalidPercentage(_))
        ));
        assert!(matches!(
            parse_percentage("120%"),
            Err(ValidationError::PercentageOutOfRange(_))
        ));
        assert!(matches!(
            parse_percentage("-1%"),
            Err(ValidationError::PercentageOutOfRange(_))
        ));
    }
}
