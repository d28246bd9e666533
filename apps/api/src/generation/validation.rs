//! Quality gate and clean-up for generated text.
//!
//! Errors make a result invalid but it is still returned to the user; the
//! suspicious-claim patterns only produce warnings for the log.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub const COVER_LETTER_MIN_CHARS: usize = 200;
pub const COVER_LETTER_MAX_CHARS: usize = 2000;
pub const SUMMARY_MIN_CHARS: usize = 100;
/// Matches the summary textarea limit.
pub const SUMMARY_MAX_CHARS: usize = 2000;

const COVER_LETTER_PLACEHOLDERS: &[&str] = &[
    "[Company Name]",
    "[Your Name]",
    "[Position]",
    "Dear Hiring Manager",
    "Sincerely,",
    "Best regards,",
];

/// Claims the candidate data rarely backs up.
static SUSPICIOUS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)certified in",
        r"(?i)licensed to",
        r"(?i)awarded (the|a)",
        r"(?i)published in",
        r"(?i)patent for",
        r"(?i)I have \d+ years",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// `degree in` is suspicious unless it names Computer Science.
static DEGREE_IN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?i)degree in").ok());

static BRACKET_PLACEHOLDER: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\[[A-Z][A-Za-z ]*\]").ok());

static MARKDOWN_STRUCTURE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(#{1,6}\s|[-*•]\s)").ok());

static EXCESS_NEWLINES: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\n{3,}").ok());

static HEADING_MARKERS: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"#{1,6}\s").ok());

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn new(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

fn suspicious_claims(content: &str) -> Vec<String> {
    let mut warnings: Vec<String> = SUSPICIOUS_PATTERNS
        .iter()
        .filter(|re| re.is_match(content))
        .map(|re| format!("May contain unverified claim: {}", re.as_str().trim_start_matches("(?i)")))
        .collect();

    if let Some(re) = DEGREE_IN.as_ref() {
        let unverified = re.find_iter(content).any(|m| {
            let rest = &content[m.end()..];
            !rest
                .get(.." Computer Science".len())
                .is_some_and(|s| s.eq_ignore_ascii_case(" Computer Science"))
        });
        if unverified {
            warnings.push("May contain unverified claim: degree in".to_string());
        }
    }

    warnings
}

fn length_errors(content: &str, what: &str, min: usize, max: usize) -> Vec<String> {
    let len = content.chars().count();
    let mut errors = Vec::new();
    if len < min {
        errors.push(format!("{what} is too short"));
    }
    if len > max {
        errors.push(format!("{what} is too long"));
    }
    errors
}

pub fn validate_cover_letter(content: &str) -> ValidationReport {
    let mut errors = length_errors(
        content,
        "Cover letter",
        COVER_LETTER_MIN_CHARS,
        COVER_LETTER_MAX_CHARS,
    );

    errors.extend(
        COVER_LETTER_PLACEHOLDERS
            .iter()
            .filter(|p| content.contains(*p))
            .map(|p| format!("Contains placeholder: {p}")),
    );

    ValidationReport::new(errors, suspicious_claims(content))
}

pub fn validate_summary(content: &str) -> ValidationReport {
    let content = content.trim();
    let mut errors = length_errors(content, "Summary", SUMMARY_MIN_CHARS, SUMMARY_MAX_CHARS);

    if let Some(m) = BRACKET_PLACEHOLDER.as_ref().and_then(|re| re.find(content)) {
        errors.push(format!("Contains placeholder: {}", m.as_str()));
    }
    if MARKDOWN_STRUCTURE
        .as_ref()
        .is_some_and(|re| re.is_match(content))
    {
        errors.push("Contains markdown headings or bullet points".to_string());
    }

    ValidationReport::new(errors, suspicious_claims(content))
}

/// Strips the wrapping and formatting models add despite being asked not to.
pub fn post_process_cover_letter(content: &str) -> String {
    let mut text = content.trim();
    text = text
        .strip_prefix(['"', '\''])
        .unwrap_or(text);
    text = text.strip_suffix(['"', '\'']).unwrap_or(text);

    let mut processed = match EXCESS_NEWLINES.as_ref() {
        Some(re) => re.replace_all(text, "\n\n").into_owned(),
        None => text.to_string(),
    };
    processed = processed.replace("**", "").replace('*', "");
    if let Some(re) = HEADING_MARKERS.as_ref() {
        processed = re.replace_all(&processed, "").into_owned();
    }

    processed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(len: usize) -> String {
        "Built reliable payment systems. ".repeat(len / 32 + 1)[..len].to_string()
    }

    #[test]
    fn test_valid_cover_letter() {
        let report = validate_cover_letter(&paragraph(600));
        assert!(report.is_valid, "{:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_cover_letter_length_bounds() {
        let short = validate_cover_letter("Too short.");
        assert_eq!(short.errors, vec!["Cover letter is too short"]);

        let long = validate_cover_letter(&paragraph(2001));
        assert_eq!(long.errors, vec!["Cover letter is too long"]);
    }

    #[test]
    fn test_each_placeholder_is_an_error() {
        let content = format!(
            "Dear Hiring Manager, I want to join [Company Name]. {} Sincerely,",
            paragraph(300)
        );
        let report = validate_cover_letter(&content);
        assert!(!report.is_valid);
        assert!(report
            .errors
            .contains(&"Contains placeholder: [Company Name]".to_string()));
        assert!(report
            .errors
            .contains(&"Contains placeholder: Dear Hiring Manager".to_string()));
        assert!(report
            .errors
            .contains(&"Contains placeholder: Sincerely,".to_string()));
    }

    #[test]
    fn test_suspicious_claims_are_only_warnings() {
        let content = format!("{} I have 10 years of experience and I am certified in AWS.", paragraph(300));
        let report = validate_cover_letter(&content);
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_computer_science_degree_is_not_flagged() {
        let ok = format!("{} I hold a degree in Computer Science.", paragraph(300));
        assert!(validate_cover_letter(&ok).warnings.is_empty());

        let flagged = format!("{} I hold a degree in Law.", paragraph(300));
        assert_eq!(
            validate_cover_letter(&flagged).warnings,
            vec!["May contain unverified claim: degree in"]
        );
    }

    #[test]
    fn test_summary_rules() {
        assert!(validate_summary(&paragraph(300)).is_valid);
        assert_eq!(validate_summary("Short.").errors, vec!["Summary is too short"]);

        let placeholder = format!("{} Ready to join [Company Name].", paragraph(200));
        assert_eq!(
            validate_summary(&placeholder).errors,
            vec!["Contains placeholder: [Company Name]"]
        );

        let bullets = format!("- {}\n- {}", paragraph(80), paragraph(80));
        assert!(!validate_summary(&bullets).is_valid);
    }

    #[test]
    fn test_post_process_strips_wrapping_and_markdown() {
        let raw = "  \"## Opening\n**Bold** claim with *emphasis*.\n\n\n\nSecond paragraph.\"  ";
        assert_eq!(
            post_process_cover_letter(raw),
            "Opening\nBold claim with emphasis.\n\nSecond paragraph."
        );
    }

    #[test]
    fn test_post_process_leaves_clean_text_alone() {
        let clean = "First paragraph.\n\nSecond paragraph.";
        assert_eq!(post_process_cover_letter(clean), clean);
    }
}
