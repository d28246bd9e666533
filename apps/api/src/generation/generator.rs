//! Document generation: turns the résumé plus a job description into a
//! cover letter body or a professional summary.
//!
//! Flow: build prompt → pick provider parameters → generate (streamed for
//! Gemini, optional for OpenAI-compatible) → clean up → validate → return.
//!
//! Invalid output is still returned: the user decides whether to keep it,
//! the validation report tells them why it may need edits.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ai::{AiError, AiMessage, AiProvider, AiRequest, ProgressFn};
use crate::errors::AppError;
use crate::generation::prompts::{
    ACCURACY_REQUIREMENTS, ACCURACY_VERIFICATION, COVER_LETTER_PROMPT_TEMPLATE,
    COVER_LETTER_SYSTEM, SUMMARY_PROMPT_TEMPLATE, SUMMARY_SYSTEM,
};
use crate::generation::validation::{
    post_process_cover_letter, validate_cover_letter, validate_summary, ValidationReport,
};
use crate::models::resume::ResumeData;
use crate::models::settings::ProviderType;

const TOP_EXPERIENCES: usize = 3;
const TOP_ACHIEVEMENTS: usize = 3;
const TOP_SKILLS: usize = 15;

const TEMPERATURE: f32 = 0.7;
const TOP_P: f32 = 0.9;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    Summary,
    CoverLetter,
}

impl DocumentKind {
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Summary => "Summary",
            DocumentKind::CoverLetter => "Cover letter",
        }
    }

    /// Gemini's thinking models spend part of the budget before writing.
    fn max_tokens(self, provider: ProviderType) -> u32 {
        match (self, provider) {
            (DocumentKind::CoverLetter, ProviderType::OpenAiCompatible) => 800,
            (DocumentKind::CoverLetter, ProviderType::Gemini) => 8192,
            (DocumentKind::Summary, ProviderType::OpenAiCompatible) => 500,
            (DocumentKind::Summary, ProviderType::Gemini) => 4096,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationOutcome {
    pub content: String,
    pub validation: ValidationReport,
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt assembly
// ────────────────────────────────────────────────────────────────────────────

/// Single-pass `{key}` substitution, so text inserted from the résumé or job
/// description is never itself treated as a placeholder.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn experience_summary(resume: &ResumeData) -> String {
    let jobs: Vec<String> = resume
        .work_experience
        .iter()
        .take(TOP_EXPERIENCES)
        .map(|job| {
            let achievements: Vec<&str> = job.achievements().take(TOP_ACHIEVEMENTS).collect();
            format!("{} at {}: {}", job.position, job.company, achievements.join("; "))
        })
        .collect();

    if jobs.is_empty() {
        "No work experience provided".to_string()
    } else {
        jobs.join("\n\n")
    }
}

fn skills_list(resume: &ResumeData) -> String {
    let skills: Vec<&str> = resume
        .skills
        .iter()
        .flat_map(|group| group.skills.iter())
        .map(|s| s.text.trim())
        .filter(|s| !s.is_empty())
        .take(TOP_SKILLS)
        .collect();

    if skills.is_empty() {
        "No skills provided".to_string()
    } else {
        skills.join(", ")
    }
}

fn education_list(resume: &ResumeData) -> String {
    let entries: Vec<String> = resume
        .education
        .iter()
        .filter(|e| !e.school.trim().is_empty() || !e.degree.trim().is_empty())
        .map(|e| match e.degree.trim() {
            "" => e.school.clone(),
            degree => format!("{degree}, {}", e.school),
        })
        .collect();

    if entries.is_empty() {
        "No education provided".to_string()
    } else {
        entries.join("\n")
    }
}

fn languages_list(resume: &ResumeData) -> String {
    let languages: Vec<&str> = resume
        .languages
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    if languages.is_empty() {
        "Not specified".to_string()
    } else {
        languages.join(", ")
    }
}

pub fn build_cover_letter_prompt(resume: &ResumeData, job_description: &str) -> String {
    let experience = experience_summary(resume);
    let skills = skills_list(resume);

    fill_template(
        COVER_LETTER_PROMPT_TEMPLATE,
        &[
            ("name", resume.name.as_str()),
            ("position", resume.position.as_str()),
            ("summary", resume.summary.as_str()),
            ("experience", experience.as_str()),
            ("skills", skills.as_str()),
            ("job_description", job_description),
            ("accuracy_requirements", ACCURACY_REQUIREMENTS),
            ("accuracy_verification", ACCURACY_VERIFICATION),
        ],
    )
}

pub fn build_summary_prompt(resume: &ResumeData, job_description: &str) -> String {
    let experience = experience_summary(resume);
    let skills = skills_list(resume);
    let education = education_list(resume);
    let languages = languages_list(resume);

    fill_template(
        SUMMARY_PROMPT_TEMPLATE,
        &[
            ("name", resume.name.as_str()),
            ("position", resume.position.as_str()),
            ("summary", resume.summary.as_str()),
            ("experience", experience.as_str()),
            ("education", education.as_str()),
            ("skills", skills.as_str()),
            ("languages", languages.as_str()),
            ("job_description", job_description),
            ("accuracy_requirements", ACCURACY_REQUIREMENTS),
            ("accuracy_verification", ACCURACY_VERIFICATION),
        ],
    )
}

pub fn build_request(
    kind: DocumentKind,
    resume: &ResumeData,
    job_description: &str,
    provider: ProviderType,
) -> AiRequest {
    let (system, prompt) = match kind {
        DocumentKind::CoverLetter => (
            COVER_LETTER_SYSTEM,
            build_cover_letter_prompt(resume, job_description),
        ),
        DocumentKind::Summary => (SUMMARY_SYSTEM, build_summary_prompt(resume, job_description)),
    };

    AiRequest {
        messages: vec![AiMessage::system(system), AiMessage::user(prompt)],
        temperature: Some(TEMPERATURE),
        max_tokens: Some(kind.max_tokens(provider)),
        top_p: Some(TOP_P),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generation
// ────────────────────────────────────────────────────────────────────────────

/// Generates one document. `stream` is honoured for OpenAI-compatible servers;
/// Gemini always streams so long answers are not truncated.
async fn generate_document(
    provider: &dyn AiProvider,
    kind: DocumentKind,
    resume: &ResumeData,
    job_description: &str,
    stream: bool,
    on_progress: ProgressFn<'_>,
) -> Result<GenerationOutcome, AppError> {
    let job_description = job_description.trim();
    if job_description.is_empty() {
        return Err(AppError::Validation(
            "Job description cannot be empty".to_string(),
        ));
    }

    let provider_type = provider.provider_type();
    let request = build_request(kind, resume, job_description, provider_type);
    let streamed = stream || provider_type == ProviderType::Gemini;

    info!(
        "Generating {} via {:?} (streaming: {streamed})",
        kind.label().to_lowercase(),
        provider_type
    );

    let raw = if streamed {
        provider.generate_stream(&request, on_progress).await?
    } else {
        provider.generate(&request).await?.content
    };

    let (content, validation) = match kind {
        DocumentKind::CoverLetter => {
            let content = post_process_cover_letter(&raw);
            let report = validate_cover_letter(&content);
            (content, report)
        }
        DocumentKind::Summary => {
            let content = raw.trim().to_string();
            let report = validate_summary(&content);
            (content, report)
        }
    };

    if content.is_empty() {
        return Err(AiError::EmptyContent.into());
    }
    if !validation.is_valid {
        warn!("{} validation warnings: {:?}", kind.label(), validation.errors);
    }
    for warning in &validation.warnings {
        warn!("{}: {warning}", kind.label());
    }

    Ok(GenerationOutcome {
        content,
        validation,
    })
}

pub async fn generate_cover_letter(
    provider: &dyn AiProvider,
    resume: &ResumeData,
    job_description: &str,
    stream: bool,
    on_progress: ProgressFn<'_>,
) -> Result<GenerationOutcome, AppError> {
    generate_document(
        provider,
        DocumentKind::CoverLetter,
        resume,
        job_description,
        stream,
        on_progress,
    )
    .await
}

pub async fn generate_summary(
    provider: &dyn AiProvider,
    resume: &ResumeData,
    job_description: &str,
    stream: bool,
    on_progress: ProgressFn<'_>,
) -> Result<GenerationOutcome, AppError> {
    generate_document(
        provider,
        DocumentKind::Summary,
        resume,
        job_description,
        stream,
        on_progress,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiResponse, StreamProgress};
    use crate::models::resume::{Skill, SkillGroup, WorkExperience};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted provider that records which call path was used.
    struct FakeProvider {
        kind: ProviderType,
        reply: String,
        calls: Mutex<Vec<(&'static str, AiRequest)>>,
    }

    impl FakeProvider {
        fn new(kind: ProviderType, reply: &str) -> Self {
            Self {
                kind,
                reply: reply.to_string(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn last_call(&self) -> (&'static str, AiRequest) {
            self.calls.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl AiProvider for FakeProvider {
        fn provider_type(&self) -> ProviderType {
            self.kind
        }

        async fn generate(&self, request: &AiRequest) -> Result<AiResponse, AiError> {
            self.calls.lock().unwrap().push(("generate", request.clone()));
            Ok(AiResponse {
                content: self.reply.clone(),
                model: "fake".to_string(),
                usage: None,
            })
        }

        async fn generate_stream(
            &self,
            request: &AiRequest,
            on_progress: ProgressFn<'_>,
        ) -> Result<String, AiError> {
            self.calls.lock().unwrap().push(("stream", request.clone()));
            on_progress(StreamProgress::delta(self.reply.clone()));
            on_progress(StreamProgress::finished());
            Ok(self.reply.clone())
        }

        async fn test_connection(&self) -> Result<(), AiError> {
            Ok(())
        }

        async fn fetch_models(&self) -> Vec<String> {
            Vec::new()
        }
    }

    fn resume() -> ResumeData {
        ResumeData {
            name: "John Doe".to_string(),
            position: "Software Engineer".to_string(),
            summary: "Experienced software engineer".to_string(),
            work_experience: (1..=4)
                .map(|i| WorkExperience {
                    company: format!("Company {i}"),
                    position: format!("Role {i}"),
                    key_achievements: "Built scalable systems\n\nReduced bugs by 50%\nLed 5 engineers\nShipped v2".to_string(),
                    ..Default::default()
                })
                .collect(),
            skills: vec![SkillGroup {
                title: "Programming".to_string(),
                skills: (1..=20).map(|i| Skill::new(&format!("Skill{i}"))).collect(),
            }],
            ..Default::default()
        }
    }

    fn letter() -> String {
        "I am excited to apply for this role. ".repeat(10)
    }

    fn no_progress() -> impl Fn(StreamProgress) + Send + Sync {
        |_| {}
    }

    #[test]
    fn test_cover_letter_prompt_content() {
        let prompt = build_cover_letter_prompt(&resume(), "We need a Rust engineer.");
        assert!(prompt.contains("Name: John Doe"));
        assert!(prompt.contains(
            "Role 1 at Company 1: Built scalable systems; Reduced bugs by 50%; Led 5 engineers"
        ));
        assert!(prompt.contains("Role 3 at Company 3"));
        assert!(!prompt.contains("Company 4"));
        assert!(prompt.contains("Skill15"));
        assert!(!prompt.contains("Skill16"));
        assert!(prompt.contains("We need a Rust engineer."));
        assert!(prompt.contains("CRITICAL REQUIREMENTS"));
        assert!(prompt.contains("no \"Sincerely, John Doe\""));
    }

    #[test]
    fn test_prompt_fallbacks_for_empty_resume() {
        let prompt = build_cover_letter_prompt(&ResumeData::default(), "JD");
        assert!(prompt.contains("No work experience provided"));
        assert!(prompt.contains("Technical Skills: No skills provided"));

        let summary = build_summary_prompt(&ResumeData::default(), "JD");
        assert!(summary.contains("No education provided"));
        assert!(summary.contains("Languages: Not specified"));
    }

    #[test]
    fn test_inserted_text_is_not_reinterpreted() {
        let prompt = build_cover_letter_prompt(&resume(), "Mention {skills} literally");
        assert!(prompt.contains("Mention {skills} literally"));
    }

    #[test]
    fn test_fill_template_keeps_unknown_braces() {
        assert_eq!(
            fill_template("{a} and {b} {", &[("a", "x")]),
            "x and {b} {"
        );
    }

    #[test]
    fn test_request_parameters_per_provider() {
        let r = resume();
        let openai = build_request(DocumentKind::CoverLetter, &r, "JD", ProviderType::OpenAiCompatible);
        assert_eq!(openai.max_tokens, Some(800));
        assert_eq!(openai.temperature, Some(0.7));
        assert_eq!(openai.top_p, Some(0.9));
        assert_eq!(openai.messages[0].content, COVER_LETTER_SYSTEM);

        let gemini = build_request(DocumentKind::Summary, &r, "JD", ProviderType::Gemini);
        assert_eq!(gemini.max_tokens, Some(4096));
        assert_eq!(gemini.messages[0].content, SUMMARY_SYSTEM);
    }

    #[tokio::test]
    async fn test_blank_job_description_is_rejected() {
        let provider = FakeProvider::new(ProviderType::OpenAiCompatible, "x");
        let progress = no_progress();
        let err = generate_cover_letter(&provider, &resume(), "   ", false, &progress)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cover_letter_is_post_processed_and_validated() {
        let reply = format!("\"**{}**\"", letter());
        let provider = FakeProvider::new(ProviderType::OpenAiCompatible, &reply);
        let progress = no_progress();
        let outcome = generate_cover_letter(&provider, &resume(), "JD", false, &progress)
            .await
            .unwrap();

        assert_eq!(outcome.content, letter().trim());
        assert!(outcome.validation.is_valid);
        assert_eq!(provider.last_call().0, "generate");
    }

    #[tokio::test]
    async fn test_invalid_output_is_still_returned() {
        let provider =
            FakeProvider::new(ProviderType::OpenAiCompatible, "Dear Hiring Manager, hire me.");
        let progress = no_progress();
        let outcome = generate_cover_letter(&provider, &resume(), "JD", false, &progress)
            .await
            .unwrap();

        assert_eq!(outcome.content, "Dear Hiring Manager, hire me.");
        assert!(!outcome.validation.is_valid);
        assert!(outcome
            .validation
            .errors
            .contains(&"Cover letter is too short".to_string()));
    }

    #[tokio::test]
    async fn test_gemini_always_streams() {
        let provider = FakeProvider::new(ProviderType::Gemini, &letter());
        let seen = Mutex::new(Vec::new());
        let progress = |p: StreamProgress| seen.lock().unwrap().push(p);
        generate_summary(&provider, &resume(), "JD", false, &progress)
            .await
            .unwrap();

        let (path, request) = provider.last_call();
        assert_eq!(path, "stream");
        assert_eq!(request.max_tokens, Some(4096));
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_openai_streams_when_asked() {
        let provider = FakeProvider::new(ProviderType::OpenAiCompatible, &letter());
        let progress = no_progress();
        generate_summary(&provider, &resume(), "JD", true, &progress)
            .await
            .unwrap();
        assert_eq!(provider.last_call().0, "stream");
    }

    #[tokio::test]
    async fn test_output_emptied_by_cleanup_is_an_error() {
        let provider = FakeProvider::new(ProviderType::OpenAiCompatible, "** **");
        let progress = no_progress();
        let err = generate_cover_letter(&provider, &resume(), "JD", false, &progress)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Ai(AiError::EmptyContent)));
    }
}
