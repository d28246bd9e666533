use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "http://localhost:1234";
pub const DEFAULT_API_KEY: &str = "DUMMYTOKEN";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_JOB_DESCRIPTION: &str = "\
Senior Full-Stack Engineer

What you'll own
Lead frontend experiences in React/Next.js, shipping polished UI that converts
Drive features end-to-end: scope, design, build, launch, iterate
Partner with customers to validate problems and close feedback loops

What you bring
5+ years full-stack with strong frontend skills in React/Next.js/TypeScript
Fluency across Node.js, APIs and microservices
Clear communication; thrives in ambiguity

Nice to have
Built high-volume, greenfield UX from zero to one";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderType {
    #[default]
    #[serde(rename = "openai-compatible")]
    OpenAiCompatible,
    #[serde(rename = "gemini")]
    Gemini,
}

/// Settings the AI panel edits. `api_url` only applies to OpenAI-compatible
/// servers; Gemini always uses Google's endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiSettings {
    pub provider_type: ProviderType,
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub job_description: String,
    pub remember_credentials: bool,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider_type: ProviderType::default(),
            api_url: DEFAULT_API_URL.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            model: DEFAULT_MODEL.to_string(),
            job_description: DEFAULT_JOB_DESCRIPTION.to_string(),
            remember_credentials: true,
        }
    }
}

/// Partial update from the settings form. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSettingsUpdate {
    pub provider_type: Option<ProviderType>,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub job_description: Option<String>,
    pub remember_credentials: Option<bool>,
}

impl AiSettings {
    pub fn apply(&mut self, update: AiSettingsUpdate) {
        if let Some(v) = update.provider_type {
            self.provider_type = v;
        }
        if let Some(v) = update.api_url {
            self.api_url = v;
        }
        if let Some(v) = update.api_key {
            self.api_key = v;
        }
        if let Some(v) = update.model {
            self.model = v;
        }
        if let Some(v) = update.job_description {
            self.job_description = v;
        }
        if let Some(v) = update.remember_credentials {
            self.remember_credentials = v;
        }
    }
}

/// What lands on disk. Credentials are blanked when the user opts out of
/// remembering them, but the last job description is still kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredentials {
    pub api_url: String,
    pub api_key: String,
    pub remember_credentials: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_job_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_type: Option<ProviderType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl From<&AiSettings> for StoredCredentials {
    fn from(s: &AiSettings) -> Self {
        Self {
            api_url: s.api_url.clone(),
            api_key: s.api_key.clone(),
            remember_credentials: s.remember_credentials,
            last_job_description: Some(s.job_description.clone()),
            provider_type: Some(s.provider_type),
            model: Some(s.model.clone()),
        }
    }
}

impl AiSettings {
    /// Rebuilds settings from a stored record. Blank URL/key fall back to the
    /// defaults and a restored record always counts as remembered.
    pub fn from_stored(stored: StoredCredentials) -> Self {
        let defaults = AiSettings::default();
        let non_blank = |s: String, fallback: String| {
            if s.trim().is_empty() {
                fallback
            } else {
                s
            }
        };
        Self {
            provider_type: stored.provider_type.unwrap_or(defaults.provider_type),
            api_url: non_blank(stored.api_url, defaults.api_url),
            api_key: non_blank(stored.api_key, defaults.api_key),
            model: non_blank(stored.model.unwrap_or_default(), defaults.model),
            job_description: non_blank(
                stored.last_job_description.unwrap_or_default(),
                defaults.job_description,
            ),
            remember_credentials: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Idle,
    Testing,
    Valid,
    Invalid,
}
