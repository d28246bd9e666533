use serde::Serialize;

/// A known OpenAI-compatible hosting service the settings panel can pre-fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderPreset {
    pub name: &'static str,
    #[serde(rename = "baseURL")]
    pub base_url: &'static str,
    pub description: &'static str,
    /// Serves `GET /models`.
    pub supports_models: bool,
    /// Needs an API key to list models.
    pub requires_auth: bool,
    /// Shown when the model list cannot be fetched.
    pub common_models: &'static [&'static str],
}

pub const PROVIDER_PRESETS: &[ProviderPreset] = &[
    ProviderPreset {
        name: "OpenAI",
        base_url: "https://api.openai.com/v1",
        description: "Official OpenAI API (GPT-4, GPT-4o, GPT-4o-mini)",
        supports_models: true,
        requires_auth: true,
        common_models: &["gpt-4o", "gpt-4o-mini", "gpt-4-turbo", "gpt-4", "gpt-3.5-turbo"],
    },
    ProviderPreset {
        name: "OpenRouter",
        base_url: "https://openrouter.ai/api/v1",
        description: "Access 100+ models (Gemini, Claude, GPT, Llama, etc.)",
        supports_models: true,
        requires_auth: true,
        common_models: &[
            "google/gemini-2.0-flash-exp",
            "google/gemini-2.0-flash-thinking-exp:free",
            "anthropic/claude-3.5-sonnet",
            "openai/gpt-4o-mini",
            "deepseek/deepseek-r1",
        ],
    },
    ProviderPreset {
        name: "Groq",
        base_url: "https://api.groq.com/openai/v1",
        description: "Ultra-fast inference (Llama, Mixtral, Gemma)",
        supports_models: true,
        requires_auth: true,
        common_models: &[
            "llama-3.3-70b-versatile",
            "llama-3.1-70b-versatile",
            "mixtral-8x7b-32768",
            "gemma2-9b-it",
        ],
    },
    ProviderPreset {
        name: "xAI (Grok)",
        base_url: "https://api.x.ai/v1",
        description: "xAI Grok models",
        supports_models: true,
        requires_auth: true,
        common_models: &["grok-beta", "grok-vision-beta"],
    },
    ProviderPreset {
        name: "Together AI",
        base_url: "https://api.together.xyz/v1",
        description: "Open source models",
        supports_models: true,
        requires_auth: true,
        common_models: &[
            "meta-llama/Llama-3.3-70B-Instruct-Turbo",
            "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo",
            "mistralai/Mixtral-8x7B-Instruct-v0.1",
            "Qwen/Qwen2.5-72B-Instruct-Turbo",
        ],
    },
    ProviderPreset {
        name: "Local (LM Studio)",
        base_url: "http://localhost:1234/v1",
        description: "Local AI server (LM Studio, Ollama, etc.)",
        supports_models: true,
        requires_auth: false,
        common_models: &[
            "llama-3.1-8b-instruct",
            "llama-3.3-70b-instruct",
            "qwen2.5-7b-instruct",
        ],
    },
];

pub const CUSTOM_PROVIDER: ProviderPreset = ProviderPreset {
    name: "Custom",
    base_url: "",
    description: "Enter your own API URL",
    supports_models: false,
    requires_auth: true,
    common_models: &[],
};

/// Case-insensitive lookup; a trailing slash on `base_url` is ignored.
pub fn find_by_url(base_url: &str) -> Option<&'static ProviderPreset> {
    let wanted = base_url.trim().trim_end_matches('/');
    PROVIDER_PRESETS
        .iter()
        .find(|p| p.base_url.eq_ignore_ascii_case(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        let preset = find_by_url("HTTPS://API.OPENAI.COM/V1").unwrap();
        assert_eq!(preset.name, "OpenAI");
        assert!(find_by_url("https://api.groq.com/openai/v1/").is_some());
        assert!(find_by_url("https://example.com/v1").is_none());
    }

    #[test]
    fn test_local_preset_needs_no_auth() {
        let local = find_by_url("http://localhost:1234/v1").unwrap();
        assert!(!local.requires_auth);
        assert!(local.common_models.contains(&"qwen2.5-7b-instruct"));
    }

    #[test]
    fn test_preset_wire_names() {
        let json = serde_json::to_value(&PROVIDER_PRESETS[0]).unwrap();
        assert_eq!(json["baseURL"], "https://api.openai.com/v1");
        assert_eq!(json["commonModels"][1], "gpt-4o-mini");
    }
}
