// ABOUTME: Provider catalogue and the router that dispatches model calls to the right wire shape.
// ABOUTME: Maps card model ids to providers, resolves credentials, and calls the OpenAI or Gemini adapter.

pub mod gemini;
pub mod openai;

use std::time::Duration;

use async_trait::async_trait;

use crate::prompt::ChatMessage;
use crate::runtime::{AdapterError, ModelClient};

const REQUEST_TIMEOUT_SECS: u64 = 120;

/// The API vendor behind a provider: who gets the request and with which key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    OpenAi,
    Gemini,
    Groq,
    DeepSeek,
}

impl Vendor {
    pub const ALL: [Vendor; 4] = [Vendor::OpenAi, Vendor::Gemini, Vendor::Groq, Vendor::DeepSeek];

    pub fn name(&self) -> &'static str {
        match self {
            Vendor::OpenAi => "openai",
            Vendor::Gemini => "gemini",
            Vendor::Groq => "groq",
            Vendor::DeepSeek => "deepseek",
        }
    }

    pub fn key_var(&self) -> &'static str {
        match self {
            Vendor::OpenAi => "OPENAI_API_KEY",
            Vendor::Gemini => "GEMINI_API_KEY",
            Vendor::Groq => "GROQ_API_KEY",
            Vendor::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }

    pub fn base_url_var(&self) -> &'static str {
        match self {
            Vendor::OpenAi => "OPENAI_BASE_URL",
            Vendor::Gemini => "GEMINI_BASE_URL",
            Vendor::Groq => "GROQ_BASE_URL",
            Vendor::DeepSeek => "DEEPSEEK_BASE_URL",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Vendor::OpenAi => "https://api.openai.com",
            Vendor::Gemini => "https://generativelanguage.googleapis.com",
            Vendor::Groq => "https://api.groq.com/openai",
            Vendor::DeepSeek => "https://api.deepseek.com",
        }
    }

    /// Path of the chat completions endpoint, relative to the base URL.
    fn completions_path(&self) -> &'static str {
        match self {
            Vendor::DeepSeek => "/chat/completions",
            _ => "/v1/chat/completions",
        }
    }
}

/// Closed set of providers a card can name. Adding one means a new variant
/// here plus its row in `resolve`, `vendor`, and `default_model`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Gemini,
    Llama,
    Qwen,
    Kimi,
    GptOss,
    DeepSeek,
}

impl Provider {
    pub const ALL: [Provider; 7] = [
        Provider::OpenAi,
        Provider::Gemini,
        Provider::Llama,
        Provider::Qwen,
        Provider::Kimi,
        Provider::GptOss,
        Provider::DeepSeek,
    ];

    /// The canonical model id a card uses to pick this provider.
    pub fn card_id(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
            Provider::Llama => "llama",
            Provider::Qwen => "qwen",
            Provider::Kimi => "kimi",
            Provider::GptOss => "gptoss",
            Provider::DeepSeek => "deepseek",
        }
    }

    /// Map a card's model id (as picked in the UI) to a provider.
    pub fn resolve(model_id: &str) -> Result<Self, AdapterError> {
        match model_id.trim().to_ascii_lowercase().as_str() {
            "openai" | "chatgpt" | "gpt" => Ok(Provider::OpenAi),
            "gemini" | "google" => Ok(Provider::Gemini),
            "llama" => Ok(Provider::Llama),
            "qwen" => Ok(Provider::Qwen),
            "kimi" => Ok(Provider::Kimi),
            "gptoss" | "gpt-oss" => Ok(Provider::GptOss),
            "deepseek" => Ok(Provider::DeepSeek),
            _ => Err(AdapterError::UnknownProvider(model_id.to_string())),
        }
    }

    pub fn vendor(&self) -> Vendor {
        match self {
            Provider::OpenAi => Vendor::OpenAi,
            Provider::Gemini => Vendor::Gemini,
            Provider::Llama | Provider::Qwen | Provider::Kimi | Provider::GptOss => Vendor::Groq,
            Provider::DeepSeek => Vendor::DeepSeek,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o",
            Provider::Gemini => "gemini-2.5-flash",
            Provider::Llama => "llama-3.3-70b-versatile",
            Provider::Qwen => "qwen/qwen3-32b",
            Provider::Kimi => "moonshotai/kimi-k2-instruct",
            Provider::GptOss => "openai/gpt-oss-120b",
            Provider::DeepSeek => "deepseek-chat",
        }
    }
}

/// Key and base URL for one vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorSettings {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl VendorSettings {
    fn from_env(vendor: Vendor) -> Self {
        let mut api_key = non_empty_env(vendor.key_var());
        if api_key.is_none() && vendor == Vendor::Gemini {
            api_key = non_empty_env("GOOGLE_API_KEY");
        }
        let base_url = non_empty_env(vendor.base_url_var())
            .unwrap_or_else(|| vendor.default_base_url().to_string());
        Self { api_key, base_url }
    }

    fn unconfigured(vendor: Vendor) -> Self {
        Self {
            api_key: None,
            base_url: vendor.default_base_url().to_string(),
        }
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

/// Snapshot of every provider credential, taken once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub openai: VendorSettings,
    pub gemini: VendorSettings,
    pub groq: VendorSettings,
    pub deepseek: VendorSettings,
    /// Send DeepSeek's `Authorization` header as `Bearer<key>` with no
    /// space, matching older deployments.
    pub deepseek_legacy_auth: bool,
}

impl ProviderCredentials {
    /// Read keys and base URLs from the environment. Missing keys are not an
    /// error here; they surface per call.
    pub fn from_env() -> Self {
        let deepseek_legacy_auth = std::env::var("CONCLAVE_DEEPSEEK_LEGACY_AUTH")
            .map(|v| v == "true" || v == "1" || v == "yes")
            .unwrap_or(false);
        Self {
            openai: VendorSettings::from_env(Vendor::OpenAi),
            gemini: VendorSettings::from_env(Vendor::Gemini),
            groq: VendorSettings::from_env(Vendor::Groq),
            deepseek: VendorSettings::from_env(Vendor::DeepSeek),
            deepseek_legacy_auth,
        }
    }

    /// Credentials with no keys at all.
    pub fn empty() -> Self {
        Self {
            openai: VendorSettings::unconfigured(Vendor::OpenAi),
            gemini: VendorSettings::unconfigured(Vendor::Gemini),
            groq: VendorSettings::unconfigured(Vendor::Groq),
            deepseek: VendorSettings::unconfigured(Vendor::DeepSeek),
            deepseek_legacy_auth: false,
        }
    }

    pub fn with_key(mut self, vendor: Vendor, api_key: impl Into<String>) -> Self {
        self.settings_mut(vendor).api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, vendor: Vendor, base_url: impl Into<String>) -> Self {
        self.settings_mut(vendor).base_url = base_url.into();
        self
    }

    pub fn settings(&self, vendor: Vendor) -> &VendorSettings {
        match vendor {
            Vendor::OpenAi => &self.openai,
            Vendor::Gemini => &self.gemini,
            Vendor::Groq => &self.groq,
            Vendor::DeepSeek => &self.deepseek,
        }
    }

    fn settings_mut(&mut self, vendor: Vendor) -> &mut VendorSettings {
        match vendor {
            Vendor::OpenAi => &mut self.openai,
            Vendor::Gemini => &mut self.gemini,
            Vendor::Groq => &mut self.groq,
            Vendor::DeepSeek => &mut self.deepseek,
        }
    }

    /// The API key for a vendor, or a Config error naming the variable.
    pub fn api_key(&self, vendor: Vendor) -> Result<&str, AdapterError> {
        self.settings(vendor)
            .api_key
            .as_deref()
            .ok_or_else(|| AdapterError::Config(vendor.key_var().to_string()))
    }

    /// Value of the `Authorization` header for an OpenAI-shaped vendor.
    pub fn authorization(&self, vendor: Vendor) -> Result<String, AdapterError> {
        let key = self.api_key(vendor)?;
        if vendor == Vendor::DeepSeek && self.deepseek_legacy_auth {
            return Ok(format!("Bearer{}", key));
        }
        Ok(format!("Bearer {}", key))
    }

    fn completions_url(&self, vendor: Vendor) -> String {
        let base = self.settings(vendor).base_url.trim_end_matches('/');
        format!("{}{}", base, vendor.completions_path())
    }
}

/// Production ModelClient: resolves the provider, then calls it over HTTP.
pub struct ProviderRouter {
    client: reqwest::Client,
    credentials: ProviderCredentials,
}

impl ProviderRouter {
    pub fn new(credentials: ProviderCredentials) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self {
            client,
            credentials,
        }
    }

    pub fn from_env() -> Self {
        Self::new(ProviderCredentials::from_env())
    }

    pub fn credentials(&self) -> &ProviderCredentials {
        &self.credentials
    }
}

#[async_trait]
impl ModelClient for ProviderRouter {
    async fn complete(
        &self,
        model_id: &str,
        messages: &[ChatMessage],
    ) -> Result<String, AdapterError> {
        let provider = Provider::resolve(model_id)?;
        let vendor = provider.vendor();
        let model = provider.default_model();

        tracing::debug!(model_id, vendor = vendor.name(), model, "dispatching model call");

        match vendor {
            Vendor::Gemini => {
                let api_key = self.credentials.api_key(vendor)?;
                gemini::complete(
                    &self.client,
                    &self.credentials.gemini.base_url,
                    api_key,
                    model,
                    messages,
                )
                .await
            }
            Vendor::OpenAi | Vendor::Groq | Vendor::DeepSeek => {
                let authorization = self.credentials.authorization(vendor)?;
                openai::complete(
                    &self.client,
                    &self.credentials.completions_url(vendor),
                    &authorization,
                    vendor,
                    model,
                    messages,
                )
                .await
            }
        }
    }
}
