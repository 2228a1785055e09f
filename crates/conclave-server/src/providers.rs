// ABOUTME: LLM provider status detection for the conclave UI.
// ABOUTME: Reports which vendors have credentials and which card model ids route to each.

use serde::Serialize;

use conclave_agent::{Provider, ProviderCredentials, Vendor};

/// Status of a single LLM vendor.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderInfo {
    pub name: String,
    pub has_api_key: bool,
    pub base_url: String,
    /// Card model ids served by this vendor, with the model each maps to.
    pub models: Vec<ModelInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub card_id: String,
    pub model: String,
}

/// Overall provider status for the UI.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub providers: Vec<ProviderInfo>,
    pub any_available: bool,
}

impl ProviderStatus {
    /// Detect available providers from the environment. Never exposes actual
    /// API key values.
    pub fn detect() -> Self {
        Self::from_credentials(&ProviderCredentials::from_env())
    }

    pub fn from_credentials(credentials: &ProviderCredentials) -> Self {
        let providers: Vec<ProviderInfo> = Vendor::ALL
            .iter()
            .map(|vendor| {
                let settings = credentials.settings(*vendor);
                let models = Provider::ALL
                    .iter()
                    .filter(|p| p.vendor() == *vendor)
                    .map(|p| ModelInfo {
                        card_id: p.card_id().to_string(),
                        model: p.default_model().to_string(),
                    })
                    .collect();
                ProviderInfo {
                    name: vendor.name().to_string(),
                    has_api_key: settings.api_key.is_some(),
                    base_url: settings.base_url.clone(),
                    models,
                }
            })
            .collect();

        let any_available = providers.iter().any(|p| p.has_api_key);

        Self {
            providers,
            any_available,
        }
    }
}
