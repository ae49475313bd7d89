//! The user's deployment configuration: GPU profile, LLM provider and feature toggles.
//!
//! Values are immutable by convention. Every change goes through a
//! [`ConfigCommand`] applied with [`AppConfig::apply`], which hands back a new
//! configuration; renderers are pure functions of that value.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GpuProfile {
    Low,
    Mid,
    High,
}

impl GpuProfile {
    pub fn all() -> Vec<GpuProfile> {
        vec![GpuProfile::Low, GpuProfile::Mid, GpuProfile::High]
    }

    /// Label interpolated into the generated scripts
    pub fn label(&self) -> &'static str {
        match self {
            GpuProfile::Low => "Integrated Graphics / CPU",
            GpuProfile::Mid => "NVIDIA RTX 3060/4060 (8GB)",
            GpuProfile::High => "NVIDIA RTX 3090/4090 (24GB+)",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GpuProfile::Low => "low",
            GpuProfile::Mid => "mid",
            GpuProfile::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(GpuProfile::Low),
            "mid" => Some(GpuProfile::Mid),
            "high" => Some(GpuProfile::High),
            _ => None,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            GpuProfile::Low => GpuProfile::Mid,
            GpuProfile::Mid => GpuProfile::High,
            GpuProfile::High => GpuProfile::Low,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            GpuProfile::Low => GpuProfile::High,
            GpuProfile::Mid => GpuProfile::Low,
            GpuProfile::High => GpuProfile::Mid,
        }
    }

    /// Extra hint shown under the profile selector
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            GpuProfile::Mid => Some("Optimized for RTX 4060 Ti (8GB/16GB)"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LlmProvider {
    Gemini,
    Ollama,
    OpenAI,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "gemini",
            LlmProvider::Ollama => "ollama",
            LlmProvider::OpenAI => "openai",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Some(LlmProvider::Gemini),
            "ollama" => Some(LlmProvider::Ollama),
            "openai" => Some(LlmProvider::OpenAI),
            _ => None,
        }
    }

    pub fn all() -> Vec<LlmProvider> {
        vec![LlmProvider::Gemini, LlmProvider::Ollama, LlmProvider::OpenAI]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "Gemini (Cloud)",
            LlmProvider::Ollama => "Ollama (Local)",
            LlmProvider::OpenAI => "ChatGPT (OpenAI)",
        }
    }

    pub fn blurb(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "High Speed, No VRAM. Supports Deep Thinking & Imagen 3.",
            LlmProvider::Ollama => "Requires 8GB+ VRAM. Good for privacy, slower for reasoning.",
            LlmProvider::OpenAI => "Cloud API. Requires an OpenAI key in the generated .env.",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            LlmProvider::Gemini => LlmProvider::Ollama,
            LlmProvider::Ollama => LlmProvider::OpenAI,
            LlmProvider::OpenAI => LlmProvider::Gemini,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LlmProvider::Gemini => LlmProvider::OpenAI,
            LlmProvider::Ollama => LlmProvider::Gemini,
            LlmProvider::OpenAI => LlmProvider::Ollama,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    TextToImage,
    ImageToVideo,
    DocumentUpload,
    WebSearch,
    DeepThinking,
}

impl Feature {
    /// Declaration order, which is also the order used in the context string
    pub fn all() -> [Feature; 5] {
        [
            Feature::TextToImage,
            Feature::ImageToVideo,
            Feature::DocumentUpload,
            Feature::WebSearch,
            Feature::DeepThinking,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            Feature::TextToImage => "textToImage",
            Feature::ImageToVideo => "imageToVideo",
            Feature::DocumentUpload => "documentUpload",
            Feature::WebSearch => "webSearch",
            Feature::DeepThinking => "deepThinking",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Feature::TextToImage => "Imagen 3 Generation",
            Feature::ImageToVideo => "Veo Video Studio",
            Feature::DocumentUpload => "Local RAG Pipeline",
            Feature::WebSearch => "Live Web Search",
            Feature::DeepThinking => "Deep Thinking",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Feature::TextToImage => "Text-to-Image support via Google GenAI SDK",
            Feature::ImageToVideo => "Image-to-Video generation (Preview)",
            Feature::DocumentUpload => "Upload PDF/TXT docs (Uses Cloud Embeddings)",
            Feature::WebSearch => "DuckDuckGo integration for current events",
            Feature::DeepThinking => "Enable Gemini 2.0 Flash Thinking Exp logic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    pub text_to_image: bool,
    pub image_to_video: bool,
    pub document_upload: bool,
    pub web_search: bool,
    pub deep_thinking: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            text_to_image: true,
            image_to_video: true,
            document_upload: true,
            web_search: true,
            deep_thinking: true,
        }
    }
}

impl Features {
    pub fn get(&self, feature: Feature) -> bool {
        match feature {
            Feature::TextToImage => self.text_to_image,
            Feature::ImageToVideo => self.image_to_video,
            Feature::DocumentUpload => self.document_upload,
            Feature::WebSearch => self.web_search,
            Feature::DeepThinking => self.deep_thinking,
        }
    }

    pub fn set(&mut self, feature: Feature, enabled: bool) {
        let slot = match feature {
            Feature::TextToImage => &mut self.text_to_image,
            Feature::ImageToVideo => &mut self.image_to_video,
            Feature::DocumentUpload => &mut self.document_upload,
            Feature::WebSearch => &mut self.web_search,
            Feature::DeepThinking => &mut self.deep_thinking,
        };
        *slot = enabled;
    }

    pub fn toggle(&mut self, feature: Feature) {
        self.set(feature, !self.get(feature));
    }

    pub fn enabled(&self) -> Vec<Feature> {
        Feature::all().into_iter().filter(|f| self.get(*f)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub gpu_profile: GpuProfile,
    pub features: Features,
    pub llm_provider: LlmProvider,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gpu_profile: GpuProfile::Mid,
            features: Features::default(),
            llm_provider: LlmProvider::Gemini,
        }
    }
}

/// A single user edit to the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigCommand {
    SetGpuProfile(GpuProfile),
    /// Step through the profiles; `true` moves forward
    CycleGpuProfile(bool),
    SetProvider(LlmProvider),
    CycleProvider(bool),
    ToggleFeature(Feature),
    SetFeature(Feature, bool),
}

impl AppConfig {
    pub fn apply(self, command: ConfigCommand) -> AppConfig {
        let mut next = self;
        match command {
            ConfigCommand::SetGpuProfile(profile) => next.gpu_profile = profile,
            ConfigCommand::CycleGpuProfile(forward) => {
                next.gpu_profile = if forward {
                    self.gpu_profile.next()
                } else {
                    self.gpu_profile.prev()
                };
            }
            ConfigCommand::SetProvider(provider) => next.llm_provider = provider,
            ConfigCommand::CycleProvider(forward) => {
                next.llm_provider = if forward {
                    self.llm_provider.next()
                } else {
                    self.llm_provider.prev()
                };
            }
            ConfigCommand::ToggleFeature(feature) => next.features.toggle(feature),
            ConfigCommand::SetFeature(feature, enabled) => next.features.set(feature, enabled),
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_mid_profile_with_everything_on() {
        let config = AppConfig::default();
        assert_eq!(config.gpu_profile, GpuProfile::Mid);
        assert_eq!(config.llm_provider, LlmProvider::Gemini);
        assert_eq!(config.features.enabled().len(), 5);
    }

    #[test]
    fn toggling_one_feature_leaves_the_rest_alone() {
        let config = AppConfig::default().apply(ConfigCommand::ToggleFeature(Feature::WebSearch));
        assert!(!config.features.web_search);
        assert!(config.features.text_to_image);
        assert!(config.features.deep_thinking);
        assert_eq!(config.gpu_profile, GpuProfile::Mid);

        let back = config.apply(ConfigCommand::ToggleFeature(Feature::WebSearch));
        assert_eq!(back, AppConfig::default());
    }

    #[test]
    fn apply_returns_new_value_without_touching_original() {
        let original = AppConfig::default();
        let changed = original.apply(ConfigCommand::SetGpuProfile(GpuProfile::High));
        assert_eq!(original.gpu_profile, GpuProfile::Mid);
        assert_eq!(changed.gpu_profile, GpuProfile::High);
    }

    #[test]
    fn cycling_wraps_around() {
        let mut profile = GpuProfile::Low;
        for _ in 0..3 {
            profile = profile.next();
        }
        assert_eq!(profile, GpuProfile::Low);
        assert_eq!(GpuProfile::Low.prev(), GpuProfile::High);

        let config = AppConfig::default()
            .apply(ConfigCommand::CycleProvider(false));
        assert_eq!(config.llm_provider, LlmProvider::OpenAI);
    }

    #[test]
    fn enabled_features_keep_declaration_order() {
        let config = AppConfig::default()
            .apply(ConfigCommand::SetFeature(Feature::ImageToVideo, false))
            .apply(ConfigCommand::SetFeature(Feature::WebSearch, false));
        let keys: Vec<&str> = config.features.enabled().iter().map(|f| f.key()).collect();
        assert_eq!(keys, vec!["textToImage", "documentUpload", "deepThinking"]);
    }

    #[test]
    fn parses_cli_names() {
        assert_eq!(GpuProfile::from_str("HIGH"), Some(GpuProfile::High));
        assert_eq!(LlmProvider::from_str("OpenAI"), Some(LlmProvider::OpenAI));
        assert_eq!(LlmProvider::from_str("claude"), None);
    }
}
