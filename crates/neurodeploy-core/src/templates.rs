//! Script bundle rendering.
//!
//! The bundle is always the same eight files in the same order. Only the
//! PowerShell installer and the Streamlit app interpolate the GPU profile
//! label; everything else is static text. Feature toggles never reach the
//! script content, they only show up in the assistant context string.

use serde::Serialize;

use crate::profile::AppConfig;

const GPU_PROFILE_PLACEHOLDER: &str = "{{gpu_profile}}";
const REQUIREMENTS_PLACEHOLDER: &str = "{{requirements}}";

const BAT_INSTALL_TEMPLATE: &str = include_str!("../templates/setup.bat");
const BAT_RUN_TEMPLATE: &str = include_str!("../templates/start.bat");
const BAT_ROLLBACK_TEMPLATE: &str = include_str!("../templates/rollback.bat");
const INSTALL_SCRIPT_TEMPLATE: &str = include_str!("../templates/install_langchain.ps1");
const RUN_SCRIPT_TEMPLATE: &str = include_str!("../templates/run_app.ps1");
const ROLLBACK_SCRIPT_TEMPLATE: &str = include_str!("../templates/rollback.ps1");
const PYTHON_APP_TEMPLATE: &str = include_str!("../templates/app.py");
const REQUIREMENTS_TEMPLATE: &str = include_str!("../templates/requirements.txt");

/// Filenames of the bundle, in render order
pub const BUNDLE_FILENAMES: [&str; 8] = [
    "setup.bat",
    "start.bat",
    "rollback.bat",
    "install_langchain.ps1",
    "run_app.ps1",
    "rollback.ps1",
    "app.py",
    "requirements.txt",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptLanguage {
    Python,
    PowerShell,
    Text,
}

impl ScriptLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptLanguage::Python => "python",
            ScriptLanguage::PowerShell => "powershell",
            ScriptLanguage::Text => "text",
        }
    }
}

/// One rendered file offered for preview and download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedScript {
    pub filename: String,
    pub content: String,
    pub language: ScriptLanguage,
    pub description: String,
}

impl GeneratedScript {
    fn new(filename: &str, content: String, language: ScriptLanguage, description: &str) -> Self {
        Self {
            filename: filename.to_string(),
            content,
            language,
            description: description.to_string(),
        }
    }
}

fn install_script(config: &AppConfig) -> String {
    INSTALL_SCRIPT_TEMPLATE
        .replace(GPU_PROFILE_PLACEHOLDER, config.gpu_profile.label())
        .replace(REQUIREMENTS_PLACEHOLDER, REQUIREMENTS_TEMPLATE)
}

fn python_app(config: &AppConfig) -> String {
    PYTHON_APP_TEMPLATE.replace(GPU_PROFILE_PLACEHOLDER, config.gpu_profile.label())
}

/// Render the full script bundle for a configuration
pub fn render(config: &AppConfig) -> Vec<GeneratedScript> {
    vec![
        GeneratedScript::new(
            "setup.bat",
            BAT_INSTALL_TEMPLATE.to_string(),
            ScriptLanguage::Text,
            "WINDOWS INSTALLER: Double-click this to install. It automatically bypasses execution policy restrictions.",
        ),
        GeneratedScript::new(
            "start.bat",
            BAT_RUN_TEMPLATE.to_string(),
            ScriptLanguage::Text,
            "APP LAUNCHER: Double-click this to run the app.",
        ),
        GeneratedScript::new(
            "rollback.bat",
            BAT_ROLLBACK_TEMPLATE.to_string(),
            ScriptLanguage::Text,
            "UNINSTALLER: Double-click to safely delete the current environment and start fresh.",
        ),
        GeneratedScript::new(
            "install_langchain.ps1",
            install_script(config),
            ScriptLanguage::PowerShell,
            "Underlying PowerShell installer logic.",
        ),
        GeneratedScript::new(
            "run_app.ps1",
            RUN_SCRIPT_TEMPLATE.to_string(),
            ScriptLanguage::PowerShell,
            "Underlying PowerShell launcher logic.",
        ),
        GeneratedScript::new(
            "rollback.ps1",
            ROLLBACK_SCRIPT_TEMPLATE.to_string(),
            ScriptLanguage::PowerShell,
            "Cleanup script. Safely removes the virtual environment and temporary files.",
        ),
        GeneratedScript::new(
            "app.py",
            python_app(config),
            ScriptLanguage::Python,
            "The main application. Includes RAG, Chat, and Media Generation logic.",
        ),
        GeneratedScript::new(
            "requirements.txt",
            REQUIREMENTS_TEMPLATE.to_string(),
            ScriptLanguage::Text,
            "Python dependencies: LangChain, Streamlit, Google GenAI, FAISS, etc.",
        ),
    ]
}

/// Human-readable summary of the configuration handed to the assistant
pub fn context_string(config: &AppConfig) -> String {
    let features: Vec<&str> = config.features.enabled().iter().map(|f| f.key()).collect();

    let mut context = String::new();
    context.push_str("User Config:\n");
    context.push_str(&format!("GPU: {} (4060 Ti Optimized)\n", config.gpu_profile.label()));
    context.push_str(&format!("LLM Provider: {}\n", config.llm_provider.as_str()));
    context.push_str(&format!("Features: {}\n", features.join(", ")));
    context.push('\n');
    context.push_str("System Logic:\n");
    context.push_str("The system uses 'gemini-2.0-flash-thinking-exp' for deep reasoning.\n");
    context.push_str("RAG is handled via FAISS (CPU) + Google Embeddings to save VRAM.\n");
    context.push_str("Media generation uses 'google-genai' SDK for Imagen 3 and Veo.\n");
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{ConfigCommand, Feature, GpuProfile, LlmProvider};

    fn all_configs() -> Vec<AppConfig> {
        let mut configs = Vec::new();
        for profile in GpuProfile::all() {
            for provider in LlmProvider::all() {
                let base = AppConfig::default()
                    .apply(ConfigCommand::SetGpuProfile(profile))
                    .apply(ConfigCommand::SetProvider(provider));
                configs.push(base);
                configs.push(
                    Feature::all()
                        .into_iter()
                        .fold(base, |c, f| c.apply(ConfigCommand::SetFeature(f, false))),
                );
            }
        }
        configs
    }

    #[test]
    fn every_config_renders_the_same_eight_files() {
        for config in all_configs() {
            let bundle = render(&config);
            let names: Vec<&str> = bundle.iter().map(|s| s.filename.as_str()).collect();
            assert_eq!(names, BUNDLE_FILENAMES.to_vec());
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let config = AppConfig::default().apply(ConfigCommand::SetGpuProfile(GpuProfile::Low));
        assert_eq!(render(&config), render(&config));
    }

    #[test]
    fn mid_label_lands_in_installer_header_and_app_sidebar() {
        let config = AppConfig::default().apply(ConfigCommand::SetGpuProfile(GpuProfile::Mid));
        let bundle = render(&config);
        let label = GpuProfile::Mid.label();

        let installer = &bundle[3];
        assert!(installer
            .content
            .contains(&format!("# Target Profile: {} (RTX 4060 Ti Optimized)", label)));

        let app = &bundle[6];
        assert!(app
            .content
            .contains(&format!("st.sidebar.info(f\"GPU Mode: {}\\nStatus:", label)));
        assert!(!app.content.contains(GPU_PROFILE_PLACEHOLDER));
    }

    #[test]
    fn installer_embeds_requirements_manifest() {
        let bundle = render(&AppConfig::default());
        let installer = &bundle[3].content;
        assert!(installer.contains("streamlit==1.28.0"));
        assert!(installer.contains("pip uninstall -y streamlit tornado altair typeguard"));
        assert!(!installer.contains(REQUIREMENTS_PLACEHOLDER));
    }

    #[test]
    fn feature_toggles_do_not_change_script_content() {
        let base = AppConfig::default();
        let expected = render(&base);
        for feature in Feature::all() {
            let toggled = base.apply(ConfigCommand::ToggleFeature(feature));
            assert_eq!(render(&toggled), expected, "{} changed the bundle", feature.key());
        }
    }

    #[test]
    fn languages_match_file_kinds() {
        let bundle = render(&AppConfig::default());
        assert_eq!(bundle[0].language, ScriptLanguage::Text);
        assert_eq!(bundle[3].language, ScriptLanguage::PowerShell);
        assert_eq!(bundle[6].language.as_str(), "python");
    }

    #[test]
    fn context_lists_profile_provider_and_enabled_features() {
        let config = AppConfig::default()
            .apply(ConfigCommand::SetProvider(LlmProvider::Ollama))
            .apply(ConfigCommand::SetFeature(Feature::DeepThinking, false));
        let context = context_string(&config);
        assert!(context.contains("GPU: NVIDIA RTX 3060/4060 (8GB) (4060 Ti Optimized)"));
        assert!(context.contains("LLM Provider: ollama"));
        assert!(context.contains("Features: textToImage, imageToVideo, documentUpload, webSearch\n"));
    }
}
