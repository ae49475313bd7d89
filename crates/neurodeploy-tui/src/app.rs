use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use neurodeploy_core::{
    context_string, download_all, download_one, render, AppConfig, AssistantClient,
    AssistantPanel, ChatRole, ConfigCommand, DirectorySink, Feature, GeneratedScript,
    KeySource, PreviewState, SystemClipboard,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Config,
    Preview,
    Assistant,
}

/// One selectable row of the configuration list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigRow {
    GpuProfile,
    Provider,
    Feature(Feature),
}

impl ConfigRow {
    pub fn all() -> Vec<ConfigRow> {
        let mut rows = vec![ConfigRow::GpuProfile, ConfigRow::Provider];
        rows.extend(Feature::all().into_iter().map(ConfigRow::Feature));
        rows
    }
}

/// Rows a line takes once word-wrapped to `width` display columns.
/// Words wider than a row are broken across rows.
fn wrapped_rows(line: &str, width: usize) -> usize {
    let width = width.max(1);
    let mut rows = 1;
    let mut col = 0;

    for word in line.split_whitespace() {
        let w = word.width();
        if col > 0 && col + 1 + w <= width {
            col += 1 + w;
            continue;
        }
        if col > 0 {
            rows += 1;
        }
        if w == 0 {
            col = 0;
            continue;
        }
        rows += (w - 1) / width;
        col = (w - 1) % width + 1;
    }

    rows
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Configuration and everything derived from it
    pub config: AppConfig,
    pub scripts: Vec<GeneratedScript>,
    pub context: String,
    pub config_state: ListState,

    // Preview / export
    pub preview: PreviewState,
    pub preview_height: u16,
    pub clipboard: SystemClipboard,
    pub sink: DirectorySink,
    pub status: Option<String>,

    // Assistant
    pub assistant: AssistantPanel,
    pub client: AssistantClient,
    pub key_source: Option<KeySource>,
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub config_area: Option<Rect>,
    pub preview_area: Option<Rect>,
    pub chat_area: Option<Rect>,
}

impl App {
    pub fn new(
        config: AppConfig,
        client: AssistantClient,
        key_source: Option<KeySource>,
        sink: DirectorySink,
    ) -> Self {
        let mut config_state = ListState::default();
        config_state.select(Some(0));

        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            focus: FocusPane::Config,

            scripts: render(&config),
            context: context_string(&config),
            config,
            config_state,

            preview: PreviewState::default(),
            preview_height: 0,
            clipboard: SystemClipboard::default(),
            sink,
            status: None,

            assistant: AssistantPanel::new(),
            client,
            key_source,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            config_area: None,
            preview_area: None,
            chat_area: None,
        }
    }

    /// Apply a configuration edit and re-derive the bundle and context
    pub fn apply(&mut self, command: ConfigCommand) {
        self.config = self.config.apply(command);
        self.scripts = render(&self.config);
        self.context = context_string(&self.config);
        info!(?command, "configuration changed");
    }

    // Configuration list

    pub fn selected_row(&self) -> ConfigRow {
        let rows = ConfigRow::all();
        let i = self.config_state.selected().unwrap_or(0).min(rows.len() - 1);
        rows[i]
    }

    pub fn config_nav_down(&mut self) {
        let len = ConfigRow::all().len();
        let i = self.config_state.selected().unwrap_or(0);
        self.config_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn config_nav_up(&mut self) {
        let i = self.config_state.selected().unwrap_or(0);
        self.config_state.select(Some(i.saturating_sub(1)));
    }

    /// Toggle a feature or step the selected enum value
    pub fn activate_row(&mut self, forward: bool) {
        let command = match self.selected_row() {
            ConfigRow::GpuProfile => ConfigCommand::CycleGpuProfile(forward),
            ConfigRow::Provider => ConfigCommand::CycleProvider(forward),
            ConfigRow::Feature(feature) => ConfigCommand::ToggleFeature(feature),
        };
        self.apply(command);
    }

    // Preview

    pub fn select_tab(&mut self, index: usize) {
        self.preview.select_tab(index, self.scripts.len());
    }

    pub fn next_tab(&mut self) {
        self.preview.next_tab(self.scripts.len());
    }

    pub fn prev_tab(&mut self) {
        self.preview.prev_tab(self.scripts.len());
    }

    pub fn active_script(&self) -> Option<&GeneratedScript> {
        self.preview.active_script(&self.scripts)
    }

    pub fn copy_active(&mut self) {
        self.preview.copy_active(&self.scripts, &mut self.clipboard);
    }

    pub fn download_active(&mut self) {
        let Some(script) = self.preview.active_script(&self.scripts) else {
            return;
        };
        let dir = self.sink.dir().display().to_string();
        self.status = Some(if download_one(script, &mut self.sink) {
            format!("Saved {} to {}", script.filename, dir)
        } else {
            format!("Could not save {}", script.filename)
        });
    }

    pub fn download_all(&mut self) {
        let saved = download_all(&self.scripts, &mut self.sink);
        self.status = Some(format!(
            "Saved {}/{} files to {}",
            saved,
            self.scripts.len(),
            self.sink.dir().display()
        ));
    }

    pub fn scroll_preview_half_page_down(&mut self) {
        self.preview.scroll_down((self.preview_height / 2).max(1));
    }

    pub fn scroll_preview_half_page_up(&mut self) {
        self.preview.scroll_up((self.preview_height / 2).max(1));
    }

    // Assistant

    pub fn open_assistant(&mut self) {
        self.assistant.open = true;
        self.focus = FocusPane::Assistant;
        self.input_mode = InputMode::Editing;
        self.assistant.cursor_end();
    }

    pub fn close_assistant(&mut self) {
        self.assistant.open = false;
        self.input_mode = InputMode::Normal;
        if self.focus == FocusPane::Assistant {
            self.focus = FocusPane::Config;
        }
    }

    pub fn send_question(&mut self) {
        if self.assistant.send(&self.client, &self.context) {
            self.scroll_chat_to_bottom();
        }
    }

    /// Tick animation frame, pick up finished replies, expire copy feedback
    pub fn tick(&mut self) {
        if self.assistant.is_awaiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        if self.assistant.poll_reply() {
            self.scroll_chat_to_bottom();
        }
        self.preview.tick();
    }

    /// Scroll chat to bottom so the latest message (or "Thinking...") is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 40 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            40
        };

        let mut total_lines: usize = 0;

        for msg in self.assistant.transcript() {
            total_lines = total_lines.saturating_add(1); // Role line
            for line in msg.text.lines() {
                total_lines = total_lines.saturating_add(wrapped_rows(line, wrap_width));
            }
            total_lines = total_lines.saturating_add(1); // Blank line after message
        }

        if self.assistant.is_awaiting() {
            total_lines = total_lines.saturating_add(2);
        }

        let visible_height = if self.chat_height > 0 { self.chat_height } else { 20 };

        self.chat_scroll = u16::try_from(total_lines.saturating_sub(visible_height as usize))
            .unwrap_or(u16::MAX);
    }

    pub fn message_label(role: ChatRole) -> &'static str {
        match role {
            ChatRole::User => "You:",
            ChatRole::Assistant => "Assistant:",
        }
    }
}
