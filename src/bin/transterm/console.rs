//! Console session state: connection status, translation session, config
//! reconciliation, and the bounded log/transcript panes.
//!
//! Local edits are fire-and-forget: state changes and persists immediately,
//! the matching command is emitted, and convergence happens when the backend
//! pushes its next authoritative snapshot, which always wins over unsent
//! local edits.

use std::collections::VecDeque;

use transterm::protocol::{ClientCommand, ConfigPatch, Microphone, ServerEvent, TranslationConfig};
use transterm::storage::ConfigStore;

use crate::settings::{
    cycle_model, step_chunk_duration, step_sample_rate, step_volume_threshold,
};

/// Maximum log lines retained, oldest dropped first.
pub(crate) const MAX_LOG_LINES: usize = 100;

/// Operator edits to one configuration control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigEdit {
    CycleModel { forward: bool },
    ToggleGpu,
    CycleMicrophone { forward: bool },
    ApplyMicrophone,
    StepSampleRate { forward: bool },
    StepChunkDuration { forward: bool },
    StepVolumeThreshold { forward: bool },
}

/// What an accepted edit asks the caller to do.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct EditEffect {
    pub(crate) command: Option<ClientCommand>,
    pub(crate) status: Option<String>,
}

impl EditEffect {
    fn none() -> Self {
        Self::default()
    }
}

#[derive(Debug)]
pub(crate) struct ConsoleState {
    pub(crate) connected: bool,
    pub(crate) session_active: bool,
    pub(crate) config: TranslationConfig,
    /// Set once the persisted configuration has been loaded (or found absent);
    /// the controls panel renders a placeholder until then.
    pub(crate) config_loaded: bool,
    pub(crate) microphones: Vec<Microphone>,
    /// Locally selected microphone; applied to the backend on request.
    pub(crate) selected_microphone: Option<i64>,
    /// Model selection pending backend confirmation; cleared on connect.
    pub(crate) pending_model: Option<String>,
    logs: VecDeque<String>,
    pub(crate) transcript: Vec<String>,
}

impl ConsoleState {
    pub(crate) fn new() -> Self {
        Self {
            connected: false,
            session_active: false,
            config: TranslationConfig::default(),
            config_loaded: false,
            microphones: Vec::new(),
            selected_microphone: None,
            pending_model: None,
            logs: VecDeque::with_capacity(MAX_LOG_LINES),
            transcript: Vec::new(),
        }
    }

    /// Adopt the configuration rehydrated from durable storage at startup.
    pub(crate) fn adopt_saved_config(&mut self, config: TranslationConfig) {
        self.pending_model = (!config.model_name.is_empty()).then(|| config.model_name.clone());
        self.selected_microphone = config.selected_microphone_id;
        self.config = config;
    }

    pub(crate) fn on_connected(&mut self) {
        self.connected = true;
        // Model selection is backend-confirmed state; reset until the next
        // config snapshot arrives.
        self.pending_model = None;
    }

    pub(crate) fn on_disconnected(&mut self) {
        self.connected = false;
    }

    /// Apply one backend event; returns a transient status message when the
    /// event warrants one.
    pub(crate) fn apply_server_event(
        &mut self,
        event: &ServerEvent,
        store: Option<&ConfigStore>,
    ) -> Option<String> {
        match event {
            ServerEvent::Pong => {
                self.connected = true;
                Some("Handshake received".to_string())
            }
            ServerEvent::Logs { message } => {
                let stamp = chrono::Local::now().format("%H:%M:%S").to_string();
                self.push_log(&stamp, message);
                None
            }
            ServerEvent::Translation { text } => {
                self.transcript.push(text.clone());
                None
            }
            ServerEvent::TranslationStatus { active } => {
                self.session_active = *active;
                // A session boundary always starts a fresh transcript.
                self.transcript.clear();
                Some(if *active {
                    "Transcription started".to_string()
                } else {
                    "Transcription stopped".to_string()
                })
            }
            ServerEvent::Microphones { microphones } => {
                self.microphones = microphones.clone();
                None
            }
            ServerEvent::Config(config) => {
                self.adopt_snapshot(config.clone(), store);
                None
            }
        }
    }

    /// Replace local state with an authoritative snapshot and re-persist it.
    /// This is the only path allowed to overwrite an unsent local edit.
    fn adopt_snapshot(&mut self, config: TranslationConfig, store: Option<&ConfigStore>) {
        self.pending_model = (!config.model_name.is_empty()).then(|| config.model_name.clone());
        if config.selected_microphone_id.is_some() {
            self.selected_microphone = config.selected_microphone_id;
        }
        self.config = config;
        if let Some(store) = store {
            store.save(&self.config);
        }
    }

    /// Append one timestamped log line, dropping the oldest past the cap.
    pub(crate) fn push_log(&mut self, stamp: &str, message: &str) {
        if self.logs.len() >= MAX_LOG_LINES {
            self.logs.pop_front();
        }
        self.logs.push_back(format!("[{stamp}] {message}"));
    }

    pub(crate) fn logs(&self) -> impl Iterator<Item = &str> {
        self.logs.iter().map(String::as_str)
    }

    #[cfg(test)]
    pub(crate) fn log_count(&self) -> usize {
        self.logs.len()
    }

    /// Apply an operator edit. Controls are inert while disconnected.
    pub(crate) fn apply_edit(
        &mut self,
        edit: ConfigEdit,
        store: Option<&ConfigStore>,
    ) -> EditEffect {
        if !self.connected {
            return EditEffect::none();
        }
        let effect = match edit {
            ConfigEdit::CycleModel { forward } => {
                let current = self
                    .pending_model
                    .as_deref()
                    .unwrap_or(&self.config.model_name);
                let next = cycle_model(current, forward).to_string();
                self.pending_model = Some(next.clone());
                self.config.model_name = next.clone();
                EditEffect {
                    command: Some(ClientCommand::UpdateConfig(ConfigPatch::model_name(next))),
                    status: Some("Whisper model updated; restart the backend to apply".to_string()),
                }
            }
            ConfigEdit::ToggleGpu => {
                self.config.use_gpu = !self.config.use_gpu;
                EditEffect {
                    command: Some(ClientCommand::UpdateConfig(ConfigPatch::use_gpu(
                        self.config.use_gpu,
                    ))),
                    status: Some("GPU setting updated; restart the backend to apply".to_string()),
                }
            }
            ConfigEdit::CycleMicrophone { forward } => {
                self.cycle_microphone(forward);
                self.config.selected_microphone_id = self.selected_microphone;
                EditEffect::none()
            }
            ConfigEdit::ApplyMicrophone => {
                let Some(id) = self.selected_microphone else {
                    return EditEffect::none();
                };
                return EditEffect {
                    command: Some(ClientCommand::SetMicrophone { id }),
                    status: Some("Microphone updated".to_string()),
                };
            }
            ConfigEdit::StepSampleRate { forward } => {
                self.config.sample_rate = step_sample_rate(self.config.sample_rate, forward);
                EditEffect {
                    command: Some(ClientCommand::UpdateConfig(ConfigPatch::sample_rate(
                        self.config.sample_rate,
                    ))),
                    status: None,
                }
            }
            ConfigEdit::StepChunkDuration { forward } => {
                self.config.chunk_duration =
                    step_chunk_duration(self.config.chunk_duration, forward);
                EditEffect {
                    command: Some(ClientCommand::UpdateConfig(ConfigPatch::chunk_duration(
                        self.config.chunk_duration,
                    ))),
                    status: None,
                }
            }
            ConfigEdit::StepVolumeThreshold { forward } => {
                self.config.volume_threshold =
                    step_volume_threshold(self.config.volume_threshold, forward);
                EditEffect {
                    command: Some(ClientCommand::UpdateConfig(ConfigPatch::volume_threshold(
                        self.config.volume_threshold,
                    ))),
                    status: None,
                }
            }
        };
        if let Some(store) = store {
            store.save(&self.config);
        }
        effect
    }

    fn cycle_microphone(&mut self, forward: bool) {
        if self.microphones.is_empty() {
            return;
        }
        let current = self
            .selected_microphone
            .and_then(|id| self.microphones.iter().position(|m| m.id == id));
        let len = self.microphones.len();
        let next = match current {
            Some(idx) if forward => (idx + 1) % len,
            Some(idx) => (idx + len - 1) % len,
            None => 0,
        };
        self.selected_microphone = Some(self.microphones[next].id);
    }

    pub(crate) fn selected_microphone_label(&self) -> Option<String> {
        let id = self.selected_microphone?;
        let mic = self.microphones.iter().find(|m| m.id == id)?;
        let channels = if mic.channels > 1 { "channels" } else { "channel" };
        Some(format!(
            "{} ({} {channels}, {}Hz)",
            mic.name, mic.channels, mic.sample_rate
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn scratch_store(label: &str) -> ConfigStore {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let unique = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "transterm-console-test-{label}-{}-{unique}",
            std::process::id()
        ));
        ConfigStore::at_path(dir.join("config.json"))
    }

    fn connected_console() -> ConsoleState {
        let mut console = ConsoleState::new();
        console.on_connected();
        console
    }

    fn mic(id: i64, name: &str) -> Microphone {
        Microphone {
            id,
            name: name.to_string(),
            channels: 1,
            sample_rate: 44_100,
        }
    }

    #[test]
    fn saved_config_populates_state_without_network() {
        let mut console = ConsoleState::new();
        console.adopt_saved_config(TranslationConfig {
            model_name: "medium".to_string(),
            sample_rate: 22_050,
            selected_microphone_id: Some(3),
            ..TranslationConfig::default()
        });
        assert_eq!(console.config.model_name, "medium");
        assert_eq!(console.config.sample_rate, 22_050);
        assert_eq!(console.pending_model.as_deref(), Some("medium"));
        assert_eq!(console.selected_microphone, Some(3));
    }

    #[test]
    fn snapshot_overwrites_local_edit_and_repersists_verbatim() {
        let store = scratch_store("snapshot");
        let mut console = connected_console();

        // Unsent local edit.
        console.apply_edit(ConfigEdit::ToggleGpu, Some(&store));
        assert!(console.config.use_gpu);

        let snapshot = TranslationConfig {
            model_name: "large".to_string(),
            sample_rate: 48_000,
            chunk_duration: 0.5,
            volume_threshold: 0.2,
            selected_microphone_id: Some(1),
            use_gpu: false,
        };
        console.apply_server_event(&ServerEvent::Config(snapshot.clone()), Some(&store));

        assert_eq!(console.config, snapshot);
        assert_eq!(store.load(), Some(snapshot));
        let _ = std::fs::remove_file(store.path());
    }

    #[test]
    fn status_toggle_clears_transcript_in_both_directions() {
        let mut console = connected_console();
        console.apply_server_event(
            &ServerEvent::Translation {
                text: "ligne un".to_string(),
            },
            None,
        );
        assert_eq!(console.transcript.len(), 1);

        let status =
            console.apply_server_event(&ServerEvent::TranslationStatus { active: true }, None);
        assert!(console.session_active);
        assert!(console.transcript.is_empty());
        assert_eq!(status.as_deref(), Some("Transcription started"));

        console.apply_server_event(
            &ServerEvent::Translation {
                text: "ligne deux".to_string(),
            },
            None,
        );
        let status =
            console.apply_server_event(&ServerEvent::TranslationStatus { active: false }, None);
        assert!(!console.session_active);
        assert!(console.transcript.is_empty());
        assert_eq!(status.as_deref(), Some("Transcription stopped"));
    }

    #[test]
    fn log_pane_keeps_exactly_the_last_hundred_lines() {
        let mut console = ConsoleState::new();
        for i in 0..150 {
            console.push_log("10:00:00", &format!("line {i}"));
        }
        assert_eq!(console.log_count(), MAX_LOG_LINES);
        let first = console.logs().next().expect("first log");
        assert_eq!(first, "[10:00:00] line 50");
    }

    #[test]
    fn logs_events_are_client_stamped() {
        let mut console = ConsoleState::new();
        console.apply_server_event(
            &ServerEvent::Logs {
                message: "model loaded".to_string(),
            },
            None,
        );
        let line = console.logs().next().expect("log line");
        assert!(line.starts_with('['));
        assert!(line.ends_with("] model loaded"));
    }

    #[test]
    fn pong_marks_the_console_connected() {
        let mut console = ConsoleState::new();
        let status = console.apply_server_event(&ServerEvent::Pong, None);
        assert!(console.connected);
        assert_eq!(status.as_deref(), Some("Handshake received"));
    }

    #[test]
    fn connect_resets_the_pending_model_selection() {
        let mut console = ConsoleState::new();
        console.pending_model = Some("medium".to_string());
        console.on_connected();
        assert!(console.pending_model.is_none());
    }

    #[test]
    fn edits_are_inert_while_disconnected() {
        let mut console = ConsoleState::new();
        let effect = console.apply_edit(ConfigEdit::ToggleGpu, None);
        assert_eq!(effect, EditEffect::none());
        assert!(!console.config.use_gpu);
    }

    #[test]
    fn gpu_toggle_emits_a_single_field_patch_and_persists() {
        let store = scratch_store("gpu");
        let mut console = connected_console();
        let effect = console.apply_edit(ConfigEdit::ToggleGpu, Some(&store));
        assert_eq!(
            effect.command,
            Some(ClientCommand::UpdateConfig(ConfigPatch::use_gpu(true)))
        );
        assert_eq!(store.load().map(|c| c.use_gpu), Some(true));
        let _ = std::fs::remove_file(store.path());
    }

    #[test]
    fn model_cycle_updates_selection_and_emits_patch() {
        let mut console = connected_console();
        let effect = console.apply_edit(ConfigEdit::CycleModel { forward: true }, None);
        assert_eq!(console.pending_model.as_deref(), Some("medium"));
        assert_eq!(
            effect.command,
            Some(ClientCommand::UpdateConfig(ConfigPatch::model_name(
                "medium"
            )))
        );
    }

    #[test]
    fn microphone_cycle_is_local_and_apply_emits_set_microphone() {
        let mut console = connected_console();
        console.microphones = vec![mic(0, "Built-in"), mic(1, "USB")];

        let effect = console.apply_edit(ConfigEdit::CycleMicrophone { forward: true }, None);
        assert_eq!(console.selected_microphone, Some(0));
        assert!(effect.command.is_none());

        console.apply_edit(ConfigEdit::CycleMicrophone { forward: true }, None);
        assert_eq!(console.selected_microphone, Some(1));

        let effect = console.apply_edit(ConfigEdit::ApplyMicrophone, None);
        assert_eq!(effect.command, Some(ClientCommand::SetMicrophone { id: 1 }));
    }

    #[test]
    fn apply_microphone_without_selection_is_a_no_op() {
        let mut console = connected_console();
        let effect = console.apply_edit(ConfigEdit::ApplyMicrophone, None);
        assert_eq!(effect, EditEffect::none());
    }

    #[test]
    fn slider_steps_update_config_and_emit_patches() {
        let mut console = connected_console();
        let effect = console.apply_edit(ConfigEdit::StepSampleRate { forward: true }, None);
        assert_eq!(console.config.sample_rate, 16_100);
        assert_eq!(
            effect.command,
            Some(ClientCommand::UpdateConfig(ConfigPatch::sample_rate(
                16_100
            )))
        );

        let effect = console.apply_edit(ConfigEdit::StepChunkDuration { forward: false }, None);
        assert_eq!(console.config.chunk_duration, 1.9);
        assert!(effect.command.is_some());

        let effect = console.apply_edit(ConfigEdit::StepVolumeThreshold { forward: true }, None);
        assert_eq!(console.config.volume_threshold, 0.02);
        assert!(effect.command.is_some());
    }

    #[test]
    fn microphone_label_renders_channels_and_rate() {
        let mut console = connected_console();
        console.microphones = vec![mic(2, "Desk mic")];
        console.selected_microphone = Some(2);
        assert_eq!(
            console.selected_microphone_label().as_deref(),
            Some("Desk mic (1 channel, 44100Hz)")
        );
    }
}
