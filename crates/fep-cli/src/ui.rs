use fepforge::engine::progress::{Progress, ProgressCallback};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::warn;

#[derive(Debug)]
pub enum UiEvent {
    Progress(Progress),
    Log(String),
}

/// Owns the terminal while a command runs so that log lines and progress
/// bars never interleave.
pub struct UiManager {
    mp: Arc<MultiProgress>,
    state: BarState,
    event_receiver: mpsc::Receiver<UiEvent>,
    shutdown_receiver: watch::Receiver<bool>,
    _sentinel_bar: ProgressBar,
}

#[derive(Default)]
struct BarState {
    active_bar: Option<ProgressBar>,
    phase_name: String,
}

impl UiManager {
    pub fn new() -> (Self, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        let (event_sender, event_receiver) = mpsc::channel(1024);
        let (shutdown_sender, shutdown_receiver) = watch::channel(false);
        let mp = Arc::new(MultiProgress::new());
        mp.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
        let _sentinel_bar = mp.add(ProgressBar::hidden());
        let manager = Self {
            mp,
            state: BarState::default(),
            event_receiver,
            shutdown_receiver,
            _sentinel_bar,
        };

        (manager, event_sender, shutdown_sender)
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.event_receiver.recv() => {
                    self.handle_event(event);
                }
                result = self.shutdown_receiver.changed() => {
                    if result.is_err() || *self.shutdown_receiver.borrow() {
                        break;
                    }
                }
            }
        }
        // Drain whatever arrived between the last select and the shutdown signal.
        while let Ok(event) = self.event_receiver.try_recv() {
            self.handle_event(event);
        }
        self.clear_active_bar();
        self._sentinel_bar.finish_and_clear();
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(msg) => {
                self.mp.println(msg.trim_end()).ok();
            }
            UiEvent::Progress(progress) => self.handle_progress(progress),
        }
    }

    fn clear_active_bar(&mut self) {
        if let Some(bar) = self.state.active_bar.take() {
            bar.finish_and_clear();
        }
    }

    fn handle_progress(&mut self, progress: Progress) {
        match progress {
            Progress::PhaseStart { name } => {
                self.clear_active_bar();

                let pb = self.mp.add(ProgressBar::new_spinner());
                pb.enable_steady_tick(Duration::from_millis(80));
                pb.set_style(Self::spinner_style());
                pb.set_message(name.clone());

                self.state.active_bar = Some(pb);
                self.state.phase_name = name;
            }
            Progress::PhaseFinish => {
                self.clear_active_bar();
                if !self.state.phase_name.is_empty() {
                    self.mp.println(format!("✓ {}", self.state.phase_name)).ok();
                }
                self.state.phase_name.clear();
            }
            Progress::TaskStart { total } => {
                if let Some(bar) = self.state.active_bar.as_ref() {
                    bar.set_style(Self::bar_style());
                    bar.set_length(total);
                    bar.set_position(0);
                    bar.disable_steady_tick();
                }
            }
            Progress::TaskIncrement { amount } => {
                if let Some(bar) = self.state.active_bar.as_ref() {
                    bar.inc(amount);
                }
            }
            Progress::TaskFinish => {
                if let Some(bar) = self.state.active_bar.as_ref() {
                    bar.finish();
                }
            }
            Progress::StatusUpdate { text } => {
                if let Some(bar) = self.state.active_bar.as_ref() {
                    bar.set_message(format!("{} ({})", self.state.phase_name, text));
                }
            }
            Progress::Message(msg) => {
                self.mp.println(format!("  {}", msg)).ok();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<40} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                },
            )
            .progress_chars("━╸ ")
    }
}

/// Bridges the synchronous core progress callback onto the UI channel.
#[derive(Clone)]
pub struct CliProgressHandler {
    sender: mpsc::Sender<UiEvent>,
}

impl CliProgressHandler {
    pub fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let sender = self.sender.clone();
        Box::new(move |progress: Progress| {
            if let Err(e) = sender.try_send(UiEvent::Progress(progress)) {
                warn!("Failed to send progress update to UI channel: {}", e);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_manager() -> UiManager {
        let (manager, _, _) = UiManager::new();
        manager.mp.set_draw_target(ProgressDrawTarget::hidden());
        manager
    }

    fn start_phase(manager: &mut UiManager, name: &str) {
        manager.handle_event(UiEvent::Progress(Progress::PhaseStart {
            name: name.to_string(),
        }));
    }

    #[test]
    fn phase_start_creates_spinner_with_phase_name() {
        let mut manager = setup_manager();
        assert!(manager.state.active_bar.is_none());

        start_phase(&mut manager, "Assembling configurations");

        let bar = manager.state.active_bar.as_ref().unwrap();
        assert_eq!(bar.message(), "Assembling configurations");
        assert_eq!(manager.state.phase_name, "Assembling configurations");
    }

    #[test]
    fn phase_start_replaces_existing_bar() {
        let mut manager = setup_manager();
        start_phase(&mut manager, "Partitioning lambda range");
        start_phase(&mut manager, "Writing files");

        let bar = manager.state.active_bar.as_ref().unwrap();
        assert_eq!(bar.message(), "Writing files");
        assert_eq!(manager.state.phase_name, "Writing files");
    }

    #[test]
    fn phase_finish_clears_bar_and_name() {
        let mut manager = setup_manager();
        start_phase(&mut manager, "Merging forward results");

        manager.handle_event(UiEvent::Progress(Progress::PhaseFinish));

        assert!(manager.state.active_bar.is_none());
        assert!(manager.state.phase_name.is_empty());
    }

    #[test]
    fn phase_finish_without_phase_is_harmless() {
        let mut manager = setup_manager();
        manager.handle_event(UiEvent::Progress(Progress::PhaseFinish));
        assert!(manager.state.active_bar.is_none());
    }

    #[test]
    fn task_events_drive_bar_position() {
        let mut manager = setup_manager();
        start_phase(&mut manager, "Assembling configurations");

        manager.handle_event(UiEvent::Progress(Progress::TaskStart { total: 32 }));
        {
            let bar = manager.state.active_bar.as_ref().unwrap();
            assert_eq!(bar.length(), Some(32));
            assert_eq!(bar.position(), 0);
        }

        manager.handle_event(UiEvent::Progress(Progress::TaskIncrement { amount: 2 }));
        assert_eq!(manager.state.active_bar.as_ref().unwrap().position(), 2);

        manager.handle_event(UiEvent::Progress(Progress::TaskFinish));
        assert!(manager.state.active_bar.as_ref().unwrap().is_finished());
    }

    #[test]
    fn status_update_appends_to_phase_name() {
        let mut manager = setup_manager();
        start_phase(&mut manager, "Assembling configurations");

        manager.handle_event(UiEvent::Progress(Progress::StatusUpdate {
            text: "process 3".into(),
        }));

        let bar = manager.state.active_bar.as_ref().unwrap();
        assert_eq!(bar.message(), "Assembling configurations (process 3)");
    }

    #[test]
    fn log_and_message_events_are_accepted_without_bar() {
        let mut manager = setup_manager();
        manager.handle_event(UiEvent::Log("log line\n".to_string()));
        manager.handle_event(UiEvent::Progress(Progress::Message(
            "wrote run.sh".to_string(),
        )));
        assert!(manager.state.active_bar.is_none());
    }

    #[tokio::test]
    async fn progress_handler_forwards_events_to_channel() {
        let (sender, mut receiver) = mpsc::channel(1);
        let handler = CliProgressHandler::new(sender);
        let callback = handler.get_callback();

        callback(Progress::TaskIncrement { amount: 3 });

        match receiver.recv().await {
            Some(UiEvent::Progress(Progress::TaskIncrement { amount })) => assert_eq!(amount, 3),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn run_exits_on_shutdown_signal() {
        let (manager, sender, shutdown) = UiManager::new();
        manager.mp.set_draw_target(ProgressDrawTarget::hidden());
        let handle = tokio::spawn(manager.run());

        sender
            .send(UiEvent::Log("before shutdown".into()))
            .await
            .unwrap();
        shutdown.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("UI manager did not stop")
            .unwrap();
    }
}
