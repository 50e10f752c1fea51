use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright, bright_green, bright_red, bright_yellow};

const TOTAL_PHASES: usize = 4;

/// Progress tracking for the migration stages
pub struct PhaseProgress {
    pb: ProgressBar,
    phase: usize,
}

impl PhaseProgress {
    pub fn start(message: &str) -> Self {
        eprintln!("{}  {}", bright("⚙️"), bright("Phases").underlined());
        Self {
            pb: create_spinner(phase_label(1, message)),
            phase: 1,
        }
    }

    /// Finish the current phase with `done` and start the next one.
    pub fn advance(self, done: &str, next: &str) -> Self {
        self.finish_current(done);
        let phase = self.phase + 1;
        Self {
            pb: create_spinner(phase_label(phase, next)),
            phase,
        }
    }

    pub fn finish(self, done: &str) {
        self.finish_current(done);
        eprintln!();
    }

    pub fn fail(self, message: &str) {
        self.pb.abandon_with_message(
            bright_red(format!(
                "Phase {}/{TOTAL_PHASES}: {message} ✗",
                self.phase
            ))
            .to_string(),
        );
    }

    fn finish_current(&self, done: &str) {
        self.pb.finish_with_message(
            bright_green(format!("Phase {}/{TOTAL_PHASES}: {done} ✓", self.phase)).to_string(),
        );
    }
}

fn phase_label(phase: usize, message: &str) -> String {
    bright_yellow(format!("Phase {phase}/{TOTAL_PHASES}: {message}")).to_string()
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
