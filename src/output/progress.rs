use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::workflow::InvocationReport;

use super::styling::{bright, bright_green, bright_red, bright_yellow};

/// Spinner shown on stderr while an invocation runs
pub struct InvocationProgress {
    pb: ProgressBar,
}

impl InvocationProgress {
    pub fn start(ref_id: &str) -> Self {
        eprintln!("{}  {}", bright("⚙️"), bright("Dispatch").underlined());
        let pb = create_spinner(bright_yellow(format!("Running benchmarks for {ref_id}")).to_string());
        Self { pb }
    }

    pub fn finish(self, report: &InvocationReport) {
        let message = if report.has_failures() {
            bright_red(format!("Invocation #{} failed ✗", report.invocation_id)).to_string()
        } else if report.was_cancelled() {
            bright_yellow(format!("Invocation #{} was superseded", report.invocation_id)).to_string()
        } else {
            bright_green(format!("Invocation #{} finished ✓", report.invocation_id)).to_string()
        };
        self.pb.finish_with_message(message);
        eprintln!();
    }
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
