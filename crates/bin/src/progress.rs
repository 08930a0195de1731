//! Progress bar driven by build phases.

use centum_index::BuildPhase;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bar for an index build.
pub(crate) fn build_bar() -> Result<ProgressBar, indicatif::style::TemplateError> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Resolving dates...");
    Ok(pb)
}

/// Advance `pb` for one phase transition.
pub(crate) fn on_phase(pb: &ProgressBar, phase: &BuildPhase) {
    match phase {
        BuildPhase::Pending { dates } => pb.set_length(*dates as u64),
        BuildPhase::Ranking(date) => {
            pb.inc(1);
            pb.set_message(format!("{date}: ranking"));
        }
        BuildPhase::Weighting(_) | BuildPhase::Persisting(_) => pb.set_message(phase.to_string()),
        BuildPhase::Done => pb.finish_with_message("Done"),
        BuildPhase::Error => pb.abandon_with_message("Failed!"),
    }
}
