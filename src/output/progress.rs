use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Progress bar for the per-session loop of a sync run.
///
/// The length is set once the plan has been fetched.
pub fn session_progress() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_draw_target(ProgressDrawTarget::stderr());
    if let Ok(style) =
        ProgressStyle::default_bar().template("  {spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
