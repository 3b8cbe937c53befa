mod progress;
mod styling;
mod summary;
mod tables;

pub use progress::session_progress;
use styling::{dim, magenta_bold};
pub use summary::{print_plan, print_report};

/// Prints the suffersync banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🚴 suffersync"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Wahoo SYSTM → intervals.icu")
    );
}
