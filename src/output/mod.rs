mod progress;
mod styling;
mod summary;
mod tables;

pub use progress::InvocationProgress;
pub use styling::{dim, magenta_bold};
pub use summary::print_summary;

/// Prints the benchgate banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🚦 benchgate"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Benchmark CI dispatcher")
    );
}

/// Serialize `value` as JSON and write it to `path`, or stdout when absent.
pub fn write_json<T: serde::Serialize>(
    value: &T,
    pretty: bool,
    path: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };

    if let Some(path) = path {
        std::fs::write(path, json)?;
        log::info!("Report written to: {}", path.display());
    } else {
        println!("{json}");
    }

    Ok(())
}
