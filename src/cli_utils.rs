/// CLI utilities for consistent output formatting
use std::io::IsTerminal;

use crate::pipeline::GenerateSummary;

/// Get a colored prefix
///
/// Returns bright cyan if stderr is a TTY, plain text otherwise.
pub fn ninjagen_prefix() -> &'static str {
    if std::io::stderr().is_terminal() {
        "\x1b[96m[ninjagen]\x1b[0m"
    } else {
        "[ninjagen]"
    }
}

/// One-line status message for a finished run
pub fn summary_line(summary: &GenerateSummary) -> String {
    let macros = match summary.macro_count {
        1 => "1 macro".to_string(),
        n => format!("{} macros", n),
    };
    format!(
        "Wrote {} ({}, {} bytes)",
        summary.output.display(),
        macros,
        summary.size_bytes
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_summary_line() {
        let summary = GenerateSummary {
            output: PathBuf::from("build.ninja"),
            macro_count: 1,
            size_bytes: 42,
        };
        assert_eq!(summary_line(&summary), "Wrote build.ninja (1 macro, 42 bytes)");

        let summary = GenerateSummary {
            macro_count: 3,
            ..summary
        };
        assert_eq!(summary_line(&summary), "Wrote build.ninja (3 macros, 42 bytes)");
    }
}
