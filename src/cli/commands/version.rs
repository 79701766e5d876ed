//! Version information display.

use serde::Serialize;

use crate::cli::args::{OutputFormat, VersionArgs};

#[derive(Debug, Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
}

const INFO: VersionInfo = VersionInfo {
    name: env!("CARGO_PKG_NAME"),
    version: env!("CARGO_PKG_VERSION"),
};

/// Print version information.
pub fn run(args: &VersionArgs) {
    println!("{}", render(args.format));
}

fn render(format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => format!("{} {}", INFO.name, INFO.version),
        OutputFormat::Json => serde_json::to_string(&INFO)
            .unwrap_or_else(|_| format!("{} {}", INFO.name, INFO.version)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_version() {
        assert_eq!(
            render(OutputFormat::Human),
            format!("sipcmd {}", env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn json_version() {
        let value: serde_json::Value = serde_json::from_str(&render(OutputFormat::Json)).unwrap();
        assert_eq!(value["name"], "sipcmd");
        assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
    }
}
