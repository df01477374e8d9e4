// crates/ap_cli/src/args.rs
//
// Offline argument surface: one bundle in, one result out.
// Rules:
// - No networked paths (reject any scheme:// like http/https/file)
// - --validate-only loads and validates the bundle without running the engine
// - Output directory is created on demand; the bundle must already exist

use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "apportion",
    disable_help_subcommand = true,
    about = "Offline, deterministic seat apportionment over an election bundle"
)]
pub struct Args {
    /// Election bundle JSON (election + params + tally).
    #[arg(long)]
    pub bundle: PathBuf,

    /// Output directory for result.json (default: current directory).
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Pretty-print the result instead of canonical compact JSON.
    /// The result id is computed over canonical bytes either way.
    #[arg(long)]
    pub pretty: bool,

    /// Load and validate the bundle, then stop without running the engine.
    #[arg(long)]
    pub validate_only: bool,

    /// Suppress non-essential output.
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::NonLocalPath(p) => write!(f, "path must be a local file (no scheme): {p}"),
            CliError::NotFound(p) => write!(f, "file not found: {p}"),
        }
    }
}
impl std::error::Error for CliError {}

/// Entry point used by main.rs: parse, then check path posture.
pub fn parse_and_validate() -> Result<Args, CliError> {
    let args = Args::parse();
    ensure_local_path(&args.bundle)?;
    ensure_local_path(&args.out)?;

    let meta = std::fs::metadata(&args.bundle)
        .map_err(|_| CliError::NotFound(format!("--bundle {}", args.bundle.display())))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("--bundle {}", args.bundle.display())));
    }
    Ok(args)
}

/// Reject any explicit URI scheme (http://, https://, file://, ...).
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        let lower = s.trim().to_ascii_lowercase();
        if lower.contains("://")
            || lower.starts_with("http:")
            || lower.starts_with("https:")
            || lower.starts_with("file:")
        {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_paths_pass_schemes_fail() {
        assert!(ensure_local_path(Path::new("/tmp/bundle.json")).is_ok());
        assert!(ensure_local_path(Path::new("relative/bundle.json")).is_ok());
        assert!(ensure_local_path(Path::new("http://x/bundle.json")).is_err());
        assert!(ensure_local_path(Path::new("file:///x/bundle.json")).is_err());
    }
}
