use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "resdef", about = "Hash, index, and load-check resource definition trees")]
pub struct Cli {
    /// Data directory the resource paths are relative to.
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// JSON file with a `ResourcesConfig`; flags below override its fields.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Definition directory, relative to the root.
    #[arg(long, global = true)]
    pub defs: Option<String>,

    /// Font database directory, relative to the root.
    #[arg(long, global = true)]
    pub fonts: Option<String>,

    /// env_logger filter, e.g. `warn` or `resdef_engine=debug`.
    #[arg(long, global = true)]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the 32- and 64-bit hashes of each word.
    Hash {
        #[arg(required = true)]
        words: Vec<String>,

        #[arg(long, value_parser = parse_seed)]
        seed: Option<u32>,
    },
    /// Index the data directory and list what was found.
    Scan,
    /// Index, then load the named resources through a headless backend.
    Load(LoadArgs),
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    #[arg(long = "material", value_name = "NAME")]
    pub materials: Vec<String>,

    #[arg(long = "program", value_name = "NAME")]
    pub programs: Vec<String>,

    #[arg(long = "font", value_name = "NAME")]
    pub fonts: Vec<String>,

    /// Load every indexed definition and font.
    #[arg(long)]
    pub all: bool,
}

/// Accepts decimal or `0x`-prefixed hex.
fn parse_seed(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid seed '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn check_clap_invariants() {
        Cli::command().debug_assert();
    }

    #[test] fn seed_hex() { assert_eq!(parse_seed("0x9E2030F1"), Ok(0x9E20_30F1)); }
    #[test] fn seed_decimal() { assert_eq!(parse_seed("42"), Ok(42)); }
    #[test] fn seed_garbage() { assert!(parse_seed("0xzz").is_err()); }

    #[test]
    fn load_flags_repeat() {
        let cli = Cli::parse_from(["resdef", "--root", "data", "load", "--material", "a", "--material", "b"]);
        let Command::Load(args) = cli.command else { panic!("expected load") };
        assert_eq!(args.materials, ["a", "b"]);
        assert!(args.programs.is_empty());
    }
}
