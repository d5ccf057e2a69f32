use clap::Parser;
use std::path::PathBuf;

/// Fixes up a fresh UMA import so it builds alongside the project's own code.
///
/// With no arguments, `umafix` patches the built-in targets under the project
/// root, which is the directory above the one holding the executable.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Patch UMA plugin sources after an import",
    long_about = "umafix - rewrites UMA plugin sources after a package import.

Built-in targets:
  • MeshHideAsset.cs   drop [SerializeField] above `public SlotDataAsset asset`
  • SSS_Utils.cginc    prefix the skin shader's roughness helpers with SSS_

Prints one line per target: `updated: <path>`, `unchanged: <path>` or
`warn: missing <path>`. Missing files never fail the run.

QUICK EXAMPLES:
  umafix                                # Patch the project this tool lives in
  umafix --root ~/Games/MyRpg --dry-run # Preview against another checkout
  umafix -c patches.yaml -f json        # Custom targets, JSON report"
)]
pub struct Args {
    /// The project root. Defaults to the parent of the executable's directory.
    #[arg(long, env = "UMAFIX_ROOT")]
    pub root: Option<PathBuf>,

    /// Path to a YAML file listing the targets to patch.
    ///
    /// Config file format:
    ///   targets:
    ///     - path: Assets/Scripts/Thing.cs
    ///       operation: strip_attribute
    ///       attribute: SerializeField
    ///       declaration: public Thing thing
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Report what would change without modifying any files.
    #[arg(long)]
    pub dry_run: bool,

    /// The output format for the report (`text` or `json`).
    #[arg(short = 'f', long = "format", default_value = "text")]
    pub format: String,

    /// Log debug diagnostics to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command-line arguments and returns the populated `Args` struct.
pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["umafix"]).unwrap();

        assert!(args.config.is_none());
        assert!(!args.dry_run);
        assert!(!args.verbose);
        assert_eq!(args.format, "text");
    }

    #[test]
    fn test_all_flags() {
        let args = Args::try_parse_from([
            "umafix", "--root", "/project", "-c", "patches.yaml", "--dry-run", "-f", "json", "-v",
        ])
        .unwrap();

        assert_eq!(args.root, Some(PathBuf::from("/project")));
        assert_eq!(args.config, Some(PathBuf::from("patches.yaml")));
        assert!(args.dry_run);
        assert!(args.verbose);
        assert_eq!(args.format, "json");
    }
}
