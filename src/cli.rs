use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "curator",
    about = "Curator - Incremental game asset scanner and convention checker",
    version
)]
pub struct Args {
    /// Project directory to scan
    #[arg(short, long, default_value = ".")]
    pub directory: String,

    /// Run the rule engine over the scanned assets
    #[arg(short, long)]
    pub analyze: bool,

    /// Rule configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Report byte-identical duplicate files
    #[arg(long)]
    pub duplicates: bool,

    /// Ignore any persisted scan cache and rescan everything
    #[arg(long)]
    pub no_cache: bool,

    /// Scan cache location (defaults to a per-project file in the temp dir)
    #[arg(long)]
    pub cache_file: Option<PathBuf>,

    /// Number of parallel extraction threads (0 = auto-detect)
    #[arg(short, long, default_value = "0")]
    pub threads: usize,

    /// Maximum directory traversal depth
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Follow symbolic links during traversal
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Regex patterns to exclude from scanning
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Write the scan (and analysis) result to a JSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print a default rule configuration and exit
    #[arg(long)]
    pub default_config: bool,

    /// Enable verbose logging of all operations
    #[arg(short, long)]
    pub verbose: bool,

    /// Hide progress bars and use quiet output
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["curator"]);
        assert_eq!(args.directory, ".");
        assert!(!args.analyze);
        assert!(!args.no_cache);
        assert_eq!(args.threads, 0);
        assert!(args.max_depth.is_none());
    }

    #[test]
    fn test_exclude_is_comma_delimited() {
        let args = Args::parse_from(["curator", "--exclude", "Library,Temp"]);
        assert_eq!(args.exclude, vec!["Library", "Temp"]);
    }

    #[test]
    fn test_analyze_with_config() {
        let args = Args::parse_from(["curator", "-a", "-c", "rules.toml"]);
        assert!(args.analyze);
        assert_eq!(args.config.as_deref(), Some(std::path::Path::new("rules.toml")));
    }
}
