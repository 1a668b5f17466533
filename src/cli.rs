// CLI module for argument parsing and configuration

use crate::config::UserConfig;
use crate::domain::{DeleteMode, SortOrder};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Pswp - swipe through a photo folder and trash what you don't want
///
/// Keep or delete one photo at a time, newest or oldest first.
#[derive(Parser, Debug, Clone)]
#[command(name = "pswp")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory of photos to review
    ///
    /// If not specified, defaults to the current directory.
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Review order (overrides the saved preference)
    #[arg(short = 's', long = "sort", value_enum)]
    pub sort: Option<SortArg>,

    /// Collect deletions and submit them as one batch
    #[arg(short = 'Q', long = "queued", action = ArgAction::SetTrue)]
    pub queued: bool,

    /// Dry run mode - go through the motions without moving photos to trash
    #[arg(short = 'n', long = "dry-run", action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Skip the confirmation prompt before photos are trashed
    #[arg(short = 'y', long = "yes", action = ArgAction::SetTrue)]
    pub yes: bool,

    /// Include hidden files (files starting with .)
    #[arg(long = "hidden", action = ArgAction::SetTrue)]
    pub show_hidden: bool,

    /// Show the welcome dialog even if it was seen before
    #[arg(long = "welcome", action = ArgAction::SetTrue)]
    pub welcome: bool,

    /// Log filter written to the log file (e.g. "debug", "pswp=trace")
    #[arg(long = "log-level")]
    pub log_level: Option<String>,
}

/// Sort order options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    /// Most recent photos first
    Newest,
    /// Oldest photos first
    Oldest,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Newest => SortOrder::NewestFirst,
            SortArg::Oldest => SortOrder::OldestFirst,
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Validate the arguments and return any errors
    pub fn validate(&self) -> Result<(), String> {
        if !self.directory.exists() {
            return Err(format!(
                "Directory does not exist: {}",
                self.directory.display()
            ));
        }

        if !self.directory.is_dir() {
            return Err(format!(
                "Path is not a directory: {}",
                self.directory.display()
            ));
        }

        Ok(())
    }
}

/// Settings for one run: CLI flags layered over saved preferences
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub directory: PathBuf,
    pub sort_order: SortOrder,
    pub delete_mode: DeleteMode,
    pub dry_run: bool,
    pub require_approval: bool,
    pub show_hidden: bool,
    pub force_welcome: bool,
    pub log_level: Option<String>,
}

impl AppConfig {
    pub fn resolve(args: Args, prefs: &UserConfig) -> Self {
        AppConfig {
            directory: args.directory,
            sort_order: args.sort.map(SortOrder::from).unwrap_or(prefs.sort_order),
            delete_mode: if args.queued {
                DeleteMode::Queued
            } else {
                prefs.delete_mode
            },
            dry_run: args.dry_run,
            require_approval: !args.yes,
            show_hidden: args.show_hidden,
            force_welcome: args.welcome,
            log_level: args.log_level,
        }
    }
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        AppConfig::resolve(args, &UserConfig::default())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            directory: PathBuf::from("."),
            sort_order: SortOrder::default(),
            delete_mode: DeleteMode::default(),
            dry_run: false,
            require_approval: true,
            show_hidden: false,
            force_welcome: false,
            log_level: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("pswp").chain(args.iter().copied())).unwrap()
    }

    mod args_tests {
        use super::*;

        #[test]
        fn test_args_default_values() {
            let args = parse(&[]);

            assert_eq!(args.directory, PathBuf::from("."));
            assert!(args.sort.is_none());
            assert!(!args.queued);
            assert!(!args.dry_run);
            assert!(!args.yes);
            assert!(!args.show_hidden);
            assert!(!args.welcome);
            assert!(args.log_level.is_none());
        }

        #[test]
        fn test_args_all_flags() {
            let args = parse(&[
                "/photos",
                "--sort",
                "oldest",
                "--queued",
                "-n",
                "-y",
                "--hidden",
                "--welcome",
                "--log-level",
                "debug",
            ]);

            assert_eq!(args.directory, PathBuf::from("/photos"));
            assert_eq!(args.sort, Some(SortArg::Oldest));
            assert!(args.queued && args.dry_run && args.yes);
            assert!(args.show_hidden && args.welcome);
            assert_eq!(args.log_level.as_deref(), Some("debug"));
        }

        #[test]
        fn test_invalid_sort_rejected() {
            let result = Args::try_parse_from(["pswp", "--sort", "name"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_sort_arg_conversion() {
            assert_eq!(SortOrder::from(SortArg::Newest), SortOrder::NewestFirst);
            assert_eq!(SortOrder::from(SortArg::Oldest), SortOrder::OldestFirst);
        }

        #[test]
        fn test_args_validate_nonexistent_directory() {
            let args = parse(&["/nonexistent/path/12345"]);
            let result = args.validate();
            assert!(result.unwrap_err().contains("does not exist"));
        }

        #[test]
        fn test_args_validate_file_is_not_directory() {
            let file = tempfile::NamedTempFile::new().unwrap();
            let args = parse(&[file.path().to_str().unwrap()]);
            assert!(args.validate().unwrap_err().contains("not a directory"));
        }

        #[test]
        fn test_args_validate_success() {
            assert!(parse(&["."]).validate().is_ok());
        }
    }

    mod config_tests {
        use super::*;
        use crate::config::InteractionMode;

        #[test]
        fn test_preferences_used_when_flags_absent() {
            let prefs = UserConfig {
                sort_order: SortOrder::OldestFirst,
                delete_mode: DeleteMode::Queued,
                interaction_mode: InteractionMode::Browse,
                ..UserConfig::default()
            };

            let config = AppConfig::resolve(parse(&[]), &prefs);
            assert_eq!(config.sort_order, SortOrder::OldestFirst);
            assert_eq!(config.delete_mode, DeleteMode::Queued);
            assert!(config.require_approval);
        }

        #[test]
        fn test_flags_override_preferences() {
            let prefs = UserConfig {
                sort_order: SortOrder::OldestFirst,
                ..UserConfig::default()
            };

            let config = AppConfig::resolve(parse(&["--sort", "newest", "--queued", "--yes"]), &prefs);
            assert_eq!(config.sort_order, SortOrder::NewestFirst);
            assert_eq!(config.delete_mode, DeleteMode::Queued);
            assert!(!config.require_approval);
        }

        #[test]
        fn test_app_config_from_args() {
            let config: AppConfig = parse(&["/test/path", "--dry-run", "--hidden"]).into();

            assert_eq!(config.directory, PathBuf::from("/test/path"));
            assert!(config.dry_run);
            assert!(config.show_hidden);
            assert_eq!(config.sort_order, SortOrder::NewestFirst);
        }

        #[test]
        fn test_app_config_default() {
            let config = AppConfig::default();

            assert_eq!(config.directory, PathBuf::from("."));
            assert!(!config.dry_run);
            assert!(config.require_approval);
            assert_eq!(config.delete_mode, DeleteMode::Immediate);
        }
    }
}
