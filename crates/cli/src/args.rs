//! Command-line surface of `wikictl`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Title the `demo` sequence works on unless told otherwise.
pub const DEMO_TITLE: &str = "Test2";

#[derive(Debug, Parser)]
#[command(name = "wikictl", version, about = "Read, write and delete wiki pages")]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Log output format on stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Base address of the wiki, e.g. `http://192.168.56.101`.
    #[arg(long = "url", env = "WIKI_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Path of the API script below the base address.
    #[arg(long, env = "WIKI_API_PATH", global = true)]
    pub api_path: Option<String>,

    #[arg(long = "user", env = "WIKI_USERNAME", global = true)]
    pub username: Option<String>,

    #[arg(long, env = "WIKI_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Seconds to wait for a connection to the wiki.
    #[arg(long, value_name = "SECS", global = true)]
    pub connect_timeout: Option<u64>,

    /// Seconds a single request may take in total.
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Answer every request from built-in sample replies instead of a wiki.
    #[arg(long, global = true)]
    pub offline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the wiki markup of a page.
    Get { title: String },

    /// Create a page or replace its content.
    Edit {
        title: String,
        #[command(flatten)]
        content: ContentSource,
    },

    /// Delete a page. Logs in first.
    Delete { title: String },

    /// Log in and report the session identity.
    Login,

    /// Add, read, edit, read, log in and delete one page, reporting each step.
    Demo {
        #[arg(long, default_value = DEMO_TITLE)]
        title: String,
    },
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct ContentSource {
    /// New page content.
    #[arg(long)]
    pub text: Option<String>,

    /// Read the new page content from a file.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn edit_accepts_inline_text() {
        let cli = Cli::try_parse_from(["wikictl", "edit", "Test2", "--text", "Hello"]).unwrap();
        match cli.command {
            Command::Edit { title, content } => {
                assert_eq!(title, "Test2");
                assert_eq!(content.text.as_deref(), Some("Hello"));
                assert_eq!(content.file, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn edit_requires_exactly_one_content_source() {
        assert!(Cli::try_parse_from(["wikictl", "edit", "Test2"]).is_err());
        assert!(
            Cli::try_parse_from(["wikictl", "edit", "T", "--text", "a", "--file", "b"]).is_err()
        );
    }

    #[test]
    fn global_options_follow_the_subcommand() {
        let cli =
            Cli::try_parse_from(["wikictl", "get", "Test", "--offline", "--log-format", "json"])
                .unwrap();
        assert!(cli.connection.offline);
        assert_eq!(cli.log_format, LogFormat::Json);

        let cli = Cli::try_parse_from(["wikictl", "login", "--connect-timeout", "3"]).unwrap();
        assert_eq!(cli.connection.connect_timeout, Some(3));
        assert_eq!(cli.connection.timeout, None);
    }

    #[test]
    fn demo_defaults_its_title() {
        let cli = Cli::try_parse_from(["wikictl", "demo"]).unwrap();
        assert!(matches!(cli.command, Command::Demo { ref title } if title == DEMO_TITLE));
    }
}
