//! Command dispatch and the demo sequence.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use tracing::warn;
use transport::HttpTransportConfig;
use wiki::config::ENV_BASE_URL;
use wiki::{ConfigError, EditOutcome, PageTitle, Transport, WikiClient, WikiConfig, WikiError};

use crate::args::{Command, ConnectionArgs, ContentSource};

/// Exit code for `get` on a page that does not exist.
pub const EXIT_PAGE_NOT_FOUND: u8 = 2;

/// Base address used in offline mode when none is given.
const OFFLINE_BASE_URL: &str = "http://localhost";

const ENV_USERNAME: &str = "WIKI_USERNAME";
const ENV_PASSWORD: &str = "WIKI_PASSWORD";

/// Builds the client configuration from the connection options.
pub fn wiki_config(connection: &ConnectionArgs) -> Result<WikiConfig, ConfigError> {
    let base_url = match (&connection.base_url, connection.offline) {
        (Some(url), _) => url.clone(),
        (None, true) => OFFLINE_BASE_URL.to_string(),
        (None, false) => return Err(ConfigError::Missing { key: ENV_BASE_URL }),
    };
    let config = WikiConfig::new(base_url)?;
    Ok(match &connection.api_path {
        Some(path) if !path.is_empty() => config.with_api_path(path),
        _ => config,
    })
}

/// HTTP settings, with any timeout overrides applied.
pub fn transport_config(connection: &ConnectionArgs) -> HttpTransportConfig {
    let mut config = HttpTransportConfig::default();
    if let Some(secs) = connection.connect_timeout {
        config = config.with_connect_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = connection.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    config
}

fn login_credentials(connection: &ConnectionArgs) -> Result<(&str, &str), ConfigError> {
    let username = connection
        .username
        .as_deref()
        .ok_or(ConfigError::Missing { key: ENV_USERNAME })?;
    let password = connection
        .password
        .as_deref()
        .ok_or(ConfigError::Missing { key: ENV_PASSWORD })?;
    Ok((username, password))
}

fn page_title(title: &str) -> anyhow::Result<PageTitle> {
    PageTitle::new(title).context("page title must not be empty")
}

async fn read_content(source: &ContentSource) -> anyhow::Result<String> {
    match (&source.text, &source.file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        (None, None) => anyhow::bail!("either --text or --file is required"),
    }
}

/// Runs one subcommand against `client`.
pub async fn run<T: Transport>(
    mut client: WikiClient<T>,
    connection: &ConnectionArgs,
    command: Command,
) -> anyhow::Result<ExitCode> {
    match command {
        Command::Get { title } => {
            let title = page_title(&title)?;
            match client.get_content(&title).await {
                Ok(content) => println!("{content}"),
                Err(e @ WikiError::PageNotFound { .. }) => {
                    eprintln!("{e}");
                    return Ok(ExitCode::from(EXIT_PAGE_NOT_FOUND));
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Edit { title, content } => {
            let title = page_title(&title)?;
            let text = read_content(&content).await?;
            let outcome = client.edit_page(&title, &text).await?;
            println!("{}", describe_edit(&title, outcome));
        }
        Command::Delete { title } => {
            let title = page_title(&title)?;
            let (username, password) = login_credentials(connection)?;
            client.login(username, password).await?;
            client.delete_page(&title).await?;
            println!("Page '{title}' deleted");
        }
        Command::Login => {
            let (username, password) = login_credentials(connection)?;
            client.login(username, password).await?;
            if let Some(credentials) = client.credentials() {
                println!(
                    "Logged in as {} (user id {})",
                    credentials.user_name(),
                    credentials.user_id()
                );
            }
        }
        Command::Demo { title } => {
            let title = page_title(&title)?;
            demo(&mut client, connection, &title).await;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn describe_edit(title: &PageTitle, outcome: EditOutcome) -> String {
    match outcome {
        EditOutcome::PageAdded => format!("Page '{title}' added"),
        EditOutcome::PageUpdated => format!("Page '{title}' edited"),
        EditOutcome::NoChange => format!("Page '{title}' unchanged"),
    }
}

/// Adds, reads, edits, reads, logs in, and deletes `title`.
///
/// Every step runs even if an earlier one failed; each prints its own
/// outcome.
async fn demo<T: Transport>(
    client: &mut WikiClient<T>,
    connection: &ConnectionArgs,
    title: &PageTitle,
) {
    match client.edit_page(title, "Test Page").await {
        Ok(outcome) => println!("{}", describe_edit(title, outcome)),
        Err(e) => println!("Error adding page '{title}': {e}"),
    }

    match read_step(client, title).await {
        Some(content) => match client.edit_page(title, &format!("{content}.1")).await {
            Ok(outcome) => println!("{}", describe_edit(title, outcome)),
            Err(e) => println!("Error editing page '{title}': {e}"),
        },
        None => println!("Skipping edit of '{title}': its content could not be read"),
    }

    read_step(client, title).await;

    let login = match login_credentials(connection) {
        Ok((username, password)) => client
            .login(username, password)
            .await
            .map_err(anyhow::Error::from),
        Err(e) => Err(anyhow::Error::from(e)),
    };
    match login {
        Ok(()) => println!("Login successful"),
        Err(e) => println!("Login failed: {e}"),
    }

    match client.delete_page(title).await {
        Ok(()) => println!("Delete successful"),
        Err(e) => println!("Delete failed: {e}"),
    }
}

async fn read_step<T: Transport>(client: &WikiClient<T>, title: &PageTitle) -> Option<String> {
    match client.get_content(title).await {
        Ok(content) => {
            println!("Content of '{title}': {content}");
            Some(content)
        }
        Err(e) => {
            warn!(error = %e, "content fetch failed");
            println!("Content of '{title}': {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use wiki::canned::CannedTransport;
    use wiki::{TransportError, WireRequest, WireResponse};

    /// Canned replies, except that every content query finds no page.
    #[derive(Default)]
    struct PageAlwaysMissing(CannedTransport);

    #[async_trait]
    impl Transport for PageAlwaysMissing {
        async fn send(&self, request: &WireRequest) -> Result<WireResponse, TransportError> {
            let reply = self.0.send(request).await?;
            if request.parameters.get("rvprop") == Some("content") {
                return Ok(WireResponse::ok(
                    r#"{"query":{"pages":{"-1":{"title":"Test2","missing":""}}}}"#,
                ));
            }
            Ok(reply)
        }
    }

    fn actions(requests: &[WireRequest]) -> Vec<String> {
        requests
            .iter()
            .map(|r| r.parameters.get("action").unwrap_or_default().to_string())
            .collect()
    }

    fn connection(offline: bool) -> ConnectionArgs {
        ConnectionArgs {
            base_url: None,
            api_path: None,
            username: Some("root".into()),
            password: Some("secret".into()),
            connect_timeout: None,
            timeout: None,
            offline,
        }
    }

    fn offline_client() -> WikiClient<CannedTransport> {
        let config = wiki_config(&connection(true)).unwrap();
        WikiClient::new(&config, CannedTransport::new())
    }

    #[test]
    fn online_mode_requires_a_base_url() {
        assert_eq!(
            wiki_config(&connection(false)),
            Err(ConfigError::Missing { key: ENV_BASE_URL })
        );
    }

    #[test]
    fn api_path_override_is_applied() {
        let mut args = connection(false);
        args.base_url = Some("https://wiki.example.org/".into());
        args.api_path = Some("w/api.php".into());

        let config = wiki_config(&args).unwrap();

        assert_eq!(config.endpoint(), "https://wiki.example.org/w/api.php");
    }

    #[test]
    fn timeout_overrides_reach_the_transport_config() {
        let mut args = connection(false);
        assert_eq!(transport_config(&args), HttpTransportConfig::default());

        args.connect_timeout = Some(3);
        args.timeout = Some(20);
        let config = transport_config(&args);

        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.timeout, Duration::from_secs(20));
    }

    #[test]
    fn login_needs_a_password() {
        let mut args = connection(true);
        args.password = None;
        assert_eq!(
            login_credentials(&args),
            Err(ConfigError::Missing { key: ENV_PASSWORD })
        );
    }

    #[tokio::test]
    async fn delete_succeeds_offline_with_credentials() {
        let client = offline_client();
        let args = connection(true);

        run(client, &args, Command::Delete { title: "Test2".into() })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn demo_runs_every_step_offline() {
        let mut client = offline_client();
        let title = PageTitle::new("Test2").unwrap();

        demo(&mut client, &connection(true), &title).await;

        assert_eq!(
            actions(&client.transport().requests()),
            [
                "query", "edit", "query", "query", "edit", "query", "login", "login", "query",
                "delete"
            ]
        );
        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn demo_skips_the_edit_when_the_read_fails() {
        let config = wiki_config(&connection(true)).unwrap();
        let mut client = WikiClient::new(&config, PageAlwaysMissing::default());
        let title = PageTitle::new("Test2").unwrap();

        demo(&mut client, &connection(true), &title).await;

        assert_eq!(
            actions(&client.transport().0.requests()),
            ["query", "edit", "query", "query", "login", "login", "query", "delete"]
        );
    }

    #[test]
    fn edit_outcomes_read_like_the_console() {
        let title = PageTitle::new("Test2").unwrap();
        assert_eq!(describe_edit(&title, EditOutcome::PageAdded), "Page 'Test2' added");
        assert_eq!(describe_edit(&title, EditOutcome::PageUpdated), "Page 'Test2' edited");
    }
}
