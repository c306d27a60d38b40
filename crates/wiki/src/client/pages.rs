//! Page operations: read, create-or-update, delete.

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use super::{missing, unrecognized, WikiClient};
use crate::envelope::{Envelope, Warnings};
use crate::errors::{ProtocolFault, Step, WikiError};
use crate::session::SessionCredentials;
use crate::transport::{Method, Params, Transport};
use crate::types::EditOutcome;
use crate::{BaseTimestamp, DeleteToken, EditToken, PageTitle};

const SUCCESS: &str = "Success";

/// What the edit-token query yields for the following edit.
#[derive(Debug)]
struct EditTicket {
    token: EditToken,
    base_timestamp: BaseTimestamp,
}

/// Logs warnings that accompany an otherwise usable reply.
fn log_discarded(step: Step, warnings: Option<&Warnings>) {
    if let Some(warnings) = warnings {
        warn!(%step, %warnings, "ignoring remote warnings");
    }
}

impl<T: Transport> WikiClient<T> {
    /// Returns the wiki markup of the latest revision of `title`, unmodified.
    ///
    /// Fails with [`WikiError::PageNotFound`] if the page does not exist.
    #[instrument(name = "get_content", skip_all, fields(title = %title))]
    pub async fn get_content(&self, title: &PageTitle) -> Result<String, WikiError> {
        let step = Step::FetchContent;
        let params = Params::new()
            .with("action", "query")
            .with("prop", "revisions")
            .with("rvprop", "content")
            .with_encoded("titles", title.as_str());

        match self.exchange(step, self.request(Method::Get, params)).await? {
            Envelope::Error(error) => Err(WikiError::fault(step, error.into())),
            Envelope::Query { query, warnings } => {
                log_discarded(step, warnings.as_ref());
                let page = query.single_page().ok_or_else(|| missing(step, "pages"))?;
                if page.missing {
                    debug!("page does not exist");
                    return Err(WikiError::PageNotFound {
                        title: title.clone(),
                    });
                }
                let content = page
                    .first_revision_content()
                    .ok_or_else(|| missing(step, "revisions"))?;
                Ok(content.to_owned())
            }
            other => Err(unrecognized(step, other)),
        }
    }

    /// Creates `title` with `content`, or saves `content` as its new revision.
    ///
    /// No login is required here; a wiki that refuses anonymous edits reports
    /// it through the edit reply.
    #[instrument(name = "edit_page", skip_all, fields(title = %title))]
    pub async fn edit_page(
        &self,
        title: &PageTitle,
        content: &str,
    ) -> Result<EditOutcome, WikiError> {
        let ticket = self.request_edit_token(title).await?;
        let outcome = self.submit_edit(title, content, ticket).await?;
        info!(%outcome, "edit saved");
        Ok(outcome)
    }

    async fn request_edit_token(&self, title: &PageTitle) -> Result<EditTicket, WikiError> {
        let step = Step::EditToken;
        let params = Params::new()
            .with("action", "query")
            .with("prop", "info|revisions")
            .with("intoken", "edit")
            .with_encoded("titles", title.as_str());

        match self.exchange(step, self.request(Method::Get, params)).await? {
            Envelope::Error(error) => Err(WikiError::fault(step, error.into())),
            Envelope::Query { query, warnings } => {
                log_discarded(step, warnings.as_ref());
                let page = query.single_page().ok_or_else(|| missing(step, "pages"))?;
                debug!(exists = !page.missing, "received edit token");

                let token = page
                    .edittoken
                    .clone()
                    .and_then(EditToken::new)
                    .ok_or_else(|| missing(step, "edittoken"))?;
                let base_timestamp = page
                    .base_timestamp()
                    .and_then(BaseTimestamp::new)
                    .ok_or_else(|| missing(step, "starttimestamp"))?;

                Ok(EditTicket {
                    token,
                    base_timestamp,
                })
            }
            other => Err(unrecognized(step, other)),
        }
    }

    async fn submit_edit(
        &self,
        title: &PageTitle,
        content: &str,
        ticket: EditTicket,
    ) -> Result<EditOutcome, WikiError> {
        let step = Step::EditSubmit;
        let params = Params::new()
            .with("action", "edit")
            .with_encoded("title", title.as_str())
            .with_encoded("text", content)
            .with("basetimestamp", ticket.base_timestamp.as_str())
            .with_encoded("token", ticket.token.as_str());

        match self.exchange(step, self.request(Method::Post, params)).await? {
            Envelope::Error(error) => Err(WikiError::fault(step, error.into())),
            Envelope::Edit(edit) if edit.result == SUCCESS => Ok(edit.outcome()),
            Envelope::Edit(edit) => Err(WikiError::fault(
                step,
                ProtocolFault::UnexpectedResult {
                    expected: SUCCESS,
                    actual: edit.result,
                },
            )),
            other => Err(unrecognized(step, other)),
        }
    }

    /// Deletes `title`. Requires a logged-in session.
    ///
    /// Without one this fails with [`WikiError::NotAuthenticated`] and sends
    /// nothing.
    #[instrument(name = "delete_page", skip_all, fields(title = %title))]
    pub async fn delete_page(&self, title: &PageTitle) -> Result<(), WikiError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(WikiError::NotAuthenticated {
                step: Step::DeleteToken,
            })?;

        let token = self.request_delete_token(title, credentials).await?;
        self.submit_delete(title, credentials, token).await
    }

    async fn request_delete_token(
        &self,
        title: &PageTitle,
        credentials: &SessionCredentials,
    ) -> Result<DeleteToken, WikiError> {
        let step = Step::DeleteToken;
        let params = Params::new()
            .with("action", "query")
            .with("prop", "info")
            .with("intoken", "delete")
            .with_encoded("titles", title.as_str())
            .with_encoded("lgtoken", credentials.login_token().as_str());
        let request = self
            .request(Method::Post, params)
            .with_header("Cookie", credentials.session_cookie(Utc::now()));

        match self.exchange(step, request).await? {
            Envelope::Error(error) => Err(WikiError::fault(step, error.into())),
            // TODO: give permission refusals their own error kind once callers
            // need to tell them apart from other protocol faults.
            Envelope::Query {
                warnings: Some(warnings),
                ..
            }
            | Envelope::Warnings(warnings) => Err(WikiError::fault(
                step,
                ProtocolFault::Warning(warnings.to_string()),
            )),
            Envelope::Query { query, .. } => query
                .single_page()
                .and_then(|page| page.deletetoken.clone())
                .and_then(DeleteToken::new)
                .ok_or_else(|| missing(step, "deletetoken")),
            other => Err(unrecognized(step, other)),
        }
    }

    async fn submit_delete(
        &self,
        title: &PageTitle,
        credentials: &SessionCredentials,
        token: DeleteToken,
    ) -> Result<(), WikiError> {
        let step = Step::DeleteSubmit;
        let params = Params::new()
            .with("action", "delete")
            .with_encoded("title", title.as_str())
            .with_encoded("token", token.as_str());
        let request = self
            .request(Method::Post, params)
            .with_header("Cookie", credentials.session_cookie(Utc::now()));

        match self.exchange(step, request).await? {
            Envelope::Error(error) => Err(WikiError::fault(step, error.into())),
            Envelope::Delete(receipt) => {
                info!(reason = %receipt.reason, "page deleted");
                Ok(())
            }
            other => Err(unrecognized(step, other)),
        }
    }
}
