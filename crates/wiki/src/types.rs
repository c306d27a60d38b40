//! Value types returned by the client's public operations.

/// What a successful [`edit_page`](crate::WikiClient::edit_page) did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOutcome {
    /// The page did not exist and was created.
    PageAdded,
    /// A new revision was saved over the existing page.
    PageUpdated,
    /// The submitted text matched the current revision; nothing was saved.
    NoChange,
}

impl std::fmt::Display for EditOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            EditOutcome::PageAdded => "page added",
            EditOutcome::PageUpdated => "page updated",
            EditOutcome::NoChange => "no change",
        };
        f.write_str(text)
    }
}
