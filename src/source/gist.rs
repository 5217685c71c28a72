//! The gist payload returned by the GitHub REST API.
//!
//! Only the fields the panels render are modelled; `serde` ignores the rest.
//! Both `/gists/public` and `/users/{user}/gists` return a JSON array of
//! these objects, so a retrieval yields `Vec<Gist>`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Text shown in place of a missing or blank description.
pub const NO_DESCRIPTION: &str = "No description";

/// One gist, as listed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Gist {
    /// Stable identifier, used as the list key.
    pub id: String,

    /// Browser URL of the gist page.
    pub html_url: String,

    /// Free-form description.  The API sends `null` or `""` when unset.
    #[serde(default)]
    pub description: Option<String>,

    /// Owning account.  Anonymous gists have none.
    #[serde(default)]
    pub owner: Option<GistOwner>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Files keyed by filename.  Only the count is displayed.
    #[serde(default)]
    pub files: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GistOwner {
    pub login: String,
}

impl Gist {
    /// The description, or [`NO_DESCRIPTION`] when it is absent or blank.
    pub fn label(&self) -> &str {
        match self.description.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => NO_DESCRIPTION,
        }
    }

    pub fn owner_login(&self) -> Option<&str> {
        self.owner.as_ref().map(|o| o.login.as_str())
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
