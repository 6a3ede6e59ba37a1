use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug)]
pub struct HealthResponse {
    pub service: String,
    pub status: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Upstream a result came from. Its display name is also its wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum SourceKind {
    ProjectGutenberg,
    OpenLibrary,
}

impl SourceKind {
    pub const ALL: [SourceKind; 2] = [SourceKind::ProjectGutenberg, SourceKind::OpenLibrary];

    pub fn display_name(self) -> &'static str {
        match self {
            SourceKind::ProjectGutenberg => "Project Gutenberg",
            SourceKind::OpenLibrary => "Open Library",
        }
    }

    /// What a reader can do with a result from this source.
    pub fn action_label(self) -> &'static str {
        match self {
            SourceKind::ProjectGutenberg => "Download",
            SourceKind::OpenLibrary => "Borrow Online",
        }
    }
}

impl From<SourceKind> for &'static str {
    fn from(kind: SourceKind) -> Self {
        kind.display_name()
    }
}

impl TryFrom<String> for SourceKind {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.display_name() == name)
            .ok_or_else(|| format!("unknown source '{}'", name))
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One normalized search hit, whichever source produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookResult {
    pub source: SourceKind,
    pub title: String,
    pub author: String,
    pub url: String,
    #[serde(rename = "cover_url")]
    pub cover_image_url: Option<String>,
    #[serde(rename = "action")]
    pub action_label: String,
}

impl BookResult {
    pub fn new(
        source: SourceKind,
        title: impl Into<String>,
        author: impl Into<String>,
        url: impl Into<String>,
        cover_image_url: Option<String>,
    ) -> Self {
        Self {
            source,
            title: title.into(),
            author: author.into(),
            url: url.into(),
            cover_image_url,
            action_label: source.action_label().to_string(),
        }
    }

    /// Key used to collapse the same book reported by several sources.
    pub fn dedup_key(&self) -> String {
        self.title.to_lowercase()
    }
}
