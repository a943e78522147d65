//! In-memory view of a single `.nfo` metadata file
//!
//! The record keeps the original document text untouched and tracks edits to
//! the two managed fields separately, so rendering can re-emit everything it
//! does not own verbatim.

/// Fields the reconciler is allowed to rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagedField {
    Title,
    Episode,
}

impl ManagedField {
    /// Stable output order for appended elements
    pub const ALL: [ManagedField; 2] = [ManagedField::Title, ManagedField::Episode];

    pub fn tag(self) -> &'static str {
        match self {
            ManagedField::Title => "title",
            ManagedField::Episode => "episode",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "title" => Some(ManagedField::Title),
            "episode" => Some(ManagedField::Episode),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct FieldEdits {
    title: Option<String>,
    episode: Option<String>,
}

/// Parsed metadata record
#[derive(Debug, Clone, PartialEq)]
pub struct NfoRecord {
    source: String,
    root_tag: String,
    title: Option<String>,
    episode: Option<String>,
    anilist_id: Option<String>,
    edits: FieldEdits,
}

impl NfoRecord {
    pub(crate) fn new(
        source: String,
        root_tag: String,
        title: Option<String>,
        episode: Option<String>,
        anilist_id: Option<String>,
    ) -> Self {
        Self {
            source,
            root_tag,
            title,
            episode,
            anilist_id,
            edits: FieldEdits::default(),
        }
    }

    /// Document text as it was loaded
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Name of the document element (`tvshow`, `episodedetails`, ...)
    pub fn root_tag(&self) -> &str {
        &self.root_tag
    }

    /// Current title, including any pending edit
    pub fn title(&self) -> Option<&str> {
        self.edits.title.as_deref().or(self.title.as_deref())
    }

    /// Current episode text, including any pending edit
    pub fn episode(&self) -> Option<&str> {
        self.edits.episode.as_deref().or(self.episode.as_deref())
    }

    /// Raw `anilistid` element text
    pub fn anilist_id_text(&self) -> Option<&str> {
        self.anilist_id.as_deref()
    }

    /// AniList id, when the `anilistid` element holds an integer
    pub fn anilist_id(&self) -> Option<i64> {
        self.anilist_id
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.edits.title = Some(title.into());
    }

    pub fn set_episode(&mut self, episode: impl Into<String>) {
        self.edits.episode = Some(episode.into());
    }

    /// Pending replacement text for a managed field
    pub fn edit(&self, field: ManagedField) -> Option<&str> {
        match field {
            ManagedField::Title => self.edits.title.as_deref(),
            ManagedField::Episode => self.edits.episode.as_deref(),
        }
    }

    pub fn is_modified(&self) -> bool {
        self.edits != FieldEdits::default()
    }
}
