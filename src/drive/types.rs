//! Types for Drive file listings

use serde::{Deserialize, Serialize};

/// Mime type Drive gives to folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Mime type Drive gives to Google Sheets documents
pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// Fields requested from `files.list`
pub const LIST_FIELDS: &str = "files(id, name, mimeType)";

/// A folder or file in the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// The file ID
    pub id: String,

    /// The file name
    pub name: String,

    /// The mime type, when requested
    #[serde(rename = "mimeType", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// The day's spreadsheet
pub type SheetRef = FileRef;

impl FileRef {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: None,
        }
    }

    /// Leading date token of the name: everything before the first space
    pub fn display_date(&self) -> &str {
        self.name.split(' ').next().unwrap_or_default()
    }
}

/// Response body of `files.list`
#[derive(Debug, Clone, Deserialize)]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<FileRef>,
}

/// Kind of entry to look up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Folder,
    Spreadsheet,
}

impl EntryKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Folder => FOLDER_MIME_TYPE,
            Self::Spreadsheet => SPREADSHEET_MIME_TYPE,
        }
    }
}

/// A `files.list` lookup by name, type and parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryQuery {
    /// Exact name to match; any name when unset
    pub name: Option<String>,

    /// Entry type
    pub kind: EntryKind,

    /// Parent folder ID; anywhere when unset
    pub parent_id: Option<String>,

    /// Exclude trashed entries
    pub trashed_false: bool,
}

impl EntryQuery {
    /// Non-trashed folder called `name`
    pub fn folder(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            kind: EntryKind::Folder,
            parent_id: None,
            trashed_false: true,
        }
    }

    /// All non-trashed spreadsheets
    pub fn spreadsheets() -> Self {
        Self {
            name: None,
            kind: EntryKind::Spreadsheet,
            parent_id: None,
            trashed_false: true,
        }
    }

    /// Restrict to children of `parent_id`
    pub fn in_parent(mut self, parent_id: &str) -> Self {
        self.parent_id = Some(parent_id.to_string());
        self
    }

    /// Render the Drive `q` search expression
    pub fn to_query_string(&self) -> String {
        let mut clauses = Vec::new();
        if let Some(name) = &self.name {
            clauses.push(format!("name = '{}'", escape(name)));
        }
        clauses.push(format!("mimeType = '{}'", self.kind.mime_type()));
        if let Some(parent) = &self.parent_id {
            clauses.push(format!("'{}' in parents", escape(parent)));
        }
        if self.trashed_false {
            clauses.push("trashed = false".to_string());
        }
        clauses.join(" and ")
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
