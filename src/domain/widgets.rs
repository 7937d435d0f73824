use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::identity::{Identity, UserId};

pub type StickyNoteId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteColor {
    Yellow,
    Pink,
    Blue,
    Green,
}

impl NoteColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteColor::Yellow => "yellow",
            NoteColor::Pink => "pink",
            NoteColor::Blue => "blue",
            NoteColor::Green => "green",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "yellow" => Some(NoteColor::Yellow),
            "pink" => Some(NoteColor::Pink),
            "blue" => Some(NoteColor::Blue),
            "green" => Some(NoteColor::Green),
            _ => None,
        }
    }
}

impl std::fmt::Display for NoteColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A sticky note on the office dashboard. Owned by its author; only the
/// author may edit it, the author or an admin may take it down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StickyNote {
    pub id: StickyNoteId,
    pub body: String,
    pub color: NoteColor,
    pub author: String,
    pub author_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StickyNote {
    pub fn new(body: String, color: NoteColor, author: &Identity) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            body,
            color,
            author: author.name.clone(),
            author_id: Some(author.id),
            created_at: now,
            updated_at: now,
        }
    }
}

/// The shared whiteboard. A single row everyone overwrites; last writer
/// wins, and the row remembers who that was.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Whiteboard {
    pub content: String,
    pub updated_by: Option<String>,
    pub updated_by_id: Option<UserId>,
    pub updated_at: DateTime<Utc>,
}

impl Whiteboard {
    pub fn empty() -> Self {
        Self {
            content: String::new(),
            updated_by: None,
            updated_by_id: None,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::Role;

    #[test]
    fn test_color_roundtrip() {
        for color in [
            NoteColor::Yellow,
            NoteColor::Pink,
            NoteColor::Blue,
            NoteColor::Green,
        ] {
            assert_eq!(NoteColor::from_str(color.as_str()), Some(color));
        }
    }

    #[test]
    fn test_note_records_author() {
        let author = Identity {
            id: Uuid::new_v4(),
            name: "Elena Stoyanova".into(),
            role: Role::Author,
        };
        let note = StickyNote::new("Call the printer".into(), NoteColor::Yellow, &author);
        assert_eq!(note.author, "Elena Stoyanova");
        assert_eq!(note.author_id, Some(author.id));
    }
}
