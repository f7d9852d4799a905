use crate::util::new_id;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// A reusable label. Identity is `id`; only `label` ever changes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    pub label: String,
}

impl Tag {
    /// Create a tag with a freshly generated id.
    ///
    /// Tag ids are minted where the tag is created (the tag picker), not by
    /// `NoteStore::add_tag`.
    pub fn new(label: impl Into<String>) -> Result<Self, getrandom::Error> {
        Ok(Self {
            id: new_id()?,
            label: label.into(),
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub title: String,

    /// Free-text body. Older snapshots may call this `body`.
    #[serde(alias = "body")]
    pub markdown: String,

    /// Ids of attached tags. May point at tags that were deleted since.
    #[serde(rename = "tagIds")]
    pub tag_ids: Vec<String>,
}

/// User input for creating or updating a note.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoteData {
    pub title: String,
    pub markdown: String,
    pub tags: Vec<Tag>,
}

impl NoteData {
    pub fn new(title: impl Into<String>, markdown: impl Into<String>, tags: Vec<Tag>) -> Self {
        Self {
            title: title.into(),
            markdown: markdown.into(),
            tags,
        }
    }

    pub(crate) fn tag_ids(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.id.clone()).collect()
    }

    pub(crate) fn into_note(self, id: String) -> Note {
        let tag_ids = self.tag_ids();
        Note {
            id,
            title: self.title,
            markdown: self.markdown,
            tag_ids,
        }
    }
}

/// A note with its tag ids resolved against the current tag collection.
///
/// Derived on read, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnrichedNote {
    pub note: Rc<Note>,
    pub tags: Vec<Tag>,
}

impl EnrichedNote {
    pub fn id(&self) -> &str {
        &self.note.id
    }

    pub fn title(&self) -> &str {
        &self.note.title
    }

    pub fn markdown(&self) -> &str {
        &self.note.markdown
    }
}

pub type NoteList = Vec<Rc<Note>>;
pub type TagList = Vec<Tag>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_persisted_field_names() {
        let note = Note {
            id: "n1".to_string(),
            title: "A".to_string(),
            markdown: "x".to_string(),
            tag_ids: vec!["t1".to_string()],
        };
        let v = serde_json::to_value(&note).expect("should serialize");
        assert_eq!(v["id"], "n1");
        assert_eq!(v["markdown"], "x");
        assert_eq!(v["tagIds"][0], "t1");
        assert!(v.get("tag_ids").is_none());
    }

    #[test]
    fn test_note_accepts_body_alias() {
        let json = r#"{"id":"n1","title":"A","body":"x","tagIds":[]}"#;
        let note: Note = serde_json::from_str(json).expect("body alias should parse");
        assert_eq!(note.markdown, "x");
    }

    #[test]
    fn test_note_requires_tag_ids() {
        let json = r#"{"id":"n1","title":"A","markdown":"x"}"#;
        assert!(serde_json::from_str::<Note>(json).is_err());
    }

    #[test]
    fn test_note_data_projects_tag_ids_in_order() {
        let data = NoteData::new(
            "A",
            "x",
            vec![
                Tag {
                    id: "t2".to_string(),
                    label: "home".to_string(),
                },
                Tag {
                    id: "t1".to_string(),
                    label: "work".to_string(),
                },
            ],
        );
        let note = data.into_note("n1".to_string());
        assert_eq!(note.tag_ids, vec!["t2".to_string(), "t1".to_string()]);
        assert_eq!(note.title, "A");
    }

    #[test]
    fn test_tag_new_generates_id() {
        let a = Tag::new("work").unwrap();
        let b = Tag::new("work").unwrap();
        assert_eq!(a.label, "work");
        assert_ne!(a.id, b.id);
    }
}
