//! Pure collection transformations.
//!
//! Each function takes the previous collection and returns the next one.
//! `None` means the target id was not present and nothing changed.
//! Untouched notes are carried over as the same `Rc`.

use crate::models::{Note, NoteData, NoteList, Tag, TagList};
use std::rc::Rc;

pub fn append_note(notes: &[Rc<Note>], note: Rc<Note>) -> NoteList {
    let mut next = Vec::with_capacity(notes.len() + 1);
    next.extend(notes.iter().cloned());
    next.push(note);
    next
}

pub fn replace_note(notes: &[Rc<Note>], id: &str, data: NoteData) -> Option<NoteList> {
    let pos = notes.iter().position(|n| n.id == id)?;
    let mut next = notes.to_vec();
    next[pos] = Rc::new(data.into_note(id.to_string()));
    Some(next)
}

pub fn remove_note(notes: &[Rc<Note>], id: &str) -> Option<NoteList> {
    if !notes.iter().any(|n| n.id == id) {
        return None;
    }
    Some(notes.iter().filter(|n| n.id != id).cloned().collect())
}

pub fn append_tag(tags: &[Tag], tag: Tag) -> TagList {
    let mut next = tags.to_vec();
    next.push(tag);
    next
}

pub fn relabel_tag(tags: &[Tag], id: &str, label: &str) -> Option<TagList> {
    let pos = tags.iter().position(|t| t.id == id)?;
    let mut next = tags.to_vec();
    next[pos].label = label.to_string();
    Some(next)
}

pub fn remove_tag(tags: &[Tag], id: &str) -> Option<TagList> {
    if !tags.iter().any(|t| t.id == id) {
        return None;
    }
    Some(tags.iter().filter(|t| t.id != id).cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str, title: &str) -> Rc<Note> {
        Rc::new(Note {
            id: id.to_string(),
            title: title.to_string(),
            markdown: String::new(),
            tag_ids: vec![],
        })
    }

    fn tag(id: &str, label: &str) -> Tag {
        Tag {
            id: id.to_string(),
            label: label.to_string(),
        }
    }

    #[test]
    fn test_append_note_keeps_existing_entries() {
        let notes = vec![note("n1", "A")];
        let next = append_note(&notes, note("n2", "B"));
        assert_eq!(next.len(), 2);
        assert!(Rc::ptr_eq(&next[0], &notes[0]));
        assert_eq!(next[1].id, "n2");
    }

    #[test]
    fn test_replace_note_keeps_position_and_id() {
        let notes = vec![note("n1", "A"), note("n2", "B"), note("n3", "C")];
        let next = replace_note(
            &notes,
            "n2",
            NoteData::new("B2", "y", vec![tag("t1", "work")]),
        )
        .expect("n2 exists");

        assert_eq!(next[1].id, "n2");
        assert_eq!(next[1].title, "B2");
        assert_eq!(next[1].markdown, "y");
        assert_eq!(next[1].tag_ids, vec!["t1".to_string()]);
        assert!(Rc::ptr_eq(&next[0], &notes[0]));
        assert!(Rc::ptr_eq(&next[2], &notes[2]));
    }

    #[test]
    fn test_replace_missing_note_is_none() {
        let notes = vec![note("n1", "A")];
        assert!(replace_note(&notes, "nope", NoteData::default()).is_none());
    }

    #[test]
    fn test_remove_note() {
        let notes = vec![note("n1", "A"), note("n2", "B")];
        let next = remove_note(&notes, "n1").unwrap();
        assert_eq!(next.len(), 1);
        assert!(Rc::ptr_eq(&next[0], &notes[1]));
        assert!(remove_note(&next, "n1").is_none());
    }

    #[test]
    fn test_relabel_tag_keeps_id_and_position() {
        let tags = vec![tag("t1", "work"), tag("t2", "home")];
        let next = relabel_tag(&tags, "t1", "job").unwrap();
        assert_eq!(next, vec![tag("t1", "job"), tag("t2", "home")]);
        assert!(relabel_tag(&tags, "t9", "x").is_none());
    }

    #[test]
    fn test_append_and_remove_tag() {
        let tags = append_tag(&[], tag("t1", "work"));
        let tags = append_tag(&tags, tag("t2", "home"));
        assert_eq!(tags.len(), 2);

        let next = remove_tag(&tags, "t1").unwrap();
        assert_eq!(next, vec![tag("t2", "home")]);
        assert!(remove_tag(&next, "t1").is_none());
    }
}
