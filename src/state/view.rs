//! Notes joined with their tags.
//!
//! `enrich_notes` is the plain join. `EnrichedNotesCache` wraps it so the
//! join only runs when the note or tag collection was actually replaced.

use crate::models::{EnrichedNote, Note, NoteList, Tag, TagList};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

pub type EnrichedNotes = Rc<Vec<Rc<EnrichedNote>>>;

fn tag_index(tags: &[Tag]) -> HashMap<&str, &Tag> {
    let mut index = HashMap::with_capacity(tags.len());
    for tag in tags {
        index.entry(tag.id.as_str()).or_insert(tag);
    }
    index
}

/// Resolve ids in listed order. Unknown ids are dropped, repeats resolve once.
fn resolve_tags(tag_ids: &[String], index: &HashMap<&str, &Tag>) -> Vec<Tag> {
    let mut seen = HashSet::with_capacity(tag_ids.len());
    tag_ids
        .iter()
        .filter(|id| seen.insert(*id))
        .filter_map(|id| index.get(id.as_str()).map(|t| (*t).clone()))
        .collect()
}

fn enrich_note(note: &Rc<Note>, index: &HashMap<&str, &Tag>) -> EnrichedNote {
    EnrichedNote {
        note: Rc::clone(note),
        tags: resolve_tags(&note.tag_ids, index),
    }
}

pub fn enrich_notes(notes: &[Rc<Note>], tags: &[Tag]) -> Vec<EnrichedNote> {
    let index = tag_index(tags);
    notes.iter().map(|n| enrich_note(n, &index)).collect()
}

/// Memoized [`enrich_notes`], keyed by the identity of both input `Rc`s.
///
/// When only the notes changed, entries whose `Rc<Note>` is unchanged are
/// reused as-is, so unaffected enriched notes keep their identity.
#[derive(Default)]
pub struct EnrichedNotesCache {
    inputs: Option<(Rc<NoteList>, Rc<TagList>)>,
    output: EnrichedNotes,
    rebuilds: u64,
}

impl EnrichedNotesCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the join actually ran.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn get(&mut self, notes: &Rc<NoteList>, tags: &Rc<TagList>) -> EnrichedNotes {
        let tags_unchanged = match &self.inputs {
            Some((n, t)) if Rc::ptr_eq(n, notes) && Rc::ptr_eq(t, tags) => {
                return Rc::clone(&self.output);
            }
            Some((_, t)) => Rc::ptr_eq(t, tags),
            None => false,
        };

        let previous = Rc::clone(&self.output);
        let reusable: HashMap<&str, &Rc<EnrichedNote>> = if tags_unchanged {
            previous.iter().map(|e| (e.id(), e)).collect()
        } else {
            HashMap::new()
        };

        let index = tag_index(tags);
        let next: Vec<Rc<EnrichedNote>> = notes
            .iter()
            .map(|note| match reusable.get(note.id.as_str()) {
                Some(prev) if Rc::ptr_eq(&prev.note, note) => Rc::clone(prev),
                _ => Rc::new(enrich_note(note, &index)),
            })
            .collect();

        self.inputs = Some((Rc::clone(notes), Rc::clone(tags)));
        self.output = Rc::new(next);
        self.rebuilds += 1;
        log::debug!(
            "rebuilt enriched notes ({} notes, {} tags)",
            notes.len(),
            tags.len()
        );
        Rc::clone(&self.output)
    }
}

/// List-view query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoteFilter {
    /// Case-insensitive title substring; empty matches everything.
    pub title: String,
    /// Every one of these must be attached (and still exist).
    pub tag_ids: Vec<String>,
}

pub fn filter_notes(notes: &[Rc<EnrichedNote>], filter: &NoteFilter) -> Vec<Rc<EnrichedNote>> {
    let needle = filter.title.to_lowercase();
    notes
        .iter()
        .filter(|n| needle.is_empty() || n.title().to_lowercase().contains(&needle))
        .filter(|n| {
            filter
                .tag_ids
                .iter()
                .all(|id| n.tags.iter().any(|t| &t.id == id))
        })
        .cloned()
        .collect()
}
