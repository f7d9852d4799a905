pub mod context;
pub mod ops;
pub mod view;

pub use context::{provide_note_store, use_note_store, NoteStoreContext};
pub use view::{enrich_notes, filter_notes, EnrichedNotes, EnrichedNotesCache, NoteFilter};

use crate::config::AppConfig;
use crate::models::{EnrichedNote, Note, NoteData, NoteList, Tag, TagList};
use crate::storage::{KeyValueStore, PersistedValue, StorageError, NOTES_KEY, TAGS_KEY};
use crate::util::{is_blank, new_id};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use thiserror::Error;

/// Why a mutation was rejected.
///
/// Not-found and duplicate errors leave both collections untouched and
/// write nothing, so callers that want the silent behavior can ignore them.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("note `{0}` not found")]
    NoteNotFound(String),

    #[error("tag `{0}` not found")]
    TagNotFound(String),

    #[error("tag `{0}` already exists")]
    DuplicateTag(String),

    #[error("tag id must not be empty")]
    EmptyTagId,

    #[error("could not generate an id: {0}")]
    Entropy(String),

    #[error("note store is no longer available")]
    Disposed,

    /// The in-memory change was applied but could not be written.
    #[error(transparent)]
    Persist(#[from] StorageError),
}

impl StateError {
    /// True when the collections were left exactly as they were.
    pub fn is_rejected(&self) -> bool {
        !matches!(self, StateError::Persist(_))
    }
}

pub type StateResult<T> = Result<T, StateError>;

/// Keeps the first record for each id and drops blank ids.
fn dedupe_by_id<T>(items: Vec<T>, key_of: impl Fn(&T) -> &str, what: &str) -> (Vec<T>, usize) {
    let before = items.len();
    let mut seen = HashSet::with_capacity(before);
    let kept: Vec<T> = items
        .into_iter()
        .filter(|item| {
            let id = key_of(item);
            !is_blank(id) && seen.insert(id.to_string())
        })
        .collect();
    let dropped = before - kept.len();
    if dropped > 0 {
        log::warn!("dropped {dropped} stored {what} with a blank or duplicate id");
    }
    (kept, dropped)
}

/// Application state: the note and tag collections plus the derived view.
///
/// Both collections are persisted independently under their own keys.
pub struct NoteStore {
    notes: PersistedValue<NoteList>,
    tags: PersistedValue<TagList>,
    view: RefCell<EnrichedNotesCache>,
}

impl NoteStore {
    pub fn open(store: Rc<dyn KeyValueStore>, config: &AppConfig) -> Self {
        let notes = PersistedValue::load(
            Rc::clone(&store),
            config.storage_key(NOTES_KEY),
            Vec::new,
        );
        let tags = PersistedValue::load(store, config.storage_key(TAGS_KEY), Vec::new);

        let mut s = Self {
            notes,
            tags,
            view: RefCell::new(EnrichedNotesCache::new()),
        };
        s.repair_ids();
        log::info!(
            "loaded {} notes and {} tags",
            s.notes.get().len(),
            s.tags.get().len()
        );
        s
    }

    fn repair_ids(&mut self) {
        let (notes, dropped) =
            dedupe_by_id(self.notes.get().to_vec(), |n| n.id.as_str(), "notes");
        if dropped > 0 {
            let _ = self.notes.set(notes);
        }

        let (tags, dropped) = dedupe_by_id(self.tags.get().to_vec(), |t| t.id.as_str(), "tags");
        if dropped > 0 {
            let _ = self.tags.set(tags);
        }
    }

    /// Re-read both collections from storage.
    pub fn reload(&mut self) {
        self.notes.reload(Vec::new);
        self.tags.reload(Vec::new);
        self.repair_ids();
    }

    pub fn notes(&self) -> Rc<NoteList> {
        self.notes.get()
    }

    pub fn tags(&self) -> Rc<TagList> {
        self.tags.get()
    }

    pub fn note(&self, id: &str) -> Option<Rc<Note>> {
        self.notes.get().iter().find(|n| n.id == id).cloned()
    }

    pub fn tag(&self, id: &str) -> Option<Tag> {
        self.tags.get().iter().find(|t| t.id == id).cloned()
    }

    /// All notes with resolved tags, in note order. Memoized.
    pub fn notes_with_tags(&self) -> EnrichedNotes {
        self.view.borrow_mut().get(&self.notes.get(), &self.tags.get())
    }

    pub fn enriched_note(&self, id: &str) -> Option<Rc<EnrichedNote>> {
        self.notes_with_tags().iter().find(|n| n.id() == id).cloned()
    }

    pub fn filtered_notes(&self, filter: &NoteFilter) -> Vec<Rc<EnrichedNote>> {
        filter_notes(&self.notes_with_tags(), filter)
    }

    /// Number of times the enriched view was actually recomputed.
    pub fn view_rebuilds(&self) -> u64 {
        self.view.borrow().rebuilds()
    }

    fn fresh_note_id(&self) -> StateResult<String> {
        let notes = self.notes.get();
        loop {
            let id = new_id().map_err(|e| StateError::Entropy(e.to_string()))?;
            if !notes.iter().any(|n| n.id == id) {
                return Ok(id);
            }
            log::warn!("generated note id collided; retrying");
        }
    }

    pub fn create_note(&mut self, data: NoteData) -> StateResult<Rc<Note>> {
        let id = self.fresh_note_id()?;
        let note = Rc::new(data.into_note(id));
        let next = ops::append_note(&self.notes.get(), Rc::clone(&note));
        self.notes.set(next)?;
        log::debug!("created note {}", note.id);
        Ok(note)
    }

    pub fn update_note(&mut self, id: &str, data: NoteData) -> StateResult<()> {
        let next = ops::replace_note(&self.notes.get(), id, data)
            .ok_or_else(|| StateError::NoteNotFound(id.to_string()))?;
        self.notes.set(next)?;
        Ok(())
    }

    pub fn delete_note(&mut self, id: &str) -> StateResult<()> {
        let next = ops::remove_note(&self.notes.get(), id)
            .ok_or_else(|| StateError::NoteNotFound(id.to_string()))?;
        self.notes.set(next)?;
        Ok(())
    }

    pub fn add_tag(&mut self, tag: Tag) -> StateResult<()> {
        if is_blank(&tag.id) {
            return Err(StateError::EmptyTagId);
        }
        let tags = self.tags.get();
        if tags.iter().any(|t| t.id == tag.id) {
            return Err(StateError::DuplicateTag(tag.id));
        }
        self.tags.set(ops::append_tag(&tags, tag))?;
        Ok(())
    }

    pub fn rename_tag(&mut self, id: &str, label: &str) -> StateResult<()> {
        let next = ops::relabel_tag(&self.tags.get(), id, label)
            .ok_or_else(|| StateError::TagNotFound(id.to_string()))?;
        self.tags.set(next)?;
        Ok(())
    }

    /// Remove a tag. Notes keep the id in `tag_ids`; the view drops it.
    pub fn delete_tag(&mut self, id: &str) -> StateResult<()> {
        let next = ops::remove_tag(&self.tags.get(), id)
            .ok_or_else(|| StateError::TagNotFound(id.to_string()))?;
        self.tags.set(next)?;
        Ok(())
    }
}
