use super::{EnrichedNotes, NoteFilter, NoteStore, StateError, StateResult};
use crate::models::{EnrichedNote, Note, NoteData, Tag, TagList};
use leptos::prelude::*;
use std::rc::Rc;

/// Handle to the app's [`NoteStore`] for components.
///
/// The store lives in local arena storage (it holds `Rc`s). `revision`
/// ticks after every mutation so reactive readers re-run; the enriched view
/// itself is still served from the store's cache.
#[derive(Clone, Copy)]
pub struct NoteStoreContext {
    store: StoredValue<NoteStore, LocalStorage>,
    revision: RwSignal<u64>,
}

impl NoteStoreContext {
    pub fn new(store: NoteStore) -> Self {
        Self {
            store: StoredValue::new_local(store),
            revision: RwSignal::new(0),
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision.get_untracked()
    }

    fn read<R>(&self, f: impl FnOnce(&NoteStore) -> R) -> Option<R> {
        self.revision.track();
        self.store.try_with_value(f)
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut NoteStore) -> StateResult<R>) -> StateResult<R> {
        let result = self
            .store
            .try_update_value(f)
            .unwrap_or(Err(StateError::Disposed));

        match &result {
            Err(e) if e.is_rejected() => log::warn!("{e}"),
            _ => self.revision.update(|r| *r = r.wrapping_add(1)),
        }
        result
    }

    pub fn notes_with_tags(&self) -> EnrichedNotes {
        self.read(|s| s.notes_with_tags()).unwrap_or_default()
    }

    pub fn filtered_notes(&self, filter: &NoteFilter) -> Vec<Rc<EnrichedNote>> {
        self.read(|s| s.filtered_notes(filter)).unwrap_or_default()
    }

    pub fn enriched_note(&self, id: &str) -> Option<Rc<EnrichedNote>> {
        self.read(|s| s.enriched_note(id)).flatten()
    }

    pub fn tags(&self) -> Rc<TagList> {
        self.read(|s| s.tags()).unwrap_or_default()
    }

    pub fn create_note(&self, data: NoteData) -> StateResult<Rc<Note>> {
        self.mutate(|s| s.create_note(data))
    }

    pub fn update_note(&self, id: &str, data: NoteData) -> StateResult<()> {
        self.mutate(|s| s.update_note(id, data))
    }

    pub fn delete_note(&self, id: &str) -> StateResult<()> {
        self.mutate(|s| s.delete_note(id))
    }

    pub fn add_tag(&self, tag: Tag) -> StateResult<()> {
        self.mutate(|s| s.add_tag(tag))
    }

    pub fn rename_tag(&self, id: &str, label: &str) -> StateResult<()> {
        self.mutate(|s| s.rename_tag(id, label))
    }

    pub fn delete_tag(&self, id: &str) -> StateResult<()> {
        self.mutate(|s| s.delete_tag(id))
    }

    /// Re-read storage, e.g. from a `storage` event listener.
    pub fn reload(&self) {
        let _ = self.mutate(|s| {
            s.reload();
            Ok(())
        });
    }
}

pub fn provide_note_store(store: NoteStore) -> NoteStoreContext {
    let ctx = NoteStoreContext::new(store);
    provide_context(ctx);
    ctx
}

pub fn use_note_store() -> NoteStoreContext {
    expect_context::<NoteStoreContext>()
}
