//! # Playlist screen
//!
//! Keeps a local working set of playlist entries in step with the playlist
//! API. The working set is only ever replaced wholesale by a successful
//! [`fetch_all`](PlaylistScreen::fetch_all); every successful mutation is
//! followed by such a fetch instead of patching the local copy.

use crate::catalog::PlaylistApiClient;
use crate::form::{EditState, FormBuffer};
use crate::types::{
    ClientEvent, EntryId, PlaylistError, SharedEventBroadcaster, TrackEntry, TrackField,
    TrackFields,
};
use crate::Result;
use std::sync::Arc;

/// What happened after a mutation request was answered.
#[derive(Debug)]
pub enum MutationOutcome {
    /// The API accepted the mutation and the working set was re-fetched.
    Refreshed,
    /// The API accepted the mutation but the follow-up fetch failed.
    /// The working set still holds the previous snapshot.
    RefreshFailed(PlaylistError),
    /// The user declined the delete confirmation; nothing was sent.
    Cancelled,
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, MutationOutcome::Cancelled)
    }
}

/// Answer to the delete confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteChoice {
    Cancel,
    Confirm,
}

/// Asks the user whether an entry should really be deleted.
pub trait DeletePrompt {
    fn choose(&self, entry: &EntryId) -> DeleteChoice;
}

impl<F> DeletePrompt for F
where
    F: Fn(&EntryId) -> DeleteChoice,
{
    fn choose(&self, entry: &EntryId) -> DeleteChoice {
        self(entry)
    }
}

/// State behind the playlist screen: working set, form buffer and loading flag.
///
/// # Examples
///
/// ```rust,no_run
/// use playlist_client::{
///     DeleteChoice, EntryId, PlaylistApiClientImpl, PlaylistScreen, TrackField,
/// };
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let http = Arc::new(http_client::native::NativeClient::new());
/// let client = PlaylistApiClientImpl::new(http, "https://webapptech.site/apiplaylist/api/playlist");
/// let mut screen = PlaylistScreen::new(client);
///
/// screen.fetch_all().await?;
///
/// screen.set_field(TrackField::Title, "Aquarela");
/// screen.set_field(TrackField::Performer, "Toquinho");
/// screen.set_field(TrackField::Label, "Ariola");
/// screen.submit().await?;
///
/// screen
///     .submit_delete(&EntryId::new("1"), &|_: &EntryId| DeleteChoice::Confirm)
///     .await?;
/// # Ok::<(), playlist_client::PlaylistError>(())
/// # });
/// ```
pub struct PlaylistScreen<C> {
    client: C,
    entries: Vec<TrackEntry>,
    form: FormBuffer,
    loading: bool,
    broadcaster: Arc<SharedEventBroadcaster>,
}

impl<C: PlaylistApiClient> PlaylistScreen<C> {
    pub fn new(client: C) -> Self {
        Self::with_broadcaster(client, Arc::new(SharedEventBroadcaster::new()))
    }

    /// Create a screen that reports loading events on an existing broadcaster.
    pub fn with_broadcaster(client: C, broadcaster: Arc<SharedEventBroadcaster>) -> Self {
        Self {
            client,
            entries: Vec::new(),
            form: FormBuffer::new(),
            loading: false,
            broadcaster,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// The working set as of the last successful fetch.
    pub fn entries(&self) -> &[TrackEntry] {
        &self.entries
    }

    pub fn entry(&self, id: &EntryId) -> Option<&TrackEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    pub fn form(&self) -> &FormBuffer {
        &self.form
    }

    pub fn edit_state(&self) -> &EditState {
        self.form.state()
    }

    /// True while a full fetch is in flight. Mutations never raise it.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_field(&mut self, field: TrackField, value: impl Into<String>) {
        self.form.set(field, value);
    }

    /// Replace the working set with the current remote collection.
    ///
    /// On failure the previous working set is kept as is.
    pub async fn fetch_all(&mut self) -> Result<&[TrackEntry]> {
        self.set_loading(true);
        let result = self.client.list_entries().await;
        self.set_loading(false);

        match result {
            Ok(entries) => {
                log::debug!("Working set replaced with {} entries", entries.len());
                self.entries = entries;
                self.broadcaster
                    .broadcast_event(ClientEvent::WorkingSetReplaced {
                        entries: self.entries.len(),
                    });
                Ok(&self.entries)
            }
            Err(e) => {
                log::warn!("Keeping previous working set: {e}");
                Err(e)
            }
        }
    }

    /// Submit the form buffer: creates when idle, updates the editing target otherwise.
    pub async fn submit(&mut self) -> Result<MutationOutcome> {
        let fields = self.form.fields().clone();
        match self.form.state().clone() {
            EditState::Idle => self.submit_create(fields).await,
            EditState::Editing(id) => self.submit_update(&id, fields).await,
        }
    }

    /// Create a new entry, then refresh the working set and clear the form.
    pub async fn submit_create(&mut self, fields: TrackFields) -> Result<MutationOutcome> {
        fields.validate()?;

        self.client.create_entry(&fields).await?;
        log::info!("Created entry '{}' by '{}'", fields.title, fields.performer);

        self.form.clear();
        Ok(self.refresh_after_mutation().await)
    }

    /// Update entry `id`, then refresh the working set and reset the form to idle.
    pub async fn submit_update(
        &mut self,
        id: &EntryId,
        fields: TrackFields,
    ) -> Result<MutationOutcome> {
        fields.validate()?;

        self.client.update_entry(id, &fields).await?;
        log::info!("Updated entry {id}");

        self.form.clear();
        Ok(self.refresh_after_mutation().await)
    }

    /// Delete entry `id` once `prompt` confirms it, then refresh the working set.
    pub async fn submit_delete<P>(&mut self, id: &EntryId, prompt: &P) -> Result<MutationOutcome>
    where
        P: DeletePrompt + ?Sized,
    {
        if prompt.choose(id) == DeleteChoice::Cancel {
            log::debug!("Delete of entry {id} cancelled");
            return Ok(MutationOutcome::Cancelled);
        }

        self.client.delete_entry(id).await?;
        log::info!("Deleted entry {id}");

        Ok(self.refresh_after_mutation().await)
    }

    /// Copy `entry` into the form and make it the editing target.
    pub fn begin_edit(&mut self, entry: &TrackEntry) {
        self.form.load_entry(entry);
    }

    /// Drop the editing target and empty the form.
    pub fn cancel_edit(&mut self) {
        self.form.clear();
    }

    async fn refresh_after_mutation(&mut self) -> MutationOutcome {
        match self.fetch_all().await {
            Ok(_) => MutationOutcome::Refreshed,
            Err(e) => MutationOutcome::RefreshFailed(e),
        }
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.broadcaster
            .broadcast_event(ClientEvent::CatalogLoading { loading });
    }
}
