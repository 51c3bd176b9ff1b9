use chronicle_common::{
    sort_by_time, Activity, ActivityPatch, FetchOutcome, Insight, InsightGenerator, LocalMirror,
    StoreClient,
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::editor::{validate_fields, RecordEditor, ValidationError};
use crate::prompt::{ConfirmPrompt, Notifier};

pub const SAVE_FAILED_NOTICE: &str = "Failed to sync with cloud. Check your configuration.";
pub const DELETE_FAILED_NOTICE: &str = "Failed to delete from cloud.";
pub const DELETE_QUESTION: &str = "Delete this record?";

/// Collaborators the controller works through, built once at startup.
pub struct AppContext {
    pub store: StoreClient,
    pub mirror: Box<dyn LocalMirror>,
    pub insights: Box<dyn InsightGenerator>,
    pub confirm: Box<dyn ConfirmPrompt>,
    pub notifier: Box<dyn Notifier>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    Closed,
    Creating,
    Editing(String),
}

/// Where the authoritative list came from on startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Remote,
    Mirror,
    Empty,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("the record store did not accept the change")]
    Sync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
    Failed,
}

/// Owns the authoritative, time-sorted list and the flags a front-end renders.
///
/// Mutating operations take `&mut self`, so two saves or deletes can never be
/// in flight at once.
pub struct StateController {
    ctx: AppContext,
    activities: Vec<Activity>,
    loading: bool,
    syncing: bool,
    analyzing: bool,
    editor: EditorState,
    form: RecordEditor,
    insight: Option<Insight>,
    load_source: Option<LoadSource>,
}

impl StateController {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            activities: Vec::new(),
            loading: false,
            syncing: false,
            analyzing: false,
            editor: EditorState::Closed,
            form: RecordEditor::default(),
            insight: None,
            load_source: None,
        }
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    pub fn form(&self) -> &RecordEditor {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut RecordEditor {
        &mut self.form
    }

    pub fn insight(&self) -> Option<&Insight> {
        self.insight.as_ref()
    }

    pub fn load_source(&self) -> Option<LoadSource> {
        self.load_source
    }

    pub fn find(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    /// The record open in the editor, if any.
    pub fn selected(&self) -> Option<&Activity> {
        match &self.editor {
            EditorState::Editing(id) => self.find(id),
            _ => None,
        }
    }

    /// Adopt the remote list, or the mirror when the remote has nothing.
    pub async fn load_initial(&mut self) -> LoadSource {
        self.loading = true;

        let source = match self.ctx.store.fetch_activities().await {
            FetchOutcome::Populated(mut records) => {
                sort_by_time(&mut records);
                self.activities = records;
                LoadSource::Remote
            }
            outcome => {
                if outcome == FetchOutcome::Failed {
                    warn!("Remote store unavailable, falling back to local mirror");
                }
                let mut mirrored = self.ctx.mirror.read().await;
                sort_by_time(&mut mirrored);
                self.activities = mirrored;
                if self.activities.is_empty() {
                    LoadSource::Empty
                } else {
                    LoadSource::Mirror
                }
            }
        };

        info!("Loaded {} activities ({:?})", self.activities.len(), source);
        self.shadow_write().await;
        self.load_source = Some(source);
        self.loading = false;
        source
    }

    pub fn open_create(&mut self) {
        self.form = RecordEditor::for_create();
        self.editor = EditorState::Creating;
    }

    /// Returns false when no record has this id.
    pub fn open_edit(&mut self, id: &str) -> bool {
        let Some(activity) = self.find(id).cloned() else {
            return false;
        };
        self.form = RecordEditor::for_edit(&activity);
        self.editor = EditorState::Editing(activity.id);
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editor = EditorState::Closed;
    }

    /// Validate the open form and save it.
    pub async fn submit_editor(&mut self) -> Result<Activity, SaveError> {
        let patch = self.form.submit()?;
        self.save(patch).await
    }

    /// Create a record, or update the one open in the editor.
    ///
    /// On failure the list is untouched and the editor stays open so the
    /// user can retry.
    pub async fn save(&mut self, patch: ActivityPatch) -> Result<Activity, SaveError> {
        let record = self.prepare(patch)?;

        self.syncing = true;
        let accepted = self.ctx.store.upsert_activity(&record).await;
        self.syncing = false;

        if !accepted {
            self.ctx.notifier.notify(SAVE_FAILED_NOTICE);
            return Err(SaveError::Sync);
        }

        self.activities.retain(|a| a.id != record.id);
        self.activities.push(record.clone());
        sort_by_time(&mut self.activities);
        self.shadow_write().await;
        self.editor = EditorState::Closed;

        info!("Saved activity {} at {}", record.id, record.time);
        Ok(record)
    }

    fn prepare(&self, patch: ActivityPatch) -> Result<Activity, ValidationError> {
        if let Some(mut existing) = self.selected().cloned() {
            existing.apply(patch);
            validate_fields(&existing.name, &existing.time)?;
            return Ok(existing);
        }

        let name = patch.name.unwrap_or_default();
        let time = patch.time.unwrap_or_default();
        validate_fields(&name, &time)?;

        let mut record = Activity::new(name, time, patch.description);
        while self.find(&record.id).is_some() {
            record.regenerate_id();
        }
        Ok(record)
    }

    /// Ask for confirmation, then delete.
    pub async fn delete(&mut self, id: &str) -> DeleteOutcome {
        if !self.ctx.confirm.confirm(DELETE_QUESTION) {
            return DeleteOutcome::Cancelled;
        }
        self.delete_confirmed(id).await
    }

    /// Delete without asking; for front-ends that confirmed on their own.
    pub async fn delete_confirmed(&mut self, id: &str) -> DeleteOutcome {
        self.syncing = true;
        let accepted = self.ctx.store.delete_activity(id).await;
        self.syncing = false;

        if !accepted {
            self.ctx.notifier.notify(DELETE_FAILED_NOTICE);
            return DeleteOutcome::Failed;
        }

        self.activities.retain(|a| a.id != id);
        self.shadow_write().await;
        if self.editor == EditorState::Editing(id.to_string()) {
            self.editor = EditorState::Closed;
        }
        info!("Deleted activity {}", id);
        DeleteOutcome::Deleted
    }

    /// Replace the current insight with a fresh synthesis of the list.
    pub async fn request_analysis(&mut self) -> Option<&Insight> {
        self.analyzing = true;
        self.insight = match self.ctx.insights.analyze(&self.activities).await {
            Ok(insight) => insight,
            Err(e) => {
                error!("Error generating insight: {}", e);
                None
            }
        };
        self.analyzing = false;
        self.insight.as_ref()
    }

    pub fn dismiss_insight(&mut self) {
        self.insight = None;
    }

    async fn shadow_write(&self) {
        self.ctx.mirror.write(&self.activities).await;
    }
}
