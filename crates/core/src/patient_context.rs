//! Selected-patient context and the consultation lock.
//!
//! A workstation has at most one patient "in context". While a consultation is in progress the
//! context is locked and attempts to change the selection are silently ignored.
//!
//! The selection is written to a [`PatientStore`] on every successful change and restored when
//! the context is constructed, so it survives a restart. The lock flag is never persisted: a
//! freshly constructed context always starts unlocked.

use crate::constants::SELECTED_PATIENT_FILENAME;
use crate::storage::StateFile;
use crate::CoreResult;
use clinicdesk_types::PatientRef;
use std::path::Path;

/// Immutable snapshot of the context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatientContextState {
    pub selected: Option<PatientRef>,
    pub locked: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatientAction {
    Select(PatientRef),
    Clear,
    Lock,
    Unlock,
    Logout,
}

/// Apply `action` to `state`.
///
/// `Select` and `Clear` are no-ops while locked; `Lock`/`Unlock` are idempotent; `Logout` always
/// unlocks and clears.
pub fn reduce(state: &PatientContextState, action: PatientAction) -> PatientContextState {
    match action {
        PatientAction::Select(_) | PatientAction::Clear if state.locked => state.clone(),
        PatientAction::Select(patient) => PatientContextState {
            selected: Some(patient),
            locked: false,
        },
        PatientAction::Clear => PatientContextState::default(),
        PatientAction::Lock => PatientContextState {
            selected: state.selected.clone(),
            locked: true,
        },
        PatientAction::Unlock => PatientContextState {
            selected: state.selected.clone(),
            locked: false,
        },
        PatientAction::Logout => PatientContextState::default(),
    }
}

/// Durable storage for the selected patient.
pub trait PatientStore {
    fn load(&self) -> CoreResult<Option<PatientRef>>;
    fn save(&mut self, patient: Option<&PatientRef>) -> CoreResult<()>;
}

/// In-memory store, for tests and for callers that do not need persistence.
#[derive(Clone, Debug, Default)]
pub struct MemoryPatientStore {
    saved: Option<PatientRef>,
    writes: usize,
}

impl MemoryPatientStore {
    pub fn with_saved(patient: PatientRef) -> Self {
        Self {
            saved: Some(patient),
            writes: 0,
        }
    }

    /// Number of `save` calls seen so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl PatientStore for MemoryPatientStore {
    fn load(&self) -> CoreResult<Option<PatientRef>> {
        Ok(self.saved.clone())
    }

    fn save(&mut self, patient: Option<&PatientRef>) -> CoreResult<()> {
        self.saved = patient.cloned();
        self.writes += 1;
        Ok(())
    }
}

/// Store backed by a JSON file in the local state directory.
#[derive(Clone, Debug)]
pub struct FilePatientStore {
    file: StateFile,
}

impl FilePatientStore {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            file: StateFile::new(state_dir, SELECTED_PATIENT_FILENAME),
        }
    }
}

impl PatientStore for FilePatientStore {
    fn load(&self) -> CoreResult<Option<PatientRef>> {
        self.file.read()
    }

    fn save(&mut self, patient: Option<&PatientRef>) -> CoreResult<()> {
        match patient {
            Some(p) => self.file.write(p),
            None => self.file.remove(),
        }
    }
}

/// The selected patient plus the lock flag.
pub struct PatientContext<S: PatientStore> {
    state: PatientContextState,
    store: S,
}

impl<S: PatientStore> PatientContext<S> {
    /// Restore the selection from `store`. An unreadable store starts empty.
    pub fn new(store: S) -> Self {
        let selected = match store.load() {
            Ok(selected) => selected,
            Err(e) => {
                tracing::warn!("failed to restore selected patient: {:?}", e);
                None
            }
        };
        Self {
            state: PatientContextState {
                selected,
                locked: false,
            },
            store,
        }
    }

    pub fn state(&self) -> &PatientContextState {
        &self.state
    }

    pub fn selected(&self) -> Option<&PatientRef> {
        self.state.selected.as_ref()
    }

    pub fn is_locked(&self) -> bool {
        self.state.locked
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Select `patient`. Returns `Ok(false)` without touching anything while locked.
    pub fn set_selected_patient(&mut self, patient: PatientRef) -> CoreResult<bool> {
        self.apply(PatientAction::Select(patient))
    }

    /// Drop the selection. Ignored while locked.
    pub fn clear(&mut self) -> CoreResult<bool> {
        self.apply(PatientAction::Clear)
    }

    pub fn lock_patient(&mut self) {
        self.state = reduce(&self.state, PatientAction::Lock);
    }

    pub fn unlock_patient(&mut self) {
        self.state = reduce(&self.state, PatientAction::Unlock);
    }

    /// Unlock and clear, whatever the current state.
    pub fn logout(&mut self) -> CoreResult<()> {
        self.apply(PatientAction::Logout).map(|_| ())
    }

    /// Reduce, persist the selection if it changed, then commit.
    ///
    /// The new state is only committed once the store accepted it.
    fn apply(&mut self, action: PatientAction) -> CoreResult<bool> {
        let next = reduce(&self.state, action);
        if next == self.state {
            return Ok(false);
        }
        if next.selected != self.state.selected {
            self.store.save(next.selected.as_ref())?;
        }
        self.state = next;
        Ok(true)
    }
}
