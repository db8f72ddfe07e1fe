//! In-progress consultation state.
//!
//! A consultation is the clinical note a doctor composes during one visit. It lives only in
//! memory for the workstation that is editing it and is cleared on reset or after a successful
//! submission.
//!
//! The state is an immutable [`ConsultationSession`] snapshot. Every change is a
//! [`ConsultationAction`] applied by the pure [`reduce`] function, so a change either replaces a
//! whole field or sub-record or is rejected outright. [`ConsultationStore`] owns the current
//! snapshot, takes `&mut self` for every mutation (one writer at a time) and publishes each new
//! snapshot to subscribers before the mutating call returns.

use crate::followup::{FollowUp, FollowUpPatch, FollowUpPreset};
use crate::ids::LocalId;
use crate::patient_context::{PatientContext, PatientStore};
use crate::{CoreError, CoreResult};
use chrono::NaiveDate;
use clinicdesk_types::PatientRef;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Symptom {
    pub id: LocalId,
    pub name: String,
    #[serde(default)]
    pub detail: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
pub struct SymptomDraft {
    pub name: String,
    #[serde(default)]
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Medicine {
    pub id: LocalId,
    pub name: String,
    #[serde(default)]
    pub dose: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
pub struct MedicineDraft {
    pub name: String,
    #[serde(default)]
    pub dose: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub notes: String,
}

/// Vital signs recorded at the start of the visit. Every reading is optional.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vitals {
    pub bp_systolic: Option<u16>,
    pub bp_diastolic: Option<u16>,
    pub pulse: Option<u16>,
    pub temperature_c: Option<f32>,
    pub spo2: Option<u8>,
    pub respiratory_rate: Option<u16>,
    pub weight_kg: Option<f32>,
    pub height_cm: Option<f32>,
}

impl Vitals {
    /// Body-mass index rounded to one decimal, when both weight and height are known.
    pub fn bmi(&self) -> Option<f32> {
        let weight = self.weight_kg?;
        let height_m = self.height_cm? / 100.0;
        if weight <= 0.0 || height_m <= 0.0 {
            return None;
        }
        Some((weight / (height_m * height_m) * 10.0).round() / 10.0)
    }
}

/// Free-text sections of the note.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSection {
    Findings,
    Diagnosis,
    Investigations,
    Instructions,
    Procedures,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConsultationSession {
    pub symptoms: Vec<Symptom>,
    pub findings: String,
    pub diagnosis: String,
    pub investigations: String,
    pub instructions: String,
    pub procedures: String,
    pub medicines: Vec<Medicine>,
    pub follow_up: FollowUp,
    pub vitals: Vitals,
    pub doctor_notes: String,
}

impl ConsultationSession {
    pub fn text(&self, section: TextSection) -> &str {
        match section {
            TextSection::Findings => &self.findings,
            TextSection::Diagnosis => &self.diagnosis,
            TextSection::Investigations => &self.investigations,
            TextSection::Instructions => &self.instructions,
            TextSection::Procedures => &self.procedures,
        }
    }

    fn text_mut(&mut self, section: TextSection) -> &mut String {
        match section {
            TextSection::Findings => &mut self.findings,
            TextSection::Diagnosis => &mut self.diagnosis,
            TextSection::Investigations => &mut self.investigations,
            TextSection::Instructions => &mut self.instructions,
            TextSection::Procedures => &mut self.procedures,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ConsultationSession::default()
    }

    /// Build the payload posted to the consultations endpoint.
    pub fn submission(&self, patient: &PatientRef) -> ConsultationSubmission {
        ConsultationSubmission {
            patient_id: patient.id.to_string(),
            session: self.clone(),
            bmi: self.vitals.bmi(),
        }
    }
}

/// JSON body for a consultation submission.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ConsultationSubmission {
    pub patient_id: String,
    #[serde(flatten)]
    pub session: ConsultationSession,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConsultationAction {
    AddSymptom { id: LocalId, draft: SymptomDraft },
    UpdateSymptom { id: LocalId, draft: SymptomDraft },
    RemoveSymptom(LocalId),
    AddMedicine { id: LocalId, draft: MedicineDraft },
    UpdateMedicine { id: LocalId, draft: MedicineDraft },
    RemoveMedicine(LocalId),
    SetText(TextSection, String),
    SetVitals(Vitals),
    SetDoctorNotes(String),
    PatchFollowUp(FollowUpPatch),
    SelectFollowUpPreset { preset: FollowUpPreset, today: NaiveDate },
    Reset,
}

fn symptom_from(id: LocalId, draft: SymptomDraft) -> Symptom {
    Symptom {
        id,
        name: draft.name,
        detail: draft.detail,
    }
}

fn medicine_from(id: LocalId, draft: MedicineDraft) -> Medicine {
    Medicine {
        id,
        name: draft.name,
        dose: draft.dose,
        frequency: draft.frequency,
        duration: draft.duration,
        notes: draft.notes,
    }
}

/// Apply `action` to `state`, returning the next snapshot.
///
/// # Errors
///
/// Updating or removing a symptom/medicine whose id is not present is rejected with
/// [`CoreError::SymptomNotFound`] / [`CoreError::MedicineNotFound`]; an out-of-range follow-up
/// date is rejected with [`CoreError::FollowUpOutOfRange`]. On error nothing changes.
pub fn reduce(
    state: &ConsultationSession,
    action: ConsultationAction,
) -> CoreResult<ConsultationSession> {
    let mut next = state.clone();
    match action {
        ConsultationAction::AddSymptom { id, draft } => {
            next.symptoms.push(symptom_from(id, draft));
        }
        ConsultationAction::UpdateSymptom { id, draft } => {
            let slot = next
                .symptoms
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or_else(|| CoreError::SymptomNotFound(id.to_string()))?;
            *slot = symptom_from(id, draft);
        }
        ConsultationAction::RemoveSymptom(id) => {
            let before = next.symptoms.len();
            next.symptoms.retain(|s| s.id != id);
            if next.symptoms.len() == before {
                return Err(CoreError::SymptomNotFound(id.to_string()));
            }
        }
        ConsultationAction::AddMedicine { id, draft } => {
            next.medicines.push(medicine_from(id, draft));
        }
        ConsultationAction::UpdateMedicine { id, draft } => {
            let slot = next
                .medicines
                .iter_mut()
                .find(|m| m.id == id)
                .ok_or_else(|| CoreError::MedicineNotFound(id.to_string()))?;
            *slot = medicine_from(id, draft);
        }
        ConsultationAction::RemoveMedicine(id) => {
            let before = next.medicines.len();
            next.medicines.retain(|m| m.id != id);
            if next.medicines.len() == before {
                return Err(CoreError::MedicineNotFound(id.to_string()));
            }
        }
        ConsultationAction::SetText(section, text) => {
            *next.text_mut(section) = text;
        }
        ConsultationAction::SetVitals(vitals) => next.vitals = vitals,
        ConsultationAction::SetDoctorNotes(notes) => next.doctor_notes = notes,
        ConsultationAction::PatchFollowUp(patch) => {
            next.follow_up = state.follow_up.merged(patch);
        }
        ConsultationAction::SelectFollowUpPreset { preset, today } => {
            next.follow_up = state.follow_up.with_preset(preset, today)?;
        }
        ConsultationAction::Reset => return Ok(ConsultationSession::default()),
    }
    Ok(next)
}

/// Owner of the current consultation snapshot.
pub struct ConsultationStore {
    tx: watch::Sender<Arc<ConsultationSession>>,
}

impl Default for ConsultationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsultationStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(ConsultationSession::default()));
        Self { tx }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<ConsultationSession> {
        self.tx.borrow().clone()
    }

    /// A receiver that always observes the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ConsultationSession>> {
        self.tx.subscribe()
    }

    /// Reduce `action` over the current snapshot and publish the result.
    pub fn dispatch(&mut self, action: ConsultationAction) -> CoreResult<()> {
        let next = reduce(&self.snapshot(), action)?;
        self.tx.send_replace(Arc::new(next));
        Ok(())
    }

    pub fn add_symptom(&mut self, draft: SymptomDraft) -> CoreResult<LocalId> {
        let id = LocalId::generate();
        self.dispatch(ConsultationAction::AddSymptom {
            id: id.clone(),
            draft,
        })?;
        Ok(id)
    }

    pub fn update_symptom(&mut self, id: LocalId, draft: SymptomDraft) -> CoreResult<()> {
        self.dispatch(ConsultationAction::UpdateSymptom { id, draft })
    }

    pub fn remove_symptom(&mut self, id: LocalId) -> CoreResult<()> {
        self.dispatch(ConsultationAction::RemoveSymptom(id))
    }

    pub fn add_medicine(&mut self, draft: MedicineDraft) -> CoreResult<LocalId> {
        let id = LocalId::generate();
        self.dispatch(ConsultationAction::AddMedicine {
            id: id.clone(),
            draft,
        })?;
        Ok(id)
    }

    pub fn update_medicine(&mut self, id: LocalId, draft: MedicineDraft) -> CoreResult<()> {
        self.dispatch(ConsultationAction::UpdateMedicine { id, draft })
    }

    pub fn remove_medicine(&mut self, id: LocalId) -> CoreResult<()> {
        self.dispatch(ConsultationAction::RemoveMedicine(id))
    }

    pub fn set_text(&mut self, section: TextSection, text: impl Into<String>) -> CoreResult<()> {
        self.dispatch(ConsultationAction::SetText(section, text.into()))
    }

    pub fn set_vitals(&mut self, vitals: Vitals) -> CoreResult<()> {
        self.dispatch(ConsultationAction::SetVitals(vitals))
    }

    pub fn set_doctor_notes(&mut self, notes: impl Into<String>) -> CoreResult<()> {
        self.dispatch(ConsultationAction::SetDoctorNotes(notes.into()))
    }

    pub fn patch_follow_up(&mut self, patch: FollowUpPatch) -> CoreResult<()> {
        self.dispatch(ConsultationAction::PatchFollowUp(patch))
    }

    pub fn select_follow_up_preset(
        &mut self,
        preset: FollowUpPreset,
        today: NaiveDate,
    ) -> CoreResult<()> {
        self.dispatch(ConsultationAction::SelectFollowUpPreset { preset, today })
    }

    pub fn reset(&mut self) {
        self.tx.send_replace(Arc::new(ConsultationSession::default()));
    }

    /// Start a fresh consultation for the selected patient.
    ///
    /// Locks the patient context so the selection cannot change mid-visit and clears any
    /// leftover note.
    pub fn start<S: PatientStore>(&mut self, patients: &mut PatientContext<S>) -> CoreResult<PatientRef> {
        let patient = patients
            .selected()
            .cloned()
            .ok_or(CoreError::NoPatientSelected)?;
        patients.lock_patient();
        self.reset();
        tracing::info!(patient_id = %patient.id, "consultation started");
        Ok(patient)
    }

    /// Finish the consultation after a successful submission: clear the note and release the
    /// patient lock.
    pub fn finish<S: PatientStore>(&mut self, patients: &mut PatientContext<S>) {
        self.reset();
        patients.unlock_patient();
    }
}
