#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid text: {0}")]
    Text(#[from] clinicdesk_types::TextError),

    #[error("failed to create state directory: {0}")]
    StateDirCreation(std::io::Error),
    #[error("failed to write state file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read state file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to remove state file: {0}")]
    FileRemove(std::io::Error),
    #[error("failed to serialize state: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize state: {0}")]
    Deserialization(serde_json::Error),

    #[error("unknown follow-up preset: {0}")]
    UnknownFollowUpPreset(String),
    #[error("follow-up date out of range")]
    FollowUpOutOfRange,
    #[error("no symptom with id {0}")]
    SymptomNotFound(String),
    #[error("no medicine with id {0}")]
    MedicineNotFound(String),
    #[error("no patient selected")]
    NoPatientSelected,
    #[error("profile payload must be a JSON object")]
    ProfileNotObject,
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
