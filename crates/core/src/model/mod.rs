mod config;
mod ids;
mod report;
mod state;
pub mod statement;

pub use config::{
    Configuration, ConfigurationDraft, DEFAULT_LABEL_TEXT, DEFAULT_SCORE_REPORTED,
    DEFAULT_TITLE,
};
pub use ids::{ContentId, ParseIdError};
pub use report::{Definition, InteractionType, ReportEmitter, ReportKind, ReportRecord};
pub use state::{ConfirmationState, PersistedState};
