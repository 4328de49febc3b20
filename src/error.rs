//! Error taxonomy shared by the store, the roster façade and the HTTP layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    /// Storage location or other required settings are absent. Nothing is attempted.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    /// An update targeted an id that does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A request lacked required fields or carried malformed values.
    #[error("{0}")]
    Validation(String),

    /// A stage of the discard + write pipeline failed after earlier stages ran.
    #[error("schedule pipeline failed while {stage}: {source}")]
    PartialPipeline {
        stage: &'static str,
        #[source]
        source: Box<RosterError>,
    },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl RosterError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        RosterError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn pipeline(stage: &'static str, source: RosterError) -> Self {
        RosterError::PartialPipeline {
            stage,
            source: Box::new(source),
        }
    }
}

impl From<figment::Error> for RosterError {
    fn from(err: figment::Error) -> Self {
        RosterError::Config(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, RosterError>;
