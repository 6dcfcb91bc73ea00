use thiserror::Error;

/// error types of the details parser and of the name standardizer.
/// Absent details and a missing reservoir clause are not errors, see `ParseOutcome`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CrystalError {
    #[error("Malformed numeric value: '{0}'")]
    MalformedNumeric(String),
    #[error("Expansion of '{0}' does not terminate: check the dictionary and mixture definitions")]
    ExpansionCycle(String),
}
