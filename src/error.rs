use thiserror::Error;

/// Main error type for npc-dialogue
///
/// Every variant is fatal for the turn that raised it. The HTTP layer collapses
/// them into one generic failure; the kinds stay distinct for logs and tests.
#[derive(Error, Debug)]
pub enum DialogueError {
    /// Backing document (conversation graph or persona) missing or malformed
    #[error("Graph load error: {0}")]
    GraphLoad(String),

    /// Current node id not present in the character's graph
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// No reachable candidates from the current node
    #[error("No candidates reachable from node: {0}")]
    NoCandidates(String),

    /// Classifier reply did not decode into a verdict
    #[error("Classification format error: {0}")]
    ClassificationFormat(String),

    /// Classifier chose an id that was not offered this turn
    #[error("Unmatched intent: {0}")]
    UnmatchedIntent(String),

    /// Network or HTTP status failure talking to the classifier
    #[error("Classifier transport error: {0}")]
    Transport(String),

    /// Character key rejected (strict character keys only)
    #[error("Unknown character: {0}")]
    UnknownCharacter(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient Result type using DialogueError
pub type Result<T> = std::result::Result<T, DialogueError>;
