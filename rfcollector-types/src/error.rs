pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Text that is not a control command
    #[error("Invalid command: {0}")]
    Parse(String),
}
