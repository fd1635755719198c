#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("destination {name} is registered twice")]
    DuplicateDestination { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;
