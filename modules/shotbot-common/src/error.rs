use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShotbotError {
    #[error("Entity directory unavailable: {0}")]
    Directory(String),

    #[error("Store error: {0}")]
    Store(String),
}
