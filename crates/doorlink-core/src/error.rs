use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Protocol errors
    #[error("Invalid command code: {code}")]
    InvalidCommandCode { code: u8 },

    #[error("Invalid response code: {code}")]
    InvalidResponseCode { code: u8 },

    // Addressing errors
    #[error("Invalid device address '{address}': {reason}")]
    InvalidDeviceAddress { address: String, reason: String },

    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
