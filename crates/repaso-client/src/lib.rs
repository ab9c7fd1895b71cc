//! HTTP clients for the hosted services repaso talks to: the Microsoft
//! Graph API for documents in OneDrive, the image-captioning model, and
//! the quiz-generation space.

use thiserror::Error;

pub mod caption;
pub mod drive;
pub mod generate;

pub use caption::HostedCaptioner;
pub use drive::{DriveClient, DriveItem};
pub use generate::QuizGenerator;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0} returned HTTP {1}")]
    Status(&'static str, u16),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unexpected response shape: {0}")]
    BadResponse(String),
}
