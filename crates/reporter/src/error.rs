use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Health endpoint rejected report: {status}")]
    Rejected { status: u16 },
}

pub type Result<T> = std::result::Result<T, ReporterError>;
