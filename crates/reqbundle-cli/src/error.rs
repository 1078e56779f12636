use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReqbundleError {
    #[error(transparent)]
    Manifest(#[from] reqbundle_manifest::ManifestError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} problem(s) found")]
    CheckFailed(usize),
}

pub type Result<T> = std::result::Result<T, ReqbundleError>;
