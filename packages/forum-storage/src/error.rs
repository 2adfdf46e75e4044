#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Malformed extra fields: {0}")]
	ExtraFields(#[from] serde_json::Error),
	#[error("Not found: {0}")]
	NotFound(String),
}
