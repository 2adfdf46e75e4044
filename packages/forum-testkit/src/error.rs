pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("FORUM_PG_DSN is not a valid Postgres DSN: {0}")]
	Dsn(sqlx::Error),
	#[error("No maintenance database accepted a connection: {0}")]
	Maintenance(String),

	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),

	#[error(transparent)]
	Storage(#[from] forum_storage::Error),
}
