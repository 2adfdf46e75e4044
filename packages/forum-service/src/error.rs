use forum_domain::{Pid, Tid, Uid, query::QueryError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("No privileges.")]
	NoPrivileges,
	#[error("Invalid pid {0}.")]
	InvalidPid(Pid),
	#[error("Post {0} is already endorsed.")]
	AlreadyEndorsed(Pid),
	#[error("Topic {0} already has an endorsed post.")]
	TopicAlreadyEndorsed(Tid),
	#[error("Invalid uid {0}.")]
	InvalidUid(Uid),
	#[error("You cannot follow yourself.")]
	CannotFollowSelf,
	#[error("User {0} does not exist.")]
	NoUser(Uid),
	#[error("Already following user {0}.")]
	AlreadyFollowing(Uid),
	#[error("Not following user {0}.")]
	NotFollowing(Uid),
}
impl From<forum_storage::Error> for Error {
	fn from(err: forum_storage::Error) -> Self {
		match err {
			forum_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			forum_storage::Error::ExtraFields(inner) => Self::Storage { message: inner.to_string() },
			forum_storage::Error::NotFound(message) => Self::NotFound { message },
		}
	}
}

impl From<QueryError> for Error {
	fn from(err: QueryError) -> Self {
		Self::InvalidRequest { message: err.to_string() }
	}
}
