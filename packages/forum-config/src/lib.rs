mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Postgres, Service, Storage, Topics};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(path, &raw)
}

pub fn parse(path: &Path, raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	validate_topics(&cfg.topics)
}

pub fn validate_topics(topics: &Topics) -> Result<()> {
	for (label, value) in [
		("topics.recent_max_topics", topics.recent_max_topics),
		("topics.admin_reply_window", topics.admin_reply_window),
		("topics.posts_in_term_limit", topics.posts_in_term_limit),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let level = cfg.service.log_level.trim();

	if level.len() != cfg.service.log_level.len() {
		cfg.service.log_level = level.to_string();
	}
}
