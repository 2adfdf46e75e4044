//! Fixtures for forum tests: seeded stores and scratch Postgres databases.

pub mod seed;

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::runtime::Builder;
use uuid::Uuid;

use forum_config::Postgres;
use forum_storage::db::Db;

/// Databases tried, in order, when creating or dropping a scratch database.
const MAINTENANCE_DATABASES: [&str; 2] = ["postgres", "template1"];

/// Postgres server for the ignored store tests, e.g. `postgres://postgres@localhost/postgres`.
pub fn env_dsn() -> Option<String> {
	env::var("FORUM_PG_DSN").ok()
}

/// A uniquely named database holding one test's forum tables.
///
/// Call [`ScratchDatabase::drop_database`] when done; otherwise the database is dropped from a
/// helper thread when the value goes out of scope.
pub struct ScratchDatabase {
	name: String,
	dsn: String,
	maintenance: PgConnectOptions,
	dropped: bool,
}
impl ScratchDatabase {
	pub async fn create(server_dsn: &str) -> Result<Self> {
		let server = PgConnectOptions::from_str(server_dsn).map_err(Error::Dsn)?;
		let (maintenance, mut conn) = maintenance_connection(&server).await?;
		let name = format!("forum_scratch_{}", Uuid::new_v4().simple());

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str()).await?;

		let dsn = server.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, maintenance, dropped: false })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	/// Opens a pool on the scratch database with the forum schema in place.
	pub async fn connect(&self, pool_max_conns: u32) -> Result<Db> {
		let db = Db::connect(&Postgres { dsn: self.dsn.clone(), pool_max_conns }).await?;

		db.ensure_schema().await?;

		Ok(db)
	}

	pub async fn drop_database(mut self) -> Result<()> {
		drop_scratch(&self.name, &self.maintenance).await?;

		self.dropped = true;

		Ok(())
	}
}
impl Drop for ScratchDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let name = self.name.clone();
		let maintenance = self.maintenance.clone();
		let dropper = thread::spawn(move || {
			let outcome = match Builder::new_current_thread().enable_all().build() {
				Ok(runtime) => runtime.block_on(drop_scratch(&name, &maintenance)),
				Err(err) => Err(Error::Maintenance(err.to_string())),
			};

			if let Err(err) = outcome {
				eprintln!("Scratch database {name} was left behind: {err}.");
			}
		});
		let _ = dropper.join();
	}
}

async fn maintenance_connection(
	server: &PgConnectOptions,
) -> Result<(PgConnectOptions, PgConnection)> {
	let mut failure = None;

	for database in MAINTENANCE_DATABASES {
		let options = server.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => failure = Some(err),
		}
	}

	Err(Error::Maintenance(failure.map(|err| err.to_string()).unwrap_or_default()))
}

async fn drop_scratch(name: &str, maintenance: &PgConnectOptions) -> Result<()> {
	let mut conn = PgConnection::connect_with(maintenance)
		.await
		.map_err(|err| Error::Maintenance(err.to_string()))?;

	// Pools from the test may still be open.
	sqlx::query(
		"\
SELECT pg_terminate_backend(pid)
FROM pg_stat_activity
WHERE datname = $1 AND pid <> pg_backend_pid()",
	)
	.bind(name)
	.execute(&mut conn)
	.await?;
	conn.execute(format!(r#"DROP DATABASE IF EXISTS "{name}""#).as_str()).await?;

	Ok(())
}
