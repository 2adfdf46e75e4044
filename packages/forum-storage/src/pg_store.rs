use std::collections::{HashMap, HashSet};

use serde_json::Value;
use sqlx::{Row, postgres::PgRow};

use forum_domain::{Pid, Tid, Uid};

use crate::{
	Error, Result,
	db::Db,
	models::{Endorsement, PostRecord, TopicRecord, UserCounter, UserRecord},
	store::{self, BoxFuture, ExtraFields, ForumStore, Intersect, Order, ScoreRange},
};

const TOPIC_COLUMNS: &str = "\
tid, uid, cid, title, created_at, last_post_at, post_count, view_count, upvotes, downvotes, \
pinned, pin_expiry, deleted, endorsed, tags, extra";

impl ForumStore for Db {
	fn range<'a>(
		&'a self,
		keys: &'a [String],
		start: usize,
		stop: i64,
		order: Order,
	) -> BoxFuture<'a, Result<Vec<String>>> {
		Box::pin(async move {
			let sql = format!(
				"\
SELECT member
FROM (
	SELECT member, SUM(score) AS score
	FROM forum_zsets
	WHERE key = ANY($1)
	GROUP BY member
) z
ORDER BY {}
OFFSET $2
LIMIT $3",
				order_clause(order, "z.score", "z.member")
			);
			let members: Vec<String> = sqlx::query_scalar(&sql)
				.bind(keys)
				.bind(start as i64)
				.bind(store::positional_count(start, stop).map(|count| count as i64))
				.fetch_all(&self.pool)
				.await?;

			Ok(members)
		})
	}

	fn range_by_score<'a>(
		&'a self,
		keys: &'a [String],
		order: Order,
		range: ScoreRange,
	) -> BoxFuture<'a, Result<Vec<String>>> {
		Box::pin(async move {
			let sql = format!(
				"\
SELECT member
FROM (
	SELECT member, SUM(score) AS score
	FROM forum_zsets
	WHERE key = ANY($1)
	GROUP BY member
) z
WHERE z.score >= $2 AND z.score <= $3
ORDER BY {}
OFFSET $4
LIMIT $5",
				order_clause(order, "z.score", "z.member")
			);
			let members: Vec<String> = sqlx::query_scalar(&sql)
				.bind(keys)
				.bind(range.min)
				.bind(range.max)
				.bind(range.offset as i64)
				.bind(range.count.map(|count| count as i64))
				.fetch_all(&self.pool)
				.await?;

			Ok(members)
		})
	}

	fn intersect<'a>(&'a self, query: &'a Intersect) -> BoxFuture<'a, Result<Vec<String>>> {
		Box::pin(async move {
			if query.sets.is_empty() {
				return Ok(Vec::new());
			}

			let weights: Vec<f64> = (0..query.sets.len()).map(|idx| query.weight(idx)).collect();
			let distinct = query.sets.iter().collect::<HashSet<_>>().len() as i64;
			let sql = format!(
				"\
SELECT z.member
FROM forum_zsets z
JOIN UNNEST($1::text[], $2::float8[]) AS w(key, weight) ON z.key = w.key
GROUP BY z.member
HAVING COUNT(DISTINCT z.key) = $3
ORDER BY {}
OFFSET $4
LIMIT $5",
				order_clause(query.order, "SUM(z.score * w.weight)", "z.member")
			);
			let members: Vec<String> = sqlx::query_scalar(&sql)
				.bind(&query.sets)
				.bind(&weights)
				.bind(distinct)
				.bind(query.start as i64)
				.bind(store::positional_count(query.start, query.stop).map(|count| count as i64))
				.fetch_all(&self.pool)
				.await?;

			Ok(members)
		})
	}

	fn scores<'a>(
		&'a self,
		key: &'a str,
		members: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Option<f64>>>> {
		Box::pin(async move {
			let rows: Vec<(String, f64)> = sqlx::query_as(
				"SELECT member, score FROM forum_zsets WHERE key = $1 AND member = ANY($2)",
			)
			.bind(key)
			.bind(members)
			.fetch_all(&self.pool)
			.await?;
			let by_member: HashMap<String, f64> = rows.into_iter().collect();

			Ok(members.iter().map(|member| by_member.get(member).copied()).collect())
		})
	}

	fn is_member<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move {
			let found: bool = sqlx::query_scalar(
				"SELECT EXISTS (SELECT 1 FROM forum_zsets WHERE key = $1 AND member = $2)",
			)
			.bind(key)
			.bind(member)
			.fetch_one(&self.pool)
			.await?;

			Ok(found)
		})
	}

	fn is_member_of_sets<'a>(
		&'a self,
		keys: &'a [String],
		member: &'a str,
	) -> BoxFuture<'a, Result<Vec<bool>>> {
		Box::pin(async move {
			let found: Vec<String> = sqlx::query_scalar(
				"SELECT DISTINCT key FROM forum_zsets WHERE key = ANY($1) AND member = $2",
			)
			.bind(keys)
			.bind(member)
			.fetch_all(&self.pool)
			.await?;
			let found: HashSet<String> = found.into_iter().collect();

			Ok(keys.iter().map(|key| found.contains(key)).collect())
		})
	}

	fn card<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM forum_zsets WHERE key = $1")
				.bind(key)
				.fetch_one(&self.pool)
				.await?;

			Ok(count.max(0) as u64)
		})
	}

	fn add<'a>(&'a self, key: &'a str, score: f64, member: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			sqlx::query(
				"\
INSERT INTO forum_zsets (key, member, score)
VALUES ($1, $2, $3)
ON CONFLICT (key, member) DO UPDATE SET score = EXCLUDED.score",
			)
			.bind(key)
			.bind(member)
			.bind(score)
			.execute(&self.pool)
			.await?;

			Ok(())
		})
	}

	fn remove<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			sqlx::query("DELETE FROM forum_zsets WHERE key = $1 AND member = $2")
				.bind(key)
				.bind(member)
				.execute(&self.pool)
				.await?;

			Ok(())
		})
	}

	fn topics<'a>(
		&'a self,
		tids: &'a [Tid],
		extra: ExtraFields<'a>,
	) -> BoxFuture<'a, Result<Vec<Option<TopicRecord>>>> {
		Box::pin(async move {
			let sql = format!("SELECT {TOPIC_COLUMNS} FROM forum_topics WHERE tid = ANY($1)");
			let rows = sqlx::query(&sql).bind(tids).fetch_all(&self.pool).await?;
			let mut by_tid = HashMap::with_capacity(rows.len());

			for row in rows {
				let topic = topic_from_row(&row, extra)?;

				by_tid.insert(topic.tid, topic);
			}

			Ok(tids.iter().map(|tid| by_tid.get(tid).cloned()).collect())
		})
	}

	fn put_topic<'a>(&'a self, topic: &'a TopicRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let extra = serde_json::to_value(&topic.extra)?;

			sqlx::query(
				"\
INSERT INTO forum_topics (
	tid,
	uid,
	cid,
	title,
	created_at,
	last_post_at,
	post_count,
	view_count,
	upvotes,
	downvotes,
	pinned,
	pin_expiry,
	deleted,
	endorsed,
	tags,
	extra
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
ON CONFLICT (tid) DO UPDATE
SET
	uid = EXCLUDED.uid,
	cid = EXCLUDED.cid,
	title = EXCLUDED.title,
	created_at = EXCLUDED.created_at,
	last_post_at = EXCLUDED.last_post_at,
	post_count = EXCLUDED.post_count,
	view_count = EXCLUDED.view_count,
	upvotes = EXCLUDED.upvotes,
	downvotes = EXCLUDED.downvotes,
	pinned = EXCLUDED.pinned,
	pin_expiry = EXCLUDED.pin_expiry,
	deleted = EXCLUDED.deleted,
	endorsed = EXCLUDED.endorsed,
	tags = EXCLUDED.tags,
	extra = EXCLUDED.extra",
			)
			.bind(topic.tid)
			.bind(topic.uid)
			.bind(topic.cid)
			.bind(topic.title.as_str())
			.bind(topic.timestamp)
			.bind(topic.last_post_time)
			.bind(topic.post_count)
			.bind(topic.view_count)
			.bind(topic.upvotes)
			.bind(topic.downvotes)
			.bind(topic.pinned)
			.bind(topic.pin_expiry)
			.bind(topic.deleted)
			.bind(topic.endorsed)
			.bind(&topic.tags)
			.bind(extra)
			.execute(&self.pool)
			.await?;

			Ok(())
		})
	}

	fn set_topic_endorsed<'a>(&'a self, tid: Tid, endorsed: bool) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let result = sqlx::query("UPDATE forum_topics SET endorsed = $2 WHERE tid = $1")
				.bind(tid)
				.bind(endorsed)
				.execute(&self.pool)
				.await?;

			if result.rows_affected() == 0 {
				return Err(Error::NotFound(format!("topic {tid}")));
			}

			Ok(())
		})
	}

	fn posts<'a>(&'a self, pids: &'a [Pid]) -> BoxFuture<'a, Result<Vec<Option<PostRecord>>>> {
		Box::pin(async move {
			let rows: Vec<(i64, i64, i64, i64, bool)> = sqlx::query_as(
				"SELECT pid, tid, uid, created_at, anonymous FROM forum_posts WHERE pid = ANY($1)",
			)
			.bind(pids)
			.fetch_all(&self.pool)
			.await?;
			let by_pid: HashMap<Pid, PostRecord> = rows
				.into_iter()
				.map(|(pid, tid, uid, timestamp, anonymous)| {
					(pid, PostRecord { pid, tid, uid, timestamp, anonymous })
				})
				.collect();

			Ok(pids.iter().map(|pid| by_pid.get(pid).cloned()).collect())
		})
	}

	fn put_post<'a>(&'a self, post: &'a PostRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			sqlx::query(
				"\
INSERT INTO forum_posts (pid, tid, uid, created_at, anonymous)
VALUES ($1, $2, $3, $4, $5)
ON CONFLICT (pid) DO UPDATE
SET
	tid = EXCLUDED.tid,
	uid = EXCLUDED.uid,
	created_at = EXCLUDED.created_at,
	anonymous = EXCLUDED.anonymous",
			)
			.bind(post.pid)
			.bind(post.tid)
			.bind(post.uid)
			.bind(post.timestamp)
			.bind(post.anonymous)
			.execute(&self.pool)
			.await?;

			Ok(())
		})
	}

	fn users<'a>(&'a self, uids: &'a [Uid]) -> BoxFuture<'a, Result<Vec<Option<UserRecord>>>> {
		Box::pin(async move {
			let rows = sqlx::query(
				"\
SELECT uid, username, userslug, picture, status, follower_count, following_count
FROM forum_users
WHERE uid = ANY($1)",
			)
			.bind(uids)
			.fetch_all(&self.pool)
			.await?;
			let mut by_uid = HashMap::with_capacity(rows.len());

			for row in rows {
				let user = UserRecord {
					uid: row.try_get("uid")?,
					username: row.try_get("username")?,
					userslug: row.try_get("userslug")?,
					picture: row.try_get("picture")?,
					status: row.try_get("status")?,
					follower_count: row.try_get("follower_count")?,
					following_count: row.try_get("following_count")?,
				};

				by_uid.insert(user.uid, user);
			}

			Ok(uids.iter().map(|uid| by_uid.get(uid).cloned()).collect())
		})
	}

	fn put_user<'a>(&'a self, user: &'a UserRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			sqlx::query(
				"\
INSERT INTO forum_users (uid, username, userslug, picture, status, follower_count, following_count)
VALUES ($1, $2, $3, $4, $5, $6, $7)
ON CONFLICT (uid) DO UPDATE
SET
	username = EXCLUDED.username,
	userslug = EXCLUDED.userslug,
	picture = EXCLUDED.picture,
	status = EXCLUDED.status,
	follower_count = EXCLUDED.follower_count,
	following_count = EXCLUDED.following_count",
			)
			.bind(user.uid)
			.bind(user.username.as_str())
			.bind(user.userslug.as_str())
			.bind(user.picture.as_str())
			.bind(user.status.as_str())
			.bind(user.follower_count)
			.bind(user.following_count)
			.execute(&self.pool)
			.await?;

			Ok(())
		})
	}

	fn set_user_counter<'a>(
		&'a self,
		uid: Uid,
		counter: UserCounter,
		value: i64,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let column = match counter {
				UserCounter::Followers => "follower_count",
				UserCounter::Following => "following_count",
			};
			let sql = format!("UPDATE forum_users SET {column} = $2 WHERE uid = $1");
			let result = sqlx::query(&sql).bind(uid).bind(value).execute(&self.pool).await?;

			if result.rows_affected() == 0 {
				return Err(Error::NotFound(format!("user {uid}")));
			}

			Ok(())
		})
	}

	fn endorsement<'a>(&'a self, pid: Pid) -> BoxFuture<'a, Result<Option<Endorsement>>> {
		Box::pin(async move {
			let row: Option<(i64, i64)> = sqlx::query_as(
				"SELECT endorsed_by, endorsed_at FROM forum_post_endorsements WHERE pid = $1",
			)
			.bind(pid)
			.fetch_optional(&self.pool)
			.await?;

			Ok(row.map(|(endorsed_by, endorsed_at)| Endorsement {
				endorsed: true,
				endorsed_by,
				endorsed_at,
			}))
		})
	}

	fn put_endorsement<'a>(
		&'a self,
		pid: Pid,
		endorsement: &'a Endorsement,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			sqlx::query(
				"\
INSERT INTO forum_post_endorsements (pid, endorsed_by, endorsed_at)
VALUES ($1, $2, $3)
ON CONFLICT (pid) DO UPDATE
SET
	endorsed_by = EXCLUDED.endorsed_by,
	endorsed_at = EXCLUDED.endorsed_at",
			)
			.bind(pid)
			.bind(endorsement.endorsed_by)
			.bind(endorsement.endorsed_at)
			.execute(&self.pool)
			.await?;

			Ok(())
		})
	}

	fn delete_endorsement<'a>(&'a self, pid: Pid) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			sqlx::query("DELETE FROM forum_post_endorsements WHERE pid = $1")
				.bind(pid)
				.execute(&self.pool)
				.await?;

			Ok(())
		})
	}
}

fn order_clause(order: Order, score: &str, member: &str) -> String {
	let direction = match order {
		Order::Asc => "ASC",
		Order::Desc => "DESC",
	};

	format!("{score} {direction}, {member} COLLATE \"C\" {direction}")
}

fn topic_from_row(row: &PgRow, extra: ExtraFields<'_>) -> Result<TopicRecord> {
	let extra_value: Value = row.try_get("extra")?;
	let extra = match extra_value {
		Value::Object(map) => map.into_iter().filter(|(field, _)| extra.keeps(field)).collect(),
		_ => Default::default(),
	};

	Ok(TopicRecord {
		tid: row.try_get("tid")?,
		uid: row.try_get("uid")?,
		cid: row.try_get("cid")?,
		title: row.try_get("title")?,
		timestamp: row.try_get("created_at")?,
		last_post_time: row.try_get("last_post_at")?,
		post_count: row.try_get("post_count")?,
		view_count: row.try_get("view_count")?,
		upvotes: row.try_get("upvotes")?,
		downvotes: row.try_get("downvotes")?,
		pinned: row.try_get("pinned")?,
		pin_expiry: row.try_get("pin_expiry")?,
		deleted: row.try_get("deleted")?,
		endorsed: row.try_get("endorsed")?,
		tags: row.try_get("tags")?,
		extra,
	})
}
