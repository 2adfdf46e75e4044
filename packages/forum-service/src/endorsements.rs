use serde::{Deserialize, Serialize};

use forum_domain::{Pid, Tid, Uid};
use forum_storage::{
	Order, keys,
	models::{Endorsement, PostRecord},
};

use crate::{Error, Result, TopicService, collaborators::parse_ids, now_ms};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndorseResponse {
	pub pid: Pid,
	pub endorsed: bool,
	#[serde(rename = "endorsedBy")]
	pub endorsed_by: Uid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnendorseResponse {
	pub pid: Pid,
	pub endorsed: bool,
}

impl TopicService {
	/// Marks a post as the endorsed answer of its topic. A topic holds at most one.
	pub async fn endorse(&self, pid: Pid, uid: Uid) -> Result<EndorseResponse> {
		self.require_endorser(pid, uid).await?;

		let post = self.endorsable_post(pid).await?;

		if self.store.endorsement(pid).await?.is_some_and(|endorsement| endorsement.endorsed) {
			return Err(Error::AlreadyEndorsed(pid));
		}
		if let Some(endorsed) = self.topic_endorsed_post(post.tid).await?
			&& endorsed != pid
		{
			return Err(Error::TopicAlreadyEndorsed(post.tid));
		}

		let now = now_ms();
		let endorsement = Endorsement { endorsed: true, endorsed_by: uid, endorsed_at: now };

		self.store.put_endorsement(pid, &endorsement).await?;
		self.store.add(&keys::topic_endorsed(post.tid), now as f64, &pid.to_string()).await?;
		self.store.set_topic_endorsed(post.tid, true).await?;

		tracing::info!(pid, tid = post.tid, uid, "Post endorsed.");

		Ok(EndorseResponse { pid, endorsed: true, endorsed_by: uid })
	}

	pub async fn unendorse(&self, pid: Pid, uid: Uid) -> Result<UnendorseResponse> {
		self.require_endorser(pid, uid).await?;

		let post = self.endorsable_post(pid).await?;
		let endorsed_key = keys::topic_endorsed(post.tid);

		self.store.delete_endorsement(pid).await?;
		self.store.remove(&endorsed_key, &pid.to_string()).await?;

		let still_endorsed = self.store.card(&endorsed_key).await? > 0;

		self.store.set_topic_endorsed(post.tid, still_endorsed).await?;

		tracing::info!(pid, tid = post.tid, uid, "Post unendorsed.");

		Ok(UnendorseResponse { pid, endorsed: false })
	}

	/// Endorsement record of a post, visible to anyone who can read its topic.
	pub async fn endorsement(&self, pid: Pid, uid: Uid) -> Result<Option<Endorsement>> {
		let post = self.endorsable_post(pid).await?;
		let readable = self.collaborators.privileges.filter_readable_tids(&[post.tid], uid).await?;

		if readable.is_empty() {
			return Err(Error::NoPrivileges);
		}

		Ok(self.store.endorsement(pid).await?)
	}

	/// The earliest endorsed post of a topic, if any.
	pub async fn topic_endorsed_post(&self, tid: Tid) -> Result<Option<Pid>> {
		let sets = [keys::topic_endorsed(tid)];
		let pids = self.store.range(&sets, 0, 0, Order::Asc).await?;

		Ok(parse_ids(pids).into_iter().next())
	}

	async fn require_endorser(&self, pid: Pid, uid: Uid) -> Result<()> {
		if self.collaborators.privileges.can_endorse(pid, uid).await? {
			Ok(())
		} else {
			Err(Error::NoPrivileges)
		}
	}

	async fn endorsable_post(&self, pid: Pid) -> Result<PostRecord> {
		self.store
			.posts(&[pid])
			.await?
			.into_iter()
			.next()
			.flatten()
			.ok_or(Error::InvalidPid(pid))
	}
}
