use forum_domain::Uid;
use forum_storage::{
	Order, keys,
	models::{UserCounter, UserRecord},
};

use crate::{Error, Result, TopicService, collaborators::parse_ids, now_ms};

impl TopicService {
	pub async fn follow(&self, uid: Uid, their_uid: Uid) -> Result<()> {
		self.toggle_follow(uid, their_uid, true).await
	}

	pub async fn unfollow(&self, uid: Uid, their_uid: Uid) -> Result<()> {
		self.toggle_follow(uid, their_uid, false).await
	}

	pub async fn is_following(&self, uid: Uid, their_uid: Uid) -> Result<bool> {
		if uid <= 0 || their_uid <= 0 {
			return Ok(false);
		}

		Ok(self.is_stored_follow(uid, their_uid).await?)
	}

	/// Users `uid` follows, most recent first.
	pub async fn following(&self, uid: Uid, start: usize, stop: i64) -> Result<Vec<UserRecord>> {
		if uid <= 0 {
			return Ok(Vec::new());
		}

		self.follow_listing([keys::following(uid), keys::following_remote(uid)], start, stop).await
	}

	/// Users following `uid`, most recent first.
	pub async fn followers(&self, uid: Uid, start: usize, stop: i64) -> Result<Vec<UserRecord>> {
		if uid <= 0 {
			return Ok(Vec::new());
		}

		self.follow_listing([keys::followers(uid), keys::followers_remote(uid)], start, stop).await
	}

	async fn follow_listing(
		&self,
		sets: [String; 2],
		start: usize,
		stop: i64,
	) -> Result<Vec<UserRecord>> {
		// Remote actors are stored by URI and have no local user record.
		let uids = parse_ids(self.store.range(&sets, start, stop, Order::Desc).await?);

		Ok(self.store.users(&uids).await?.into_iter().flatten().collect())
	}

	async fn toggle_follow(&self, uid: Uid, their_uid: Uid, follow: bool) -> Result<()> {
		if uid <= 0 {
			return Err(Error::InvalidUid(uid));
		}
		if their_uid <= 0 {
			return Err(Error::InvalidUid(their_uid));
		}
		if uid == their_uid {
			return Err(Error::CannotFollowSelf);
		}

		let target_uids = [their_uid];
		let (target, following) = futures::try_join!(
			self.store.users(&target_uids),
			self.is_stored_follow(uid, their_uid)
		)?;

		if target.into_iter().flatten().next().is_none() {
			return Err(Error::NoUser(their_uid));
		}
		if follow && following {
			return Err(Error::AlreadyFollowing(their_uid));
		}
		if !follow && !following {
			return Err(Error::NotFollowing(their_uid));
		}

		let following_key = keys::following(uid);
		let followers_key = keys::followers(their_uid);

		if follow {
			let now = now_ms() as f64;

			self.store.add(&following_key, now, &their_uid.to_string()).await?;
			self.store.add(&followers_key, now, &uid.to_string()).await?;
		} else {
			self.store.remove(&following_key, &their_uid.to_string()).await?;
			self.store.remove(&followers_key, &uid.to_string()).await?;
		}

		self.refresh_follow_counts(uid, their_uid).await?;

		tracing::info!(uid, their_uid, follow, "Follow state changed.");

		Ok(())
	}

	async fn is_stored_follow(&self, uid: Uid, their_uid: Uid) -> forum_storage::Result<bool> {
		self.store.is_member(&keys::following(uid), &their_uid.to_string()).await
	}

	async fn refresh_follow_counts(&self, uid: Uid, their_uid: Uid) -> Result<()> {
		let following_key = keys::following(uid);
		let following_remote_key = keys::following_remote(uid);
		let followers_key = keys::followers(their_uid);
		let followers_remote_key = keys::followers_remote(their_uid);
		let (following, following_remote, followers, followers_remote) = futures::try_join!(
			self.store.card(&following_key),
			self.store.card(&following_remote_key),
			self.store.card(&followers_key),
			self.store.card(&followers_remote_key),
		)?;

		self.set_counter(uid, UserCounter::Following, following + following_remote).await?;
		self.set_counter(their_uid, UserCounter::Followers, followers + followers_remote).await
	}

	/// Counters of users without a stored record are left alone.
	async fn set_counter(&self, uid: Uid, counter: UserCounter, value: u64) -> Result<()> {
		match self.store.set_user_counter(uid, counter, value as i64).await {
			Ok(()) | Err(forum_storage::Error::NotFound(_)) => Ok(()),
			Err(err) => Err(err.into()),
		}
	}
}
