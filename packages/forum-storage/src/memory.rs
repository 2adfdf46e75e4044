use std::{
	collections::HashMap,
	sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use forum_domain::{Pid, Tid, Uid};

use crate::{
	Error, Result,
	models::{Endorsement, PostRecord, TopicRecord, UserCounter, UserRecord},
	store::{self, BoxFuture, ExtraFields, ForumStore, Intersect, Order, ScoreRange},
};

#[derive(Debug, Default)]
struct State {
	zsets: HashMap<String, HashMap<String, f64>>,
	topics: HashMap<Tid, TopicRecord>,
	posts: HashMap<Pid, PostRecord>,
	users: HashMap<Uid, UserRecord>,
	endorsements: HashMap<Pid, Endorsement>,
}

/// Process-local store used by tests and by embedders that keep the forum in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
	state: RwLock<State>,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	fn read(&self) -> RwLockReadGuard<'_, State> {
		self.state.read().unwrap_or_else(|err| err.into_inner())
	}

	fn write(&self) -> RwLockWriteGuard<'_, State> {
		self.state.write().unwrap_or_else(|err| err.into_inner())
	}

	fn union(&self, keys: &[String]) -> Vec<(String, f64)> {
		let state = self.read();
		let mut merged: HashMap<String, f64> = HashMap::new();

		for key in keys {
			let Some(set) = state.zsets.get(key) else {
				continue;
			};

			for (member, score) in set {
				*merged.entry(member.clone()).or_insert(0.0) += score;
			}
		}

		merged.into_iter().collect()
	}

	fn intersect_sync(&self, query: &Intersect) -> Vec<String> {
		let state = self.read();
		let Some((first, rest)) = query.sets.split_first() else {
			return Vec::new();
		};
		let Some(base) = state.zsets.get(first) else {
			return Vec::new();
		};
		let mut scored = Vec::new();

		'members: for (member, score) in base {
			let mut total = score * query.weight(0);

			for (offset, key) in rest.iter().enumerate() {
				let Some(other) = state.zsets.get(key).and_then(|set| set.get(member)) else {
					continue 'members;
				};

				total += other * query.weight(offset + 1);
			}

			scored.push((member.clone(), total));
		}

		drop(state);

		page(sorted(scored, query.order), query.start, store::positional_count(query.start, query.stop))
	}
}

impl ForumStore for MemoryStore {
	fn range<'a>(
		&'a self,
		keys: &'a [String],
		start: usize,
		stop: i64,
		order: Order,
	) -> BoxFuture<'a, Result<Vec<String>>> {
		let members =
			page(sorted(self.union(keys), order), start, store::positional_count(start, stop));

		Box::pin(async move { Ok(members) })
	}

	fn range_by_score<'a>(
		&'a self,
		keys: &'a [String],
		order: Order,
		range: ScoreRange,
	) -> BoxFuture<'a, Result<Vec<String>>> {
		let in_range = self
			.union(keys)
			.into_iter()
			.filter(|(_, score)| *score >= range.min && *score <= range.max)
			.collect();
		let members = page(sorted(in_range, order), range.offset, range.count);

		Box::pin(async move { Ok(members) })
	}

	fn intersect<'a>(&'a self, query: &'a Intersect) -> BoxFuture<'a, Result<Vec<String>>> {
		let members = self.intersect_sync(query);

		Box::pin(async move { Ok(members) })
	}

	fn scores<'a>(
		&'a self,
		key: &'a str,
		members: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Option<f64>>>> {
		let state = self.read();
		let set = state.zsets.get(key);
		let scores =
			members.iter().map(|member| set.and_then(|set| set.get(member)).copied()).collect();

		drop(state);

		Box::pin(async move { Ok(scores) })
	}

	fn is_member<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<bool>> {
		let found = self.read().zsets.get(key).is_some_and(|set| set.contains_key(member));

		Box::pin(async move { Ok(found) })
	}

	fn is_member_of_sets<'a>(
		&'a self,
		keys: &'a [String],
		member: &'a str,
	) -> BoxFuture<'a, Result<Vec<bool>>> {
		let state = self.read();
		let found = keys
			.iter()
			.map(|key| state.zsets.get(key).is_some_and(|set| set.contains_key(member)))
			.collect();

		drop(state);

		Box::pin(async move { Ok(found) })
	}

	fn card<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<u64>> {
		let count = self.read().zsets.get(key).map(|set| set.len() as u64).unwrap_or(0);

		Box::pin(async move { Ok(count) })
	}

	fn add<'a>(&'a self, key: &'a str, score: f64, member: &'a str) -> BoxFuture<'a, Result<()>> {
		self.write().zsets.entry(key.to_string()).or_default().insert(member.to_string(), score);

		Box::pin(async move { Ok(()) })
	}

	fn remove<'a>(&'a self, key: &'a str, member: &'a str) -> BoxFuture<'a, Result<()>> {
		let mut state = self.write();

		if let Some(set) = state.zsets.get_mut(key) {
			set.remove(member);

			if set.is_empty() {
				state.zsets.remove(key);
			}
		}

		drop(state);

		Box::pin(async move { Ok(()) })
	}

	fn topics<'a>(
		&'a self,
		tids: &'a [Tid],
		extra: ExtraFields<'a>,
	) -> BoxFuture<'a, Result<Vec<Option<TopicRecord>>>> {
		let state = self.read();
		let topics = tids
			.iter()
			.map(|tid| {
				state.topics.get(tid).map(|topic| {
					let mut topic = topic.clone();

					topic.extra.retain(|field, _| extra.keeps(field));

					topic
				})
			})
			.collect();

		drop(state);

		Box::pin(async move { Ok(topics) })
	}

	fn put_topic<'a>(&'a self, topic: &'a TopicRecord) -> BoxFuture<'a, Result<()>> {
		self.write().topics.insert(topic.tid, topic.clone());

		Box::pin(async move { Ok(()) })
	}

	fn set_topic_endorsed<'a>(&'a self, tid: Tid, endorsed: bool) -> BoxFuture<'a, Result<()>> {
		let result = match self.write().topics.get_mut(&tid) {
			Some(topic) => {
				topic.endorsed = endorsed;

				Ok(())
			},
			None => Err(Error::NotFound(format!("topic {tid}"))),
		};

		Box::pin(async move { result })
	}

	fn posts<'a>(&'a self, pids: &'a [Pid]) -> BoxFuture<'a, Result<Vec<Option<PostRecord>>>> {
		let state = self.read();
		let posts = pids.iter().map(|pid| state.posts.get(pid).cloned()).collect();

		drop(state);

		Box::pin(async move { Ok(posts) })
	}

	fn put_post<'a>(&'a self, post: &'a PostRecord) -> BoxFuture<'a, Result<()>> {
		self.write().posts.insert(post.pid, post.clone());

		Box::pin(async move { Ok(()) })
	}

	fn users<'a>(&'a self, uids: &'a [Uid]) -> BoxFuture<'a, Result<Vec<Option<UserRecord>>>> {
		let state = self.read();
		let users = uids.iter().map(|uid| state.users.get(uid).cloned()).collect();

		drop(state);

		Box::pin(async move { Ok(users) })
	}

	fn put_user<'a>(&'a self, user: &'a UserRecord) -> BoxFuture<'a, Result<()>> {
		self.write().users.insert(user.uid, user.clone());

		Box::pin(async move { Ok(()) })
	}

	fn set_user_counter<'a>(
		&'a self,
		uid: Uid,
		counter: UserCounter,
		value: i64,
	) -> BoxFuture<'a, Result<()>> {
		let result = match self.write().users.get_mut(&uid) {
			Some(user) => {
				match counter {
					UserCounter::Followers => user.follower_count = value,
					UserCounter::Following => user.following_count = value,
				}

				Ok(())
			},
			None => Err(Error::NotFound(format!("user {uid}"))),
		};

		Box::pin(async move { result })
	}

	fn endorsement<'a>(&'a self, pid: Pid) -> BoxFuture<'a, Result<Option<Endorsement>>> {
		let endorsement = self.read().endorsements.get(&pid).copied();

		Box::pin(async move { Ok(endorsement) })
	}

	fn put_endorsement<'a>(
		&'a self,
		pid: Pid,
		endorsement: &'a Endorsement,
	) -> BoxFuture<'a, Result<()>> {
		self.write().endorsements.insert(pid, *endorsement);

		Box::pin(async move { Ok(()) })
	}

	fn delete_endorsement<'a>(&'a self, pid: Pid) -> BoxFuture<'a, Result<()>> {
		self.write().endorsements.remove(&pid);

		Box::pin(async move { Ok(()) })
	}
}

fn sorted(mut scored: Vec<(String, f64)>, order: Order) -> Vec<(String, f64)> {
	scored.sort_by(|a, b| {
		let ordering = a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0));

		match order {
			Order::Asc => ordering,
			Order::Desc => ordering.reverse(),
		}
	});

	scored
}

fn page(scored: Vec<(String, f64)>, offset: usize, count: Option<usize>) -> Vec<String> {
	let members = scored.into_iter().skip(offset).map(|(member, _)| member);

	match count {
		Some(count) => members.take(count).collect(),
		None => members.collect(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ties_order_by_member() {
		let scored = vec![("b".to_string(), 1.0), ("a".to_string(), 1.0), ("c".to_string(), 0.5)];
		let asc: Vec<_> = sorted(scored.clone(), Order::Asc).into_iter().map(|(m, _)| m).collect();
		let desc: Vec<_> = sorted(scored, Order::Desc).into_iter().map(|(m, _)| m).collect();

		assert_eq!(asc, vec!["c", "a", "b"]);
		assert_eq!(desc, vec!["b", "a", "c"]);
	}

	#[test]
	fn page_respects_offset_and_count() {
		let scored = (0..5).map(|idx| (idx.to_string(), idx as f64)).collect::<Vec<_>>();

		assert_eq!(page(scored.clone(), 1, Some(2)), vec!["1", "2"]);
		assert_eq!(page(scored.clone(), 3, None), vec!["3", "4"]);
		assert!(page(scored, 9, None).is_empty());
	}

	#[test]
	fn missing_sets_yield_nothing() {
		let store = MemoryStore::new();
		let query = Intersect::scored_by_first(vec!["a".to_string()], 0, -1, Order::Desc);

		assert!(store.intersect_sync(&query).is_empty());
		assert!(store.union(&["missing".to_string()]).is_empty());
	}
}
