use serde_json::json;

use forum_storage::{
	Error, ExtraFields, ForumStore, Intersect, Order, ScoreRange,
	memory::MemoryStore,
	models::{Endorsement, TopicRecord, UserCounter, UserRecord},
};

async fn zset(store: &MemoryStore, key: &str, entries: &[(&str, f64)]) {
	for (member, score) in entries {
		store.add(key, *score, member).await.expect("Failed to add member.");
	}
}

fn keys(names: &[&str]) -> Vec<String> {
	names.iter().map(|name| name.to_string()).collect()
}

#[tokio::test]
async fn ranges_over_several_keys_sum_shared_scores() {
	let store = MemoryStore::new();

	zset(&store, "a", &[("x", 1.0), ("y", 5.0), ("z", 2.0)]).await;
	zset(&store, "b", &[("x", 10.0)]).await;

	let all = keys(&["a", "b", "missing"]);

	assert_eq!(store.range(&all, 0, -1, Order::Desc).await.expect("Range."), vec!["x", "y", "z"]);
	assert_eq!(store.range(&all, 0, -1, Order::Asc).await.expect("Range."), vec!["z", "y", "x"]);
	assert_eq!(store.range(&all, 1, 1, Order::Desc).await.expect("Range."), vec!["y"]);
	assert!(store.range(&all, 2, 1, Order::Desc).await.expect("Range.").is_empty());
}

#[tokio::test]
async fn score_ranges_page_inside_the_bounds() {
	let store = MemoryStore::new();

	zset(&store, "t", &[("1", 10.0), ("2", 20.0), ("3", 30.0), ("4", 40.0)]).await;

	let sets = keys(&["t"]);
	let recent = ScoreRange::at_least(20.0);

	assert_eq!(
		store.range_by_score(&sets, Order::Desc, recent).await.expect("Range."),
		vec!["4", "3", "2"]
	);
	assert_eq!(
		store.range_by_score(&sets, Order::Desc, recent.limit(2)).await.expect("Range."),
		vec!["4", "3"]
	);

	let window = ScoreRange { min: 15.0, max: 35.0, offset: 1, count: None };

	assert_eq!(store.range_by_score(&sets, Order::Asc, window).await.expect("Range."), vec!["3"]);
}

#[tokio::test]
async fn intersections_filter_by_membership_and_score_by_weight() {
	let store = MemoryStore::new();

	zset(&store, "topics:recent", &[("1", 100.0), ("2", 300.0), ("3", 200.0)]).await;
	zset(&store, "followed", &[("1", 9_999.0), ("3", 1.0)]).await;

	let watched =
		Intersect::scored_by_first(keys(&["topics:recent", "followed"]), 0, -1, Order::Desc);

	assert_eq!(store.intersect(&watched).await.expect("Intersect."), vec!["3", "1"]);

	let summed = Intersect {
		sets: keys(&["topics:recent", "followed"]),
		weights: vec![1.0, 1.0],
		start: 0,
		stop: 0,
		order: Order::Desc,
	};

	assert_eq!(store.intersect(&summed).await.expect("Intersect."), vec!["1"]);
}

#[tokio::test]
async fn membership_queries_report_per_member_and_per_key() {
	let store = MemoryStore::new();

	zset(&store, "read", &[("1", 5.0)]).await;
	zset(&store, "admins", &[("7", 0.0)]).await;

	assert_eq!(
		store.scores("read", &keys(&["1", "2"])).await.expect("Scores."),
		vec![Some(5.0), None]
	);
	assert_eq!(
		store.is_member_of_sets(&keys(&["admins", "mods"]), "7").await.expect("Membership."),
		vec![true, false]
	);
	assert_eq!(store.card("read").await.expect("Card."), 1);

	store.remove("read", "1").await.expect("Remove.");

	assert_eq!(store.card("read").await.expect("Card."), 0);
	assert!(!store.is_member("read", "1").await.expect("Membership."));
}

#[tokio::test]
async fn topics_hydrate_only_requested_extra_fields() {
	let store = MemoryStore::new();
	let mut topic = TopicRecord { tid: 4, cid: 1, title: "Pinned".to_string(), ..Default::default() };

	topic.extra.insert("heat".to_string(), json!(3));
	topic.extra.insert("color".to_string(), json!("red"));
	store.put_topic(&topic).await.expect("Failed to store topic.");

	let wanted = vec!["heat".to_string()];
	let none = store.topics(&[4, 5], ExtraFields::None).await.expect("Topics.");
	let some = store.topics(&[4], ExtraFields::Only(&wanted)).await.expect("Topics.");
	let all = store.topics(&[4], ExtraFields::All).await.expect("Topics.");

	assert_eq!(none.len(), 2);
	assert!(none[1].is_none());
	assert!(none[0].as_ref().is_some_and(|topic| topic.extra.is_empty()));
	assert_eq!(some[0].as_ref().map(|topic| topic.extra.len()), Some(1));
	assert_eq!(all[0].as_ref(), Some(&topic));
}

#[tokio::test]
async fn record_updates_require_existing_records() {
	let store = MemoryStore::new();

	assert!(matches!(store.set_topic_endorsed(1, true).await, Err(Error::NotFound(_))));
	assert!(matches!(
		store.set_user_counter(1, UserCounter::Followers, 3).await,
		Err(Error::NotFound(_))
	));

	store
		.put_user(&UserRecord { uid: 1, username: "alice".to_string(), ..Default::default() })
		.await
		.expect("Failed to store user.");
	store.set_user_counter(1, UserCounter::Followers, 3).await.expect("Counter.");

	let users = store.users(&[1]).await.expect("Users.");

	assert_eq!(users[0].as_ref().map(|user| user.follower_count), Some(3));

	let endorsement = Endorsement { endorsed: true, endorsed_by: 1, endorsed_at: 10 };

	store.put_endorsement(9, &endorsement).await.expect("Endorse.");

	assert_eq!(store.endorsement(9).await.expect("Read."), Some(endorsement));

	store.delete_endorsement(9).await.expect("Delete.");

	assert_eq!(store.endorsement(9).await.expect("Read."), None);
}
