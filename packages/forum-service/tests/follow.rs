use std::sync::Arc;

use forum_config::Topics;
use forum_domain::Uid;
use forum_service::{Error, TopicService};
use forum_storage::{ForumStore, keys, memory::MemoryStore, models::UserRecord};
use forum_testkit::seed::seed_user;

async fn forum() -> (Arc<MemoryStore>, TopicService) {
	let store = Arc::new(MemoryStore::new());

	for (uid, name) in [(1, "alice"), (2, "bob"), (3, "carol")] {
		seed_user(&*store, uid, name).await.expect("Failed to seed user.");
	}

	let service = TopicService::new(Topics::default(), store.clone());

	(store, service)
}

async fn user(store: &MemoryStore, uid: Uid) -> UserRecord {
	let users = store.users(&[uid]).await.expect("Failed to read user.");

	users.into_iter().flatten().next().expect("User exists.")
}

fn uids(users: &[UserRecord]) -> Vec<Uid> {
	users.iter().map(|user| user.uid).collect()
}

#[tokio::test]
async fn follow_rejects_invalid_transitions() {
	let (_, service) = forum().await;

	assert!(matches!(service.follow(0, 2).await, Err(Error::InvalidUid(0))));
	assert!(matches!(service.follow(1, -4).await, Err(Error::InvalidUid(-4))));
	assert!(matches!(service.follow(2, 2).await, Err(Error::CannotFollowSelf)));
	assert!(matches!(service.follow(1, 9).await, Err(Error::NoUser(9))));
	assert!(matches!(service.unfollow(1, 2).await, Err(Error::NotFollowing(2))));

	service.follow(1, 2).await.expect("Failed to follow.");

	assert!(matches!(service.follow(1, 2).await, Err(Error::AlreadyFollowing(2))));
}

#[tokio::test]
async fn following_updates_sets_and_counters() {
	let (store, service) = forum().await;

	service.follow(1, 2).await.expect("Failed to follow.");
	service.follow(3, 2).await.expect("Failed to follow.");
	service.follow(1, 3).await.expect("Failed to follow.");

	assert!(service.is_following(1, 2).await.expect("Lookup."));
	assert!(!service.is_following(2, 1).await.expect("Lookup."));
	assert_eq!(user(&store, 1).await.following_count, 2);
	assert_eq!(user(&store, 2).await.follower_count, 2);
	assert_eq!(user(&store, 3).await.follower_count, 1);

	let followers = service.followers(2, 0, -1).await.expect("Failed to list followers.");
	let following = service.following(1, 0, -1).await.expect("Failed to list following.");

	assert_eq!(uids(&followers).len(), 2);
	assert!(uids(&followers).contains(&1) && uids(&followers).contains(&3));
	assert_eq!(uids(&following).len(), 2);
	assert!(service.following(0, 0, -1).await.expect("Listing.").is_empty());

	service.unfollow(1, 2).await.expect("Failed to unfollow.");

	assert!(!service.is_following(1, 2).await.expect("Lookup."));
	assert_eq!(user(&store, 1).await.following_count, 1);
	assert_eq!(user(&store, 2).await.follower_count, 1);
	assert_eq!(uids(&service.followers(2, 0, -1).await.expect("Listing.")), vec![3]);
}

#[tokio::test]
async fn remote_followers_count_but_are_not_listed() {
	let (store, service) = forum().await;

	store
		.add(&keys::followers_remote(2), 1.0, "https://remote.example/users/dana")
		.await
		.expect("Failed to add remote follower.");
	service.follow(1, 2).await.expect("Failed to follow.");

	assert_eq!(user(&store, 2).await.follower_count, 2);
	assert_eq!(uids(&service.followers(2, 0, -1).await.expect("Listing.")), vec![1]);
}

#[tokio::test]
async fn actors_without_a_profile_can_still_follow() {
	let (store, service) = forum().await;

	service.follow(42, 1).await.expect("Failed to follow.");

	assert_eq!(user(&store, 1).await.follower_count, 1);
	assert!(service.is_following(42, 1).await.expect("Lookup."));
}
