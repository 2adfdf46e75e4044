use std::sync::Arc;

use forum_config::Topics;
use forum_domain::{Tid, anonymous::ANONYMOUS_NAME};
use forum_service::{EndorseResponse, Error, TopicService, UnendorseResponse};
use forum_storage::{ExtraFields, ForumStore, memory::MemoryStore, models::PostRecord};
use forum_testkit::seed::{
	TopicFixture, make_admin, make_global_moderator, seed_category, seed_public_category,
	seed_reply, seed_topic, seed_user,
};

const ADMIN: i64 = 1;
const MODERATOR: i64 = 2;
const MEMBER: i64 = 3;

async fn forum() -> (Arc<MemoryStore>, TopicService) {
	let store = Arc::new(MemoryStore::new());

	seed_public_category(&*store, 1).await.expect("Failed to seed category.");
	seed_category(&*store, 3, &[]).await.expect("Failed to seed category.");

	for topic in [TopicFixture::new(1, 1), TopicFixture::new(2, 1), TopicFixture::new(3, 3)] {
		seed_topic(&*store, &topic.build()).await.expect("Failed to seed topic.");
	}
	for (pid, tid, cid) in [(10, 1, 1), (11, 1, 1), (20, 2, 1), (30, 3, 3)] {
		seed_reply(&*store, cid, pid, tid, MEMBER, pid * 10).await.expect("Failed to seed reply.");
	}

	make_admin(&*store, ADMIN).await.expect("Failed to grant admin.");
	make_global_moderator(&*store, MODERATOR).await.expect("Failed to grant moderator.");

	let service = TopicService::new(Topics::default(), store.clone());

	(store, service)
}

async fn topic_endorsed(store: &MemoryStore, tid: Tid) -> bool {
	let topics = store.topics(&[tid], ExtraFields::None).await.expect("Failed to read topic.");

	topics.into_iter().flatten().next().expect("Topic exists.").endorsed
}

#[tokio::test]
async fn endorsing_requires_privilege_and_an_existing_post() {
	let (_, service) = forum().await;

	assert!(matches!(service.endorse(10, MEMBER).await, Err(Error::NoPrivileges)));
	assert!(matches!(service.endorse(10, 0).await, Err(Error::NoPrivileges)));
	assert!(matches!(service.endorse(99, ADMIN).await, Err(Error::InvalidPid(99))));
	assert!(matches!(service.unendorse(10, MEMBER).await, Err(Error::NoPrivileges)));
}

#[tokio::test]
async fn endorsing_marks_the_post_and_its_topic() {
	let (store, service) = forum().await;
	let response = service.endorse(10, ADMIN).await.expect("Failed to endorse.");

	assert_eq!(response, EndorseResponse { pid: 10, endorsed: true, endorsed_by: ADMIN });
	assert!(topic_endorsed(&store, 1).await);
	assert!(!topic_endorsed(&store, 2).await);
	assert_eq!(service.topic_endorsed_post(1).await.expect("Lookup."), Some(10));

	let endorsement =
		service.endorsement(10, MEMBER).await.expect("Failed to read.").expect("Endorsed.");

	assert!(endorsement.endorsed);
	assert_eq!(endorsement.endorsed_by, ADMIN);
	assert!(service.endorsement(11, MEMBER).await.expect("Failed to read.").is_none());
}

#[tokio::test]
async fn a_topic_holds_one_endorsed_post() {
	let (store, service) = forum().await;

	service.endorse(10, ADMIN).await.expect("Failed to endorse.");

	assert!(matches!(service.endorse(10, MODERATOR).await, Err(Error::AlreadyEndorsed(10))));
	assert!(matches!(service.endorse(11, MODERATOR).await, Err(Error::TopicAlreadyEndorsed(1))));

	service.endorse(20, MODERATOR).await.expect("Other topics stay independent.");

	let response = service.unendorse(10, MODERATOR).await.expect("Failed to unendorse.");

	assert_eq!(response, UnendorseResponse { pid: 10, endorsed: false });
	assert!(!topic_endorsed(&store, 1).await);
	assert_eq!(service.topic_endorsed_post(1).await.expect("Lookup."), None);

	service.endorse(11, MODERATOR).await.expect("Failed to endorse after unendorse.");

	assert_eq!(service.topic_endorsed_post(1).await.expect("Lookup."), Some(11));
	assert!(topic_endorsed(&store, 1).await);
}

#[tokio::test]
async fn endorsements_follow_topic_read_privileges() {
	let (_, service) = forum().await;

	service.endorse(30, ADMIN).await.expect("Admins endorse anywhere.");

	assert!(matches!(service.endorsement(30, MEMBER).await, Err(Error::NoPrivileges)));
	assert!(service.endorsement(30, ADMIN).await.expect("Failed to read.").is_some());
	assert!(matches!(service.endorsement(77, ADMIN).await, Err(Error::InvalidPid(77))));
}

#[tokio::test]
async fn anonymous_posts_mask_their_author() {
	let (store, service) = forum().await;

	seed_user(&*store, MEMBER, "Ferris").await.expect("Failed to seed user.");
	store
		.put_post(&PostRecord { pid: 40, tid: 2, uid: MEMBER, timestamp: 400, anonymous: true })
		.await
		.expect("Failed to store post.");

	let named = service.post_author(20).await.expect("Failed to resolve author.");
	let masked = service.post_author(40).await.expect("Failed to resolve author.");

	assert_eq!(named.uid, MEMBER);
	assert_eq!(named.username, "Ferris");
	assert_eq!(named.icon_text, "F");
	assert_eq!(masked.uid, 0);
	assert_eq!(masked.username, ANONYMOUS_NAME);
	assert_eq!(masked.status, "offline");

	let stored = store.posts(&[40]).await.expect("Failed to read post.");

	assert_eq!(stored[0].as_ref().map(|post| post.uid), Some(MEMBER));
}
