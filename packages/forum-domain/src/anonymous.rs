use serde::{Deserialize, Serialize};

use crate::Uid;

pub const ANONYMOUS_NAME: &str = "Anonymous User";

/// Author fields shown next to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayAuthor {
	pub uid: Uid,
	pub username: String,
	pub displayname: String,
	pub userslug: String,
	pub picture: String,
	#[serde(rename = "icon:text")]
	pub icon_text: String,
	#[serde(rename = "icon:bgColor")]
	pub icon_bg_color: String,
	pub status: String,
}
impl DisplayAuthor {
	pub fn anonymous() -> Self {
		Self {
			uid: 0,
			username: ANONYMOUS_NAME.to_string(),
			displayname: ANONYMOUS_NAME.to_string(),
			userslug: String::new(),
			picture: String::new(),
			icon_text: "?".to_string(),
			icon_bg_color: "#aaa".to_string(),
			status: "offline".to_string(),
		}
	}
}

/// Stored posts keep the real author; only the rendered author is replaced.
pub fn mask_author(author: DisplayAuthor, anonymous: bool) -> DisplayAuthor {
	if anonymous { DisplayAuthor::anonymous() } else { author }
}
