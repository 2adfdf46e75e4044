use forum_domain::{
	Pid,
	anonymous::{DisplayAuthor, mask_author},
};
use forum_storage::models::UserRecord;

use crate::{Error, Result, TopicService};

const ICON_BACKGROUNDS: [&str; 14] = [
	"#f44336", "#e91e63", "#9c27b0", "#673ab7", "#3f51b5", "#2196f3", "#009688", "#1b5e20",
	"#33691e", "#827717", "#e65100", "#ff5722", "#795548", "#607d8b",
];

impl TopicService {
	/// Author shown next to a post. Anonymous posts hide the real author, which stays stored.
	pub async fn post_author(&self, pid: Pid) -> Result<DisplayAuthor> {
		let post = self.store.posts(&[pid]).await?.into_iter().next().flatten();
		let post = post.ok_or(Error::InvalidPid(pid))?;
		let user = self.store.users(&[post.uid]).await?.into_iter().next().flatten();
		let user = user.ok_or(Error::NoUser(post.uid))?;

		Ok(mask_author(display_author(&user), post.anonymous))
	}
}

fn display_author(user: &UserRecord) -> DisplayAuthor {
	let icon_text =
		user.username.chars().next().map(|c| c.to_uppercase().to_string()).unwrap_or_default();
	let char_sum: usize = user.username.chars().map(|c| c as usize).sum();

	DisplayAuthor {
		uid: user.uid,
		username: user.username.clone(),
		displayname: user.username.clone(),
		userslug: user.userslug.clone(),
		picture: user.picture.clone(),
		icon_text,
		icon_bg_color: ICON_BACKGROUNDS[char_sum % ICON_BACKGROUNDS.len()].to_string(),
		status: user.status.clone(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn icon_uses_the_first_letter() {
		let user = UserRecord { uid: 4, username: "ferris".to_string(), ..Default::default() };
		let author = display_author(&user);

		assert_eq!(author.icon_text, "F");
		assert!(ICON_BACKGROUNDS.contains(&author.icon_bg_color.as_str()));
	}
}
