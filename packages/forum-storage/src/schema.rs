pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_forum_zsets.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_forum_zsets.sql")),
				"tables/002_forum_topics.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_forum_topics.sql")),
				"tables/003_forum_posts.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_forum_posts.sql")),
				"tables/004_forum_users.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_forum_users.sql")),
				"tables/005_forum_post_endorsements.sql" => out
					.push_str(include_str!("../../../sql/tables/005_forum_post_endorsements.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn expands_every_table() {
		let sql = render_schema();

		assert!(!sql.contains("\\ir"));

		for table in [
			"forum_zsets",
			"forum_topics",
			"forum_posts",
			"forum_users",
			"forum_post_endorsements",
		] {
			assert!(sql.contains(&format!("CREATE TABLE IF NOT EXISTS {table}")), "{table}");
		}
	}
}
