//! Mock data served by the local API.
//!
//! Deterministic so tests can assert on exact titles and counts, and large
//! enough that `_limit` queries actually cut something off.

use payloads::responses::{Post, User};
use payloads::{PostId, UserId};

pub const DEFAULT_POST_COUNT: u64 = 10;
pub const DEFAULT_USER_COUNT: u64 = 5;

const NAMES: &[(&str, &str)] = &[
    ("Alice Example", "alice"),
    ("Bob Example", "bob"),
    ("Charlie Example", "charlie"),
    ("Dana Example", "dana"),
    ("Eve Example", "eve"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockDataset {
    pub posts: Vec<Post>,
    pub users: Vec<User>,
}

impl Default for MockDataset {
    fn default() -> Self {
        Self::new(DEFAULT_POST_COUNT, DEFAULT_USER_COUNT)
    }
}

impl MockDataset {
    /// `post_count` posts spread round-robin over `user_count` users.
    pub fn new(post_count: u64, user_count: u64) -> Self {
        let users: Vec<User> = (1..=user_count).map(user).collect();
        let posts = (1..=post_count)
            .map(|id| post(id, UserId(1 + (id - 1) % user_count.max(1))))
            .collect();
        Self { posts, users }
    }

    pub fn post(&self, post_id: &PostId) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == *post_id)
    }

    pub fn print_summary(&self) {
        tracing::info!("📋 Mock dataset summary:");
        tracing::info!("   Posts: {}", self.posts.len());
        tracing::info!("   Users: {}", self.users.len());
        if let Some(first) = self.posts.first() {
            tracing::info!("   First post: #{} {}", first.id, first.title);
        }
    }
}

fn user(id: u64) -> User {
    let (name, username) = NAMES
        .get((id as usize - 1) % NAMES.len())
        .copied()
        .unwrap_or(("Someone", "someone"));
    let username = if id as usize > NAMES.len() {
        format!("{username}{id}")
    } else {
        username.to_string()
    };
    User {
        id: UserId(id),
        name: name.to_string(),
        email: format!("{username}@example.com"),
        username,
        phone: None,
        website: Some("example.com".to_string()),
    }
}

fn post(id: u64, user_id: UserId) -> Post {
    Post {
        user_id,
        id: PostId(id),
        title: format!("Post number {id}"),
        body: format!("Body of post {id}, written by user {user_id}."),
    }
}
