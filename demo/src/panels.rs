//! Plain-text panels for the terminal.

use fetcher::{FetchError, FetchView, Phase};
use payloads::responses::{Post, User};

pub fn posts(view: &FetchView<'_, Vec<Post>>) -> String {
    view.render("posts", |posts, _, error| {
        let mut out = header("Posts", view.phase(), error);
        for post in posts {
            out.push_str(&format!("  #{:<3} {}\n", post.id, post.title));
        }
        out
    })
}

pub fn users(view: &FetchView<'_, Vec<User>>) -> String {
    view.render("users", |users, _, error| {
        let mut out = header("Users", view.phase(), error);
        for user in users {
            out.push_str(&format!(
                "  {:<20} @{:<12} {}\n",
                user.name, user.username, user.email
            ));
        }
        out
    })
}

/// Title line for a panel that already has data.
fn header(title: &str, phase: Phase, error: Option<&FetchError>) -> String {
    let mut out = format!("== {title}");
    match phase {
        Phase::Loading => out.push_str(" (refreshing...)"),
        Phase::Failed => out.push_str(" (stale)"),
        Phase::Idle | Phase::Success => {}
    }
    out.push('\n');
    if let Some(error) = error {
        out.push_str(&format!("  Error: {error}\n"));
    }
    out
}
