//! Plain-text rendering of API responses.

use crate::models::{
    AuthResponse, Comment, CommentResponse, FeedEntry, LikeSummary, Pagination, RecipeDetail,
};

/// `2024-06-01T12:34:56.789Z` -> `2024-06-01`
fn day(timestamp: &str) -> &str {
    timestamp.get(..10).unwrap_or(timestamp)
}

/// Newline-terminated block.
fn block(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn likes_label(summary: &LikeSummary) -> String {
    let noun = if summary.likes == 1 { "like" } else { "likes" };
    let mine = if summary.has_liked { " (incl. you)" } else { "" };
    format!("{} {noun}{mine}", summary.likes)
}

fn comments_label(count: i64) -> String {
    match count {
        1 => "1 comment".to_string(),
        n => format!("{n} comments"),
    }
}

/// One feed card: title line, byline, description, then interaction counts.
pub fn feed_entry(entry: &FeedEntry, likes: &LikeSummary, comment_total: i64) -> String {
    let mut lines = vec![
        format!("[{}] {}", entry.recipe_id, entry.title),
        format!(
            "    by {} (#{}) on {}",
            entry.user.username,
            entry.user.user_id,
            day(&entry.created_at)
        ),
        format!("    {}", entry.description),
    ];
    if let Some(image) = &entry.image {
        lines.push(format!("    image: {image}"));
    }
    lines.push(format!(
        "    {} · {}",
        likes_label(likes),
        comments_label(comment_total)
    ));
    block(lines)
}

pub fn pagination(page: &Pagination, shown: usize) -> String {
    if shown == 0 {
        return format!("No recipes ({} total)", page.total);
    }
    let first = page.offset + 1;
    let last = page.offset + shown as i64;
    let range = format!("Showing {first}-{last} of {}", page.total);
    if last < page.total {
        format!("{range} (next: --offset {})", page.offset + page.limit)
    } else {
        range
    }
}

pub fn recipe_detail(recipe: &RecipeDetail) -> String {
    let mut lines = vec![
        format!("{} [{}]", recipe.title, recipe.recipe_id),
        format!("by {} on {}", recipe.user.username, day(&recipe.created_at)),
        String::new(),
        recipe.description.clone(),
    ];

    if !recipe.image_urls.is_empty() {
        lines.push(String::new());
        lines.extend(recipe.image_urls.iter().map(|url| format!("image: {url}")));
    }

    lines.push(String::new());
    lines.push("Ingredients".to_string());
    let width = recipe
        .ingredients
        .iter()
        .map(|i| i.name.chars().count())
        .max()
        .unwrap_or(0);
    lines.extend(
        recipe
            .ingredients
            .iter()
            .map(|i| format!("  {:<width$}  {}", i.name, i.quantity)),
    );

    lines.push(String::new());
    lines.push("Instructions".to_string());
    lines.extend(
        recipe
            .instructions
            .iter()
            .enumerate()
            .map(|(n, step)| format!("  {}. {}", n + 1, step)),
    );
    block(lines)
}

pub fn comment_line(comment: &Comment) -> String {
    format!(
        "  {} ({}): {}",
        comment.user.username,
        day(&comment.created_at),
        comment.content
    )
}

/// Counts use `total`; only the fetched page of comments is listed.
pub fn interactions(likes: &LikeSummary, comments: &[Comment], total: i64) -> String {
    let mut lines = vec![format!(
        "{} · {}",
        likes_label(likes),
        comments_label(total)
    )];
    lines.extend(comments.iter().map(comment_line));

    let hidden = total - comments.len() as i64;
    if hidden > 0 {
        lines.push(format!("  ... and {} more", comments_label(hidden)));
    }
    block(lines)
}

pub fn new_comment(comment: &CommentResponse) -> String {
    format!(
        "  you ({}): {}  [#{}]",
        day(&comment.created_at),
        comment.content,
        comment.comment_id
    )
}

pub fn session(auth: &AuthResponse) -> String {
    format!(
        "Signed in as {} (user #{})\nexport FOODIEGRAM_TOKEN={}",
        auth.username, auth.user_id, auth.token
    )
}
