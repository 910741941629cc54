//! Defines [`PostView`], the render-ready form of a [`LoadedPost`], and the
//! conversions from views into template [`Value`]s.

use crate::config::{BlogConfig, POSTS_DIRECTORY};
use crate::post::LoadedPost;
use chrono::{DateTime, Utc};
use gtmpl_value::Value;
use pulldown_cmark::escape::escape_html;
use std::collections::HashMap;

/// A post prepared for templating. Views are rebuilt for every render and
/// never written anywhere.
#[derive(Clone, Debug, PartialEq)]
pub struct PostView {
    /// The post title, exposed to templates as `Header`.
    pub header_text: String,

    /// `{base_url}/posts/{path}`, joined verbatim.
    pub link: String,

    pub author: String,
    pub created_display: String,
    pub last_updated_display: String,

    /// Milliseconds since the Unix epoch. Index pages sort on this key.
    pub created_sort_key: i64,

    pub last_updated_sort_key: i64,
}

impl PostView {
    /// Builds the view for `post` under the blog-wide settings in `config`.
    pub fn new(post: &LoadedPost, config: &BlogConfig) -> PostView {
        PostView {
            header_text: post.title.clone(),
            link: format!("{}/{}/{}", config.base_url, POSTS_DIRECTORY, post.path),
            author: post.author.clone(),
            created_display: display_date(&post.created),
            last_updated_display: display_date(&post.last_updated),
            created_sort_key: post.created.timestamp_millis(),
            last_updated_sort_key: post.last_updated.timestamp_millis(),
        }
    }
}

/// Formats a date as e.g. `Tuesday, 4 June 2024`.
pub fn display_date(date: &DateTime<Utc>) -> String {
    date.format("%A, %-d %B %Y").to_string()
}

/// Builds views for every post and orders them newest first. The sort is
/// stable so posts with equal timestamps keep their manifest order.
pub fn sorted_views(posts: &[LoadedPost], config: &BlogConfig) -> Vec<PostView> {
    let mut views: Vec<PostView> = posts.iter().map(|p| PostView::new(p, config)).collect();
    views.sort_by(|a, b| b.created_sort_key.cmp(&a.created_sort_key));
    views
}

/// HTML-escapes manifest text before it is handed to a template. Links and
/// post bodies are never passed through here.
fn escaped(text: &str) -> Value {
    let mut out = String::with_capacity(text.len());
    // Writing into a `String` can't fail.
    let _ = escape_html(&mut out, text);
    Value::String(out)
}

impl From<&PostView> for Value {
    /// Converts a [`PostView`] into a [`Value`] for templating. Field names
    /// follow the keys themes already use (`Header`, `Link`, `Created`, ...).
    /// `Header` and `Author` are HTML-escaped; `Link` is passed verbatim.
    fn from(view: &PostView) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("Header".to_owned(), escaped(&view.header_text));
        m.insert("Link".to_owned(), Value::String(view.link.clone()));
        m.insert("Author".to_owned(), escaped(&view.author));
        m.insert(
            "Created".to_owned(),
            Value::String(view.created_display.clone()),
        );
        m.insert(
            "LastUpdated".to_owned(),
            Value::String(view.last_updated_display.clone()),
        );
        m.insert("CreatedStamp".to_owned(), Value::from(view.created_sort_key));
        m.insert(
            "LastUpdatedStamp".to_owned(),
            Value::from(view.last_updated_sort_key),
        );
        Value::Object(m)
    }
}

/// The context for the header fragment. `Title` is HTML-escaped and
/// `BaseURL` is passed verbatim.
pub fn header_value(config: &BlogConfig) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("BaseURL".to_owned(), Value::String(config.base_url.clone()));
    m.insert("Title".to_owned(), escaped(&config.title));
    Value::Object(m)
}

/// The context for the list fragment: the blog title and the already-sorted
/// post views.
pub fn list_value(blog_title: &str, views: &[PostView]) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("BlogTitle".to_owned(), escaped(blog_title));
    m.insert(
        "PostList".to_owned(),
        Value::Array(views.iter().map(Value::from).collect()),
    );
    Value::Object(m)
}
