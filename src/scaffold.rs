//! Helpers behind the `newblog` and `newpost` commands.

use crate::config::{self, BlogConfig, PostRef, POSTS_DIRECTORY};
use chrono::{DateTime, Utc};
use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

/// The theme a freshly scaffolded blog points at.
pub const DEFAULT_THEME: &str = "theme/default";

/// Derives a post's file name from its title: spaces become underscores, the
/// result is lowercased and `.html` is appended. For example `My Title`
/// becomes `my_title.html`.
pub fn derive_path(title: &str) -> String {
    format!("{}.html", title.replace(' ', "_").to_lowercase())
}

/// The manifest written by [`new_blog`].
pub fn default_config() -> BlogConfig {
    BlogConfig {
        base_url: String::from("/"),
        title: String::from("Regular old blog"),
        theme: String::from(DEFAULT_THEME),
        posts: Vec::new(),
    }
}

/// Creates a new blog at `dir`: the directory itself, a default manifest and
/// an empty posts directory. Fails if `dir` already exists.
pub fn new_blog(dir: &Path) -> Result<()> {
    create_dir(dir)?;
    default_config().save(dir)?;
    create_dir(&dir.join(POSTS_DIRECTORY))?;
    tracing::debug!("Blog {} created", dir.display());
    Ok(())
}

/// Appends a post to the manifest in `dir` and creates its empty body file.
/// The post's path is derived from `title` and its timestamp is `now`.
/// Returns the path of the new body file.
pub fn new_post(dir: &Path, author: &str, title: &str, now: DateTime<Utc>) -> Result<PathBuf> {
    let mut config = BlogConfig::from_directory(dir)?;
    let path = derive_path(title);
    if config.posts.iter().any(|post| post.path == path) {
        return Err(Error::DuplicatePost(path));
    }

    // The body file must not already exist, and it is created before the
    // manifest is touched.
    let body_path = dir.join(POSTS_DIRECTORY).join(&path);
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&body_path)
        .map_err(|err| Error::Io {
            path: body_path.clone(),
            err,
        })?;

    config.posts.push(PostRef {
        author: author.to_owned(),
        title: title.to_owned(),
        path,
        timestamp: now.timestamp_millis(),
    });
    config.save(dir)?;
    tracing::debug!("{} created", body_path.display());
    Ok(body_path)
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir(dir).map_err(|err| Error::Io {
        path: dir.to_owned(),
        err,
    })
}

/// The result of a scaffolding operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error creating a blog or a post.
#[derive(Debug)]
pub enum Error {
    /// Returned when reading or writing the manifest fails.
    Config(config::Error),

    /// Returned when the manifest already has a post with the derived path.
    DuplicatePost(String),

    /// Returned for filesystem errors creating directories or files.
    Io { path: PathBuf, err: io::Error },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Config(err) => err.fmt(f),
            Error::DuplicatePost(path) => {
                write!(f, "A post with path '{}' already exists", path)
            }
            Error::Io { path, err } => write!(f, "Creating '{}': {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(err) => Some(err),
            Error::DuplicatePost(_) => None,
            Error::Io { path: _, err } => Some(err),
        }
    }
}

impl From<config::Error> for Error {
    fn from(err: config::Error) -> Error {
        Error::Config(err)
    }
}
