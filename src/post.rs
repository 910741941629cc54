//! Defines the [`Blog`] and [`LoadedPost`] types and the logic for loading a
//! blog directory into memory: the manifest ([`crate::config::BlogConfig`])
//! plus the body and modification time of every post it references.

use crate::config::{self, BlogConfig, PostRef, POSTS_DIRECTORY};
use chrono::{DateTime, TimeZone, Utc};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// A blog directory loaded into memory.
#[derive(Clone, Debug)]
pub struct Blog {
    /// The directory the blog was loaded from.
    pub path: PathBuf,

    pub config: BlogConfig,

    /// One entry per manifest post, in manifest order.
    pub posts: Vec<LoadedPost>,
}

/// A post whose body has been read from disk.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedPost {
    pub title: String,
    pub author: String,

    /// The body file path relative to the posts directory.
    pub path: String,

    /// The raw body bytes, emitted into the post page as-is. Bodies need not
    /// be UTF-8.
    pub body: Vec<u8>,

    /// Derived from the manifest timestamp.
    pub created: DateTime<Utc>,

    /// Derived from the body file's modification time.
    pub last_updated: DateTime<Utc>,
}

impl Blog {
    /// Loads `{path}/blawg.json` and every post body it references from
    /// `{path}/posts/`. Nothing is returned unless every post loads; the first
    /// error wins.
    pub fn load(path: &Path) -> Result<Blog> {
        let config = BlogConfig::from_directory(path)?;
        let posts_directory = path.join(POSTS_DIRECTORY);

        let mut posts = Vec::with_capacity(config.posts.len());
        for post_ref in &config.posts {
            posts.push(load_post(&posts_directory, post_ref)?);
        }
        tracing::debug!("Loaded {} posts from {}", posts.len(), path.display());

        Ok(Blog {
            path: path.to_owned(),
            config,
            posts,
        })
    }
}

fn load_post(posts_directory: &Path, post_ref: &PostRef) -> Result<LoadedPost> {
    let path = posts_directory.join(&post_ref.path);
    let annotate = |err: io::Error| match err.kind() {
        io::ErrorKind::NotFound => Error::NotFound {
            path: path.clone(),
            err,
        },
        _ => Error::Io {
            path: path.clone(),
            err,
        },
    };

    let mut file = File::open(&path).map_err(&annotate)?;
    let modified = file.metadata().and_then(|m| m.modified()).map_err(&annotate)?;
    let mut body = Vec::new();
    file.read_to_end(&mut body).map_err(&annotate)?;

    Ok(LoadedPost {
        title: post_ref.title.clone(),
        author: post_ref.author.clone(),
        path: post_ref.path.clone(),
        body,
        created: from_millis(post_ref.timestamp).ok_or_else(|| Error::InvalidTimestamp {
            path: post_ref.path.clone(),
            timestamp: post_ref.timestamp,
        })?,
        last_updated: DateTime::<Utc>::from(modified),
    })
}

/// Converts epoch milliseconds into an instant. Returns [`None`] when the
/// value is out of range for [`DateTime`].
pub fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// Represents the result of a [`Blog`]-load operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a [`Blog`].
#[derive(Debug)]
pub enum Error {
    /// Returned when the manifest couldn't be loaded.
    Config(config::Error),

    /// Returned when a post body file referenced in the manifest doesn't
    /// exist.
    NotFound { path: PathBuf, err: io::Error },

    /// Returned when a post's timestamp can't be represented as a date.
    InvalidTimestamp { path: String, timestamp: i64 },

    /// Returned for other I/O errors reading a post body.
    Io { path: PathBuf, err: io::Error },
}

impl Error {
    /// Reports whether the error is due to a missing file, either the
    /// manifest or a post body.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. } | Error::Config(config::Error::NotFound { .. })
        )
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Config(err) => err.fmt(f),
            Error::NotFound { path, err } => {
                write!(f, "Post file '{}' not found: {}", path.display(), err)
            }
            Error::InvalidTimestamp { path, timestamp } => {
                write!(f, "Post '{}' has an invalid timestamp: {}", path, timestamp)
            }
            Error::Io { path, err } => {
                write!(f, "Reading post file '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(err) => Some(err),
            Error::NotFound { path: _, err } => Some(err),
            Error::InvalidTimestamp { .. } => None,
            Error::Io { path: _, err } => Some(err),
        }
    }
}

impl From<config::Error> for Error {
    /// Converts a [`config::Error`] into an [`Error`]. It allows us to use the
    /// `?` operator when loading the manifest.
    fn from(err: config::Error) -> Error {
        Error::Config(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::MANIFEST_FILE;
    use std::fs;
    use tempfile::tempdir;

    fn write_blog<B: AsRef<[u8]>>(dir: &Path, manifest: &str, posts: &[(&str, B)]) {
        fs::write(dir.join(MANIFEST_FILE), manifest).unwrap();
        fs::create_dir_all(dir.join(POSTS_DIRECTORY)).unwrap();
        for (path, body) in posts {
            fs::write(dir.join(POSTS_DIRECTORY).join(path), body).unwrap();
        }
    }

    #[test]
    fn test_load() {
        let dir = tempdir().unwrap();
        write_blog(
            dir.path(),
            r#"{"baseURL": "/b", "title": "T", "theme": "t", "posts": [
                {"author": "ann", "title": "Hello World", "path": "hello_world.html", "timestamp": 1717459200000},
                {"author": "bob", "title": "Second Post", "path": "second_post.html", "timestamp": 1717545600000}
            ]}"#,
            &[
                ("hello_world.html", "<p>hello</p>"),
                ("second_post.html", "<p>second</p>"),
            ],
        );

        let blog = Blog::load(dir.path()).unwrap();
        assert_eq!(blog.path, dir.path());
        assert_eq!(blog.config.title, "T");
        assert_eq!(blog.posts.len(), 2);

        let first = &blog.posts[0];
        assert_eq!(first.title, "Hello World");
        assert_eq!(first.author, "ann");
        assert_eq!(first.path, "hello_world.html");
        assert_eq!(first.body, b"<p>hello</p>");
        assert_eq!(first.created.to_rfc3339(), "2024-06-04T00:00:00+00:00");
        assert_eq!(blog.posts[1].title, "Second Post");
    }

    #[test]
    fn test_load_last_updated_from_mtime() {
        let dir = tempdir().unwrap();
        write_blog(
            dir.path(),
            r#"{"posts": [{"path": "a.html", "timestamp": 0}]}"#,
            &[("a.html", "")],
        );
        let modified = fs::metadata(dir.path().join(POSTS_DIRECTORY).join("a.html"))
            .unwrap()
            .modified()
            .unwrap();

        let blog = Blog::load(dir.path()).unwrap();
        assert_eq!(blog.posts[0].last_updated, DateTime::<Utc>::from(modified));
        assert_eq!(blog.posts[0].created.timestamp_millis(), 0);
    }

    #[test]
    fn test_load_non_utf8_body() {
        let dir = tempdir().unwrap();
        write_blog(
            dir.path(),
            r#"{"posts": [{"path": "p.html", "timestamp": 0}]}"#,
            &[("p.html", &b"<p>caf\xe9</p>"[..])],
        );
        let blog = Blog::load(dir.path()).unwrap();
        assert_eq!(blog.posts[0].body, b"<p>caf\xe9</p>");
    }

    #[test]
    fn test_load_missing_post() {
        let dir = tempdir().unwrap();
        write_blog(
            dir.path(),
            r#"{"posts": [
                {"path": "present.html", "timestamp": 1},
                {"path": "absent.html", "timestamp": 2}
            ]}"#,
            &[("present.html", "here")],
        );

        let err = Blog::load(dir.path()).unwrap_err();
        assert!(err.is_not_found());
        match err {
            Error::NotFound { path, .. } => {
                assert_eq!(path, dir.path().join(POSTS_DIRECTORY).join("absent.html"))
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_manifest() {
        let dir = tempdir().unwrap();
        let err = Blog::load(dir.path()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_load_malformed_manifest() {
        let dir = tempdir().unwrap();
        write_blog::<&str>(dir.path(), "[1, 2", &[]);
        match Blog::load(dir.path()) {
            Err(Error::Config(config::Error::DeserializeJson { .. })) => {}
            other => panic!("expected DeserializeJson, got {:?}", other),
        }
    }

    #[test]
    fn test_load_invalid_timestamp() {
        let dir = tempdir().unwrap();
        write_blog(
            dir.path(),
            r#"{"posts": [{"path": "a.html", "timestamp": 9223372036854775807}]}"#,
            &[("a.html", "")],
        );
        match Blog::load(dir.path()) {
            Err(Error::InvalidTimestamp { timestamp, .. }) => assert_eq!(timestamp, i64::MAX),
            other => panic!("expected InvalidTimestamp, got {:?}", other),
        }
    }
}
