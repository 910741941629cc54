//! Defines the manifest types ([`BlogConfig`] and [`PostRef`]) which mirror
//! the `blawg.json` file on disk, and [`Options`], the per-invocation settings
//! that are handed to every operation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

/// The name of the manifest file inside a blog directory.
pub const MANIFEST_FILE: &str = "blawg.json";

/// The name of the directory (relative to the blog directory and also to the
/// output directory) which holds post files.
pub const POSTS_DIRECTORY: &str = "posts";

/// Blog-wide settings and the post index, as stored in `blawg.json`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct BlogConfig {
    /// Prefix for every generated link. It is concatenated verbatim, so a
    /// trailing slash will produce a double slash in post links.
    #[serde(rename = "baseURL")]
    pub base_url: String,

    pub title: String,

    /// The theme directory, relative to [`Options::theme_root`].
    pub theme: String,

    pub posts: Vec<PostRef>,
}

/// A single entry in the manifest's post index.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PostRef {
    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub title: String,

    /// The body file, relative to `{blog_directory}/posts`. The rendered page
    /// lands at the same relative path under `{output_directory}/posts`.
    pub path: String,

    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl BlogConfig {
    /// Loads the manifest from `{dir}/blawg.json`.
    pub fn from_directory(dir: &Path) -> Result<BlogConfig> {
        BlogConfig::from_file(&dir.join(MANIFEST_FILE))
    }

    /// Loads the manifest from an explicit file path.
    pub fn from_file(path: &Path) -> Result<BlogConfig> {
        let file = File::open(path).map_err(|err| Error::open(path, err))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|err| Error::DeserializeJson {
            path: path.to_owned(),
            err,
        })
    }

    /// Writes the manifest to `{dir}/blawg.json` as two-space indented JSON,
    /// replacing whatever was there.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = dir.join(MANIFEST_FILE);
        let mut contents = serde_json::to_string_pretty(self).map_err(Error::SerializeJson)?;
        contents.push('\n');
        File::create(&path)
            .and_then(|mut file| file.write_all(contents.as_bytes()))
            .map_err(|err| Error::Io { path, err })
    }
}

/// Settings for a single invocation, constructed once from the command line
/// and passed by reference to the loader, writer and scaffolding functions.
#[derive(Clone, Debug)]
pub struct Options {
    /// The directory containing `blawg.json` and `posts/`.
    pub blog_directory: PathBuf,

    /// The directory into which the site is rendered. Its contents are
    /// deleted at the start of every build.
    pub output_directory: PathBuf,

    /// The directory against which [`BlogConfig::theme`] is resolved.
    pub theme_root: PathBuf,
}

impl Options {
    /// Resolves the theme directory for a blog.
    pub fn theme_directory(&self, config: &BlogConfig) -> PathBuf {
        self.theme_root.join(&config.theme)
    }
}

/// The result of a fallible manifest operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error reading or writing the manifest.
#[derive(Debug)]
pub enum Error {
    /// Returned when the manifest file doesn't exist.
    NotFound { path: PathBuf, err: io::Error },

    /// Returned when the manifest isn't valid JSON or doesn't match the
    /// expected shape.
    DeserializeJson {
        path: PathBuf,
        err: serde_json::Error,
    },

    /// Returned when the manifest can't be serialized.
    SerializeJson(serde_json::Error),

    /// Returned for other I/O errors.
    Io { path: PathBuf, err: io::Error },
}

impl Error {
    fn open(path: &Path, err: io::Error) -> Error {
        match err.kind() {
            io::ErrorKind::NotFound => Error::NotFound {
                path: path.to_owned(),
                err,
            },
            _ => Error::Io {
                path: path.to_owned(),
                err,
            },
        }
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound { path, err } => {
                write!(f, "Manifest '{}' not found: {}", path.display(), err)
            }
            Error::DeserializeJson { path, err } => {
                write!(f, "Parsing manifest '{}': {}", path.display(), err)
            }
            Error::SerializeJson(err) => write!(f, "Serializing manifest: {}", err),
            Error::Io { path, err } => write!(f, "Accessing '{}': {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::NotFound { path: _, err } => Some(err),
            Error::DeserializeJson { path: _, err } => Some(err),
            Error::SerializeJson(err) => Some(err),
            Error::Io { path: _, err } => Some(err),
        }
    }
}
