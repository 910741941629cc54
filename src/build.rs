//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: clearing the output directory,
//! copying the theme's static assets, parsing the theme's fragments
//! ([`crate::theme`]) and rendering the index and post pages
//! ([`crate::write`]).

use crate::config::{Options, POSTS_DIRECTORY};
use crate::post::Blog;
use crate::theme::{self, Theme, ASSETS_DIRECTORY};
use crate::write::{Error as WriteError, Writer};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Builds the site for an already-loaded [`Blog`] into
/// [`Options::output_directory`]. The steps run strictly in order and the
/// first failure aborts the rest; files written before the failure are left
/// in place. Returns the number of pages written.
pub fn build_site(blog: &Blog, options: &Options) -> Result<usize> {
    let out = &options.output_directory;
    let theme_directory = options.theme_directory(&blog.config);

    // Only the children are removed; `out` itself is kept.
    clear_dir(out)?;
    copy_dir(&theme_directory.join(ASSETS_DIRECTORY), out)?;

    let posts_directory = out.join(POSTS_DIRECTORY);
    std::fs::create_dir_all(&posts_directory).map_err(|err| Error::Io {
        path: posts_directory.clone(),
        err,
    })?;

    let theme = Theme::load(&theme_directory)?;
    let writer = Writer {
        theme: &theme,
        output_directory: out,
    };
    let pages = writer.write_blog(blog)?;
    tracing::info!("Wrote {} pages to {}", pages, out.display());
    Ok(pages)
}

/// Deletes every entry inside `dir`, creating `dir` if it doesn't exist.
fn clear_dir(dir: &Path) -> Result<()> {
    let clean = |path: &Path, err: io::Error| Error::Clean {
        path: path.to_owned(),
        err,
    };

    std::fs::create_dir_all(dir).map_err(|err| clean(dir, err))?;
    for entry in std::fs::read_dir(dir).map_err(|err| clean(dir, err))? {
        let entry = entry.map_err(|err| clean(dir, err))?;
        let path = entry.path();
        let result = match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => std::fs::remove_dir_all(&path),
            Ok(_) => std::fs::remove_file(&path),
            Err(err) => Err(err),
        };
        result.map_err(|err| clean(&path, err))?;
    }
    Ok(())
}

/// Recursively copies the contents of `src` into `dst`, overwriting files
/// that already exist. A missing `src` is not an error.
fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_dir() {
        tracing::warn!("Theme has no assets directory at {}", src.display());
        return Ok(());
    }

    for result in WalkDir::new(src).min_depth(1) {
        let entry = result?;
        // strip_prefix shouldn't fail since `src` is always an ancestor of
        // `entry.path()`
        let relative = match entry.path().strip_prefix(src) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let target = dst.join(relative);
        let copied = if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)
        } else {
            std::fs::copy(entry.path(), &target).map(|_| ())
        };
        copied.map_err(|err| Error::CopyAsset {
            src: entry.path().to_owned(),
            dst: target.clone(),
            err,
        })?;
        tracing::debug!("Copied {}", relative.display());
    }
    Ok(())
}

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during cleaning the
/// output directory, copying assets, loading the theme, writing pages, and
/// other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while cleaning the output directory.
    Clean { path: PathBuf, err: io::Error },

    /// Returned for I/O problems while copying a theme asset.
    CopyAsset {
        src: PathBuf,
        dst: PathBuf,
        err: io::Error,
    },

    /// Returned for errors walking the theme's assets directory.
    WalkDir(walkdir::Error),

    /// Returned for errors loading or parsing the theme's fragments.
    Theme(theme::Error),

    /// Returned for errors rendering or writing pages.
    Write(WriteError),

    /// Returned for other I/O errors.
    Io { path: PathBuf, err: io::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Clean { path, err } => {
                write!(f, "Cleaning '{}': {}", path.display(), err)
            }
            Error::CopyAsset { src, dst, err } => write!(
                f,
                "Copying asset '{}' to '{}': {}",
                src.display(),
                dst.display(),
                err
            ),
            Error::WalkDir(err) => err.fmt(f),
            Error::Theme(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Io { path, err } => {
                write!(f, "Creating '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Clean { path: _, err } => Some(err),
            Error::CopyAsset { err, .. } => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Theme(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Io { path: _, err } => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator while walking the assets directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<theme::Error> for Error {
    /// Converts [`theme::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: theme::Error) -> Error {
        Error::Theme(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}
