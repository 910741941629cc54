//! Composes pages from a [`Theme`]'s fragments and writes them to the output
//! directory. The index page is header, list and footer; each post page is
//! header, post header, the raw body bytes and footer.

use crate::config::POSTS_DIRECTORY;
use crate::post::{Blog, LoadedPost};
use crate::theme::{self, Theme};
use crate::view::{sorted_views, PostView};
use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The name of the index page inside the output directory.
pub const INDEX_FILE: &str = "index.html";

/// Responsible for composing theme fragments into pages and writing them to
/// disk.
pub struct Writer<'a> {
    /// The parsed theme fragments.
    pub theme: &'a Theme,

    /// The site root. The index page is written to
    /// `{output_directory}/index.html` and post pages to
    /// `{output_directory}/posts/{path}`.
    pub output_directory: &'a Path,
}

impl Writer<'_> {
    /// Composes the index page: header, list, footer.
    pub fn index_page(&self, blog: &Blog, views: &[PostView]) -> Result<String> {
        let mut page = self.theme.render_header(&blog.config)?;
        page.push_str(&self.theme.render_list(&blog.config.title, views)?);
        page.push_str(self.theme.footer());
        Ok(page)
    }

    /// Composes a post page: header, post header, body, footer. The body is
    /// copied byte for byte, so the page is only UTF-8 if the body is.
    pub fn post_page(&self, blog: &Blog, post: &LoadedPost) -> Result<Vec<u8>> {
        let mut page = self.theme.render_header(&blog.config)?.into_bytes();
        page.extend_from_slice(
            self.theme
                .render_post_header(&PostView::new(post, &blog.config))?
                .as_bytes(),
        );
        page.extend_from_slice(&post.body);
        page.extend_from_slice(self.theme.footer().as_bytes());
        Ok(page)
    }

    /// Writes the index page and then every post page, stopping at the first
    /// failure. Returns the number of files written.
    pub fn write_blog(&self, blog: &Blog) -> Result<usize> {
        let views = sorted_views(&blog.posts, &blog.config);
        write_file(
            &self.output_directory.join(INDEX_FILE),
            self.index_page(blog, &views)?.as_bytes(),
        )?;

        let posts_directory = self.output_directory.join(POSTS_DIRECTORY);
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        seen_dirs.insert(posts_directory.clone());
        for post in &blog.posts {
            let file_path = posts_directory.join(&post.path);
            if let Some(dir) = file_path.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    std::fs::create_dir_all(dir).map_err(|err| Error::Io {
                        path: dir.to_owned(),
                        err,
                    })?;
                }
            }
            write_file(&file_path, &self.post_page(blog, post)?)?;
            tracing::debug!("Wrote {}", file_path.display());
        }

        Ok(blog.posts.len() + 1)
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    std::fs::write(path, contents).map_err(|err| Error::Io {
        path: path.to_owned(),
        err,
    })
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(theme::Error),

    /// An error writing the output files.
    Io { path: PathBuf, err: io::Error },
}

impl From<theme::Error> for Error {
    /// Converts a [`theme::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for fallible template operations.
    fn from(err: theme::Error) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Io { path, err } => write!(f, "Writing '{}': {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(err) => Some(err),
            Error::Io { path: _, err } => Some(err),
        }
    }
}
