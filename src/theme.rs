//! Loads a theme's template fragments and renders them. A theme directory
//! holds four fragments which are concatenated to form pages:
//!
//! * `header.html`, rendered against the blog settings (`BaseURL`, `Title`)
//! * `list.html`, rendered against the sorted post views (`BlogTitle`,
//!   `PostList`)
//! * `postheader.html`, rendered against a single post view
//! * `footer.html`, emitted verbatim
//!
//! plus an `assets/` directory which is copied into the output as-is.

use crate::config::BlogConfig;
use crate::view::{header_value, list_value, PostView};
use gtmpl::{Context, Template};
use gtmpl_value::Value;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

pub const HEADER_TEMPLATE: &str = "header.html";
pub const POST_HEADER_TEMPLATE: &str = "postheader.html";
pub const LIST_TEMPLATE: &str = "list.html";
pub const FOOTER_TEMPLATE: &str = "footer.html";
pub const ASSETS_DIRECTORY: &str = "assets";

/// The parsed fragments of a theme.
pub struct Theme {
    header: Template,
    post_header: Template,
    list: Template,
    footer: String,
}

impl Theme {
    /// Reads and parses the four fragments from `dir`. Fails on the first
    /// missing or malformed fragment.
    pub fn load(dir: &Path) -> Result<Theme> {
        let header = read_fragment(dir, HEADER_TEMPLATE)?;
        let post_header = read_fragment(dir, POST_HEADER_TEMPLATE)?;
        let list = read_fragment(dir, LIST_TEMPLATE)?;
        let footer = read_fragment(dir, FOOTER_TEMPLATE)?;
        Theme::from_fragments(&header, &post_header, &list, footer)
    }

    /// Parses a theme from in-memory fragments.
    pub fn from_fragments(
        header: &str,
        post_header: &str,
        list: &str,
        footer: String,
    ) -> Result<Theme> {
        Ok(Theme {
            header: parse(HEADER_TEMPLATE, header)?,
            post_header: parse(POST_HEADER_TEMPLATE, post_header)?,
            list: parse(LIST_TEMPLATE, list)?,
            footer,
        })
    }

    /// Renders the site header shared by every page.
    pub fn render_header(&self, config: &BlogConfig) -> Result<String> {
        execute(HEADER_TEMPLATE, &self.header, header_value(config))
    }

    /// Renders the index listing. `views` is rendered in the order given.
    pub fn render_list(&self, blog_title: &str, views: &[PostView]) -> Result<String> {
        execute(LIST_TEMPLATE, &self.list, list_value(blog_title, views))
    }

    /// Renders the header of a single post page.
    pub fn render_post_header(&self, view: &PostView) -> Result<String> {
        execute(POST_HEADER_TEMPLATE, &self.post_header, Value::from(view))
    }

    pub fn footer(&self) -> &str {
        &self.footer
    }
}

/// Parses `text` and renders it against `context` in one step.
pub fn render(text: &str, context: Value) -> Result<String> {
    let name = "inline";
    execute(name, &parse(name, text)?, context)
}

fn read_fragment(dir: &Path, name: &str) -> Result<String> {
    let path = dir.join(name);
    std::fs::read_to_string(&path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => Error::NotFound { path, err },
        _ => Error::Io { path, err },
    })
}

fn parse(name: &str, text: &str) -> Result<Template> {
    let mut template = Template::default();
    template.parse(text).map_err(|message| Error::Template {
        name: name.to_owned(),
        message,
    })?;
    Ok(template)
}

fn execute(name: &str, template: &Template, context: Value) -> Result<String> {
    let annotate = |message: String| Error::Template {
        name: name.to_owned(),
        message,
    };
    template.render(&Context::from(context).map_err(annotate)?).map_err(annotate)
}

/// The result of a fallible theme operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or rendering a theme.
#[derive(Debug)]
pub enum Error {
    /// Returned when a template fragment is missing from the theme
    /// directory.
    NotFound { path: PathBuf, err: io::Error },

    /// Returned when a template fragment is malformed or fails to execute.
    Template { name: String, message: String },

    /// Returned for other I/O errors reading a fragment.
    Io { path: PathBuf, err: io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound { path, err } => {
                write!(f, "Template file '{}' not found: {}", path.display(), err)
            }
            Error::Template { name, message } => {
                write!(f, "Template '{}': {}", name, message)
            }
            Error::Io { path, err } => {
                write!(f, "Reading template file '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::NotFound { path: _, err } => Some(err),
            Error::Template { .. } => None,
            Error::Io { path: _, err } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::{from_millis, LoadedPost};
    use tempfile::tempdir;

    fn view(title: &str, created: i64) -> PostView {
        let post = LoadedPost {
            title: title.to_owned(),
            author: String::from("ann"),
            path: format!("{}.html", title),
            body: Vec::new(),
            created: from_millis(created).unwrap(),
            last_updated: from_millis(created).unwrap(),
        };
        PostView::new(&post, &BlogConfig::default())
    }

    fn theme() -> Theme {
        Theme::from_fragments(
            "<h1><a href=\"{{.BaseURL}}\">{{.Title}}</a></h1>",
            "<h2>{{.Header}}</h2><p>{{.Author}} on {{.Created}}</p>",
            "<h2>{{.BlogTitle}}</h2><ul>{{range .PostList}}<li><a href=\"{{.Link}}\">{{.Header}}</a></li>{{end}}</ul>",
            String::from("</body>{{.NotSubstituted}}"),
        )
        .unwrap()
    }

    #[test]
    fn test_render_header() {
        let config = BlogConfig {
            base_url: String::from("https://example.org"),
            title: String::from("Example"),
            ..Default::default()
        };
        assert_eq!(
            theme().render_header(&config).unwrap(),
            "<h1><a href=\"https://example.org\">Example</a></h1>"
        );
    }

    #[test]
    fn test_render_list_keeps_given_order() {
        let views = vec![view("b", 2), view("a", 1)];
        assert_eq!(
            theme().render_list("Blog", &views).unwrap(),
            "<h2>Blog</h2><ul><li><a href=\"/posts/b.html\">b</a></li><li><a href=\"/posts/a.html\">a</a></li></ul>"
        );
    }

    #[test]
    fn test_render_post_header() {
        assert_eq!(
            theme().render_post_header(&view("a", 0)).unwrap(),
            "<h2>a</h2><p>ann on Thursday, 1 January 1970</p>"
        );
    }

    #[test]
    fn test_footer_is_verbatim() {
        assert_eq!(theme().footer(), "</body>{{.NotSubstituted}}");
    }

    #[test]
    fn test_malformed_template() {
        match Theme::from_fragments("{{.Title", "", "", String::new()) {
            Err(Error::Template { name, .. }) => assert_eq!(name, HEADER_TEMPLATE),
            _ => panic!("expected a template error"),
        }
        assert!(matches!(
            render("{{end}}", Value::Nil),
            Err(Error::Template { .. })
        ));
    }

    #[test]
    fn test_render_escapes_titles() {
        let config = BlogConfig {
            title: String::from("Tom & \"Jerry\""),
            ..Default::default()
        };
        assert_eq!(
            theme().render_header(&config).unwrap(),
            "<h1><a href=\"\">Tom &amp; &quot;Jerry&quot;</a></h1>"
        );

        let views = vec![view("Q&A <script>", 1)];
        let list = theme().render_list("<b>Blog</b>", &views).unwrap();
        assert!(list.starts_with("<h2>&lt;b&gt;Blog&lt;/b&gt;</h2>"));
        assert!(list.contains(">Q&amp;A &lt;script&gt;</a>"));
    }

    #[test]
    fn test_render_inline() {
        let config = BlogConfig {
            title: String::from("Inline"),
            ..Default::default()
        };
        assert_eq!(
            render("[{{.Title}}]", header_value(&config)).unwrap(),
            "[Inline]"
        );
    }

    #[test]
    fn test_load_missing_fragment() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(HEADER_TEMPLATE), "h").unwrap();
        std::fs::write(dir.path().join(POST_HEADER_TEMPLATE), "p").unwrap();
        std::fs::write(dir.path().join(LIST_TEMPLATE), "l").unwrap();

        match Theme::load(dir.path()) {
            Err(Error::NotFound { path, .. }) => {
                assert_eq!(path, dir.path().join(FOOTER_TEMPLATE))
            }
            _ => panic!("expected NotFound for the footer"),
        }

        std::fs::write(dir.path().join(FOOTER_TEMPLATE), "f").unwrap();
        let theme = Theme::load(dir.path()).unwrap();
        assert_eq!(theme.footer(), "f");
    }
}
