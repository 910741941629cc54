use anyhow::{bail, Context, Result};
use blawg::build::build_site;
use blawg::config::Options;
use blawg::post::Blog;
use blawg::scaffold::{new_blog, new_post};
use clap::{crate_version, App, Arg, ArgMatches, SubCommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let matches = App::new("blawg")
        .version(crate_version!())
        .about("Builds a static blog from a blawg.json manifest and a theme")
        .arg(
            Arg::with_name("path")
                .short("p")
                .long("path")
                .takes_value(true)
                .default_value("path")
                .help("path to blog data"),
        )
        .arg(
            Arg::with_name("out")
                .short("o")
                .long("out")
                .takes_value(true)
                .help("output dir"),
        )
        .arg(
            Arg::with_name("theme-root")
                .short("t")
                .long("theme-root")
                .takes_value(true)
                .default_value(".")
                .help("directory against which the manifest's theme is resolved"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("log every file that is read and written"),
        )
        .subcommand(SubCommand::with_name("newblog").about("Creates a new blog at --path"))
        .subcommand(
            SubCommand::with_name("newpost")
                .about("Adds an empty post to the blog at --path")
                .arg(Arg::with_name("author").required(true).index(1))
                .arg(Arg::with_name("title").required(true).index(2)),
        )
        .get_matches();

    init_logging(matches.is_present("verbose"));

    // `default_value` guarantees this is present.
    let blog_directory = PathBuf::from(matches.value_of("path").unwrap_or("path"));
    match matches.subcommand() {
        ("newblog", _) => {
            new_blog(&blog_directory)
                .with_context(|| format!("creating blog {}", blog_directory.display()))?;
            println!("blog {} created", blog_directory.display());
        }
        ("newpost", Some(sub)) => {
            let author = sub.value_of("author").unwrap_or_default();
            let title = sub.value_of("title").unwrap_or_default();
            let body = new_post(&blog_directory, author, title, chrono::Utc::now())
                .with_context(|| format!("creating post {:?}", title))?;
            println!("{} created", body.display());
        }
        _ => build(&options(&matches, blog_directory)?)?,
    }
    Ok(())
}

fn options(matches: &ArgMatches, blog_directory: PathBuf) -> Result<Options> {
    let output_directory = match matches.value_of("out") {
        Some(out) if !out.is_empty() => PathBuf::from(out),
        _ => bail!("Must have output directory -o"),
    };
    Ok(Options {
        blog_directory,
        output_directory,
        theme_root: PathBuf::from(matches.value_of("theme-root").unwrap_or(".")),
    })
}

fn build(options: &Options) -> Result<()> {
    let blog = Blog::load(&options.blog_directory)
        .with_context(|| format!("loading blog {}", options.blog_directory.display()))?;
    build_site(&blog, options).with_context(|| {
        format!(
            "building {} into {}",
            options.blog_directory.display(),
            options.output_directory.display()
        )
    })?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
