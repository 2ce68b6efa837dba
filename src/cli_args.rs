use clap::{Parser, Subcommand};
use log::debug;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineArgs {
    #[arg(
        long,
        global = true,
        default_value = "settings.json",
        help = "Path to the JSON settings file"
    )]
    pub settings: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Find the XML-RPC endpoint of a site
    Discover {
        #[arg(help = "Site address, e.g. https://en.blog.wordpress.com/")]
        site: String,
    },

    /// Verify the configured credentials
    Check,

    /// List recent posts
    Posts {
        #[arg(long, help = "Number of posts to fetch (defaults to settings)")]
        count: Option<u32>,
    },

    /// Publish a post, optionally with media
    Publish {
        #[arg(long)]
        title: Option<String>,

        #[arg(long, help = "Post body, text or HTML")]
        content: Option<String>,

        #[arg(long, conflicts_with_all = ["gallery", "video"], help = "Image file to embed before the content")]
        image: Option<String>,

        #[arg(
            long,
            value_delimiter = ',',
            conflicts_with = "video",
            help = "Comma-separated image files shown as a gallery"
        )]
        gallery: Vec<String>,

        #[arg(long, help = "Video file to embed before the content")]
        video: Option<String>,
    },

    /// Parse a delegated-auth callback address
    Callback {
        locator: String,
    },

    /// Print the address that asks the WordPress app for authorization
    Authorize {
        #[arg(long = "client-id")]
        client_id: String,

        #[arg(long = "redirect-uri")]
        redirect_uri: String,

        #[arg(long)]
        secret: String,
    },
}

impl CommandLineArgs {
    pub fn parse_args() -> Self {
        let args = CommandLineArgs::parse();
        debug!("Parsed command: {:?}", args.command);
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_discover() {
        let args = CommandLineArgs::try_parse_from(["wp-publish", "discover", "example.com"]).unwrap();
        assert_eq!(args.settings, "settings.json");
        assert_eq!(
            args.command,
            Command::Discover {
                site: "example.com".to_string()
            }
        );
    }

    #[test]
    fn test_parse_publish_with_gallery() {
        let args = CommandLineArgs::try_parse_from([
            "wp-publish",
            "--settings",
            "/tmp/s.json",
            "publish",
            "--title",
            "Hi",
            "--gallery",
            "a.jpg,b.jpg",
        ])
        .unwrap();
        assert_eq!(args.settings, "/tmp/s.json");
        match args.command {
            Command::Publish {
                title,
                content,
                image,
                gallery,
                video,
            } => {
                assert_eq!(title.as_deref(), Some("Hi"));
                assert!(content.is_none());
                assert!(image.is_none());
                assert_eq!(gallery, vec!["a.jpg", "b.jpg"]);
                assert!(video.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_publish_attachments_are_exclusive() {
        let result = CommandLineArgs::try_parse_from([
            "wp-publish",
            "publish",
            "--image",
            "a.jpg",
            "--video",
            "b.mp4",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_posts_count() {
        let args = CommandLineArgs::try_parse_from(["wp-publish", "posts", "--count", "0"]).unwrap();
        assert_eq!(args.command, Command::Posts { count: Some(0) });
    }
}
