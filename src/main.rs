mod cli_args;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use url::Url;

use cli_args::{Command, CommandLineArgs};
use wordpress_xmlrpc::common::time_utils::display_datetime;
use wordpress_xmlrpc::sso::{authorization_url, AuthorizationRequest, CallbackParser};
use wordpress_xmlrpc::{
    ApiClient, Attachment, HttpTransport, MediaItem, MediaUpload, Post, Settings,
};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let start_time = Instant::now();
    debug!("wp-publish v{} starting up...", env!("CARGO_PKG_VERSION"));

    let cli_args = CommandLineArgs::parse_args();
    run(cli_args).await?;

    debug!(
        "Completed in {:.2} seconds",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

async fn run(cli_args: CommandLineArgs) -> Result<()> {
    match cli_args.command {
        Command::Discover { site } => {
            let settings = load_settings_or_default(&cli_args.settings)?;
            let transport = Arc::new(HttpTransport::from_settings(&settings)?);
            let found = ApiClient::resolve_endpoint(&site, transport.clone(), transport).await?;
            println!("{}", found.endpoint);
        }
        Command::Check => {
            let client = build_client(&cli_args.settings).await?;
            if client.check_credentials().await? {
                println!("Credentials are valid");
            } else {
                println!("Credentials are invalid");
            }
        }
        Command::Posts { count } => {
            let settings = Settings::load(&cli_args.settings)?;
            let client = client_from_settings(&settings).await?;
            let count = count.unwrap_or(settings.default_post_count);
            let posts = client.recent_posts(count).await?;
            info!("Fetched {} post(s)", posts.len());
            for post in posts {
                let date = post
                    .published
                    .as_ref()
                    .map(display_datetime)
                    .unwrap_or_default();
                println!(
                    "{:>6}  {:<19}  {}  {}",
                    post.id,
                    date,
                    if post.title.is_empty() {
                        "(no title)"
                    } else {
                        post.title.as_str()
                    },
                    post.link.as_deref().unwrap_or("")
                );
            }
        }
        Command::Publish {
            title,
            content,
            image,
            gallery,
            video,
        } => {
            let client = build_client(&cli_args.settings).await?;
            let attachment = upload_attachment(&client, image, gallery, video).await?;
            let post = Post {
                title,
                content,
                attachment,
            };
            let result = client.publish(&post).await?;
            println!("Published post {}: {}", result.id, result.address);
        }
        Command::Callback { locator } => {
            let settings = Settings::load(&cli_args.settings)?;
            let scheme = settings
                .callback_scheme
                .context("settings need callback_scheme to parse callbacks")?;
            match CallbackParser::new(scheme).parse(&locator) {
                Some(auth) => {
                    println!("endpoint: {}", auth.endpoint);
                    println!("token: {}", auth.token);
                }
                None => warn!("Not a delegated-auth callback: {}", locator),
            }
        }
        Command::Authorize {
            client_id,
            redirect_uri,
            secret,
        } => {
            let settings = Settings::load(&cli_args.settings)?;
            let callback = settings
                .callback_scheme
                .context("settings need callback_scheme to request authorization")?;
            let url = authorization_url(&AuthorizationRequest {
                client_id,
                redirect_uri,
                secret,
                callback,
            })?;
            println!("{}", url);
        }
    }
    Ok(())
}

fn load_settings_or_default(settings_file: &str) -> Result<Settings> {
    if Path::new(settings_file).exists() {
        Settings::load(settings_file)
    } else {
        debug!("No settings at '{}', using defaults", settings_file);
        Ok(Settings::default())
    }
}

async fn build_client(settings_file: &str) -> Result<ApiClient> {
    let settings = Settings::load(settings_file)?;
    client_from_settings(&settings).await
}

async fn client_from_settings(settings: &Settings) -> Result<ApiClient> {
    let transport = Arc::new(HttpTransport::from_settings(settings)?);
    let credential = settings.credential()?;

    let endpoint = match (&settings.endpoint, &settings.site) {
        (Some(endpoint), _) => Url::parse(endpoint)
            .with_context(|| format!("Invalid endpoint in settings: {}", endpoint))?,
        (None, Some(site)) => {
            info!("Discovering XML-RPC endpoint for {}...", site);
            ApiClient::resolve_endpoint(site, transport.clone(), transport.clone())
                .await?
                .endpoint
        }
        (None, None) => {
            return Err(anyhow::anyhow!(
                "settings need either an endpoint or a site"
            ))
        }
    };
    debug!("Using endpoint {}", endpoint);

    Ok(ApiClient::new(endpoint, credential, transport))
}

async fn upload_attachment(
    client: &ApiClient,
    image: Option<String>,
    gallery: Vec<String>,
    video: Option<String>,
) -> Result<Option<Attachment>> {
    if let Some(path) = image {
        return Ok(Some(Attachment::Image(upload(client, &path).await?)));
    }
    if !gallery.is_empty() {
        let mut images = Vec::with_capacity(gallery.len());
        for path in &gallery {
            images.push(upload(client, path).await?);
        }
        return Ok(Some(Attachment::Gallery(images)));
    }
    if let Some(path) = video {
        return Ok(Some(Attachment::Video(upload(client, &path).await?)));
    }
    Ok(None)
}

async fn upload(client: &ApiClient, path: &str) -> Result<MediaItem> {
    let upload = MediaUpload::from_path(Path::new(path))?;
    info!("Uploading {}...", upload.name);
    let item = client
        .upload_media(&upload)
        .await
        .with_context(|| format!("Failed to upload {}", path))?;
    debug!("Uploaded {} as media {}", path, item.id);
    Ok(item)
}
