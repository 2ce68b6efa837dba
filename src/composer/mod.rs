use log::debug;

mod media;

pub use media::{gallery_fragment, image_fragment, video_fragment};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub id: u64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    Image(MediaItem),
    Gallery(Vec<MediaItem>),
    Video(MediaItem),
}

impl Attachment {
    pub fn fragment(&self) -> String {
        match self {
            Attachment::Image(image) => image_fragment(image),
            Attachment::Gallery(images) => gallery_fragment(images),
            Attachment::Video(video) => video_fragment(video),
        }
    }
}

pub fn compose(attachment: Option<&Attachment>, content: Option<&str>) -> String {
    let body = content.unwrap_or("");
    let attachment = match attachment {
        Some(attachment) => attachment,
        None => return body.to_string(),
    };

    let fragment = attachment.fragment();
    debug!("Composed attachment fragment ({} bytes)", fragment.len());
    if body.is_empty() {
        fragment
    } else {
        format!("{}\n\n{}", fragment, body)
    }
}
