use html_escape::encode_double_quoted_attribute;

use super::MediaItem;

pub fn image_fragment(image: &MediaItem) -> String {
    let url = encode_double_quoted_attribute(&image.url);
    format!(
        "<a href=\"{}\"><img class=\"alignnone size-full wp-image-{}\" src=\"{}\" alt=\"\" /></a>",
        url, image.id, url
    )
}

pub fn gallery_fragment(images: &[MediaItem]) -> String {
    let ids = images
        .iter()
        .map(|image| image.id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("[gallery ids=\"{}\"]", ids)
}

pub fn video_fragment(video: &MediaItem) -> String {
    format!(
        "[video src=\"{}\"]",
        encode_double_quoted_attribute(&video.url)
    )
}
