//! Gallery page markup
//!
//! Bare markup only: a container of anchors carrying the URLs and data
//! attributes a client-side lightbox script picks up. Styling and lightbox
//! behavior live in front-end assets, not here.

use super::items::{GalleryItem, GalleryMedia};

/// Page-level values around the item list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext<'a> {
    /// Absolute origin of the relay as seen by the client, e.g. `https://photos.example.com`
    pub base_url: &'a str,
    pub title: &'a str,
    /// Item to open in the lightbox when the page loads (zero-based)
    pub open_item: Option<usize>,
}

/// Render the gallery page for `items`
pub fn render_page(items: &[GalleryItem], ctx: &PageContext<'_>) -> String {
    let title = escape_html(ctx.title);
    let base_url = escape_html(ctx.base_url);
    let open_item = ctx
        .open_item
        .filter(|&n| n < items.len())
        .map_or_else(String::new, |n| format!(" data-open-item=\"{n}\""));

    let og_image = items.first().map_or_else(String::new, |item| {
        format!(
            "\n    <meta property=\"og:image\" content=\"{base_url}{}\">",
            escape_html(&item.thumbnail_url)
        )
    });

    let anchors: String = items.iter().map(render_item).collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <meta property="og:title" content="{title}">{og_image}
</head>
<body>
    <div id="gallery" data-base-url="{base_url}"{open_item}>
{anchors}    </div>
</body>
</html>"#
    )
}

fn render_item(item: &GalleryItem) -> String {
    let thumbnail = escape_html(&item.thumbnail_url);
    match &item.media {
        GalleryMedia::Photo => format!(
            "        <a href=\"{}\"><img src=\"{thumbnail}\" alt=\"\" loading=\"lazy\"></a>\n",
            escape_html(&item.original_url)
        ),
        GalleryMedia::Video { playback } => format!(
            "        <a data-video=\"{}\" data-poster=\"{thumbnail}\"><img src=\"{thumbnail}\" alt=\"\" loading=\"lazy\"></a>\n",
            escape_html(&playback.to_json())
        ),
    }
}

/// Escape text for use in HTML content and double-quoted attributes
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
