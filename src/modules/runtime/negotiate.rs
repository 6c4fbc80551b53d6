//! `Accept` header negotiation

use std::cmp::Ordering;

use axum::http::{header, HeaderMap};

struct MediaRange {
    media_type: String,
    quality: f32,
    index: usize,
}

/// Media ranges from an `Accept` header, most preferred first
///
/// Ranges are ordered by q-value and then by their position in the header.
/// Ranges with a q-value that is not positive or does not parse are dropped.
/// A missing header accepts everything (`*/*`); an empty one accepts nothing.
pub fn preferred_media_types(accept: Option<&str>) -> Vec<String> {
    let accept = accept.unwrap_or("*/*");
    let mut ranges: Vec<MediaRange> = accept
        .split(',')
        .enumerate()
        .filter_map(|(index, part)| parse_media_range(part, index))
        .filter(|range| range.quality > 0.0)
        .collect();

    ranges.sort_by(|a, b| {
        b.quality
            .partial_cmp(&a.quality)
            .unwrap_or(Ordering::Equal)
            .then(a.index.cmp(&b.index))
    });
    ranges.into_iter().map(|range| range.media_type).collect()
}

fn parse_media_range(part: &str, index: usize) -> Option<MediaRange> {
    let mut params = part.split(';');
    let media_type = params.next()?.trim().to_ascii_lowercase();
    if !media_type.contains('/') {
        return None;
    }

    let mut quality = 1.0;
    for param in params {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("q") {
            quality = value.trim().parse::<f32>().ok()?;
        }
    }

    Some(MediaRange {
        media_type,
        quality,
        index,
    })
}

/// Whether the client would rather get `text/html` than `application/json`
///
/// Only literal `text/html` and `application/json` ranges are considered, so
/// wildcards such as `*/*` or `text/*` select the API.
pub fn prefers_html(headers: &HeaderMap) -> bool {
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok());

    preferred_media_types(accept)
        .into_iter()
        .find(|range| range == "text/html" || range == "application/json")
        .is_some_and(|range| range == "text/html")
}
