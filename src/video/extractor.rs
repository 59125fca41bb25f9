use super::types::VideoId;
use crate::error::InvalidUrlError;
use tracing::trace;
use url::Url;

const SHORT_LINK_HOST: &str = "youtu.be";
const KNOWN_HOSTS: &[&str] = &["youtube.com", "youtube-nocookie.com", SHORT_LINK_HOST];

/// Path prefixes that are directly followed by the id, e.g. `/embed/<id>`.
const ID_PATH_PREFIXES: &[&str] = &["embed", "v", "e", "shorts", "live"];

/// Extracts the canonical video id from anything a user might paste.
pub fn extract(raw_input: &str) -> Result<VideoId, InvalidUrlError> {
    let input = raw_input.trim();
    if input.is_empty() {
        return Err(InvalidUrlError::new(raw_input, "input is empty"));
    }

    if VideoId::is_valid(input) {
        return Ok(VideoId::new_unchecked(input));
    }

    // People tend to paste `youtube.com/watch?v=...` without a scheme
    let url = if input.contains("://") {
        Url::parse(input)
    } else {
        Url::parse(&format!("https://{input}"))
    }
    .map_err(|_| InvalidUrlError::new(raw_input, "not a valid URL"))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(InvalidUrlError::new(raw_input, "unsupported URL scheme"));
    }

    let host = url
        .host_str()
        .ok_or_else(|| InvalidUrlError::new(raw_input, "URL has no host"))?;
    let known_host = KNOWN_HOSTS
        .iter()
        .find(|known| host == **known || host.ends_with(&format!(".{known}")))
        .ok_or_else(|| InvalidUrlError::new(raw_input, "not a YouTube URL"))?;

    let candidate = if *known_host == SHORT_LINK_HOST {
        first_path_segment(&url)
    } else {
        watch_param(&url).or_else(|| prefixed_path_id(&url))
    };
    trace!(?candidate, input, "Video id candidate");

    match candidate {
        Some(id) if VideoId::is_valid(&id) => Ok(VideoId::new_unchecked(&id)),
        Some(_) => Err(InvalidUrlError::new(raw_input, "malformed video id")),
        None => Err(InvalidUrlError::new(raw_input, "no video id found")),
    }
}

fn watch_param(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
}

fn first_path_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

fn prefixed_path_id(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?;
    let prefix = segments.next()?;
    if !ID_PATH_PREFIXES.contains(&prefix) {
        return None;
    }

    segments
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    fn extracted(input: &str) -> Option<String> {
        extract(input).ok().map(|id| id.to_string())
    }

    #[test]
    fn test_watch_urls() {
        assert_eq!(
            extracted("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some(ID)
        );
        assert_eq!(
            extracted("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s&list=PL123").as_deref(),
            Some(ID)
        );
        assert_eq!(
            extracted("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ").as_deref(),
            Some(ID)
        );
        assert_eq!(
            extracted("http://m.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some(ID)
        );
        assert_eq!(
            extracted("https://music.youtube.com/watch?v=dQw4w9WgXcQ&si=abc").as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn test_short_links() {
        assert_eq!(extracted("https://youtu.be/dQw4w9WgXcQ").as_deref(), Some(ID));
        assert_eq!(
            extracted("https://youtu.be/dQw4w9WgXcQ?si=xyz&t=10").as_deref(),
            Some(ID)
        );
        assert_eq!(extracted("youtu.be/dQw4w9WgXcQ").as_deref(), Some(ID));
    }

    #[test]
    fn test_path_forms() {
        assert_eq!(
            extracted("https://www.youtube.com/embed/dQw4w9WgXcQ").as_deref(),
            Some(ID)
        );
        assert_eq!(
            extracted("https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ?autoplay=1").as_deref(),
            Some(ID)
        );
        assert_eq!(
            extracted("https://www.youtube.com/v/dQw4w9WgXcQ").as_deref(),
            Some(ID)
        );
        assert_eq!(
            extracted("https://www.youtube.com/shorts/dQw4w9WgXcQ").as_deref(),
            Some(ID)
        );
        assert_eq!(
            extracted("https://www.youtube.com/live/dQw4w9WgXcQ?feature=share").as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn test_bare_and_schemeless() {
        assert_eq!(extracted(ID).as_deref(), Some(ID));
        assert_eq!(extracted("  dQw4w9WgXcQ\n").as_deref(), Some(ID));
        assert_eq!(
            extracted("youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn test_rejects_garbage() {
        for input in [
            "",
            "   ",
            "not a url",
            "https://",
            "https://example.com/watch?v=dQw4w9WgXcQ",
            "https://notyoutube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/",
            "https://www.youtube.com/watch",
            "https://www.youtube.com/watch?v=",
            "https://www.youtube.com/watch?v=tooShort",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ123",
            "https://www.youtube.com/channel/UC38IQsAvIsxxjztdMZQtwHA",
            "https://youtu.be/",
            "ftp://youtube.com/watch?v=dQw4w9WgXcQ",
        ] {
            assert!(extract(input).is_err(), "expected {input:?} to be rejected");
        }
    }

    #[test]
    fn test_error_reasons() {
        assert_eq!(extract("").unwrap_err().reason, "input is empty");
        assert_eq!(extract("not a url").unwrap_err().reason, "not a valid URL");
        assert_eq!(
            extract("https://example.com/x").unwrap_err().reason,
            "not a YouTube URL"
        );
        assert_eq!(
            extract("https://www.youtube.com/watch?v=abc").unwrap_err().reason,
            "malformed video id"
        );
        assert_eq!(
            extract("https://www.youtube.com/feed").unwrap_err().reason,
            "no video id found"
        );
    }

    #[test]
    fn test_extract_is_deterministic() {
        let input = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
        assert_eq!(extract(input), extract(input));
        assert_eq!(extract("garbage"), extract("garbage"));
    }
}
