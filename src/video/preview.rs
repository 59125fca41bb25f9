use super::types::VideoId;
use serde::Serialize;

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 390;

/// Everything a front-end needs to embed a player for a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewDescriptor {
    pub video_id: VideoId,
    pub width: u32,
    pub height: u32,
    pub autoplay: bool,
    pub embed_url: String,
}

impl PreviewDescriptor {
    fn new(video_id: &VideoId) -> Self {
        let autoplay = false;
        Self {
            video_id: video_id.clone(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            autoplay,
            embed_url: format!(
                "https://www.youtube.com/embed/{}?autoplay={}",
                video_id,
                u8::from(autoplay)
            ),
        }
    }
}

pub fn resolve(video_id: Option<&VideoId>) -> Option<PreviewDescriptor> {
    video_id.map(PreviewDescriptor::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::extract;

    #[test]
    fn test_resolve_none() {
        assert_eq!(resolve(None), None);
    }

    #[test]
    fn test_resolve_some() {
        let id = extract("https://youtu.be/dQw4w9WgXcQ").unwrap();
        let preview = resolve(Some(&id)).unwrap();

        assert_eq!(preview.video_id, id);
        assert_eq!(preview.width, 640);
        assert_eq!(preview.height, 390);
        assert!(!preview.autoplay);
        assert_eq!(
            preview.embed_url,
            "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=0"
        );
    }

    #[test]
    fn test_preview_json() {
        let id = extract("dQw4w9WgXcQ").unwrap();
        let json = serde_json::to_value(resolve(Some(&id))).unwrap();

        assert_eq!(json["video_id"], "dQw4w9WgXcQ");
        assert_eq!(json["autoplay"], false);
        assert_eq!(json["width"], 640);
    }
}
