use serde::{Deserialize, Serialize};

/// Ways ffmpeg may be configured when muxing video.
///
/// Every field is optional. A missing value, or a numeric value of zero,
/// leaves the decision to ffmpeg.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MuxOptions {
    /// Frame rate of the output video
    pub fps: Option<u32>,
    /// Segment container, interpreted per output format ("auto" defers to ffmpeg)
    pub segment_type: Option<String>,
    /// Target segment duration in seconds
    pub segment_time: Option<u32>,
    /// Maximum number of playlist entries
    pub playlist_size: Option<u32>,
    /// Maximum number of unreferenced segments kept on disk before removal
    pub storage_size: Option<u32>,
}

impl MuxOptions {
    #[must_use]
    pub fn fps(&self) -> Option<u32> {
        non_zero(self.fps)
    }

    #[must_use]
    pub fn segment_time(&self) -> Option<u32> {
        non_zero(self.segment_time)
    }

    #[must_use]
    pub fn playlist_size(&self) -> Option<u32> {
        non_zero(self.playlist_size)
    }

    #[must_use]
    pub fn storage_size(&self) -> Option<u32> {
        non_zero(self.storage_size)
    }

    /// Lower-cased segment type with surrounding whitespace removed.
    /// Empty when unset.
    #[must_use]
    pub fn segment_type(&self) -> String {
        self.segment_type
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_default()
    }
}

fn non_zero(value: Option<u32>) -> Option<u32> {
    value.filter(|v| *v != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_unset() {
        let options = MuxOptions {
            fps: Some(0),
            segment_time: Some(0),
            playlist_size: Some(0),
            storage_size: Some(0),
            ..Default::default()
        };

        assert_eq!(options.fps(), None);
        assert_eq!(options.segment_time(), None);
        assert_eq!(options.playlist_size(), None);
        assert_eq!(options.storage_size(), None);
    }

    #[test]
    fn test_segment_type_normalized() {
        let options = MuxOptions {
            segment_type: Some(" WebM ".to_string()),
            ..Default::default()
        };
        assert_eq!(options.segment_type(), "webm");
        assert_eq!(MuxOptions::default().segment_type(), "");
    }
}
