//! Output formats understood by the muxer.
//!
//! Each format turns a [`MuxOptions`] and an output directory into the exact
//! ffmpeg argument list. Everything else about running ffmpeg is shared and
//! lives in [`crate::muxer`].

pub mod dash;
pub mod hls;

pub use dash::{Dash, DashSegmentType};
pub use hls::{Hls, HlsSegmentType};

use crate::error::MuxResult;
use crate::options::MuxOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Tokens shared by every format: video arrives on stdin, codecs are copied
/// untouched and audio is dropped.
pub(crate) const PIPE_INPUT: [&str; 2] = ["-i", "pipe:0"];
pub(crate) const COPY_CODEC: [&str; 2] = ["-codec", "copy"];
pub(crate) const NO_AUDIO: &str = "-an";

pub trait Format: Send + Sync + 'static {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// File name of the manifest written into the output directory.
    fn manifest_name(&self) -> &'static str;

    /// Reject option sets ffmpeg cannot be configured with.
    fn validate(&self, options: &MuxOptions) -> MuxResult<()>;

    /// Build the ffmpeg argument list.
    ///
    /// The result depends on nothing but the inputs, so the same options
    /// always produce the same arguments in the same order.
    fn build_args(&self, directory: &Path, options: &MuxOptions) -> MuxResult<Vec<String>>;

    fn manifest_path(&self, directory: &Path) -> PathBuf {
        directory.join(self.manifest_name())
    }
}

/// Runtime selection between the supported formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamFormat {
    #[serde(alias = "mpegdash", alias = "mpeg-dash")]
    Dash,
    #[default]
    Hls,
}

impl StreamFormat {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dash => "dash",
            Self::Hls => "hls",
        }
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn push_value(args: &mut Vec<String>, flag: &str, value: u32) {
    args.push(flag.to_string());
    args.push(value.to_string());
}

pub(crate) fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_path_without_directory() {
        assert_eq!(Dash.manifest_path(Path::new("")), PathBuf::from("livestream.mpd"));
        assert_eq!(
            Hls.manifest_path(Path::new("camera")),
            PathBuf::from("camera").join("livestream.m3u8")
        );
    }
}
