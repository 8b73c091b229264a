use super::{path_arg, push_value, Format, COPY_CODEC, NO_AUDIO, PIPE_INPUT};
use crate::error::{MuxError, MuxResult};
use crate::options::MuxOptions;
use std::path::Path;

pub const DASH_MANIFEST: &str = "livestream.mpd";

const INIT_SEGMENT_NAME: &str = "init.$ext$";
const MEDIA_SEGMENT_NAME: &str = "$Time$-$Number$.$ext$";

/// Container used for DASH segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashSegmentType {
    /// Let ffmpeg pick
    Auto,
    Mp4,
    Webm,
}

impl DashSegmentType {
    pub fn parse(value: &str) -> MuxResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "mp4" => Ok(Self::Mp4),
            "webm" => Ok(Self::Webm),
            other => Err(MuxError::InvalidOptions(format!(
                "dash: invalid segment type `{other}` (expected auto, mp4 or webm)"
            ))),
        }
    }

    fn as_arg(self) -> Option<&'static str> {
        match self {
            Self::Auto => None,
            Self::Mp4 => Some("mp4"),
            Self::Webm => Some("webm"),
        }
    }
}

/// MPEG-DASH output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dash;

impl Format for Dash {
    fn name(&self) -> &'static str {
        "dash"
    }

    fn manifest_name(&self) -> &'static str {
        DASH_MANIFEST
    }

    fn validate(&self, options: &MuxOptions) -> MuxResult<()> {
        DashSegmentType::parse(&options.segment_type()).map(|_| ())
    }

    fn build_args(&self, directory: &Path, options: &MuxOptions) -> MuxResult<Vec<String>> {
        let segment_type = DashSegmentType::parse(&options.segment_type())?;

        // Read the input at its native rate; the camera is live
        let mut args = vec!["-re".to_string()];
        args.extend(PIPE_INPUT.iter().map(|s| s.to_string()));
        args.extend(COPY_CODEC.iter().map(|s| s.to_string()));
        args.extend(["-f", "dash", NO_AUDIO].iter().map(|s| s.to_string()));
        args.extend(
            [
                "-init_seg_name",
                INIT_SEGMENT_NAME,
                "-media_seg_name",
                MEDIA_SEGMENT_NAME,
            ]
            .iter()
            .map(|s| s.to_string()),
        );

        if let Some(container) = segment_type.as_arg() {
            args.push("-dash_segment_type".to_string());
            args.push(container.to_string());
        }

        if let Some(fps) = options.fps() {
            push_value(&mut args, "-r", fps);
        }

        if let Some(segment_time) = options.segment_time() {
            push_value(&mut args, "-seg_duration", segment_time);
        }

        if let Some(playlist_size) = options.playlist_size() {
            push_value(&mut args, "-window_size", playlist_size);
        }

        if let Some(storage_size) = options.storage_size() {
            push_value(&mut args, "-extra_window_size", storage_size);
        }

        args.push(path_arg(&self.manifest_path(directory)));

        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mandatory() -> Vec<String> {
        [
            "-re",
            "-i",
            "pipe:0",
            "-codec",
            "copy",
            "-f",
            "dash",
            "-an",
            "-init_seg_name",
            "init.$ext$",
            "-media_seg_name",
            "$Time$-$Number$.$ext$",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn with(mut base: Vec<String>, extra: &[&str]) -> Vec<String> {
        base.extend(extra.iter().map(|s| s.to_string()));
        base
    }

    #[test]
    fn test_empty_options() {
        let args = Dash.build_args(Path::new(""), &MuxOptions::default()).unwrap();
        assert_eq!(args, with(mandatory(), &["livestream.mpd"]));
    }

    #[test]
    fn test_directory() {
        let args = Dash.build_args(Path::new("camera"), &MuxOptions::default()).unwrap();
        assert_eq!(args.last().unwrap(), &path_arg(&Path::new("camera").join("livestream.mpd")));
    }

    #[test]
    fn test_single_options() {
        let cases: Vec<(MuxOptions, &[&str])> = vec![
            (
                MuxOptions { fps: Some(60), ..Default::default() },
                &["-r", "60"],
            ),
            (
                MuxOptions { segment_time: Some(2), ..Default::default() },
                &["-seg_duration", "2"],
            ),
            (
                MuxOptions { playlist_size: Some(50), ..Default::default() },
                &["-window_size", "50"],
            ),
            (
                MuxOptions { storage_size: Some(100), ..Default::default() },
                &["-extra_window_size", "100"],
            ),
            (
                MuxOptions { segment_type: Some("mp4".to_string()), ..Default::default() },
                &["-dash_segment_type", "mp4"],
            ),
            (
                MuxOptions { segment_type: Some("WEBM".to_string()), ..Default::default() },
                &["-dash_segment_type", "webm"],
            ),
            (
                MuxOptions { segment_type: Some("auto".to_string()), ..Default::default() },
                &[],
            ),
        ];

        for (options, flags) in cases {
            let args = Dash.build_args(Path::new(""), &options).unwrap();
            let mut expected = with(mandatory(), flags);
            expected.push("livestream.mpd".to_string());
            assert_eq!(args, expected, "options: {options:?}");
        }
    }

    #[test]
    fn test_all_options_order() {
        let options = MuxOptions {
            fps: Some(30),
            segment_time: Some(5),
            playlist_size: Some(25),
            storage_size: Some(50),
            ..Default::default()
        };

        let args = Dash.build_args(Path::new("mpegdash"), &options).unwrap();
        let manifest = path_arg(&Path::new("mpegdash").join("livestream.mpd"));
        let expected = with(
            mandatory(),
            &[
                "-r",
                "30",
                "-seg_duration",
                "5",
                "-window_size",
                "25",
                "-extra_window_size",
                "50",
                manifest.as_str(),
            ],
        );
        assert_eq!(args, expected);
    }

    #[test]
    fn test_invalid_segment_type() {
        let options = MuxOptions {
            segment_type: Some("mpegts".to_string()),
            ..Default::default()
        };

        let err = Dash.build_args(Path::new(""), &options).unwrap_err();
        assert!(err.is_configuration());
        assert!(Dash.validate(&options).is_err());
    }

    #[test]
    fn test_deterministic() {
        let options = MuxOptions {
            fps: Some(24),
            segment_type: Some("webm".to_string()),
            storage_size: Some(3),
            ..Default::default()
        };

        let first = Dash.build_args(Path::new("out"), &options).unwrap();
        let second = Dash.build_args(Path::new("out"), &options).unwrap();
        assert_eq!(first, second);
    }
}
