use super::{path_arg, push_value, Format, COPY_CODEC, NO_AUDIO, PIPE_INPUT};
use crate::error::{MuxError, MuxResult};
use crate::options::MuxOptions;
use std::path::Path;

pub const HLS_MANIFEST: &str = "livestream.m3u8";

/// Segment layout for HLS. Each layout has its own file name pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HlsSegmentType {
    Mpegts,
    Fmp4,
}

impl HlsSegmentType {
    /// Unset and "auto" resolve to MPEG-TS, ffmpeg's own default.
    pub fn parse(value: &str) -> MuxResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "auto" | "mpegts" => Ok(Self::Mpegts),
            "fmp4" => Ok(Self::Fmp4),
            other => Err(MuxError::InvalidOptions(format!(
                "hls: invalid segment type `{other}` (expected auto, mpegts or fmp4)"
            ))),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mpegts => "mpegts",
            Self::Fmp4 => "fmp4",
        }
    }

    /// ffmpeg segment name pattern, expanded by ffmpeg itself.
    #[must_use]
    pub fn filename_pattern(self) -> &'static str {
        match self {
            Self::Mpegts => "raspilive-%03d.ts",
            Self::Fmp4 => "raspilive-%d.m4s",
        }
    }
}

/// HTTP Live Streaming output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hls;

impl Format for Hls {
    fn name(&self) -> &'static str {
        "hls"
    }

    fn manifest_name(&self) -> &'static str {
        HLS_MANIFEST
    }

    fn validate(&self, options: &MuxOptions) -> MuxResult<()> {
        HlsSegmentType::parse(&options.segment_type()).map(|_| ())
    }

    fn build_args(&self, directory: &Path, options: &MuxOptions) -> MuxResult<Vec<String>> {
        let segment_type = HlsSegmentType::parse(&options.segment_type())?;

        let mut args: Vec<String> = PIPE_INPUT.iter().map(|s| s.to_string()).collect();
        args.extend(COPY_CODEC.iter().map(|s| s.to_string()));
        args.extend(["-f", "hls", NO_AUDIO].iter().map(|s| s.to_string()));

        args.push("-hls_segment_type".to_string());
        args.push(segment_type.as_str().to_string());
        args.push("-hls_segment_filename".to_string());
        args.push(path_arg(&directory.join(segment_type.filename_pattern())));

        let mut hls_flags = Vec::new();

        if let Some(fps) = options.fps() {
            push_value(&mut args, "-r", fps);
        }

        if let Some(segment_time) = options.segment_time() {
            push_value(&mut args, "-hls_time", segment_time);
            hls_flags.push("split_by_time");
        }

        if let Some(playlist_size) = options.playlist_size() {
            push_value(&mut args, "-hls_list_size", playlist_size);
        }

        if let Some(storage_size) = options.storage_size() {
            push_value(&mut args, "-hls_delete_threshold", storage_size);
            hls_flags.push("delete_segments");
        }

        if !hls_flags.is_empty() {
            args.push("-hls_flags".to_string());
            args.push(hls_flags.join("+"));
        }

        args.push(path_arg(&self.manifest_path(directory)));

        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected(directory: &str, segment_type: HlsSegmentType, extra: &[&str]) -> Vec<String> {
        let dir = Path::new(directory);
        let mut args: Vec<String> = [
            "-i",
            "pipe:0",
            "-codec",
            "copy",
            "-f",
            "hls",
            "-an",
            "-hls_segment_type",
            segment_type.as_str(),
            "-hls_segment_filename",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(path_arg(&dir.join(segment_type.filename_pattern())));
        args.extend(extra.iter().map(|s| s.to_string()));
        args.push(path_arg(&dir.join("livestream.m3u8")));
        args
    }

    #[test]
    fn test_empty_options() {
        let args = Hls.build_args(Path::new(""), &MuxOptions::default()).unwrap();
        assert_eq!(args, expected("", HlsSegmentType::Mpegts, &[]));
        assert_eq!(args.last().unwrap(), "livestream.m3u8");
        assert_eq!(args[10], "raspilive-%03d.ts");
        assert!(!args.contains(&"-hls_flags".to_string()));
    }

    #[test]
    fn test_fmp4_layout() {
        let options = MuxOptions {
            segment_type: Some("fmp4".to_string()),
            ..Default::default()
        };

        let args = Hls.build_args(Path::new("camera"), &options).unwrap();
        assert_eq!(args, expected("camera", HlsSegmentType::Fmp4, &[]));
    }

    #[test]
    fn test_explicit_mpegts_matches_default() {
        let explicit = MuxOptions {
            segment_type: Some("MPEGTS".to_string()),
            ..Default::default()
        };

        assert_eq!(
            Hls.build_args(Path::new("camera"), &explicit).unwrap(),
            Hls.build_args(Path::new("camera"), &MuxOptions::default()).unwrap()
        );
    }

    #[test]
    fn test_segment_time_splits_by_time() {
        let options = MuxOptions {
            segment_time: Some(4),
            ..Default::default()
        };

        let args = Hls.build_args(Path::new(""), &options).unwrap();
        assert_eq!(
            args,
            expected(
                "",
                HlsSegmentType::Mpegts,
                &["-hls_time", "4", "-hls_flags", "split_by_time"]
            )
        );
    }

    #[test]
    fn test_storage_size_deletes_segments() {
        let options = MuxOptions {
            storage_size: Some(100),
            ..Default::default()
        };

        let args = Hls.build_args(Path::new(""), &options).unwrap();
        assert_eq!(
            args,
            expected(
                "",
                HlsSegmentType::Mpegts,
                &["-hls_delete_threshold", "100", "-hls_flags", "delete_segments"]
            )
        );
    }

    #[test]
    fn test_all_options() {
        let options = MuxOptions {
            fps: Some(30),
            segment_time: Some(5),
            playlist_size: Some(25),
            storage_size: Some(50),
            segment_type: None,
        };

        let args = Hls.build_args(Path::new("hls"), &options).unwrap();
        assert_eq!(
            args,
            expected(
                "hls",
                HlsSegmentType::Mpegts,
                &[
                    "-r",
                    "30",
                    "-hls_time",
                    "5",
                    "-hls_list_size",
                    "25",
                    "-hls_delete_threshold",
                    "50",
                    "-hls_flags",
                    "split_by_time+delete_segments",
                ]
            )
        );
    }

    #[test]
    fn test_invalid_segment_type() {
        let options = MuxOptions {
            segment_type: Some("webm".to_string()),
            ..Default::default()
        };

        let err = Hls.build_args(Path::new(""), &options).unwrap_err();
        assert!(matches!(err, MuxError::InvalidOptions(_)));
    }
}
