// raspilive-ffmpeg - ffmpeg orchestration for raspilive
//
// Layout:
// - options   - Option set shared by every output format
// - format/   - Argument builders (DASH, HLS)
// - process   - Launcher abstraction over OS processes
// - muxer     - Muxer process lifecycle (mux, wait, exit interpretation)

pub mod error;
pub mod format;
pub mod muxer;
pub mod options;
pub mod process;

pub use error::{MuxError, MuxResult};
pub use format::{Dash, Format, Hls, StreamFormat};
pub use muxer::{Muxer, EARLY_EXIT_CODE, FFMPEG_PROGRAM};
pub use options::MuxOptions;
pub use process::{Invocation, Launcher, Process, ProcessIo, SystemLauncher};
