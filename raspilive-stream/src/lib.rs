// raspilive-stream - camera pipeline and file serving for raspilive
//
// Architecture:
// - camera      - Camera sources (raspivid)
// - pipeline    - Camera -> muxer orchestration
// - file_server - Static file server over the output directory
// - serve       - Pipeline and file server run side by side
// - config, logging - Application plumbing

pub mod camera;
pub mod config;
pub mod error;
pub mod file_server;
pub mod logging;
pub mod pipeline;
pub mod serve;

pub use camera::{Raspivid, RaspividOptions, VideoSource};
pub use config::Config;
pub use error::{StreamError, StreamResult};
pub use file_server::FileServer;
pub use pipeline::stream_video;
pub use serve::serve;
