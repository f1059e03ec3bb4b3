//! vision_core: hand detector, video source and media classification interfaces.

pub mod interfaces;
pub mod media;
#[cfg(feature = "video-opencv")]
pub mod video;

pub use interfaces::{
    Frame, FrameSequence, HandDetector, NoVideoBackend, VideoError, VideoOpener, VideoSource,
};
pub use media::{MediaKind, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};

/// Video opener for this build: OpenCV when `video-opencv` is enabled, otherwise one
/// that rejects every file so videos are skipped with a warning.
pub fn default_video_opener() -> Box<dyn VideoOpener> {
    #[cfg(feature = "video-opencv")]
    {
        Box::new(video::OpenCvVideoOpener)
    }
    #[cfg(not(feature = "video-opencv"))]
    {
        Box::new(NoVideoBackend)
    }
}

pub mod prelude {
    pub use crate::interfaces::*;
    pub use crate::media::MediaKind;
}
