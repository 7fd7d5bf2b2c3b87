pub(crate) mod ffmpeg;
pub(crate) mod format;
pub(crate) mod session;
pub(crate) mod sink;
