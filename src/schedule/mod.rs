pub(crate) mod plan;
pub(crate) mod timelapse;
pub(crate) mod timeline;
