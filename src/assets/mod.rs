pub(crate) mod cache;
pub(crate) mod color;
pub(crate) mod decode;
pub(crate) mod loader;
pub(crate) mod media;
pub(crate) mod svg_raster;
pub(crate) mod text;
