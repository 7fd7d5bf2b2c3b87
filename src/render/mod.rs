pub(crate) mod draw;
pub(crate) mod frame;
pub(crate) mod overlay;
pub(crate) mod painter;
