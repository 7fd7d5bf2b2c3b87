pub(crate) mod blur;
pub(crate) mod composite;
pub(crate) mod ken_burns;
pub(crate) mod raster;
pub(crate) mod transitions;
