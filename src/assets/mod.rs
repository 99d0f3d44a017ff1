pub(crate) mod decode;
pub(crate) mod gear;
pub(crate) mod svg_raster;
