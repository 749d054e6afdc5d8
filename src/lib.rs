#[cfg(feature = "render")]
pub mod canvas;
#[cfg(feature = "render")]
pub mod font;
pub mod icon_gen;
