#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use ocula_image as image;

#[doc(inline)]
pub use ocula_imgproc as imgproc;

#[doc(inline)]
pub use ocula_io as io;

#[doc(inline)]
pub use ocula_regions as regions;
