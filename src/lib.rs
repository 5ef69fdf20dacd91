//! `gridkit` is a modular toolkit for slicing, rendering and exporting
//! gridded numeric array data
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-exports of toolkit crates.
#[doc(inline)]
pub use gridkit_array as array;

#[doc(inline)]
pub use gridkit_utils as utils;

#[cfg(feature = "raster")]
#[cfg_attr(docsrs, doc(cfg(feature = "raster")))]
#[doc(inline)]
pub use gridkit_raster as raster;

#[cfg(feature = "vtk")]
#[cfg_attr(docsrs, doc(cfg(feature = "vtk")))]
#[doc(inline)]
pub use gridkit_vtk as vtk;
