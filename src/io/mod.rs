pub mod compression;
pub mod glob;
pub mod lines;

#[cfg_attr(docsrs, doc(cfg(feature = "io-csv")))]
#[cfg(feature = "io-csv")]
pub mod stats;
