pub mod common;
pub mod dataset;
pub mod domain;
pub mod modules;
pub mod numerics;
pub mod plot;
pub mod simdir;
