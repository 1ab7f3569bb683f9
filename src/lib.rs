pub mod app;
pub mod capability;
pub mod config;
pub mod control;
pub mod flower;
pub mod raster;
pub mod render;
pub mod settings;
pub mod source;
pub mod terminal;
