// Library exports for emark

pub mod commands;
pub mod config;
pub mod registry;
pub mod state;
pub mod surface;
pub mod text_surface;
pub mod workbench;
