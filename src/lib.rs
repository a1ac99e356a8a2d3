pub mod ai;
pub mod animation;
pub mod camera;
pub mod combat;
pub mod compute;
pub mod config;
pub mod display;
pub mod entities;
pub mod error;
pub mod events;
pub mod geometry;
pub mod hud;
pub mod input;
pub mod level;
pub mod particles;
pub mod physics;
pub mod session;
pub mod store;
