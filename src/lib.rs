//! amberbars - a terminal music player with a floating spectrum overlay.
//!
//! The overlay is a borderless bar-graph equalizer drawn above the player.
//! It can be dragged around with the mouse and resized from its bottom-right
//! corner; its bars are fed by an FFT element tapped off the playback stream.

pub mod app;
pub mod audio;
pub mod cli;
pub mod config;
pub mod fs;
pub mod overlay;
pub mod plugin;
pub mod ui;
