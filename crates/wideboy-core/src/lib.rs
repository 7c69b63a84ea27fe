#![cfg_attr(not(test), no_std)]

//! Tile compositor and frame loop for a small RGB LED matrix.
//!
//! Boot resolves the panel orientation once, builds a grid of tiles over the
//! display surface, and hands the composition to [`app::FrameLoop`], which
//! rewrites the tile labels from a frame counter for as long as the board
//! has power.

extern crate alloc;

pub mod app;
pub mod boot;
pub mod config;
pub mod display;
pub mod layout;
pub mod network;
pub mod orientation;
pub mod scene;
pub mod tile;

pub use matrix_panel::{ColorOrder, PanelConfig, Rotation};
