//! Core data types shared by the section store and the scene proxy.
//!
//! - `aabb` holds the bounding volume math (accumulating boxes, world bounds)
//! - `asset` is the external static-mesh contract plus GPU vertex/matrix layouts
//! - `section` is the game-thread state of one mesh section

pub mod aabb;
pub mod asset;
pub mod section;
