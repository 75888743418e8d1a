//! Entity-Component-System implementation
//!
//! A small ECS carrying the collision data: generational entity handles,
//! type-erased component storage, and the systems that run the per-tick
//! collision pass.

pub mod world;
pub mod entity;
pub mod component;
pub mod system;
mod storage;
pub mod components;
pub mod systems;

pub use world::World;
pub use entity::Entity;
pub use component::Component;
pub use system::System;

#[cfg(test)]
mod tests;
