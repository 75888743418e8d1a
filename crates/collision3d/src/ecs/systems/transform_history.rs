//! Previous-transform bookkeeping
//!
//! Run at the end of each tick, after collision, so the next tick's
//! `distance_traveled` measures only that tick's motion.

use std::convert::Infallible;

use crate::ecs::components::TransformComponent;
use crate::ecs::{System, World};

/// Copies every entity's transform into its previous slot
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformHistorySystem;

impl TransformHistorySystem {
    /// Create the system
    pub fn new() -> Self {
        Self
    }
}

impl System for TransformHistorySystem {
    type Error = Infallible;

    fn run(&mut self, world: &mut World) -> Result<(), Self::Error> {
        let entities: Vec<_> = world.entities().collect();
        for entity in entities {
            if let Some(transform) = world.get_component_mut::<TransformComponent>(entity) {
                transform.store_previous();
            }
        }
        Ok(())
    }
}
