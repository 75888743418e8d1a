//! System trait

use super::World;

/// System trait for processing entities and components
pub trait System {
    /// Failure that aborts the system's run
    type Error;

    /// Run the system once over the world
    fn run(&mut self, world: &mut World) -> Result<(), Self::Error>;
}
