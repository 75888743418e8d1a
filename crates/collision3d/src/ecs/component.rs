//! Component trait

/// Marker trait for components
pub trait Component: 'static + Send + Sync {}
