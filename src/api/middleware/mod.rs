// Middleware module - CORS and request tracing

pub mod cors;
pub mod observability;

// Re-export for convenience
pub use cors::create_cors_layer;
pub use observability::{create_trace_layer, init_tracing};
