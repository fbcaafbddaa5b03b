pub mod cancel;
pub mod collector;
pub mod connectors;
pub mod matcher;
pub mod notifier;
pub mod processor;
pub mod registry;
pub mod render;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;


pub use collector::Collector;
pub use notifier::Notifier;
pub use processor::Processor;
pub use registry::Registry;
