pub mod header_processor;
pub mod virtual_processor;

pub use header_processor::HeaderProcessor;
pub use virtual_processor::VirtualProcessor;
