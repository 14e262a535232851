/// Storefront Query - shopping query understanding and product search
///
/// Core library turning free-text shopping queries into structured filters
/// and fanning them out into merged searches against a product index.

pub mod config;
pub mod core;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
