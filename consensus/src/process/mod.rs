pub mod mining;
pub mod past_median_time;
pub mod sync;

#[cfg(test)]
mod integration_test;
