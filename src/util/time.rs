use std::time::{SystemTime, UNIX_EPOCH};

/// Get the current unix timestamp in microseconds.
/// A clock set before the epoch yields 0.
pub fn time_now_us() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|since_the_epoch| since_the_epoch.as_micros())
        .unwrap_or(0)
}

/// Calculate the time between two points.
/// pre_timestamp and post_timestamp are unix timestamps in (u) microseconds
/// a float value is returned represented as milliseconds
pub fn calc_elapsed_ms(pre_timestamp: u128, post_timestamp: u128) -> f64 {
    match (post_timestamp < pre_timestamp) || (pre_timestamp < 1000) || (post_timestamp < 1000) {
        // clock went backwards or is unusable
        true => -1.0,
        false => {
            let us = post_timestamp - pre_timestamp;
            us as f64 / 1000.0
        }
    }
}
