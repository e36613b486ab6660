//! FireNode library — portable smoke alarm logic.
//!
//! A single ESP32 node samples an MQ-2 gas sensor, compares each reading
//! against a fixed threshold and broadcasts a JSON `FIRE_ALERT` datagram on
//! the LAN when it is exceeded, rate limited to one alert per interval.
//!
//! This crate holds everything that does not touch hardware: configuration,
//! timestamps, the alert state machine, the wire protocol and the network
//! bring-up policy. It is `no_std`, allocation free and testable on any host
//! with `cargo test`. The ESP-IDF firmware (`firmware-std`) is a thin
//! consumer that supplies the ADC reading, the clock and a UDP socket.

#![cfg_attr(not(test), no_std)]

pub mod alert;
pub mod board;
pub mod clock;
pub mod config;
pub mod network;
pub mod node;
pub mod protocol;
pub mod sensor;
