// SPDX-License-Identifier: MIT

pub mod client;
pub mod config;
pub mod pipeline;
pub mod registry;
pub mod server;
pub mod store;
pub mod tools;
