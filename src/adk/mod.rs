// SPDX-License-Identifier: MIT

//! Shared error types and the `Tool` trait

pub mod error;
pub mod tool;
