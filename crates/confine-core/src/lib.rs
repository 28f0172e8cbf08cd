//! # confine-core
//!
//! Sandbox policy primitives for the confine launcher.
//!
//! This crate provides:
//! - **Mount profiles**: fstab-style mount entry lists with a total order,
//!   atomic persistence, and a detachable chain for draining.
//! - **Seccomp**: allow-list profile parsing and compilation into a
//!   default-deny syscall filter.
//! - **Privileges**: a verified effective-uid bracket around filter loading.
//!
//! The real kernel filter backend is behind the `libseccomp` feature.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod mount;
pub mod privilege;
pub mod seccomp;

#[cfg(test)]
mod fakes;
