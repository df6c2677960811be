//! `procurebot-navigation`: the boundary to the remote desktop client.
//!
//! This crate provides:
//! - [`NavigationClient`]: the scripting bridge capability (element lookup by
//!   hierarchical address, text/focus/caret/key operations, dialogs, trees)
//! - [`ImageLocator`]: the screen-template fallback for controls without a
//!   stable scripting address
//! - [`ContainerResolver`] / [`NavigationAddress`]: addresses whose top-level
//!   container name is assigned at runtime
//! - [`FieldWriter`]: the write-then-validate sequence every field edit needs
//! - [`InMemorySession`]: a scripted session for tests and dry runs

pub mod address;
pub mod client;
pub mod image;
pub mod in_memory;
pub mod writer;

pub use address::{ContainerResolver, NavigationAddress, DEFAULT_CONTAINER_MARKER, USER_AREA};
pub use client::{
    BridgeError, BridgeResult, ElementRef, NavigationClient, SessionStatus, TreeNode, VKey,
};
pub use image::{ImageLocator, LocatorSettings, MatchError, ScreenMatcher, ScreenPoint};
pub use in_memory::{Action, InMemorySession, ScreenState};
pub use writer::FieldWriter;
