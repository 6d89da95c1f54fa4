//! The desktop: live editor, console and frame panes wired by messages.
//!
//! A [`Desktop`] is built from a deck of window declarations. It owns every
//! window, drives their lifecycle (`activate`, `stabilise`, `cleanup`) and
//! delivers the messages they send each other. Everything the windows draw
//! on comes from a host-supplied [`platform::Platform`].

mod console;
mod desktop;
mod editor;
mod frame;
mod scheduler;
mod window;

pub mod format;
pub mod metrics;
pub mod platform;
pub mod testing;

pub use desktop::{Desktop, Diagnostic};
pub use scheduler::{Posted, Scheduler};
pub use window::InputEvent;
