//! # Events Module
//!
//! Progress reporting decoupled from presentation.
//!
//! Pipelines emit [`Event`]s through an [`EventSender`]; whoever holds the
//! matching [`EventReceiver`] (the CLI progress bars, a test) renders or
//! inspects them. Sending never fails and never blocks on an unbounded
//! channel, so a run without a listener behaves exactly like one with.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Hash(HashEvent::Progress(p)) = event {
//!             println!("hashed {}/{}", p.completed, p.total);
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
