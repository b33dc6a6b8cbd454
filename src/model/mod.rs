//! Document model types.
//!
//! This module defines the intermediate representation shared by the
//! analysis stages and the renderers. A [`DocumentModel`] is an ordered
//! sequence of [`Block`]s plus an optional title and the assigned [`Genre`].

mod block;
mod document;

pub use block::{Block, BlockKind, Role};
pub use document::{DocumentModel, Genre};
