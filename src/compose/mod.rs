//! Combinators building new producers out of existing ones.
//!
//! - [`Take`] - bound a producer to a number of samples
//! - [`Loop`] - replay a seekable producer
//! - [`Seq`] - play producers back to back
//! - [`Mix`] - sum a fixed set of producers
//! - [`DupView`] - observe one producer through two independent views
//!
//! Every combinator is itself a [`Producer`](crate::Producer), so they nest
//! to any depth. Pass-through combinators ([`Take`], [`Loop`]) forward the
//! wrapped producer's error; fan-in combinators ([`Seq`], [`Mix`]) treat a
//! failed input as finished and carry on with the rest.

mod dup;
mod looping;
mod mix;
mod seq;
mod take;

pub use dup::{dup, DupView};
pub use looping::{looped, Loop};
pub use mix::{mix, Mix};
pub use seq::{seq, Seq};
pub use take::{take, take_for, Take};
