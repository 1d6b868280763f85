//! Link id and token generation.

pub mod random;
pub mod seq;
pub mod token;

use sharegate_core::LinkId;

pub use random::RandomGenerator;
pub use seq::SeqGenerator;
pub use token::generate_token;

/// Trait for generating link ids.
///
/// Implementations are pure generators that don't interact with storage.
/// They are responsible for uniqueness: no collision retry is performed by
/// callers, a duplicate id surfaces as a storage conflict.
pub trait Generator: Send + Sync + 'static {
    fn generate(&self) -> LinkId;
}
