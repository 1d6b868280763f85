use crate::Generator;
use rand::rngs::OsRng;
use rand::RngCore;
use sharegate_core::LinkId;

/// Number of random bytes behind a generated link id.
pub const LINK_ID_BYTES: usize = 16;

/// Generates link ids from 128 bits of OS randomness, base58 encoded.
///
/// Ids are unique with overwhelming probability without coordination between
/// nodes, and reveal nothing about creation order or volume.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGenerator;

impl RandomGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator for RandomGenerator {
    fn generate(&self) -> LinkId {
        let mut bytes = [0u8; LINK_ID_BYTES];
        OsRng.fill_bytes(&mut bytes);
        LinkId::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_are_valid_link_ids() {
        let generator = RandomGenerator::new();
        for _ in 0..100 {
            let id = generator.generate();
            assert!(LinkId::parse(id.as_str()).is_ok(), "{id} should parse");
        }
    }

    #[test]
    fn generated_ids_do_not_repeat() {
        let generator = RandomGenerator::new();
        let ids: HashSet<_> = (0..1_000).map(|_| generator.generate()).collect();
        assert_eq!(ids.len(), 1_000);
    }
}
