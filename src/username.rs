use rand::Rng;

use crate::Result;

const WORDS: &[&str] = &[
    "Creeper", "Ender", "Piglin", "Blaze", "Slime", "Drowned", "Shulker",
    "Allay", "Warden", "Phantom", "Vex", "Strider",
];

/// Produces a player name when the user left the field empty.
#[cfg_attr(test, mockall::automock)]
pub trait UsernameGenerator: Send + Sync {
    fn generate(&self) -> Result<String>;
}

/// Offline fallback: a mob name plus a numeric suffix, e.g. `Warden_4821`.
pub struct RandomUsernameGenerator;

impl UsernameGenerator for RandomUsernameGenerator {
    fn generate(&self) -> Result<String> {
        let mut rng = rand::thread_rng();
        let word = WORDS[rng.gen_range(0..WORDS.len())];
        let suffix: u16 = rng.gen_range(1000..10000);
        Ok(format!("{}_{}", word, suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_name_shape() {
        let generator = RandomUsernameGenerator;
        for _ in 0..32 {
            let name = generator.generate().unwrap();
            assert!(!name.is_empty());
            let (word, suffix) = name.split_once('_').unwrap();
            assert!(WORDS.contains(&word));
            assert!(suffix.parse::<u16>().unwrap() >= 1000);
        }
    }
}
