use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::shared::constants::{DEFAULT_OBJECT_NAME_LEN, TRANSCRIPT_EXTENSION};

/// Random transcript object name, e.g. `aZ3k9.txt`.
pub fn default_object_name() -> String {
    object_name_from(&mut rand::thread_rng())
}

pub fn object_name_from<R: Rng + ?Sized>(rng: &mut R) -> String {
    let stem: String = rng
        .sample_iter(&Alphanumeric)
        .take(DEFAULT_OBJECT_NAME_LEN)
        .map(char::from)
        .collect();
    format!("{stem}.{TRANSCRIPT_EXTENSION}")
}

/// Whether `name` has the shape produced by [`default_object_name`].
#[cfg(test)]
pub(crate) fn is_default_object_name(name: &str) -> bool {
    match name.strip_suffix(&format!(".{TRANSCRIPT_EXTENSION}")) {
        Some(stem) => {
            stem.len() == DEFAULT_OBJECT_NAME_LEN
                && stem.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;

    #[test]
    fn test_default_name_matches_pattern() {
        for _ in 0..100 {
            let name = default_object_name();
            assert!(is_default_object_name(&name), "unexpected name: {name}");
        }
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let a = object_name_from(&mut StdRng::seed_from_u64(7));
        let b = object_name_from(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[rstest]
    #[case::too_short("abcd.txt")]
    #[case::too_long("abcdef.txt")]
    #[case::wrong_extension("abcde.mp3")]
    #[case::symbol("ab_de.txt")]
    #[case::no_extension("abcde")]
    fn test_rejects_other_shapes(#[case] name: &str) {
        assert!(!is_default_object_name(name));
    }
}
