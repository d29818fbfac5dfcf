//! Hint labels.
//!
//! Labels are a bijective base-26 numbering over the 0-based discovery index:
//! `A`..`Z` for 0..=25, then `AA`, `AB`, ... There is no zero digit, so every
//! index has exactly one label and every non-empty alphabetic string names
//! exactly one index.

/// Letters in the label alphabet.
const RADIX: usize = 26;

/// Label for a 0-based element index.
pub fn encode(index: usize) -> String {
    let mut out = Vec::new();
    // Widen so `usize::MAX + 1` does not overflow.
    let mut n = index as u128 + 1;
    while n > 0 {
        n -= 1;
        out.push(b'A' + (n % RADIX as u128) as u8);
        n /= RADIX as u128;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

/// Index named by `text`, case-insensitively. `None` for empty input,
/// non-letters, or values that do not fit in `usize`.
pub fn decode(text: &str) -> Option<usize> {
    if text.is_empty() {
        return None;
    }
    let mut value: u128 = 0;
    for c in text.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = u128::from(c.to_ascii_uppercase() as u8 - b'A') + 1;
        value = value.checked_mul(RADIX as u128)?.checked_add(digit)?;
    }
    usize::try_from(value - 1).ok()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn known_labels() {
        for (index, label) in [
            (0, "A"),
            (1, "B"),
            (25, "Z"),
            (26, "AA"),
            (27, "AB"),
            (51, "AZ"),
            (52, "BA"),
            (701, "ZZ"),
            (702, "AAA"),
        ] {
            assert_eq!(encode(index), label);
            assert_eq!(decode(label), Some(index));
        }
    }

    #[test]
    fn decode_is_case_insensitive() {
        assert_eq!(decode("ba"), Some(52));
        assert_eq!(decode("bA"), Some(52));
    }

    #[test]
    fn decode_rejects_non_labels() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("A1"), None);
        assert_eq!(decode("A B"), None);
        assert_eq!(decode("É"), None);
        assert_eq!(decode(&"Z".repeat(40)), None);
        assert_eq!(decode(&"Z".repeat(14)), None);
    }

    #[test]
    fn extremes_roundtrip() {
        assert_eq!(decode(&encode(usize::MAX)), Some(usize::MAX));
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(index in 0usize..1_000_000) {
            prop_assert_eq!(decode(&encode(index)), Some(index));
        }
    }
}
