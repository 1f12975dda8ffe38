//! Credit card type table
//!
//! Each entry lists the accepted digit counts, the issuer prefixes and whether
//! the Luhn checksum applies. An empty prefix list accepts any issuer.

/// One row of the card table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardType {
    pub name: &'static str,
    pub lengths: &'static [usize],
    pub prefixes: &'static [&'static str],
    pub luhn: bool,
}

impl CardType {
    /// Check a digits-only card number against this type
    pub fn accepts(&self, digits: &str) -> bool {
        self.lengths.contains(&digits.len())
            && (self.prefixes.is_empty() || self.prefixes.iter().any(|p| digits.starts_with(p)))
            && (!self.luhn || luhn_valid(digits))
    }
}

pub const CARDS: &[CardType] = &[
    CardType {
        name: "default",
        lengths: &[13, 14, 15, 16, 17, 18, 19],
        prefixes: &[],
        luhn: true,
    },
    CardType {
        name: "american express",
        lengths: &[15],
        prefixes: &["34", "37"],
        luhn: true,
    },
    CardType {
        name: "diners club",
        lengths: &[14, 16],
        prefixes: &["36", "55", "300", "301", "302", "303", "304", "305"],
        luhn: true,
    },
    CardType {
        name: "discover",
        lengths: &[16],
        prefixes: &["65", "6011"],
        luhn: true,
    },
    CardType {
        name: "jcb",
        lengths: &[15, 16],
        prefixes: &["3", "1800", "2131"],
        luhn: true,
    },
    CardType {
        name: "maestro",
        lengths: &[16, 18],
        prefixes: &["5020", "5038", "6304", "6759"],
        luhn: true,
    },
    CardType {
        name: "mastercard",
        lengths: &[16],
        prefixes: &["51", "52", "53", "54", "55"],
        luhn: true,
    },
    CardType {
        name: "visa",
        lengths: &[13, 16],
        prefixes: &["4"],
        luhn: true,
    },
];

/// Look up a card type by case-insensitive name
pub fn lookup(name: &str) -> Option<&'static CardType> {
    let name = name.trim().to_lowercase();
    CARDS.iter().find(|card| card.name == name)
}

/// Luhn (mod 10) checksum over a digits-only string
pub fn luhn_valid(digits: &str) -> bool {
    let mut sum = 0u32;
    for (i, c) in digits.chars().rev().enumerate() {
        let Some(d) = c.to_digit(10) else {
            return false;
        };
        sum += match (i % 2 == 1, d * 2) {
            (true, doubled) if doubled > 9 => doubled - 9,
            (true, doubled) => doubled,
            (false, _) => d,
        };
    }
    sum % 10 == 0
}
