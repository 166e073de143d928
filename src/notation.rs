//! Dice notation and roll requests
//!
//! Text form: `[sign][count]d[faces]` dice terms and `[sign][integer]` flat
//! modifiers, concatenated without separators (`2d6+1d8+3`). Unknown die
//! sizes and stray characters are skipped.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_TOTAL_DICE;
use crate::dice::DieType;
use crate::error::{DiceError, Result};

/// Roll text as written: signed counts per die type plus a flat modifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRoll {
    pub dice: BTreeMap<DieType, i64>,
    pub modifier: i64,
}

impl ParsedRoll {
    pub fn is_empty(&self) -> bool {
        self.dice.values().all(|&c| c == 0) && self.modifier == 0
    }
}

enum Term {
    Dice { kind: Option<DieType>, count: i64 },
    Flat(i64),
}

/// Parse roll text. Never fails: anything unrecognised is skipped, so an
/// empty or garbage string yields an empty roll.
pub fn parse(text: &str) -> ParsedRoll {
    let bytes = text.as_bytes();
    let mut roll = ParsedRoll::default();
    let mut i = 0;
    while i < bytes.len() {
        match scan_term(bytes, i) {
            Some((term, end)) => {
                match term {
                    Term::Dice {
                        kind: Some(kind),
                        count,
                    } => {
                        let entry = roll.dice.entry(kind).or_insert(0);
                        *entry = entry.saturating_add(count);
                    }
                    Term::Dice { kind: None, .. } => {}
                    Term::Flat(value) => roll.modifier = roll.modifier.saturating_add(value),
                }
                i = end;
            }
            None => i += 1,
        }
    }
    roll
}

/// Dice terms first in ascending face count, modifier last, zero entries
/// dropped and the leading `+` stripped.
pub fn format(roll: &ParsedRoll) -> String {
    let mut out = String::new();
    for (kind, &count) in &roll.dice {
        if count != 0 {
            out.push_str(&format!("{count:+}{kind}"));
        }
    }
    if roll.modifier != 0 {
        out.push_str(&format!("{:+}", roll.modifier));
    }
    match out.strip_prefix('+') {
        Some(rest) => rest.to_string(),
        None => out,
    }
}

/// Canonical spelling of roll text
pub fn normalize(text: &str) -> String {
    format(&parse(text))
}

fn scan_term(bytes: &[u8], start: usize) -> Option<(Term, usize)> {
    let sign_len = usize::from(matches!(bytes.get(start), Some(b'+' | b'-')));
    let negative = bytes.get(start) == Some(&b'-');
    let count_start = start + sign_len;
    let count_end = digits_end(bytes, count_start);

    // Dice term: optional count, then `d` and at least one face digit
    if matches!(bytes.get(count_end), Some(b'd' | b'D')) {
        let faces_start = count_end + 1;
        let faces_end = digits_end(bytes, faces_start);
        if faces_end > faces_start {
            let count = if count_end > count_start {
                signed(negative, parse_digits(&bytes[count_start..count_end]))
            } else if negative {
                -1
            } else {
                1
            };
            let faces = &bytes[faces_start..faces_end];
            let kind = DieType::ALL
                .into_iter()
                .find(|t| t.name().as_bytes()[1..] == *faces);
            return Some((Term::Dice { kind, count }, faces_end));
        }
    }

    // Flat modifier
    if count_end > count_start {
        let value = signed(negative, parse_digits(&bytes[count_start..count_end]));
        return Some((Term::Flat(value), count_end));
    }
    None
}

fn digits_end(bytes: &[u8], from: usize) -> usize {
    let mut end = from;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    end
}

fn parse_digits(digits: &[u8]) -> i64 {
    digits.iter().fold(0i64, |acc, d| {
        acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
    })
}

fn signed(negative: bool, value: i64) -> i64 {
    if negative { -value } else { value }
}

/// Validated roll request: non-negative counts per die type plus modifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawDiceCounts")]
pub struct DiceCounts {
    counts: BTreeMap<DieType, u32>,
    #[serde(default)]
    pub modifier: i64,
}

/// Wire form of [`DiceCounts`]; zero counts are dropped on the way in
#[derive(Deserialize)]
struct RawDiceCounts {
    #[serde(default)]
    counts: BTreeMap<DieType, u32>,
    #[serde(default)]
    modifier: i64,
}

impl From<RawDiceCounts> for DiceCounts {
    fn from(raw: RawDiceCounts) -> Self {
        let mut counts = DiceCounts::new().with_modifier(raw.modifier);
        for (kind, count) in raw.counts {
            counts.set(kind, count);
        }
        counts
    }
}

impl DiceCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, kind: DieType, count: u32) -> Self {
        self.set(kind, count);
        self
    }

    pub fn with_modifier(mut self, modifier: i64) -> Self {
        self.modifier = modifier;
        self
    }

    pub fn get(&self, kind: DieType) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn set(&mut self, kind: DieType, count: u32) {
        if count == 0 {
            self.counts.remove(&kind);
        } else {
            self.counts.insert(kind, count);
        }
    }

    pub fn total(&self) -> u64 {
        self.counts.values().map(|&c| u64::from(c)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Types with a positive count, ascending face count
    pub fn iter(&self) -> impl Iterator<Item = (DieType, u32)> + '_ {
        self.counts.iter().map(|(&k, &c)| (k, c))
    }

    /// Two d8 stand in for an empty request
    pub fn or_default_roll(self) -> Self {
        if self.is_empty() {
            Self::new().with(DieType::D8, 2).with_modifier(self.modifier)
        } else {
            self
        }
    }

    /// Apply `delta` to one type, keeping the total within the dice cap.
    ///
    /// Overflow is taken from the other type holding the most dice, then the
    /// next, and only from `kind` itself once nothing else is left.
    pub fn change_count(&self, kind: DieType, delta: i64) -> DiceCounts {
        let mut next = self.clone();
        let cap = u64::from(MAX_TOTAL_DICE);
        let updated = (i64::from(self.get(kind)) + delta).clamp(0, i64::from(MAX_TOTAL_DICE));
        next.set(kind, updated as u32);

        let mut excess = next.total().saturating_sub(cap);
        while excess > 0 {
            let largest = next
                .iter()
                .filter(|&(k, _)| k != kind)
                .max_by_key(|&(_, c)| c);
            match largest {
                Some((other, count)) => {
                    let cut = excess.min(u64::from(count));
                    next.set(other, count - cut as u32);
                    excess -= cut;
                }
                None => {
                    let own = next.get(kind);
                    next.set(kind, own.saturating_sub(excess as u32));
                    break;
                }
            }
        }
        next
    }

    pub fn to_parsed(&self) -> ParsedRoll {
        ParsedRoll {
            dice: self.iter().map(|(k, c)| (k, i64::from(c))).collect(),
            modifier: self.modifier,
        }
    }

    pub fn to_notation(&self) -> String {
        format(&self.to_parsed())
    }

    pub fn from_notation(text: &str) -> Result<Self> {
        Self::try_from(parse(text))
    }
}

impl TryFrom<ParsedRoll> for DiceCounts {
    type Error = DiceError;

    fn try_from(roll: ParsedRoll) -> Result<Self> {
        let mut counts = DiceCounts::new().with_modifier(roll.modifier);
        for (kind, count) in roll.dice {
            let count = u32::try_from(count).map_err(|_| {
                DiceError::invalid_request(format!("{kind} count {count} out of range"))
            })?;
            counts.set(kind, count);
        }
        Ok(counts)
    }
}

impl fmt::Display for DiceCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_notation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_basic() {
        let roll = parse("2d6+1d8+3");
        assert_eq!(roll.dice.get(&DieType::D6), Some(&2));
        assert_eq!(roll.dice.get(&DieType::D8), Some(&1));
        assert_eq!(roll.modifier, 3);
    }

    #[test]
    fn test_round_trip() {
        assert_eq!(format(&parse("2d6+1d8+3")), "2d6+1d8+3");
        assert_eq!(normalize("1d20"), "1d20");
    }

    #[test]
    fn test_empty_parses_to_empty() {
        assert!(parse("").is_empty());
        assert!(parse("hello").is_empty());
        assert_eq!(format(&parse("")), "");
    }

    #[test]
    fn test_implicit_counts() {
        let roll = parse("d20-d4");
        assert_eq!(roll.dice.get(&DieType::D20), Some(&1));
        assert_eq!(roll.dice.get(&DieType::D4), Some(&-1));
        assert_eq!(roll.modifier, 0);
    }

    #[test]
    fn test_case_insensitive_and_accumulating() {
        let roll = parse("2D6 + 3d6-1");
        assert_eq!(roll.dice.get(&DieType::D6), Some(&5));
        assert_eq!(roll.modifier, -1);
    }

    #[test]
    fn test_unknown_dice_are_skipped() {
        let roll = parse("3d7+2d06+1d100+4");
        assert!(roll.dice.is_empty());
        assert_eq!(roll.modifier, 4);
    }

    #[test]
    fn test_dangling_count_is_modifier() {
        // "5d" has no faces, so the 5 reads as a flat modifier
        let roll = parse("5d+1d4");
        assert_eq!(roll.modifier, 5);
        assert_eq!(roll.dice.get(&DieType::D4), Some(&1));
    }

    #[test]
    fn test_normalize_orders_terms() {
        assert_eq!(normalize("3+1d20+2d6"), "2d6+1d20+3");
        assert_eq!(normalize("-2d6+1d8"), "-2d6+1d8");
        assert_eq!(normalize("1d6-1d6+2"), "2");
    }

    #[test]
    fn test_negative_counts_rejected() {
        let err = DiceCounts::from_notation("-2d6").unwrap_err();
        assert!(matches!(err, DiceError::InvalidRequest { .. }));
        let ok = DiceCounts::from_notation("2d6+1").unwrap();
        assert_eq!(ok.total(), 2);
        assert_eq!(ok.modifier, 1);
    }

    #[test]
    fn test_default_roll() {
        let counts = DiceCounts::new().with_modifier(2).or_default_roll();
        assert_eq!(counts.get(DieType::D8), 2);
        assert_eq!(counts.total(), 2);
        assert_eq!(counts.modifier, 2);

        let kept = DiceCounts::new().with(DieType::D4, 1).or_default_roll();
        assert_eq!(kept.get(DieType::D8), 0);
    }

    #[test]
    fn test_change_count_takes_from_largest_other() {
        let counts = DiceCounts::new()
            .with(DieType::D6, 600)
            .with(DieType::D8, 300)
            .with(DieType::D20, 100);
        let next = counts.change_count(DieType::D20, 5);
        assert_eq!(next.total(), 1000);
        assert_eq!(next.get(DieType::D20), 105);
        assert_eq!(next.get(DieType::D6), 595);
        assert_eq!(next.get(DieType::D8), 300);
    }

    #[test]
    fn test_change_count_spills_across_types() {
        let counts = DiceCounts::new().with(DieType::D6, 3).with(DieType::D4, 997);
        let next = counts.change_count(DieType::D4, 0).change_count(DieType::D6, 500);
        assert_eq!(next.total(), 1000);
        assert_eq!(next.get(DieType::D6), 503);
        assert_eq!(next.get(DieType::D4), 497);
    }

    #[test]
    fn test_change_count_clamps_single_type() {
        let counts = DiceCounts::new().with(DieType::D6, 999);
        let next = counts.change_count(DieType::D6, 50);
        assert_eq!(next.get(DieType::D6), 1000);
        let down = next.change_count(DieType::D6, -2000);
        assert!(down.is_empty());
    }

    #[test]
    fn test_serde_round_trip() {
        let counts = DiceCounts::new().with(DieType::D12, 2).with_modifier(-1);
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"counts":{"d12":2},"modifier":-1}"#);
        let back: DiceCounts = serde_json::from_str(&json).unwrap();
        assert_eq!(back, counts);
    }

    #[test]
    fn test_deserialize_drops_zero_counts() {
        let json = r#"{"counts":{"d4":0,"d20":2},"modifier":0}"#;
        let counts: DiceCounts = serde_json::from_str(json).unwrap();
        assert_eq!(counts.iter().collect::<Vec<_>>(), vec![(DieType::D20, 2)]);
        assert_eq!(counts, DiceCounts::new().with(DieType::D20, 2));

        let bare: DiceCounts = serde_json::from_str(r#"{"counts":{"d6":1}}"#).unwrap();
        assert_eq!(bare, DiceCounts::new().with(DieType::D6, 1));
    }

    fn arb_roll() -> impl Strategy<Value = ParsedRoll> {
        (
            proptest::collection::btree_map(
                proptest::sample::select(DieType::ALL.to_vec()),
                (1i64..200, any::<bool>()).prop_map(|(c, neg)| if neg { -c } else { c }),
                0..6,
            ),
            -50i64..50,
        )
            .prop_map(|(dice, modifier)| ParsedRoll { dice, modifier })
    }

    proptest! {
        #[test]
        fn prop_format_parse_round_trip(roll in arb_roll()) {
            let text = format(&roll);
            prop_assert_eq!(parse(&text), roll);
        }

        #[test]
        fn prop_change_count_respects_cap(
            start in proptest::collection::vec(0u32..=400, 6),
            pick in 0usize..6,
            delta in -500i64..500,
        ) {
            let mut counts = DiceCounts::new();
            for (kind, c) in DieType::ALL.into_iter().zip(start) {
                counts.set(kind, c);
            }
            let next = counts.change_count(DieType::ALL[pick], delta);
            prop_assert!(next.total() <= u64::from(MAX_TOTAL_DICE));
        }
    }
}
