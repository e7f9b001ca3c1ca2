//! Code point subset resolution.

use std::{collections::BTreeSet, ops::RangeInclusive};

use crate::config::{Configuration, SubsetCategory};

const LOWER_CASE: &[RangeInclusive<u32>] = &[0x61..=0x7A];
const UPPER_CASE: &[RangeInclusive<u32>] = &[0x41..=0x5A];
const DIGITS: &[RangeInclusive<u32>] = &[0x30..=0x39];
const PUNCTUATION: &[RangeInclusive<u32>] =
    &[0x21..=0x2F, 0x3A..=0x40, 0x5B..=0x60, 0x7B..=0x7E, 0xA1..=0xBF];

impl SubsetCategory {
    /// Fixed code point ranges of the category; empty for [`SubsetCategory::Custom`].
    pub fn ranges(self) -> &'static [RangeInclusive<u32>] {
        match self {
            Self::LowerCase => LOWER_CASE,
            Self::UpperCase => UPPER_CASE,
            Self::Digits => DIGITS,
            Self::Punctuation => PUNCTUATION,
            Self::Custom => &[],
        }
    }
}

/// Code points an output font is restricted to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CodePointSubset {
    /// Keep every glyph of the source font.
    #[default]
    Unrestricted,
    Restricted(BTreeSet<char>),
}

impl CodePointSubset {
    /// Resolve the selected categories into a set of code points.
    ///
    /// No categories means no restriction. Otherwise the set always holds
    /// U+0020, and `custom_text` contributes only when `Custom` is selected.
    pub fn resolve<'a>(
        categories: impl IntoIterator<Item = &'a SubsetCategory>,
        custom_text: &str,
    ) -> Self {
        let mut categories = categories.into_iter().peekable();
        if categories.peek().is_none() {
            return Self::Unrestricted;
        }

        let mut set = BTreeSet::from([' ']);
        for category in categories {
            if *category == SubsetCategory::Custom {
                set.extend(custom_text.chars());
                continue;
            }
            for range in category.ranges() {
                set.extend(range.clone().filter_map(char::from_u32));
            }
        }
        Self::Restricted(set)
    }

    pub fn from_config(config: &Configuration) -> Self {
        Self::resolve(&config.subsets, &config.custom_subset)
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    /// Whether `ch` survives subsetting.
    pub fn contains(&self, ch: char) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Restricted(set) => set.contains(&ch),
        }
    }

    /// The restricted set, or `None` when unrestricted.
    pub fn codepoints(&self) -> Option<&BTreeSet<char>> {
        match self {
            Self::Unrestricted => None,
            Self::Restricted(set) => Some(set),
        }
    }
}
