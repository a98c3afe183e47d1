//! Glyph fallback rules.
//!
//! Resolution walks an ordered list of [`FallbackRule`]s and returns the first
//! candidate face that has a glyph for the character. The list is plain data so
//! the order can be inspected, replaced and tested apart from the lookup.

use crate::face::{FallbackSet, FontId};

/// Which codepoints a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodepointFilter {
    Any,
    /// Every codepoint except this one.
    Except(char),
    /// Inclusive range.
    Range(u32, u32),
    /// Codepoints `>=` the bound.
    AtLeast(u32),
    /// Codepoints `>` the bound.
    Above(u32),
    OneOf(Vec<char>),
    /// Unicode variation selectors.
    VariationSelector,
}

impl CodepointFilter {
    pub fn matches(&self, ch: char) -> bool {
        let cp = ch as u32;
        match self {
            CodepointFilter::Any => true,
            CodepointFilter::Except(c) => ch != *c,
            CodepointFilter::Range(lo, hi) => (*lo..=*hi).contains(&cp),
            CodepointFilter::AtLeast(lo) => cp >= *lo,
            CodepointFilter::Above(lo) => cp > *lo,
            CodepointFilter::OneOf(chars) => chars.contains(&ch),
            CodepointFilter::VariationSelector => is_variation_selector(ch),
        }
    }
}

/// Face a rule tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackTarget {
    /// Stop resolving and report the base font with glyph 0.
    Suppress,
    /// The base font itself.
    Base,
    /// A fallback set, at the base font's size class.
    Set(FallbackSet),
    /// A specific face.
    Face(FontId),
}

/// One step of the fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackRule {
    pub filter: CodepointFilter,
    pub target: FallbackTarget,
    /// Return the candidate even when it has no glyph.
    pub forced: bool,
    /// Only applies when resolving against this base font.
    pub only_for_base: Option<FontId>,
}

impl FallbackRule {
    pub fn new(filter: CodepointFilter, target: FallbackTarget) -> Self {
        Self {
            filter,
            target,
            forced: false,
            only_for_base: None,
        }
    }

    pub fn forced(mut self) -> Self {
        self.forced = true;
        self
    }

    pub fn for_base(mut self, base: FontId) -> Self {
        self.only_for_base = Some(base);
        self
    }

    pub fn applies(&self, base: FontId, ch: char) -> bool {
        self.only_for_base.is_none_or(|only| only == base) && self.filter.matches(ch)
    }
}

/// Result of resolving one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolved {
    pub font: FontId,
    /// Glyph index in `font`; 0 means no face had the glyph.
    pub index: u16,
}

/// The standard fallback order.
///
/// `apple` adds the rule that draws the command and shift keycaps from the
/// default content face, where the platform's own fonts expect them.
pub fn default_rules(apple: bool) -> Vec<FallbackRule> {
    use CodepointFilter as F;
    use FallbackTarget as T;

    let mut rules = vec![
        FallbackRule::new(F::VariationSelector, T::Suppress),
        FallbackRule::new(F::Except(' '), T::Set(FallbackSet::SmolEmoji)),
        FallbackRule::new(F::Range(0x2190, 0x2193), T::Set(FallbackSet::Iosevka)).forced(),
        FallbackRule::new(F::Any, T::Base),
        FallbackRule::new(F::Any, T::Set(FallbackSet::NotoEmoji)),
        FallbackRule::new(F::Any, T::Set(FallbackSet::NotoSymbols2)),
        FallbackRule::new(F::Any, T::Set(FallbackSet::NotoSymbols)),
        FallbackRule::new(F::AtLeast(0x2E80), T::Set(FallbackSet::SimplifiedChinese)),
        FallbackRule::new(F::AtLeast(0x3000), T::Set(FallbackSet::Korean)),
        FallbackRule::new(F::Above(0x3040), T::Set(FallbackSet::Japanese)),
        FallbackRule::new(F::AtLeast(0x0600), T::Set(FallbackSet::Arabic)),
    ];
    if apple {
        rules.push(
            FallbackRule::new(F::OneOf(vec!['\u{2318}', '\u{21E7}']), T::Face(FontId::DEFAULT_CONTENT))
                .for_base(FontId::REGULAR)
                .forced(),
        );
    }
    rules.push(FallbackRule::new(F::Any, T::Set(FallbackSet::UserSymbols)));
    rules.push(FallbackRule::new(F::Any, T::Set(FallbackSet::Iosevka)));
    rules
}

pub fn is_variation_selector(ch: char) -> bool {
    matches!(ch as u32, 0xFE00..=0xFE0F | 0xE0100..=0xE01EF)
}

/// Emoji skin tone modifiers.
pub fn is_fitzpatrick_modifier(ch: char) -> bool {
    matches!(ch as u32, 0x1F3FB..=0x1F3FF)
}

/// Codepoints with the Default_Ignorable_Code_Point property.
pub fn is_default_ignorable(ch: char) -> bool {
    matches!(
        ch as u32,
        0x00AD
            | 0x034F
            | 0x061C
            | 0x115F..=0x1160
            | 0x17B4..=0x17B5
            | 0x180B..=0x180F
            | 0x200B..=0x200F
            | 0x202A..=0x202E
            | 0x2060..=0x206F
            | 0x3164
            | 0xFE00..=0xFE0F
            | 0xFEFF
            | 0xFFA0
            | 0xFFF0..=0xFFF8
            | 0x1BCA0..=0x1BCA3
            | 0x1D173..=0x1D17A
            | 0xE0000..=0xE0FFF
    )
}

/// Characters that never start a run and never draw a glyph.
pub fn is_ignorable(ch: char) -> bool {
    is_variation_selector(ch) || is_default_ignorable(ch) || is_fitzpatrick_modifier(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters() {
        assert!(CodepointFilter::Except(' ').matches('a'));
        assert!(!CodepointFilter::Except(' ').matches(' '));
        assert!(CodepointFilter::Range(0x2190, 0x2193).matches('\u{2192}'));
        assert!(!CodepointFilter::Range(0x2190, 0x2193).matches('\u{2194}'));
        assert!(CodepointFilter::AtLeast(0x3000).matches('\u{3000}'));
        assert!(!CodepointFilter::Above(0x3040).matches('\u{3040}'));
        assert!(CodepointFilter::VariationSelector.matches('\u{FE0F}'));
    }

    #[test]
    fn test_default_order() {
        let rules = default_rules(false);
        assert_eq!(rules[0].target, FallbackTarget::Suppress);
        assert_eq!(rules[1].target, FallbackTarget::Set(FallbackSet::SmolEmoji));
        assert!(rules[2].forced);
        assert_eq!(rules[3].target, FallbackTarget::Base);
        assert_eq!(
            rules.last().map(|r| r.target),
            Some(FallbackTarget::Set(FallbackSet::Iosevka))
        );
        assert_eq!(default_rules(true).len(), rules.len() + 1);
    }

    #[test]
    fn test_base_restriction() {
        let rule = FallbackRule::new(CodepointFilter::Any, FallbackTarget::Base).for_base(FontId::REGULAR);
        assert!(rule.applies(FontId::REGULAR, 'x'));
        assert!(!rule.applies(FontId::BOLD, 'x'));
    }

    #[test]
    fn test_ignorables() {
        assert!(is_ignorable('\u{FE0F}'));
        assert!(is_ignorable('\u{200D}'));
        assert!(is_ignorable('\u{1F3FD}'));
        assert!(!is_ignorable('a'));
    }
}
