//! Integration tests for the `ParticleKind` derive.
//!
//! These use the generated impls on enums declared outside the main crate.

use pyro::{FireworkType, ParticleKind};

#[derive(ParticleKind, Clone, Copy, PartialEq, Eq, Debug)]
enum Shell {
    Peony,
    Willow,
    Crossette,
}

#[test]
fn test_kind_into_u32() {
    let peony: u32 = Shell::Peony.into();
    let willow: u32 = Shell::Willow.into();
    let crossette: u32 = Shell::Crossette.into();

    assert_eq!(peony, 0);
    assert_eq!(willow, 1);
    assert_eq!(crossette, 2);
}

#[test]
fn test_kind_from_u32() {
    assert_eq!(Shell::from(0u32), Shell::Peony);
    assert_eq!(Shell::from(1u32), Shell::Willow);
    assert_eq!(Shell::from(2u32), Shell::Crossette);
}

#[test]
fn test_kind_invalid_u32_defaults_to_first() {
    assert_eq!(Shell::from(99u32), Shell::Peony);
}

#[test]
fn test_kind_count_and_all() {
    assert_eq!(Shell::count(), 3);
    assert_eq!(Shell::ALL, [Shell::Peony, Shell::Willow, Shell::Crossette]);
    for (i, kind) in Shell::ALL.into_iter().enumerate() {
        assert_eq!(kind.index(), i);
    }
}

#[test]
fn test_kind_name() {
    assert_eq!(Shell::Crossette.name(), "crossette");
}

#[derive(ParticleKind, Clone, Copy, PartialEq, Debug)]
enum SingleVariant {
    Only,
}

#[test]
fn test_single_variant_kind() {
    assert_eq!(SingleVariant::count(), 1);
    assert_eq!(SingleVariant::from(7u32), SingleVariant::Only);
}

#[test]
fn test_firework_type_is_derived() {
    assert_eq!(FireworkType::count(), 5);
    assert_eq!(FireworkType::ALL[0], FireworkType::Bloom);
    assert_eq!(FireworkType::from(4u32), FireworkType::Sparkler);
    assert_eq!(FireworkType::Scatter.name(), "scatter");
}
