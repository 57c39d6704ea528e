//! Cell codec.
//!
//! A cell is two 32-bit words. The head word carries physics state, the tail
//! word carries visuals. Layout, least-significant bit first:
//!
//! ```text
//! head: | class:3 | modifier:5 | behavior:4 | special:4 | heat:4 | reserved:4 | temperature:8 |
//! tail: | red:8 | green:8 | blue:8 | blur:2 | burn:2 | heat_visual:2 | reserved:2 |
//! ```
//!
//! The modifier field is interpreted per type class: powders read it as
//! `sliding:1 | direction:1 | momentum:3`, static cells as
//! `body_id:4 | eight_connected:1`.

use word_macro::packed_word;

use crate::error::CellError;
use crate::heat_profile::{HeatProfile, profile};

packed_word!(Head: u32 {
  class_bits => (0, 3),
  modifier => (3, 5),
  behavior_bits => (8, 4),
  special => (12, 4),
  heat_index => (16, 4),
  reserved => (20, 4),
  temperature => (24, 8),
});

packed_word!(Tail: u32 {
  red => (0, 8),
  green => (8, 8),
  blue => (16, 8),
  blur => (24, 2),
  burn => (26, 2),
  heat_visual => (28, 2),
  reserved => (30, 2),
});

/// Coarse physical category. Numeric order is weight order.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeClass {
  Air = 0,
  /// Massless transient (flames).
  Effect = 1,
  Gas = 2,
  FloatingPowder = 3,
  Fluid = 4,
  Powder = 5,
  WetPowder = 6,
  Static = 7,
}

impl TypeClass {
  #[inline]
  pub const fn from_bits(bits: u32) -> Self {
    match bits & 0b111 {
      0 => Self::Air,
      1 => Self::Effect,
      2 => Self::Gas,
      3 => Self::FloatingPowder,
      4 => Self::Fluid,
      5 => Self::Powder,
      6 => Self::WetPowder,
      _ => Self::Static,
    }
  }

  #[inline]
  pub const fn weight(self) -> u8 {
    self as u8
  }

  #[inline]
  pub const fn is_powder(self) -> bool {
    matches!(self, Self::FloatingPowder | Self::Powder | Self::WetPowder)
  }

  /// Powders a root or a resting body can push aside.
  #[inline]
  pub const fn is_loose(self) -> bool {
    matches!(self, Self::Powder | Self::WetPowder)
  }

  /// Space a rigid body can fall into.
  #[inline]
  pub const fn is_free(self) -> bool {
    matches!(self, Self::Air | Self::Effect | Self::Gas | Self::Fluid)
  }

  /// Air or a massless effect.
  #[inline]
  pub const fn is_empty(self) -> bool {
    matches!(self, Self::Air | Self::Effect)
  }
}

/// Fine-grained role of a cell, orthogonal to its type class.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Behavior {
  None = 0,
  Soil = 1,
  Grass = 2,
  /// Seed or base of a tree.
  Tree = 3,
  TreeRoot = 4,
  TreeTrunk = 5,
  TreeLeaf = 6,
  Fire = 7,
  FireSource = 8,
  Meteor = 9,
  Liquid = 10,
  Entity = 11,
}

impl Behavior {
  pub const fn from_bits(bits: u32) -> Result<Self, CellError> {
    Ok(match bits & 0xF {
      0 => Self::None,
      1 => Self::Soil,
      2 => Self::Grass,
      3 => Self::Tree,
      4 => Self::TreeRoot,
      5 => Self::TreeTrunk,
      6 => Self::TreeLeaf,
      7 => Self::Fire,
      8 => Self::FireSource,
      9 => Self::Meteor,
      10 => Self::Liquid,
      11 => Self::Entity,
      other => return Err(CellError::ReservedBehavior(other)),
    })
  }

  #[inline]
  pub const fn is_tree(self) -> bool {
    matches!(
      self,
      Self::Tree | Self::TreeRoot | Self::TreeTrunk | Self::TreeLeaf
    )
  }

  #[inline]
  pub const fn is_burning(self) -> bool {
    matches!(self, Self::Fire | Self::FireSource | Self::Meteor)
  }
}

/// Liquid subtype stored in the special field of a liquid cell.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LiquidKind {
  Water = 0,
  Molten = 1,
  Oil = 2,
}

impl LiquidKind {
  pub const fn from_bits(bits: u32) -> Result<Self, CellError> {
    match bits {
      0 => Ok(Self::Water),
      1 => Ok(Self::Molten),
      2 => Ok(Self::Oil),
      other => Err(CellError::UnknownLiquidKind(other)),
    }
  }

  /// Relative density; a denser liquid sinks through a lighter one.
  #[inline]
  pub const fn density(self) -> u8 {
    match self {
      Self::Molten => 3,
      Self::Water => 2,
      Self::Oil => 1,
    }
  }
}

/// Visual-only motion-blur class.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlurClass {
  None = 0,
  Background = 1,
  Foreground = 2,
}

const SLIDING_BIT: u32 = 0b0_0001;
const DIRECTION_BIT: u32 = 0b0_0010;
const MOMENTUM_SHIFT: u32 = 2;
const BODY_ID_MASK: u32 = 0b0_1111;
const NEIGHBORHOOD_BIT: u32 = 0b1_0000;

/// Largest powder momentum.
pub const MAX_MOMENTUM: u32 = 7;

impl Head {
  pub const fn new(class: TypeClass, behavior: Behavior) -> Self {
    Self::ZERO
      .with_class_bits(class as u32)
      .with_behavior_bits(behavior as u32)
  }

  #[inline]
  pub const fn type_class(self) -> TypeClass {
    TypeClass::from_bits(self.class_bits())
  }

  #[inline]
  pub const fn with_type_class(self, class: TypeClass) -> Self {
    self.with_class_bits(class as u32)
  }

  #[inline]
  pub const fn behavior(self) -> Result<Behavior, CellError> {
    Behavior::from_bits(self.behavior_bits())
  }

  #[inline]
  pub const fn with_behavior(self, behavior: Behavior) -> Self {
    self.with_behavior_bits(behavior as u32)
  }

  #[inline]
  pub const fn liquid_kind(self) -> Result<LiquidKind, CellError> {
    LiquidKind::from_bits(self.special())
  }

  #[inline]
  pub fn profile(self) -> &'static HeatProfile {
    profile(self.heat_index())
  }

  #[inline]
  pub const fn temp(self) -> u8 {
    self.temperature() as u8
  }

  #[inline]
  pub const fn with_temp(self, temperature: u8) -> Self {
    self.with_temperature(temperature as u32)
  }

  // Powder view of the modifier field.

  #[inline]
  pub const fn sliding(self) -> bool {
    self.modifier() & SLIDING_BIT != 0
  }

  #[inline]
  pub const fn slides_right(self) -> bool {
    self.modifier() & DIRECTION_BIT != 0
  }

  #[inline]
  pub const fn momentum(self) -> u32 {
    self.modifier() >> MOMENTUM_SHIFT
  }

  /// Replaces the powder slide state; momentum saturates at [`MAX_MOMENTUM`].
  pub const fn with_slide(self, sliding: bool, right: bool, momentum: u32) -> Self {
    let momentum = if momentum > MAX_MOMENTUM {
      MAX_MOMENTUM
    } else {
      momentum
    };
    let mut bits = momentum << MOMENTUM_SHIFT;
    if sliding {
      bits |= SLIDING_BIT;
    }
    if right {
      bits |= DIRECTION_BIT;
    }
    self.with_modifier(bits)
  }

  // Static view of the modifier field.

  #[inline]
  pub const fn body_id(self) -> u32 {
    self.modifier() & BODY_ID_MASK
  }

  #[inline]
  pub const fn eight_connected(self) -> bool {
    self.modifier() & NEIGHBORHOOD_BIT != 0
  }

  pub const fn with_body(self, id: u32, eight_connected: bool) -> Self {
    let id = if id > BODY_ID_MASK { BODY_ID_MASK } else { id };
    let bits = if eight_connected {
      id | NEIGHBORHOOD_BIT
    } else {
      id
    };
    self.with_modifier(bits)
  }
}

impl Tail {
  pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
    Self::ZERO
      .with_red(r as u32)
      .with_green(g as u32)
      .with_blue(b as u32)
  }

  #[inline]
  pub const fn color(self) -> [u8; 3] {
    [self.red() as u8, self.green() as u8, self.blue() as u8]
  }

  #[inline]
  pub const fn with_color(self, [r, g, b]: [u8; 3]) -> Self {
    self
      .with_red(r as u32)
      .with_green(g as u32)
      .with_blue(b as u32)
  }

  pub const fn blur_class(self) -> BlurClass {
    match self.blur() {
      1 => BlurClass::Background,
      2 => BlurClass::Foreground,
      _ => BlurClass::None,
    }
  }

  #[inline]
  pub const fn with_blur_class(self, blur: BlurClass) -> Self {
    self.with_blur(blur as u32)
  }
}

/// One grid position: head and tail word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell {
  pub head: Head,
  pub tail: Tail,
}

impl Cell {
  /// Air at temperature zero.
  pub const DEFAULT: Self = Self {
    head: Head::ZERO,
    tail: Tail::ZERO,
  };

  #[inline]
  pub const fn new(head: Head, tail: Tail) -> Self {
    Self { head, tail }
  }

  #[inline]
  pub const fn type_class(self) -> TypeClass {
    self.head.type_class()
  }

  #[inline]
  pub const fn temp(self) -> u8 {
    self.head.temp()
  }

  #[inline]
  pub const fn is_default(self) -> bool {
    self.head.bits() == 0 && self.tail.bits() == 0
  }

  /// Behavior tag, or [`Behavior::None`] for a malformed head.
  #[inline]
  pub fn behavior_or_none(self) -> Behavior {
    self.head.behavior().unwrap_or(Behavior::None)
  }

  /// Checks the head word for values no rule can interpret.
  pub fn validate(self) -> Result<Behavior, CellError> {
    if self.head.reserved() != 0 {
      return Err(CellError::ReservedBits(self.head.bits()));
    }
    let behavior = self.head.behavior()?;
    if behavior == Behavior::Liquid {
      self.head.liquid_kind()?;
    }
    Ok(behavior)
  }

  /// Physical identity, ignoring transient state (temperature, slide state,
  /// burn marks).
  pub fn identity(self) -> (TypeClass, u32, u32, [u8; 3]) {
    (
      self.type_class(),
      self.head.behavior_bits(),
      self.head.heat_index(),
      self.tail.color(),
    )
  }
}
