//! Bitfield macros for packed simulation words.
//!
//! # Design Goals
//!
//! - One `u32`/`u64` newtype per packed word, `#[repr(transparent)]`
//! - Named getters, setters and `with_*` builders per field
//! - Writes saturate at the field maximum instead of bleeding into the
//!   neighbouring field
//! - Zero-cost abstractions (all accessors inline, most are `const`)

#[doc(hidden)]
pub use paste;

/// Defines a packed word with named bitfields.
///
/// Each field is declared as `name => (shift, width)`. Fields must not
/// overlap and must fit in the backing integer; both conditions are checked
/// at compile time.
///
/// For every field `foo` the macro generates:
/// - `FOO_SHIFT`, `FOO_WIDTH`, `FOO_MAX` and `FOO_MASK` constants
/// - `foo(self)` returning the field value
/// - `set_foo(&mut self, value)` saturating at `FOO_MAX`
/// - `with_foo(self, value)` as a `const` builder
///
/// # Example
///
/// ```
/// # use word_macro::packed_word;
/// packed_word!(Head: u32 {
///     kind => (0, 3),
///     momentum => (3, 3),
///     temperature => (24, 8),
/// });
///
/// let mut head = Head::ZERO.with_kind(5).with_temperature(200);
/// assert_eq!(head.kind(), 5);
/// assert_eq!(head.temperature(), 200);
///
/// head.set_momentum(42); // saturates
/// assert_eq!(head.momentum(), 7);
/// assert_eq!(head.kind(), 5);
/// ```
#[macro_export]
macro_rules! packed_word {
  ($name:ident : $ty:ty { $($field:ident => ($shift:literal, $width:literal)),* $(,)? }) => {
    #[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
    #[repr(transparent)]
    pub struct $name($ty);

    impl $name {
      /// Word with every field set to zero.
      pub const ZERO: Self = Self(0);

      /// Wraps raw bits without validation.
      #[inline]
      pub const fn from_bits(bits: $ty) -> Self {
        Self(bits)
      }

      /// Returns the raw bits.
      #[inline]
      pub const fn bits(self) -> $ty {
        self.0
      }

      $crate::paste::paste! {
        $(
          pub const [<$field:upper _SHIFT>]: u32 = $shift;
          pub const [<$field:upper _WIDTH>]: u32 = $width;
          pub const [<$field:upper _MAX>]: $ty = ((1 as $ty) << $width) - 1;
          pub const [<$field:upper _MASK>]: $ty = Self::[<$field:upper _MAX>] << $shift;

          #[doc = concat!("Returns the `", stringify!($field), "` field (bits ", stringify!($shift), "+", stringify!($width), ").")]
          #[inline]
          pub const fn $field(self) -> $ty {
            (self.0 >> $shift) & Self::[<$field:upper _MAX>]
          }

          #[doc = concat!("Sets the `", stringify!($field), "` field, saturating at its maximum.")]
          #[inline]
          pub fn [<set_ $field>](&mut self, value: $ty) {
            *self = self.[<with_ $field>](value);
          }

          #[doc = concat!("Returns a copy with the `", stringify!($field), "` field replaced, saturating at its maximum.")]
          #[inline]
          pub const fn [<with_ $field>](self, value: $ty) -> Self {
            let max = Self::[<$field:upper _MAX>];
            let value = if value > max { max } else { value };
            Self((self.0 & !Self::[<$field:upper _MASK>]) | (value << $shift))
          }
        )*
      }

      /// Union of every declared field mask.
      pub const DECLARED_MASK: $ty = 0 $(| ((((1 as $ty) << $width) - 1) << $shift))*;
    }

    const _: () = {
      let bits = (::core::mem::size_of::<$ty>() * 8) as u32;
      let mut seen: $ty = 0;
      $(
        assert!($width > 0 && $shift + $width <= bits, concat!(stringify!($name), "::", stringify!($field), " does not fit"));
        let mask: $ty = (((1 as $ty) << $width) - 1) << $shift;
        assert!(seen & mask == 0, concat!(stringify!($name), "::", stringify!($field), " overlaps another field"));
        seen |= mask;
      )*
      let _ = seen;
    };

    impl ::core::fmt::Debug for $name {
      fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        f.debug_struct(stringify!($name))
          $(.field(stringify!($field), &self.$field()))*
          .finish()
      }
    }
  };
}
