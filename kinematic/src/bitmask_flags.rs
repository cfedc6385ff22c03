use num_traits::{One, PrimInt};

/// Trait implemented by user-defined flag enums.
///
/// The enum's discriminant (via `#[repr(u8)]`) determines the bit index.
/// The backing integer type is chosen through the associated `Storage`.
pub trait FlagBitmask {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    fn mask(&self) -> Self::Storage {
        // NOTE: `bit_index()` must be < number of bits in `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// A plain bitmask container over any primitive integer.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitmaskFlags<T: PrimInt> {
    pub bits: T,
}

impl<T: PrimInt> BitmaskFlags<T> {
    pub fn new(bits: T) -> Self {
        Self { bits }
    }

    pub fn empty() -> Self {
        Self { bits: T::zero() }
    }

    pub fn all() -> Self {
        Self { bits: !T::zero() }
    }

    /// Build a mask with every listed flag set.
    pub fn from_flags<U: FlagBitmask<Storage = T> + Copy>(tags: &[U]) -> Self {
        let mut flags = Self::empty();
        flags.add_many(tags);
        flags
    }

    // --- Single Tag Operations ---
    pub fn add<U: FlagBitmask<Storage = T>>(&mut self, tag: U) {
        self.bits = self.bits | tag.mask();
    }

    pub fn remove<U: FlagBitmask<Storage = T>>(&mut self, tag: U) {
        self.bits = self.bits & !tag.mask();
    }

    pub fn has<U: FlagBitmask<Storage = T>>(&self, tag: U) -> bool {
        (self.bits & tag.mask()) != T::zero()
    }

    // --- Bulk Operations ---
    pub fn add_many<U: FlagBitmask<Storage = T> + Copy>(&mut self, tags: &[U]) {
        for &tag in tags {
            self.add(tag);
        }
    }

    pub fn remove_many<U: FlagBitmask<Storage = T> + Copy>(&mut self, tags: &[U]) {
        for &tag in tags {
            self.remove(tag);
        }
    }

    // --- Logic Gates ---
    pub fn has_all<U: FlagBitmask<Storage = T> + Copy>(&self, tags: &[U]) -> bool {
        if tags.is_empty() {
            return true;
        }
        let combined = tags.iter().fold(T::zero(), |acc, t| acc | t.mask());
        (self.bits & combined) == combined
    }

    pub fn has_any<U: FlagBitmask<Storage = T> + Copy>(&self, tags: &[U]) -> bool {
        if tags.is_empty() {
            return false;
        }
        let combined = tags.iter().fold(T::zero(), |acc, t| acc | t.mask());
        (self.bits & combined) != T::zero()
    }

    /// True when the two masks share at least one bit.
    pub fn intersects(&self, other: Self) -> bool {
        (self.bits & other.bits) != T::zero()
    }

    pub fn is_empty(&self) -> bool {
        self.bits == T::zero()
    }

    pub fn clear(&mut self) {
        self.bits = T::zero();
    }
}

/// Declare a bitmask-backed enum and implement `FlagBitmask` for it.
///
/// Example:
/// ```rust
/// kinematic::define_bitmask_flags!(Team, u16, {
///     Red,
///     Blue,
/// });
/// ```
#[macro_export]
macro_rules! define_bitmask_flags {
    ($name:ident, $storage:ty, { $($variant:ident),* $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($variant),*
        }

        impl $crate::bitmask_flags::FlagBitmask for $name {
            type Storage = $storage;

            fn bit_index(&self) -> u8 {
                *self as u8
            }
        }
    };
}

define_bitmask_flags!(Layer, u32, {
    Obstacles,
    Characters,
    Platforms,
});

/// Collision layer membership or query filter.
pub type LayerMask = BitmaskFlags<u32>;

impl From<Layer> for LayerMask {
    fn from(layer: Layer) -> Self {
        LayerMask::new(layer.mask())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_bits_follow_declaration_order() {
        assert_eq!(Layer::Obstacles.mask(), 0b001);
        assert_eq!(Layer::Characters.mask(), 0b010);
        assert_eq!(Layer::Platforms.mask(), 0b100);
    }

    #[test]
    fn add_remove_and_query() {
        let mut mask = LayerMask::empty();
        assert!(mask.is_empty());

        mask.add(Layer::Obstacles);
        mask.add(Layer::Platforms);
        assert!(mask.has(Layer::Obstacles));
        assert!(!mask.has(Layer::Characters));
        assert!(mask.has_all(&[Layer::Obstacles, Layer::Platforms]));
        assert!(mask.has_any(&[Layer::Characters, Layer::Platforms]));

        mask.remove(Layer::Obstacles);
        assert!(!mask.has(Layer::Obstacles));
        assert!(!mask.has_all(&[Layer::Obstacles, Layer::Platforms]));
    }

    #[test]
    fn masks_intersect_on_shared_bits_only() {
        let solids = LayerMask::from_flags(&[Layer::Obstacles, Layer::Platforms]);
        assert!(solids.intersects(Layer::Platforms.into()));
        assert!(!solids.intersects(Layer::Characters.into()));
        assert!(LayerMask::all().intersects(Layer::Characters.into()));
        assert!(!LayerMask::empty().intersects(LayerMask::all()));
    }
}
