//! Write-through cache of a write-only register bank.
//!
//! Neither codec can be read back over the bus, so the drivers compute every
//! bit edit against this shadow and store the result only once the bus write
//! has succeeded. A failed write therefore leaves the shadow stale: the
//! device may hold the old or the new value, and nothing here finds out.

/// In-memory mirror of `N` registers, each up to 16 bits wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterShadow<const N: usize> {
    regs: [u16; N],
    defaults: [u16; N],
}

impl<const N: usize> RegisterShadow<N> {
    /// Start from the device's power-on values.
    pub const fn new(defaults: [u16; N]) -> Self {
        RegisterShadow {
            regs: defaults,
            defaults,
        }
    }

    /// Shadow of a device whose reset values are unknown (all zero).
    pub const fn zeroed() -> Self {
        Self::new([0; N])
    }

    /// Cached value of `reg`. Out-of-range registers read as zero.
    pub fn get(&self, reg: u8) -> u16 {
        self.regs.get(usize::from(reg)).copied().unwrap_or(0)
    }

    /// Record a value the device has acknowledged.
    pub fn set(&mut self, reg: u8, value: u16) {
        debug_assert!(usize::from(reg) < N, "register {reg:#04x} outside shadow");
        if let Some(slot) = self.regs.get_mut(usize::from(reg)) {
            *slot = value;
        }
    }

    /// The device was reset: forget everything written so far.
    pub fn reset(&mut self) {
        self.regs = self.defaults;
    }

    /// `reg` with bit `bit` set or cleared. Does not modify the shadow.
    pub fn with_bit(&self, reg: u8, bit: u8, on: bool) -> u16 {
        let current = self.get(reg);
        if on {
            current | (1 << bit)
        } else {
            current & !(1 << bit)
        }
    }

    /// `reg` with the field `[msb:lsb]` replaced by `setting`, which is
    /// truncated to the field width. Does not modify the shadow.
    pub fn with_bits(&self, reg: u8, msb: u8, lsb: u8, setting: u16) -> u16 {
        debug_assert!(msb >= lsb && msb < 16);
        let width = u32::from(msb - lsb) + 1;
        let mask = (((1u32 << width) - 1) << lsb) as u16;
        (self.get(reg) & !mask) | ((setting << lsb) & mask)
    }

    /// Every cached value, indexed by register.
    pub fn as_slice(&self) -> &[u16] {
        &self.regs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_bit_field_on_zero_register() {
        let mut shadow = RegisterShadow::<4>::zeroed();
        let v = shadow.with_bits(2, 6, 4, 5);
        shadow.set(2, v);

        assert_eq!(shadow.get(2), 0b0101_0000);
        assert_eq!((shadow.get(2) >> 4) & 0b111, 5);
        assert_eq!(shadow.get(2) & !0b0111_0000, 0);
    }

    #[test]
    fn multi_bit_preserves_other_bits() {
        let shadow = RegisterShadow::new([0x1FF]);
        assert_eq!(shadow.with_bits(0, 3, 1, 0), 0x1F1);
        assert_eq!(shadow.with_bits(0, 8, 0, 0x042), 0x042);
    }

    #[test]
    fn multi_bit_setting_truncated_to_field() {
        let shadow = RegisterShadow::<1>::zeroed();
        assert_eq!(shadow.with_bits(0, 5, 4, 0b111), 0b11_0000);
    }

    #[test]
    fn single_bit_set_and_clear() {
        let shadow = RegisterShadow::new([0b1010]);
        assert_eq!(shadow.with_bit(0, 0, true), 0b1011);
        assert_eq!(shadow.with_bit(0, 3, false), 0b0010);
        // Computing a value never touches the cache.
        assert_eq!(shadow.get(0), 0b1010);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut shadow = RegisterShadow::new([0x097, 0x00A]);
        shadow.set(0, 0x1FF);
        shadow.set(1, 0);
        shadow.reset();
        assert_eq!(shadow.as_slice(), &[0x097, 0x00A]);
    }

    #[test]
    fn out_of_range_reads_zero() {
        let shadow = RegisterShadow::new([0xFFFF; 2]);
        assert_eq!(shadow.get(9), 0);
    }
}
