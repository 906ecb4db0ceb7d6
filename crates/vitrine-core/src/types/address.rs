//! Debuggee memory address type.

use std::fmt;
use std::ops::Add;

/// Strongly typed debuggee address
///
/// A wrapper around `u64` that keeps addresses from mixing with sizes,
/// counts, and the other numeric values this engine juggles. Every address
/// the engine handles belongs to the *inspected* process; it is never valid
/// to dereference one locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    ///
    /// Containers frequently carry null link fields before construction
    /// finishes, so this shows up as a sentinel all over the views.
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value
    #[must_use]
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    #[must_use]
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Whether this is the null address
    #[must_use]
    pub const fn is_null(self) -> bool
    {
        self.0 == 0
    }

    /// Add an offset to this address, checking for overflow
    ///
    /// Returns `None` on overflow. Offsets computed from debuggee-supplied
    /// sizes can be arbitrary garbage, so the checked form is the default
    /// throughout the views.
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }

    /// Subtract an offset from this address, checking for underflow
    pub fn checked_sub(self, offset: u64) -> Option<Self>
    {
        self.0.checked_sub(offset).map(Address)
    }

    /// Add an offset to this address, saturating at the maximum value
    #[must_use]
    pub fn saturating_add(self, offset: u64) -> Self
    {
        Address(self.0.saturating_add(offset))
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}

impl Add<u64> for Address
{
    type Output = Address;

    fn add(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_add(rhs))
    }
}
