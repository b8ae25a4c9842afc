pub mod amount;
pub mod percentage;

/// Fractional digits of the native currency (wei per ether).
pub const ETHER_DECIMALS: u8 = 18;
