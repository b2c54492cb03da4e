//! Tick derivation helpers

/// Greatest common divisor; `gcd(0, x) == x`
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// GCD of every value, or `None` for an empty input
pub fn gcd_all<I>(values: I) -> Option<u64>
where
    I: IntoIterator<Item = u64>,
{
    values.into_iter().fold(None, |acc, value| match acc {
        None => Some(value),
        Some(current) => Some(gcd(current, value)),
    })
}
