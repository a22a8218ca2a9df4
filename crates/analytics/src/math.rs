//! Division helpers that report undefined results as `None` instead of panicking.

use rust_decimal::Decimal;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// `numerator / denominator`, or `None` when the denominator is zero.
pub(crate) fn ratio(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        return None;
    }
    numerator.checked_div(denominator)
}

/// `numerator / denominator * 100`, or `None` when the denominator is zero.
pub(crate) fn percent_of(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    ratio(numerator, denominator).and_then(|r| r.checked_mul(HUNDRED))
}

/// Arithmetic mean, or `None` for an empty sequence.
pub(crate) fn mean(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    let (sum, count) = values
        .into_iter()
        .fold((Decimal::ZERO, 0u64), |(sum, count), v| (sum + v, count + 1));
    ratio(sum, Decimal::from(count))
}
