// src/process/composite.rs

use crate::config::CompositeGroup;
use crate::record::Record;

/// Mean of `values` rounded half away from zero to 2 places.
/// Absent if any value is absent, not a number, or not finite.
pub fn average(values: &[Option<&str>]) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    let mut sum = 0.0_f64;
    for v in values.iter().copied() {
        let score = v?.trim().parse::<f64>().ok().filter(|f| f.is_finite())?;
        sum += score;
    }
    let mean = sum / values.len() as f64;
    if !mean.is_finite() {
        return None;
    }
    round_cents(mean)
}

/// Rounds on decimal digits rather than on the binary value, so `1.005` gives `1.01`.
/// Prints the shortest form: `8`, `7.5`, `7.17`. Never prints `-0`.
fn round_cents(value: f64) -> Option<String> {
    // 9 places is well past score precision and drops binary noise
    let text = format!("{:.9}", value.abs());
    let (whole, frac) = text.split_once('.')?;
    let digits = frac.as_bytes();
    let mut cents = whole.parse::<u128>().ok()? * 100 + frac.get(..2)?.parse::<u128>().ok()?;
    if digits[2] >= b'5' {
        cents += 1;
    }

    let sign = if value < 0.0 && cents != 0 { "-" } else { "" };
    let (units, rem) = (cents / 100, cents % 100);
    Some(match rem {
        0 => format!("{}{}", sign, units),
        r if r % 10 == 0 => format!("{}{}.{}", sign, units, r / 10),
        r => format!("{}{}.{:02}", sign, units, r),
    })
}

/// Fills composite columns of records whose source only publishes raw subjects.
pub struct CompositeAverager<'a> {
    groups: &'a [CompositeGroup],
}

impl<'a> CompositeAverager<'a> {
    pub fn new(groups: &'a [CompositeGroup]) -> Self {
        Self { groups }
    }

    pub fn apply(&self, record: &mut Record) {
        for group in self.groups {
            let value = {
                let inputs: Vec<Option<&str>> =
                    group.inputs.iter().map(|c| record.get(*c)).collect();
                average(&inputs)
            };
            record.set(group.target, value);
        }
    }
}
