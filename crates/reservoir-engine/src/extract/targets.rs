use std::fmt;
use std::ops::RangeInclusive;

use crate::error::ExtractError;

/// Question numbers a caller wants back, parsed from lists like `1-5,8`.
///
/// Held as sorted, disjoint ranges, so a wide range costs no more than a
/// single number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSet {
    ranges: Vec<RangeInclusive<u32>>,
}

impl TargetSet {
    pub fn new(numbers: impl IntoIterator<Item = u32>) -> Self {
        Self::from_ranges(numbers.into_iter().map(|n| n..=n).collect())
    }

    /// Parses comma-separated numbers and inclusive ranges.
    ///
    /// Whitespace is ignored and an empty input gives an empty set.
    pub fn parse(input: &str) -> Result<Self, ExtractError> {
        let invalid = |reason: String| ExtractError::InvalidTargets {
            input: input.to_string(),
            reason,
        };
        let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();

        let mut ranges = Vec::new();
        for part in compact.split(',').filter(|p| !p.is_empty()) {
            match part.split_once('-') {
                Some((start, end)) => {
                    let start = parse_number(start).map_err(&invalid)?;
                    let end = parse_number(end).map_err(&invalid)?;
                    if start > end {
                        return Err(invalid(format!("range {start}-{end} is reversed")));
                    }
                    ranges.push(start..=end);
                }
                None => {
                    let n = parse_number(part).map_err(&invalid)?;
                    ranges.push(n..=n);
                }
            }
        }
        Ok(Self::from_ranges(ranges))
    }

    /// Sorts and merges overlapping or adjacent ranges.
    fn from_ranges(mut ranges: Vec<RangeInclusive<u32>>) -> Self {
        ranges.sort_by_key(|r| *r.start());
        let mut merged: Vec<RangeInclusive<u32>> = Vec::with_capacity(ranges.len());
        for range in ranges {
            if let Some(last) = merged.last_mut()
                && *range.start() <= last.end().saturating_add(1)
            {
                if range.end() > last.end() {
                    *last = *last.start()..=*range.end();
                }
                continue;
            }
            merged.push(range);
        }
        Self { ranges: merged }
    }

    pub fn contains(&self, number: u32) -> bool {
        let idx = self.ranges.partition_point(|r| *r.end() < number);
        self.ranges.get(idx).is_some_and(|r| r.contains(&number))
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of selected questions.
    pub fn len(&self) -> u64 {
        self.ranges
            .iter()
            .map(|r| u64::from(*r.end()) - u64::from(*r.start()) + 1)
            .sum()
    }

    /// Selected numbers in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.ranges.iter().cloned().flatten()
    }
}

impl fmt::Display for TargetSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .ranges
            .iter()
            .map(|r| {
                if r.start() == r.end() {
                    r.start().to_string()
                } else {
                    format!("{}-{}", r.start(), r.end())
                }
            })
            .collect();
        f.write_str(&parts.join(","))
    }
}

fn parse_number(s: &str) -> Result<u32, String> {
    s.parse()
        .map_err(|_| format!("{s:?} is not a question number"))
}
