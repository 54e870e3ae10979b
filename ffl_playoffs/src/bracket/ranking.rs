//! Standard competition ranking ("1224" ranking).

use rust_decimal::Decimal;

/// Assign competition ranks to scores already sorted best first.
///
/// Equal scores share a rank and the next distinct score skips ahead by the
/// size of the tie group, so `[50, 50, 40]` ranks as `[1, 1, 3]`.
pub fn competition_ranks(sorted_desc: &[Decimal]) -> Vec<u32> {
    let mut ranks = Vec::with_capacity(sorted_desc.len());
    let mut current_rank = 1u32;

    for (idx, score) in sorted_desc.iter().enumerate() {
        if idx > 0 && Some(score) != sorted_desc.get(idx - 1) {
            current_rank = idx as u32 + 1;
        }
        ranks.push(current_rank);
    }

    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decimals(values: &[i64]) -> Vec<Decimal> {
        values.iter().copied().map(Decimal::from).collect()
    }

    #[test]
    fn test_two_way_tie_skips_a_rank() {
        assert_eq!(competition_ranks(&decimals(&[50, 50, 40])), vec![1, 1, 3]);
    }

    #[test]
    fn test_distinct_scores() {
        assert_eq!(competition_ranks(&decimals(&[90, 80, 70])), vec![1, 2, 3]);
    }

    #[test]
    fn test_ties_in_the_middle_and_tail() {
        assert_eq!(
            competition_ranks(&decimals(&[100, 90, 90, 90, 80, 70, 70])),
            vec![1, 2, 2, 2, 5, 6, 6]
        );
    }

    #[test]
    fn test_decimal_scale_does_not_split_ties() {
        // 50.0 and 50.00 are the same score
        let scores = vec![Decimal::new(500, 1), Decimal::new(5000, 2), Decimal::new(4999, 2)];
        assert_eq!(competition_ranks(&scores), vec![1, 1, 3]);
    }

    #[test]
    fn test_empty() {
        assert!(competition_ranks(&[]).is_empty());
    }
}
