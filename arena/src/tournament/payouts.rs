//! Prize pool split.

use super::models::PrizeShare;

/// Split `pool` by the percentage shares.
///
/// Each position gets `floor(pool * percentage / 100)`; whatever the flooring
/// leaves over goes to the first position, so the amounts always add up to
/// the pool when the shares total 100.
///
/// # Arguments
///
/// * `pool` - Total prize pool in minor units
/// * `shares` - Ordered prize distribution
///
/// # Returns
///
/// * `Vec<(String, i64)>` - Position label and amount, in distribution order
pub fn calculate_payouts(pool: i64, shares: &[PrizeShare]) -> Vec<(String, i64)> {
    let pool = pool.max(0);
    let mut payouts: Vec<(String, i64)> = shares
        .iter()
        .map(|share| {
            let amount = i128::from(pool) * i128::from(share.percentage) / 100;
            (share.position.clone(), amount as i64)
        })
        .collect();

    let paid: i64 = payouts.iter().map(|(_, amount)| amount).sum();
    let total_percentage: u32 = shares.iter().map(|s| s.percentage).sum();
    if total_percentage == 100
        && let Some((_, first)) = payouts.first_mut()
    {
        *first += pool - paid;
    }

    payouts
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_even_split() {
        let shares = vec![PrizeShare::new("1st", 50), PrizeShare::new("2nd", 50)];
        assert_eq!(
            calculate_payouts(1000, &shares),
            vec![("1st".to_string(), 500), ("2nd".to_string(), 500)]
        );
    }

    #[test]
    fn test_remainder_goes_to_first_position() {
        let shares = vec![
            PrizeShare::new("2nd", 33),
            PrizeShare::new("1st", 34),
            PrizeShare::new("3rd", 33),
        ];
        let payouts = calculate_payouts(100 + 1, &shares);
        // floor: 33, 34, 33 = 100, remainder 1
        assert_eq!(payouts[0], ("2nd".to_string(), 34));
        assert_eq!(payouts[1], ("1st".to_string(), 34));
        assert_eq!(payouts[2], ("3rd".to_string(), 33));
    }

    #[test]
    fn test_empty_pool() {
        let shares = vec![PrizeShare::new("1st", 100)];
        assert_eq!(calculate_payouts(0, &shares), vec![("1st".to_string(), 0)]);
    }

    fn shares_totalling_100() -> impl Strategy<Value = Vec<PrizeShare>> {
        prop::collection::vec(1u32..20, 1..6).prop_map(|weights| {
            let mut shares: Vec<PrizeShare> = weights
                .iter()
                .enumerate()
                .map(|(i, _)| PrizeShare::new(&format!("P{}", i + 1), 1))
                .collect();
            // Spread the rest of 100 by weight, last one takes the slack
            let weight_sum: u32 = weights.iter().sum();
            let spare = 100 - shares.len() as u32;
            let mut given = 0;
            let last = shares.len() - 1;
            for (i, share) in shares.iter_mut().enumerate() {
                let extra = if i == last {
                    spare - given
                } else {
                    spare * weights[i] / weight_sum
                };
                given += extra;
                share.percentage += extra;
            }
            shares
        })
    }

    proptest! {
        #[test]
        fn prop_payouts_conserve_pool(pool in 0i64..10_000_000, shares in shares_totalling_100()) {
            let payouts = calculate_payouts(pool, &shares);
            let total: i64 = payouts.iter().map(|(_, amount)| amount).sum();
            prop_assert_eq!(total, pool);
            prop_assert!(payouts.iter().all(|(_, amount)| *amount >= 0));
        }

        #[test]
        fn prop_only_first_position_rounds_up(pool in 0i64..10_000_000, shares in shares_totalling_100()) {
            let payouts = calculate_payouts(pool, &shares);
            for (share, (_, amount)) in shares.iter().zip(payouts.iter()).skip(1) {
                prop_assert_eq!(*amount, pool * i64::from(share.percentage) / 100);
            }
        }
    }
}
