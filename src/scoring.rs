//! Deal scoring: an active listing's current bid against the sold prices
//! of comparable vehicles.

use chrono::{DateTime, Duration, Utc};
use std::cmp::Reverse;

use crate::models::{DealResult, HistoricalComparable, ListingStatus, PriceStats, RawListing};

/// Auctions ending within this many hours are flagged as ending soon.
pub const ENDING_SOON_HOURS: i64 = 24;

/// Comparables attached to a result for display.
pub const MAX_COMPARABLES: usize = 25;

/// Sales at or above this price are treated as outliers by the weighted mean.
pub const OUTLIER_PRICE: f64 = 1_000_000.0;

/// Decay constant of the recency weighting: a sale this many days old
/// weighs 1/e of one sold today.
pub const RECENCY_DECAY_DAYS: f64 = 360.0;

/// Years either side of the active listing's year that count as comparable.
pub const YEAR_WINDOW: i32 = 2;

/// Mean, median, min and max of `prices`. `None` for an empty slice.
pub fn price_stats(prices: &[f64]) -> Option<PriceStats> {
    if prices.is_empty() {
        return None;
    }

    let mut sorted = prices.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    };

    Some(PriceStats {
        mean,
        median,
        min: sorted[0],
        max: sorted[count - 1],
        count,
        recency_weighted_mean: None,
    })
}

/// Mean of the comparables' prices weighted by `exp(-days_since_sale / 360)`.
/// Sales from [`OUTLIER_PRICE`] up and sales without a date are left out;
/// `None` when nothing remains.
pub fn recency_weighted_mean(comparables: &[HistoricalComparable], now: DateTime<Utc>) -> Option<f64> {
    let (weighted, total) = comparables
        .iter()
        .filter(|c| c.price < OUTLIER_PRICE)
        .filter_map(|c| {
            let days = (now - c.sold_at?).num_seconds().max(0) as f64 / 86_400.0;
            Some((c.price, (-days / RECENCY_DECAY_DAYS).exp()))
        })
        .fold((0.0, 0.0), |(sum, weights), (price, w)| (sum + price * w, weights + w));

    (total > 0.0).then(|| weighted / total)
}

/// 1..=10. Each full 5 points of under- or over-pricing moves the score
/// one step away from 5.
pub fn deal_score(percentage_difference: f64) -> u8 {
    let steps = (percentage_difference.abs() / 5.0).floor();
    let score = if percentage_difference > 0.0 {
        (5.0 + steps).min(10.0)
    } else {
        (5.0 - steps).max(1.0)
    };
    score as u8
}

/// True when the auction ends within [`ENDING_SOON_HOURS`] of `now`.
/// A listing without a known end time is never ending soon.
pub fn is_ending_soon(listing: &RawListing, now: DateTime<Utc>) -> bool {
    listing
        .end_time()
        .is_some_and(|end| end - now <= Duration::hours(ENDING_SOON_HOURS))
}

/// Score `active` against `comparables`. Only sold comparables with a
/// positive price count; with none left there is no result.
pub fn score(active: &RawListing, comparables: &[RawListing], now: DateTime<Utc>) -> Option<DealResult> {
    let mut sold: Vec<HistoricalComparable> = comparables
        .iter()
        .filter(|c| c.status == ListingStatus::Sold)
        .filter_map(|c| {
            c.resolved_sold_price()
                .filter(|price| *price > 0.0)
                .map(|price| HistoricalComparable::from_listing(c, price))
        })
        .collect();

    let prices: Vec<f64> = sold.iter().map(|c| c.price).collect();
    let mut historical = price_stats(&prices)?;
    historical.recency_weighted_mean = recency_weighted_mean(&sold, now);

    let current_bid = active.current_bid_amount().unwrap_or(0.0);
    let price_difference = historical.mean - current_bid;
    let percentage_difference = price_difference / historical.mean * 100.0;

    sold.sort_by_key(|c| Reverse(c.sold_at));
    sold.truncate(MAX_COMPARABLES);

    Some(DealResult {
        listing: active.clone(),
        current_bid,
        historical,
        price_difference,
        percentage_difference,
        deal_score: deal_score(percentage_difference),
        ending_soon: is_ending_soon(active, now),
        comparables: sold,
    })
}

/// Best deals first. Equal scores keep their input order.
pub fn rank(mut deals: Vec<DealResult>) -> Vec<DealResult> {
    deals.sort_by_key(|d| Reverse(d.deal_score));
    deals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawValue;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 17, 12, 0, 0).unwrap()
    }

    fn active(bid: f64) -> RawListing {
        let mut listing = RawListing::new(
            "1988 Porsche 911 Carrera",
            "https://bringatrailer.com/listing/active/",
            ListingStatus::Active,
        );
        listing.current_bid = Some(bid);
        listing
    }

    fn sold(price: &str, date: &str) -> RawListing {
        let mut listing = RawListing::new(
            "1987 Porsche 911 Carrera",
            format!("https://bringatrailer.com/listing/sold-{date}/"),
            ListingStatus::Sold,
        );
        listing.sold_price = Some(price.to_string());
        listing.sold_date = Some(date.to_string());
        listing
    }

    fn comparables() -> Vec<RawListing> {
        vec![
            sold("$10,000", "2025-01-10"),
            sold("$12,000", "2025-03-10"),
            sold("$14,000", "2025-02-10"),
            sold("$16,000", "2025-04-10"),
        ]
    }

    #[test]
    fn scores_underpriced_listing() {
        let result = score(&active(9000.0), &comparables(), now()).unwrap();

        assert_eq!(result.historical.mean, 13_000.0);
        assert_eq!(result.historical.median, 13_000.0);
        assert_eq!(result.historical.min, 10_000.0);
        assert_eq!(result.historical.max, 16_000.0);
        assert_eq!(result.historical.count, 4);
        assert_eq!(result.price_difference, 4000.0);
        assert!((result.percentage_difference - 30.769).abs() < 0.01);
        assert_eq!(result.deal_score, 10);
    }

    #[test]
    fn recent_sales_weigh_more() {
        let result = score(&active(9000.0), &comparables(), now()).unwrap();
        let weighted = result.historical.recency_weighted_mean.unwrap();
        // April's $16,000 sale is the most recent, January's $10,000 the oldest.
        assert!(weighted > result.historical.mean);
        assert!(weighted < 16_000.0);
        assert_eq!(result.deal_score, 10, "score still uses the plain mean");
    }

    #[test]
    fn weighted_mean_skips_outliers_and_undated_sales() {
        let at = |price: f64, days_ago: i64| HistoricalComparable {
            title: "comp".into(),
            url: "https://bringatrailer.com/listing/comp/".into(),
            price,
            sold_at: Some(now() - Duration::days(days_ago)),
        };

        let same_day = [at(10_000.0, 0), at(20_000.0, 0)];
        assert_eq!(recency_weighted_mean(&same_day, now()), Some(15_000.0));

        let decayed = [at(10_000.0, 0), at(20_000.0, 360)];
        let expected = (10_000.0 + 20_000.0 * (-1.0f64).exp()) / (1.0 + (-1.0f64).exp());
        assert!((recency_weighted_mean(&decayed, now()).unwrap() - expected).abs() < 1e-6);

        let mut undated = at(50_000.0, 0);
        undated.sold_at = None;
        let with_outlier = [at(12_000.0, 30), at(OUTLIER_PRICE, 1), undated];
        let only_dated = recency_weighted_mean(&with_outlier, now()).unwrap();
        assert!((only_dated - 12_000.0).abs() < 1e-6);

        assert_eq!(recency_weighted_mean(&[at(2_500_000.0, 1)], now()), None);
    }

    #[test]
    fn no_sold_comparables_means_no_result() {
        assert!(score(&active(9000.0), &[], now()).is_none());

        let mut unsold = sold("$12,000", "2025-01-01");
        unsold.status = ListingStatus::NotSold;
        assert!(score(&active(9000.0), &[unsold], now()).is_none());
    }

    #[test]
    fn non_positive_prices_are_dropped() {
        let mut numeric = sold("", "2025-01-01");
        numeric.sold_price = None;
        numeric.price = Some(20_000.0);

        let result = score(&active(9000.0), &[sold("$0", "2025-01-01"), numeric], now()).unwrap();
        assert_eq!(result.historical.count, 1);
        assert_eq!(result.historical.mean, 20_000.0);

        assert!(score(&active(9000.0), &[sold("$0", "2025-01-01")], now()).is_none());
    }

    #[test]
    fn median_of_odd_count() {
        let stats = price_stats(&[30.0, 10.0, 20.0]).unwrap();
        assert_eq!(stats.median, 20.0);
        assert_eq!(stats.mean, 20.0);
    }

    #[test]
    fn score_is_monotonic_and_bounded() {
        let comps = comparables();
        let mut previous = 0u8;
        for bid in (0..=40).rev().map(|i| f64::from(i) * 1000.0) {
            let result = score(&active(bid), &comps, now()).unwrap();
            assert!((1..=10).contains(&result.deal_score));
            assert!(result.deal_score >= previous, "bid {bid} lowered the score");
            previous = result.deal_score;
        }
    }

    #[test]
    fn deal_score_steps() {
        assert_eq!(deal_score(0.0), 5);
        assert_eq!(deal_score(4.99), 5);
        assert_eq!(deal_score(5.0), 6);
        assert_eq!(deal_score(-5.0), 4);
        assert_eq!(deal_score(-9.99), 4);
        assert_eq!(deal_score(-300.0), 1);
        assert_eq!(deal_score(99.0), 10);
    }

    #[test]
    fn missing_bid_counts_as_zero() {
        let mut listing = active(0.0);
        listing.current_bid = None;
        let result = score(&listing, &comparables(), now()).unwrap();
        assert_eq!(result.current_bid, 0.0);
        assert_eq!(result.deal_score, 10);
    }

    #[test]
    fn formatted_bid_is_used() {
        let mut listing = active(0.0);
        listing.current_bid = None;
        listing.bid_amount = Some("USD $13,000".into());
        let result = score(&listing, &comparables(), now()).unwrap();
        assert_eq!(result.current_bid, 13_000.0);
        assert_eq!(result.deal_score, 5);
    }

    #[test]
    fn ending_soon_window() {
        let mut soon = active(9000.0);
        soon.end_date = Some(RawValue::Text((now() + Duration::hours(18)).to_rfc3339()));
        let mut later = active(9000.0);
        later.end_date = Some(RawValue::Number((now() + Duration::hours(30)).timestamp() as f64));

        assert!(score(&soon, &comparables(), now()).unwrap().ending_soon);
        assert!(!score(&later, &comparables(), now()).unwrap().ending_soon);
        assert!(!is_ending_soon(&active(9000.0), now()));
    }

    #[test]
    fn comparables_are_recent_first_and_capped() {
        let result = score(&active(9000.0), &comparables(), now()).unwrap();
        let prices: Vec<f64> = result.comparables.iter().map(|c| c.price).collect();
        assert_eq!(prices, vec![16_000.0, 12_000.0, 14_000.0, 10_000.0]);

        let many: Vec<RawListing> = (1..=40)
            .map(|day| sold("$10,000", &format!("2025-01-{:02}", (day % 28) + 1)))
            .collect();
        let result = score(&active(9000.0), &many, now()).unwrap();
        assert_eq!(result.comparables.len(), MAX_COMPARABLES);
        assert_eq!(result.historical.count, 40);
    }

    #[test]
    fn rank_is_stable_descending() {
        let comps = comparables();
        let mut a = score(&active(13_000.0), &comps, now()).unwrap();
        a.listing.title = "a".into();
        let mut b = score(&active(9000.0), &comps, now()).unwrap();
        b.listing.title = "b".into();
        let mut c = score(&active(13_000.0), &comps, now()).unwrap();
        c.listing.title = "c".into();

        let ranked = rank(vec![a, b, c]);
        let titles: Vec<&str> = ranked.iter().map(|d| d.listing.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "a", "c"]);
    }
}
