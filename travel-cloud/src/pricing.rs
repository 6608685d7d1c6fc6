//! Booking price authority
//!
//! Totals are always derived from the stored tour row. Uses rust_decimal for
//! the arithmetic and rounds only the final figures.

use rust_decimal::prelude::*;
use shared::error::{AppError, ErrorCode};
use shared::models::{PriceQuote, Tour};

/// Rounding strategy for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Children pay this fraction of the (discounted) adult price
const CHILD_PRICE_RATIO: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Upper bound for adults, and separately for children, on one booking
pub const MAX_PARTY_SIZE: i32 = shared::models::booking::MAX_PARTY_SIZE;

/// Convert f64 to Decimal for calculation
#[inline]
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Unrounded adult price after the active discount
fn discounted_adult(tour: &Tour) -> Decimal {
    let price = to_decimal(tour.price);
    match tour.active_discount() {
        Some(pct) => price * (Decimal::ONE - to_decimal(pct) / Decimal::ONE_HUNDRED),
        None => price,
    }
}

/// Adult price shown on tour listings
pub fn adult_price(tour: &Tour) -> f64 {
    to_f64(discounted_adult(tour))
}

/// Compute the authoritative price for `guests` adults and `children` children.
///
/// Rejects inactive tours, out-of-range counts and parties above the tour's
/// `max_guests`.
pub fn quote(tour: &Tour, guests: i32, children: i32) -> Result<PriceQuote, AppError> {
    if !tour.is_active {
        return Err(AppError::new(ErrorCode::TourInactive).with_detail("tour_id", tour.id));
    }
    if !(1..=MAX_PARTY_SIZE).contains(&guests) || !(0..=MAX_PARTY_SIZE).contains(&children) {
        return Err(AppError::new(ErrorCode::BookingInvalidGuests)
            .with_detail("guests", guests)
            .with_detail("children", children));
    }
    if let Some(max) = tour.max_guests
        && guests + children > max
    {
        return Err(AppError::new(ErrorCode::BookingCapacityExceeded)
            .with_detail("max_guests", max)
            .with_detail("requested", guests + children));
    }

    let adult = discounted_adult(tour);
    let child = adult * CHILD_PRICE_RATIO;
    let total = Decimal::from(guests) * adult + Decimal::from(children) * child;

    Ok(PriceQuote {
        tour_id: tour.id,
        currency: tour.currency.clone(),
        base_price: to_f64(to_decimal(tour.price)),
        discount_percentage: tour.active_discount(),
        adult_price: to_f64(adult),
        child_price: to_f64(child),
        guests,
        children,
        total_price: to_f64(total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tour(price: f64, discounted: bool, pct: Option<f64>) -> Tour {
        Tour {
            id: 1,
            title_en: "Elephant Sanctuary".into(),
            title_th: None,
            title_zh: None,
            description_en: "Half day".into(),
            description_th: None,
            description_zh: None,
            location_en: "Chiang Mai".into(),
            location_th: None,
            location_zh: None,
            price,
            currency: "THB".into(),
            is_discounted: discounted,
            discount_percentage: pct,
            image_url: None,
            gallery: vec![],
            video_url: None,
            start_date: None,
            end_date: None,
            duration: "4 hours".into(),
            max_guests: None,
            is_active: true,
            created_at: 0,
            updated_at: 0,
            categories: vec![],
        }
    }

    #[test]
    fn test_no_discount() {
        let q = quote(&tour(1500.0, false, Some(20.0)), 2, 1).unwrap();
        assert_eq!(q.adult_price, 1500.0);
        assert_eq!(q.child_price, 750.0);
        assert_eq!(q.total_price, 3750.0);
        assert_eq!(q.discount_percentage, None);
    }

    #[test]
    fn test_discount_applies_to_children() {
        // 2 * 2000 * 0.9 + 1 * 2000 * 0.9 * 0.5 = 3600 + 900
        let q = quote(&tour(2000.0, true, Some(10.0)), 2, 1).unwrap();
        assert_eq!(q.adult_price, 1800.0);
        assert_eq!(q.child_price, 900.0);
        assert_eq!(q.total_price, 4500.0);
        assert_eq!(q.discount_percentage, Some(10.0));
    }

    #[test]
    fn test_rounding_only_at_end() {
        // adult 1699.9915, child 849.99575 -> 5099.9745 + 1699.9915 = 6799.966
        let q = quote(&tour(1999.99, true, Some(15.0)), 3, 2).unwrap();
        assert_eq!(q.adult_price, 1699.99);
        assert_eq!(q.child_price, 850.0);
        assert_eq!(q.total_price, 6799.97);
    }

    #[test]
    fn test_midpoint_rounds_away_from_zero() {
        // 999 * 0.85 = 849.15, child 424.575
        let q = quote(&tour(999.0, true, Some(15.0)), 1, 1).unwrap();
        assert_eq!(q.child_price, 424.58);
        assert_eq!(q.total_price, 1273.73);
    }

    #[test]
    fn test_out_of_range_discount_is_ignored() {
        for pct in [Some(0.0), Some(-5.0), Some(100.5), None] {
            let q = quote(&tour(1000.0, true, pct), 1, 0).unwrap();
            assert_eq!(q.total_price, 1000.0, "pct {pct:?}");
        }
    }

    #[test]
    fn test_full_discount() {
        let q = quote(&tour(1000.0, true, Some(100.0)), 4, 4).unwrap();
        assert_eq!(q.total_price, 0.0);
    }

    #[test]
    fn test_total_matches_formula() {
        let prices = [0.0, 1.0, 99.5, 450.0, 1234.56, 2500.0, 89999.99];
        let discounts = [None, Some(5.0), Some(12.5), Some(33.0), Some(50.0), Some(99.9)];
        for &p in &prices {
            for &d in &discounts {
                for g in [1, 2, 7, 50] {
                    for c in [0, 1, 3, 50] {
                        let t = tour(p, d.is_some(), d);
                        let q = quote(&t, g, c).unwrap();
                        let factor = 1.0 - d.unwrap_or(0.0) / 100.0;
                        let expected =
                            g as f64 * p * factor + c as f64 * (p * factor) * 0.5;
                        assert!(
                            (q.total_price - expected).abs() <= 0.0051,
                            "P={p} D={d:?} G={g} C={c}: {} vs {expected}",
                            q.total_price
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_guest_bounds() {
        let t = tour(100.0, false, None);
        let err = quote(&t, 0, 1).unwrap_err();
        assert_eq!(err.code, ErrorCode::BookingInvalidGuests);
        assert!(quote(&t, MAX_PARTY_SIZE + 1, 0).is_err());
        assert!(quote(&t, 1, -1).is_err());
        assert!(quote(&t, MAX_PARTY_SIZE, MAX_PARTY_SIZE).is_ok());
    }

    #[test]
    fn test_capacity() {
        let mut t = tour(100.0, false, None);
        t.max_guests = Some(4);
        assert!(quote(&t, 2, 2).is_ok());
        let err = quote(&t, 3, 2).unwrap_err();
        assert_eq!(err.code, ErrorCode::BookingCapacityExceeded);
    }

    #[test]
    fn test_inactive_tour() {
        let mut t = tour(100.0, false, None);
        t.is_active = false;
        assert_eq!(quote(&t, 1, 0).unwrap_err().code, ErrorCode::TourInactive);
    }

    #[test]
    fn test_adult_price_listing() {
        assert_eq!(adult_price(&tour(2000.0, true, Some(25.0))), 1500.0);
        assert_eq!(adult_price(&tour(2000.0, false, Some(25.0))), 2000.0);
    }
}
