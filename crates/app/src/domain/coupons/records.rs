//! Coupon Records

use arbor::{
    coupons::{Coupon, CouponCode, CouponDiscount},
    money::Amount,
};
use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

/// Wire row of the platform's `coupons` table.
#[derive(Debug, Clone, Deserialize)]
pub struct CouponRecord {
    pub id: Uuid,
    pub code: String,
    pub discount_type: String,
    pub discount_value: f64,
    #[serde(default)]
    pub min_purchase_amount: Option<f64>,
    #[serde(default)]
    pub max_discount_amount: Option<f64>,
    #[serde(default)]
    pub usage_limit: Option<u32>,
    #[serde(default)]
    pub used_count: Option<u32>,
    #[serde(default)]
    pub expires_at: Option<Timestamp>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_free_shipping: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CouponRecord {
    /// Maps the wire row into the domain coupon.
    ///
    /// Anything other than `"fixed"` is treated as a percentage discount,
    /// and malformed numeric values degrade to zero, matching how the
    /// storefront has always read these rows.
    #[must_use]
    pub fn into_coupon(self) -> Coupon {
        let discount = if self.discount_type == "fixed" {
            CouponDiscount::Fixed(amount_from(self.discount_value))
        } else {
            CouponDiscount::Percentage {
                percent: percent_points(self.discount_value),
                cap: self.max_discount_amount.map(amount_from),
            }
        };

        Coupon {
            id: self.id,
            code: CouponCode::new(&self.code),
            discount,
            min_purchase: self.min_purchase_amount.map_or(0, amount_from),
            usage_limit: self.usage_limit,
            used_count: self.used_count.unwrap_or(0),
            expires_at: self.expires_at,
            is_active: self.is_active.unwrap_or(true),
            free_shipping: self.is_free_shipping.unwrap_or(false),
            description: self.description.unwrap_or_default(),
        }
    }
}

/// Converts a wire amount to a domain amount; non-finite or negative
/// values degrade to zero.
fn amount_from(value: f64) -> Amount {
    if value.is_finite() && value > 0.0 {
        value.round() as Amount
    } else {
        0
    }
}

/// Converts wire percent points (e.g. `10` for 10%) to a fractional rate.
fn percent_points(value: f64) -> Percentage {
    let points = Decimal::from_f64_retain(value).unwrap_or(Decimal::ZERO);

    Percentage::from(points / Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn fixed_row_maps_to_a_fixed_discount() -> TestResult {
        let record: CouponRecord = serde_json::from_str(
            r#"{
                "id": "00000000-0000-0000-0000-000000000001",
                "code": "welcome100",
                "discount_type": "fixed",
                "discount_value": 100,
                "min_purchase_amount": 500,
                "usage_limit": 10,
                "used_count": 3,
                "is_active": true,
                "is_free_shipping": false,
                "description": "Welcome offer"
            }"#,
        )?;

        let coupon = record.into_coupon();

        assert_eq!(coupon.code.as_str(), "WELCOME100");
        assert_eq!(coupon.discount, CouponDiscount::Fixed(100));
        assert_eq!(coupon.min_purchase, 500);
        assert_eq!(coupon.usage_limit, Some(10));
        assert_eq!(coupon.used_count, 3);
        assert!(!coupon.free_shipping);

        Ok(())
    }

    #[test]
    fn percentage_row_maps_with_cap() -> TestResult {
        let record: CouponRecord = serde_json::from_str(
            r#"{
                "id": "00000000-0000-0000-0000-000000000002",
                "code": "TEN",
                "discount_type": "percentage",
                "discount_value": 10,
                "max_discount_amount": 50
            }"#,
        )?;

        let coupon = record.into_coupon();

        // 10% of 1000 is 100, capped at 50.
        assert_eq!(coupon.discount_amount(1_000)?, 50);

        Ok(())
    }

    #[test]
    fn missing_optionals_take_defaults() -> TestResult {
        let record: CouponRecord = serde_json::from_str(
            r#"{
                "id": "00000000-0000-0000-0000-000000000003",
                "code": "BARE",
                "discount_type": "percentage",
                "discount_value": 5
            }"#,
        )?;

        let coupon = record.into_coupon();

        assert_eq!(coupon.min_purchase, 0);
        assert_eq!(coupon.usage_limit, None);
        assert_eq!(coupon.used_count, 0);
        assert_eq!(coupon.expires_at, None);
        assert!(!coupon.free_shipping);
        assert!(coupon.description.is_empty());

        Ok(())
    }

    #[test]
    fn expiry_timestamp_is_parsed() -> TestResult {
        let record: CouponRecord = serde_json::from_str(
            r#"{
                "id": "00000000-0000-0000-0000-000000000004",
                "code": "DATED",
                "discount_type": "fixed",
                "discount_value": 50,
                "expires_at": "2026-01-01T00:00:00Z"
            }"#,
        )?;

        assert!(record.into_coupon().expires_at.is_some());

        Ok(())
    }

    #[test]
    fn negative_amounts_degrade_to_zero() {
        assert_eq!(amount_from(-25.0), 0);
        assert_eq!(amount_from(f64::NAN), 0);
        assert_eq!(amount_from(49.6), 50);
    }
}
