//! Order Summary
//!
//! Terminal rendering of a priced cart: one table row per line, then a
//! totals block. Presentation only — the monetary contract lives in
//! [`crate::pricing`].

use std::io;

use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::Cart,
    coupons::Coupon,
    membership::{DiscountSettings, MembershipTier},
    money::format_amount,
    pricing::CheckoutBreakdown,
};

/// Errors that can occur when writing a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// IO error
    #[error("IO error")]
    Io,
}

/// Writes the order summary for a priced cart.
///
/// # Errors
///
/// Returns [`SummaryError::Io`] if the output cannot be written.
pub fn write_summary(
    mut out: impl io::Write,
    cart: &Cart,
    breakdown: &CheckoutBreakdown,
    coupon: Option<&Coupon>,
    tier: MembershipTier,
    settings: &DiscountSettings,
) -> Result<(), SummaryError> {
    let mut builder = Builder::default();

    builder.push_record(["Item", "Unit Price", "Qty", "Line Total"]);

    for line in cart.iter() {
        builder.push_record([
            line.name.clone(),
            format_amount(line.unit_price),
            line.quantity.to_string(),
            format_amount(line.line_total()),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(1..), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| SummaryError::Io)?;

    write_totals(&mut out, breakdown, coupon, tier, settings)
}

fn write_totals(
    out: &mut impl io::Write,
    breakdown: &CheckoutBreakdown,
    coupon: Option<&Coupon>,
    tier: MembershipTier,
    settings: &DiscountSettings,
) -> Result<(), SummaryError> {
    let mut lines: SmallVec<[(String, String); 5]> = SmallVec::new();

    lines.push(("Subtotal:".to_string(), format_amount(breakdown.subtotal)));

    let shipping = if breakdown.shipping_fee == 0 {
        "free".to_string()
    } else {
        format_amount(breakdown.shipping_fee)
    };

    lines.push(("Shipping:".to_string(), shipping));

    if let Some(coupon) = coupon.filter(|_| breakdown.coupon_discount > 0) {
        lines.push((
            format!("Coupon {}:", coupon.code),
            format!("-{}", format_amount(breakdown.coupon_discount)),
        ));
    }

    if breakdown.member_discount > 0 {
        let label = settings
            .scale_label_for(tier)
            .map_or_else(|| tier.label().to_string(), |scale| {
                format!("{} {scale}", tier.label())
            });

        lines.push((
            format!("{label}:"),
            format!("-{}", format_amount(breakdown.member_discount)),
        ));
    }

    lines.push(("Total:".to_string(), format_amount(breakdown.grand_total)));

    let label_width = lines.iter().map(|(label, _)| label.chars().count()).max();
    let value_width = lines.iter().map(|(_, value)| value.chars().count()).max();

    let (Some(label_width), Some(value_width)) = (label_width, value_width) else {
        return Ok(());
    };

    for (label, value) in &lines {
        writeln!(out, " {label:>label_width$}  {value:>value_width$}")
            .map_err(|_err| SummaryError::Io)?;
    }

    writeln!(out).map_err(|_err| SummaryError::Io)
}
