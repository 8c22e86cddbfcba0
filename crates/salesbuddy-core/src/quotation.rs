//! Quote builder math.
//!
//! Quotes are never persisted. The client posts the current worksheet and
//! gets back the computed totals, margin analysis and whether the quote may
//! be sent.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Average margin used for the projected-profit estimate.
pub const PROJECTED_MARGIN: f64 = 0.38;

/// Margin at or above which a line is considered healthy.
pub const TARGET_MARGIN: f64 = 40.0;

/// Margin below which a line is flagged.
pub const FLOOR_MARGIN: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
  pub name:       String,
  pub quantity:   u32,
  pub unit_price: f64,
  /// Margin as a percentage of the unit price.
  #[serde(default)]
  pub margin:     f64,
}

impl LineItem {
  pub fn new(name: &str, quantity: u32, unit_price: f64, margin: f64) -> Self {
    Self { name: name.into(), quantity, unit_price, margin }
  }

  pub fn total(&self) -> f64 { f64::from(self.quantity) * self.unit_price }

  /// Cost per unit implied by the margin.
  pub fn unit_cost(&self) -> f64 { self.unit_price * (1.0 - self.margin / 100.0) }

  pub fn margin_band(&self) -> MarginBand { MarginBand::of(self.margin) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginBand {
  Healthy,
  Fair,
  Low,
}

impl MarginBand {
  pub fn of(margin: f64) -> Self {
    if margin >= TARGET_MARGIN {
      Self::Healthy
    } else if margin >= FLOOR_MARGIN {
      Self::Fair
    } else {
      Self::Low
    }
  }
}

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
  #[default]
  Pending,
  Approved,
  NeedsReview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendVia {
  Email,
  Whatsapp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
  pub customer:    String,
  pub contact:     String,
  pub email:       String,
  pub items:       Vec<LineItem>,
  /// Discount as a percentage of the subtotal.
  #[serde(default)]
  pub discount:    f64,
  pub valid_until: String,
  #[serde(default)]
  pub status:      ApprovalStatus,
}

impl Quote {
  /// The worksheet the quote page opens with.
  pub fn sample() -> Self {
    Self {
      customer:    "Acme Corporation".into(),
      contact:     "John Doe".into(),
      email:       "john@acme.com".into(),
      items:       vec![
        LineItem::new("Enterprise Software License", 5, 1200.0, 40.0),
        LineItem::new("Implementation Services", 1, 8000.0, 35.0),
        LineItem::new("Training & Support", 1, 3000.0, 50.0),
      ],
      discount:    10.0,
      valid_until: "2024-02-15".into(),
      status:      ApprovalStatus::Pending,
    }
  }

  pub fn subtotal(&self) -> f64 { self.items.iter().map(LineItem::total).sum() }

  pub fn discount_amount(&self) -> f64 { self.subtotal() * self.discount / 100.0 }

  pub fn total(&self) -> f64 { self.subtotal() - self.discount_amount() }

  pub fn projected_profit(&self) -> f64 { self.total() * PROJECTED_MARGIN }

  /// Reject worksheets whose numbers cannot describe a real quote: discount
  /// and margins must lie in `0..=100`, unit prices must not be negative.
  pub fn validate(&self) -> Result<()> {
    if !percentage(self.discount) {
      return Err(Error::InvalidQuote(format!(
        "discount {} is outside 0..=100",
        self.discount
      )));
    }
    for item in &self.items {
      if !item.unit_price.is_finite() || item.unit_price < 0.0 {
        return Err(Error::InvalidQuote(format!(
          "{} unit price {} must not be negative",
          item.name, item.unit_price
        )));
      }
      if !percentage(item.margin) {
        return Err(Error::InvalidQuote(format!(
          "{} margin {} is outside 0..=100",
          item.name, item.margin
        )));
      }
    }
    Ok(())
  }

  /// Only valid, approved quotes may leave the building.
  pub fn ensure_sendable(&self) -> Result<()> {
    self.validate()?;
    if self.status != ApprovalStatus::Approved {
      return Err(Error::QuoteNotApproved);
    }
    Ok(())
  }

  /// Pricing hints for lines whose margin is off target in either direction.
  pub fn suggestions(&self) -> Vec<String> {
    self
      .items
      .iter()
      .filter_map(|item| {
        if item.margin < TARGET_MARGIN {
          Some(format!(
            "{} margin is below target - consider value-based pricing",
            item.name
          ))
        } else if item.margin >= 50.0 {
          Some(format!(
            "{} shows strong margin - opportunity to expand this offering",
            item.name
          ))
        } else {
          None
        }
      })
      .collect()
  }

  pub fn summarize(&self) -> Result<QuoteSummary> {
    self.validate()?;
    Ok(QuoteSummary {
      items:            self
        .items
        .iter()
        .map(|item| PricedLine {
          name:      item.name.clone(),
          quantity:  item.quantity,
          total:     item.total(),
          unit_cost: item.unit_cost(),
          margin:    item.margin,
          band:      item.margin_band(),
        })
        .collect(),
      subtotal:         self.subtotal(),
      discount_amount:  self.discount_amount(),
      total:            self.total(),
      projected_profit: self.projected_profit(),
      suggestions:      self.suggestions(),
      status:           self.status,
      sendable:         self.status == ApprovalStatus::Approved,
    })
  }
}

fn percentage(value: f64) -> bool { (0.0..=100.0).contains(&value) }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedLine {
  pub name:      String,
  pub quantity:  u32,
  pub total:     f64,
  pub unit_cost: f64,
  pub margin:    f64,
  pub band:      MarginBand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSummary {
  pub items:            Vec<PricedLine>,
  pub subtotal:         f64,
  pub discount_amount:  f64,
  pub total:            f64,
  pub projected_profit: f64,
  pub suggestions:      Vec<String>,
  pub status:           ApprovalStatus,
  pub sendable:         bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn close(a: f64, b: f64) -> bool { (a - b).abs() < 1e-9 }

  #[test]
  fn sample_quote_totals() {
    let quote = Quote::sample();
    assert!(close(quote.subtotal(), 17_000.0));
    assert!(close(quote.discount_amount(), 1_700.0));
    assert!(close(quote.total(), 15_300.0));
    assert!(close(quote.projected_profit(), 5_814.0));
  }

  #[test]
  fn unit_cost_from_margin() {
    let item = LineItem::new("Implementation Services", 1, 8000.0, 35.0);
    assert!(close(item.unit_cost(), 5200.0));
    assert_eq!(item.margin_band(), MarginBand::Fair);
    assert_eq!(MarginBand::of(24.9), MarginBand::Low);
    assert_eq!(MarginBand::of(40.0), MarginBand::Healthy);
  }

  #[test]
  fn sending_requires_approval() {
    let mut quote = Quote::sample();
    assert!(matches!(quote.ensure_sendable(), Err(Error::QuoteNotApproved)));
    quote.status = ApprovalStatus::NeedsReview;
    assert!(quote.ensure_sendable().is_err());
    quote.status = ApprovalStatus::Approved;
    assert!(quote.ensure_sendable().is_ok());
    assert!(quote.summarize().unwrap().sendable);
  }

  #[test]
  fn out_of_range_discount_is_rejected() {
    let mut quote = Quote {
      items: vec![LineItem::new("Widget", 1, 1000.0, 40.0)],
      discount: 150.0,
      status: ApprovalStatus::Approved,
      ..Quote::sample()
    };
    assert!(matches!(quote.validate(), Err(Error::InvalidQuote(_))));
    assert!(matches!(quote.summarize(), Err(Error::InvalidQuote(_))));
    assert!(matches!(quote.ensure_sendable(), Err(Error::InvalidQuote(_))));

    quote.discount = -20.0;
    assert!(quote.validate().is_err());
    quote.discount = 100.0;
    assert!(quote.validate().is_ok());
    assert_eq!(quote.summarize().unwrap().total, 0.0);
  }

  #[test]
  fn line_item_bounds() {
    let with = |item: LineItem| Quote { items: vec![item], ..Quote::sample() };

    let negative_price = with(LineItem::new("Widget", 1, -500.0, 40.0));
    assert!(matches!(negative_price.validate(), Err(Error::InvalidQuote(_))));

    let wild_margin = with(LineItem::new("Widget", 1, 500.0, 250.0));
    assert!(wild_margin.summarize().is_err());

    let negative_margin = with(LineItem::new("Widget", 1, 500.0, -1.0));
    assert!(negative_margin.validate().is_err());

    let nan_price = with(LineItem::new("Widget", 1, f64::NAN, 40.0));
    assert!(nan_price.validate().is_err());

    let free = with(LineItem::new("Widget", 3, 0.0, 0.0));
    assert!(free.validate().is_ok());
  }

  #[test]
  fn suggestions_flag_both_directions() {
    let suggestions = Quote::sample().suggestions();
    assert_eq!(suggestions.len(), 2);
    assert!(suggestions[0].starts_with("Implementation Services margin"));
    assert!(suggestions[1].starts_with("Training & Support shows strong"));
  }

  #[test]
  fn empty_quote_is_zero() {
    let quote = Quote { items: Vec::new(), ..Quote::sample() };
    assert_eq!(quote.total(), 0.0);
  }
}
