//! Dashboard and analytics datasets.
//!
//! These are static figures; the reporting pipeline that would compute them
//! from the lead tables does not exist yet.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
  pub name:   String,
  pub value:  String,
  pub change: String,
}

fn metric(name: &str, value: &str, change: &str) -> Metric {
  Metric { name: name.into(), value: value.into(), change: change.into() }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementWeek {
  pub name:      String,
  pub emails:    u32,
  pub opens:     u32,
  pub clicks:    u32,
  pub responses: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelStage {
  pub stage:       String,
  pub probability: u32,
  pub count:       u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSource {
  pub name:  String,
  /// Share of new leads, in percent.
  pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsReport {
  pub metrics:      Vec<Metric>,
  pub engagement:   Vec<EngagementWeek>,
  pub funnel:       Vec<FunnelStage>,
  pub lead_sources: Vec<LeadSource>,
}

pub fn report() -> AnalyticsReport {
  let engagement = [
    (45, 32, 18, 8),
    (52, 38, 22, 12),
    (48, 35, 19, 9),
    (56, 42, 28, 15),
  ]
  .into_iter()
  .enumerate()
  .map(|(i, (emails, opens, clicks, responses))| EngagementWeek {
    name: format!("Week {}", i + 1),
    emails,
    opens,
    clicks,
    responses,
  })
  .collect();

  let funnel = [
    ("Lead", 100, 150),
    ("Qualified", 85, 127),
    ("Demo Sent", 65, 82),
    ("Proposal", 45, 37),
    ("Negotiation", 25, 16),
    ("Closed Won", 24, 12),
  ]
  .into_iter()
  .map(|(stage, probability, count)| FunnelStage {
    stage: stage.into(),
    probability,
    count,
  })
  .collect();

  let lead_sources = [
    ("LinkedIn", 35),
    ("Website", 28),
    ("Email Campaign", 20),
    ("Referrals", 12),
    ("Other", 5),
  ]
  .into_iter()
  .map(|(name, value)| LeadSource { name: name.into(), value })
  .collect();

  AnalyticsReport {
    metrics: vec![
      metric("Email Open Rate", "68.5%", "+5.2%"),
      metric("Response Rate", "23.4%", "+3.1%"),
      metric("Demo Conversion", "41.2%", "+8.7%"),
      metric("Win Probability", "24.1%", "+2.3%"),
    ],
    engagement,
    funnel,
    lead_sources,
  }
}

/// Headline numbers on the home dashboard.
pub fn dashboard_stats() -> Vec<Metric> {
  vec![
    metric("Total Leads", "2,847", "+12.3%"),
    metric("Qualified Leads", "1,234", "+8.1%"),
    metric("Demos Sent", "567", "+23.4%"),
    metric("Win Rate", "24.5%", "+3.2%"),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lead_sources_sum_to_100() {
    let total: u32 = report().lead_sources.iter().map(|s| s.value).sum();
    assert_eq!(total, 100);
  }

  #[test]
  fn funnel_counts_never_grow() {
    let funnel = report().funnel;
    assert_eq!(funnel.len(), 6);
    assert!(funnel.windows(2).all(|w| w[0].count >= w[1].count));
  }

  #[test]
  fn weeks_are_labelled_in_order() {
    let names: Vec<_> =
      report().engagement.into_iter().map(|w| w.name).collect();
    assert_eq!(names, ["Week 1", "Week 2", "Week 3", "Week 4"]);
  }
}
