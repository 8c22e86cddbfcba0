//! BANT scoring and the pipeline stage derived from it.
//!
//! A lead is scored on four factors (budget, authority, need, timeline), each
//! in `0..=100`. The total is their arithmetic mean and is the only input to
//! [`Stage::from_total`]. [`Bant::total`] is the single place the total is
//! computed; stores persist its result on every write and never accept one
//! from a caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator as _};
use uuid::Uuid;

use crate::{Error, Result};

/// Upper bound of every sub-score.
pub const MAX_SCORE: u8 = 100;

// ─── BANT ────────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct Bant {
  pub budget:    u8,
  pub authority: u8,
  pub need:      u8,
  pub timeline:  u8,
}

impl Bant {
  /// The same value for all four factors.
  pub fn uniform(score: u8) -> Self {
    Self { budget: score, authority: score, need: score, timeline: score }
  }

  pub fn validate(&self) -> Result<()> {
    for (field, value) in self.factors() {
      if value > MAX_SCORE {
        return Err(Error::ScoreOutOfRange { field, value });
      }
    }
    Ok(())
  }

  /// Arithmetic mean of the four factors.
  pub fn total(&self) -> f64 {
    let sum: u32 = self.factors().iter().map(|(_, v)| u32::from(*v)).sum();
    f64::from(sum) / 4.0
  }

  fn factors(&self) -> [(&'static str, u8); 4] {
    [
      ("budget", self.budget),
      ("authority", self.authority),
      ("need", self.need),
      ("timeline", self.timeline),
    ]
  }
}

/// A persisted score row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadScore {
  pub lead_id:     Uuid,
  #[serde(flatten)]
  pub bant:        Bant,
  /// Always equal to `bant.total()`; recomputed by the store on write.
  pub total_score: f64,
  pub updated_at:  DateTime<Utc>,
}

// ─── Stages ──────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
  #[strum(to_string = "Initial Contact")]
  InitialContact,
  #[strum(to_string = "Qualified")]
  Qualified,
  #[strum(to_string = "Demo Scheduled")]
  DemoScheduled,
  #[strum(to_string = "Proposal Sent")]
  ProposalSent,
  #[strum(to_string = "Negotiation")]
  Negotiation,
  #[strum(to_string = "Closed")]
  Closed,
}

/// Number of pipeline stages.
pub const STAGE_COUNT: u8 = 6;

impl Stage {
  /// Map a total score to its stage. Thresholds are inclusive lower bounds.
  pub fn from_total(total: f64) -> Self {
    if total >= 80.0 {
      Self::Closed
    } else if total >= 65.0 {
      Self::Negotiation
    } else if total >= 50.0 {
      Self::ProposalSent
    } else if total >= 35.0 {
      Self::DemoScheduled
    } else if total >= 20.0 {
      Self::Qualified
    } else {
      Self::InitialContact
    }
  }

  /// The score written to all four factors when a user picks this stage by
  /// hand. Each value sits inside its own stage's band, so
  /// `Stage::from_total(f64::from(s.synthetic_score())) == s`.
  pub fn synthetic_score(self) -> u8 {
    match self {
      Self::InitialContact => 10,
      Self::Qualified => 25,
      Self::DemoScheduled => 40,
      Self::ProposalSent => 55,
      Self::Negotiation => 70,
      Self::Closed => 85,
    }
  }

  /// 1-based position in the pipeline.
  pub fn step(self) -> u8 {
    Self::iter().position(|s| s == self).map_or(1, |i| i as u8 + 1)
  }

  /// Completion percentage shown by the progress bar.
  pub fn progress(self) -> u8 {
    (f64::from(self.step()) / f64::from(STAGE_COUNT) * 100.0).round() as u8
  }

  pub fn all() -> Vec<Self> { Self::iter().collect() }
}

// ─── Read model ──────────────────────────────────────────────────────────────

/// What the lead detail page shows about a lead's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
  #[serde(flatten)]
  pub bant:        Bant,
  pub total_score: f64,
  pub stage:       Stage,
  pub stage_label: String,
  pub step:        u8,
  pub steps:       u8,
  pub progress:    u8,
  /// `false` when the lead has never been scored.
  pub scored:      bool,
}

impl ScoreCard {
  pub fn new(bant: Option<Bant>) -> Self {
    let scored = bant.is_some();
    let bant = bant.unwrap_or_default();
    let total_score = bant.total();
    let stage = Stage::from_total(total_score);
    Self {
      bant,
      total_score,
      stage,
      stage_label: stage.to_string(),
      step: stage.step(),
      steps: STAGE_COUNT,
      progress: stage.progress(),
      scored,
    }
  }
}

// ─── Evaluation ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Temperature {
  Hot,
  Warm,
  Cold,
}

impl Temperature {
  pub fn from_total(total: u8) -> Self {
    if total >= 70 {
      Self::Hot
    } else if total >= 40 {
      Self::Warm
    } else {
      Self::Cold
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
  pub title:  String,
  pub action: String,
}

impl Recommendation {
  fn new(title: &str, action: &str) -> Self {
    Self { title: title.into(), action: action.into() }
  }
}

/// Output of the standalone scoring worksheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
  #[serde(flatten)]
  pub bant:            Bant,
  /// Mean rounded to the nearest integer.
  pub total_score:     u8,
  pub temperature:     Temperature,
  pub stage:           Stage,
  pub recommendations: Vec<Recommendation>,
}

/// Score a lead on the worksheet and suggest next actions.
pub fn evaluate(bant: Bant) -> Result<Evaluation> {
  bant.validate()?;
  let total_score = bant.total().round() as u8;
  let mut recommendations = Vec::new();
  if total_score < 70 {
    if bant.timeline < 50 {
      recommendations.push(Recommendation::new(
        "Timeline Score Low",
        "Schedule discovery call to understand urgency and implementation \
         timeline",
      ));
    }
    if bant.authority < 50 {
      recommendations.push(Recommendation::new(
        "Authority Score Low",
        "Request introduction to decision makers and map stakeholder influence",
      ));
    }
    if bant.budget < 50 {
      recommendations.push(Recommendation::new(
        "Budget Score Low",
        "Discuss budget range and ROI expectations with economic buyer",
      ));
    }
  } else {
    recommendations.push(Recommendation::new(
      "High-Quality Lead",
      "Proceed with proposal preparation and demo scheduling",
    ));
  }
  Ok(Evaluation {
    bant,
    total_score,
    temperature: Temperature::from_total(total_score),
    stage: Stage::from_total(f64::from(total_score)),
    recommendations,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn total_is_mean_and_bounded() {
    let samples = [
      Bant::uniform(0),
      Bant::uniform(100),
      Bant { budget: 75, authority: 60, need: 85, timeline: 40 },
      Bant { budget: 100, authority: 0, need: 0, timeline: 1 },
    ];
    for bant in samples {
      let expected = (f64::from(bant.budget)
        + f64::from(bant.authority)
        + f64::from(bant.need)
        + f64::from(bant.timeline))
        / 4.0;
      let total = bant.total();
      assert_eq!(total, expected);
      assert!((0.0..=100.0).contains(&total));
    }
  }

  #[test]
  fn out_of_range_factor_rejected() {
    let bant = Bant { budget: 50, authority: 101, need: 0, timeline: 0 };
    assert!(matches!(
      bant.validate(),
      Err(Error::ScoreOutOfRange { field: "authority", value: 101 })
    ));
  }

  #[test]
  fn stage_thresholds() {
    assert_eq!(Stage::from_total(0.0), Stage::InitialContact);
    assert_eq!(Stage::from_total(19.75), Stage::InitialContact);
    assert_eq!(Stage::from_total(20.0), Stage::Qualified);
    assert_eq!(Stage::from_total(35.0), Stage::DemoScheduled);
    assert_eq!(Stage::from_total(50.0), Stage::ProposalSent);
    assert_eq!(Stage::from_total(64.75), Stage::ProposalSent);
    assert_eq!(Stage::from_total(65.0), Stage::Negotiation);
    assert_eq!(Stage::from_total(80.0), Stage::Closed);
    assert_eq!(Stage::from_total(100.0), Stage::Closed);
  }

  #[test]
  fn stage_is_monotonic() {
    // Every reachable total is a multiple of 0.25.
    let mut previous = Stage::InitialContact;
    for quarter in 0..=400 {
      let stage = Stage::from_total(f64::from(quarter) / 4.0);
      assert!(stage >= previous, "regressed at {}", f64::from(quarter) / 4.0);
      previous = stage;
    }
  }

  #[test]
  fn synthetic_score_lands_in_own_stage() {
    for stage in Stage::all() {
      let bant = Bant::uniform(stage.synthetic_score());
      assert_eq!(Stage::from_total(bant.total()), stage);
    }
  }

  #[test]
  fn steps_and_progress() {
    assert_eq!(Stage::InitialContact.step(), 1);
    assert_eq!(Stage::Closed.step(), 6);
    assert_eq!(Stage::InitialContact.progress(), 17);
    assert_eq!(Stage::ProposalSent.progress(), 67);
    assert_eq!(Stage::Closed.progress(), 100);
  }

  #[test]
  fn stage_labels() {
    assert_eq!(Stage::DemoScheduled.to_string(), "Demo Scheduled");
    let json = serde_json::to_string(&Stage::ProposalSent).unwrap();
    assert_eq!(json, r#""proposal_sent""#);
  }

  #[test]
  fn unscored_card_is_initial_contact() {
    let card = ScoreCard::new(None);
    assert!(!card.scored);
    assert_eq!(card.total_score, 0.0);
    assert_eq!(card.stage, Stage::InitialContact);
    assert_eq!(card.step, 1);
  }

  #[test]
  fn worksheet_defaults_are_warm() {
    let eval =
      evaluate(Bant { budget: 75, authority: 60, need: 85, timeline: 40 })
        .unwrap();
    assert_eq!(eval.total_score, 65);
    assert_eq!(eval.temperature, Temperature::Warm);
    assert_eq!(eval.stage, Stage::Negotiation);
    let titles: Vec<_> =
      eval.recommendations.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["Timeline Score Low"]);
  }

  #[test]
  fn hot_lead_gets_single_recommendation() {
    let eval = evaluate(Bant::uniform(90)).unwrap();
    assert_eq!(eval.temperature, Temperature::Hot);
    assert_eq!(eval.recommendations.len(), 1);
    assert_eq!(eval.recommendations[0].title, "High-Quality Lead");
  }

  #[test]
  fn cold_lead_gets_all_low_factor_actions() {
    let eval = evaluate(Bant::uniform(10)).unwrap();
    assert_eq!(eval.temperature, Temperature::Cold);
    assert_eq!(eval.recommendations.len(), 3);
  }
}
