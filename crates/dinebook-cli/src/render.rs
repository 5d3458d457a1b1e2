//! Plain-text rendering of directory records for the terminal.

use std::fmt::Write as _;

use dinebook_core::{
  restaurant::Restaurant,
  review::{PendingReview, Review},
};
use dinebook_sync::{ReplayReport, SubmitOutcome};

const WEEK: [&str; 7] =
  ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"];

pub fn restaurant_line(r: &Restaurant) -> String {
  let star = if r.is_favorite { " ★" } else { "" };
  format!("{:>4}  {}{star}  ({}, {})", r.id.0, r.name, r.cuisine_type, r.neighborhood)
}

pub fn restaurant_detail(r: &Restaurant) -> String {
  let mut out = String::new();
  let star = if r.is_favorite { " ★" } else { "" };
  let _ = writeln!(out, "{}{star}", r.name);
  let _ = writeln!(out, "  cuisine:      {}", r.cuisine_type);
  let _ = writeln!(out, "  neighborhood: {}", r.neighborhood);
  if !r.address.is_empty() {
    let _ = writeln!(out, "  address:      {}", r.address);
  }
  if let Some(pos) = r.latlng {
    let _ = writeln!(out, "  location:     {:.6}, {:.6}", pos.lat, pos.lng);
  }
  let _ = writeln!(out, "  image:        {}", r.image_url());
  let _ = writeln!(out, "  image alt:    {}", r.image_alt());
  let _ = writeln!(out, "  page:         {}", r.detail_path());

  if !r.operating_hours.is_empty() {
    let _ = writeln!(out, "  hours:");
    for (day, hours) in ordered_hours(r) {
      let _ = writeln!(out, "    {day:<10} {hours}");
    }
  }
  out
}

/// Opening hours in week order; unrecognized day names follow alphabetically.
fn ordered_hours(r: &Restaurant) -> Vec<(&str, &str)> {
  let known = WEEK
    .iter()
    .filter_map(|day| r.operating_hours.get(*day).map(|h| (*day, h.as_str())));
  let other = r
    .operating_hours
    .iter()
    .filter(|(day, _)| !WEEK.contains(&day.as_str()))
    .map(|(day, h)| (day.as_str(), h.as_str()));
  known.chain(other).collect()
}

pub fn review_block(r: &Review) -> String {
  let status = if r.is_confirmed() { "" } else { " (local copy)" };
  format!(
    "{}  {}/5  {}{status}\n  {}",
    r.name,
    r.rating,
    r.created_at.format("%B %-d, %Y"),
    r.comments
  )
}

pub fn pending_line(p: &PendingReview) -> String {
  format!(
    "#{:<3} restaurant {}  {} {}/5  {}",
    p.queue_id.0,
    p.review.restaurant_id,
    p.review.name,
    p.review.rating,
    p.review.created_at.format("%Y-%m-%d %H:%M")
  )
}

pub fn submit_outcome(outcome: &SubmitOutcome) -> String {
  match outcome {
    SubmitOutcome::Posted(review) => match review.id {
      Some(id) => format!("Review posted (id {id})."),
      None => "Review posted.".to_owned(),
    },
    SubmitOutcome::Queued(p) => format!(
      "Offline: review queued as #{} and will be sent on reconnect.",
      p.queue_id.0
    ),
  }
}

/// Summary for the replay run at startup; silent when there was nothing to do.
pub fn startup_replay(report: &ReplayReport) -> Option<String> {
  (*report != ReplayReport::default()).then(|| replay_report(report))
}

pub fn replay_report(report: &ReplayReport) -> String {
  match (report.posted, report.remaining) {
    (0, 0) => "Nothing pending.".to_owned(),
    (n, 0) => format!("Sent {n} pending review(s)."),
    (n, left) => format!("Sent {n} pending review(s); {left} still pending."),
  }
}
