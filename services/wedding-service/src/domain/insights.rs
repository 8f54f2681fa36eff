//! Admin planning insights: reminders, catering analysis, response
//! analytics and attendance projections.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

use super::rsvp::RsvpStats;

pub const DIETARY_REMINDER_WINDOW_DAYS: i64 = 21;
pub const TABLE_REMINDER_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationAction {
    AutoTableOptimization,
    SmartReminders,
    DietaryInsights,
    GuestAnalytics,
    RsvpPrediction,
}

impl AutomationAction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "auto_table_optimization" => Some(Self::AutoTableOptimization),
            "smart_reminders" => Some(Self::SmartReminders),
            "dietary_insights" => Some(Self::DietaryInsights),
            "guest_analytics" => Some(Self::GuestAnalytics),
            "rsvp_prediction" => Some(Self::RsvpPrediction),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendedAction {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub priority: &'static str,
    pub message: String,
    pub action: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SmartReminders {
    pub incomplete_dietary: i64,
    pub unassigned_parties: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_event: Option<i64>,
    pub recommended_actions: Vec<RecommendedAction>,
}

fn within(days_until_event: Option<i64>, window: i64) -> bool {
    days_until_event.is_none_or(|days| days <= window)
}

/// Without an event date every reminder is considered due.
pub fn smart_reminders(
    incomplete_dietary: i64,
    unassigned_parties: i64,
    days_until_event: Option<i64>,
) -> SmartReminders {
    let mut actions = Vec::new();

    if incomplete_dietary > 0 && within(days_until_event, DIETARY_REMINDER_WINDOW_DAYS) {
        actions.push(RecommendedAction {
            kind: "dietary_reminder",
            priority: "medium",
            message: format!(
                "Request dietary information from {incomplete_dietary} attending guests"
            ),
            action: "send_dietary_reminder",
        });
    }

    if unassigned_parties > 0 && within(days_until_event, TABLE_REMINDER_WINDOW_DAYS) {
        actions.push(RecommendedAction {
            kind: "table_assignment",
            priority: "medium",
            message: format!("Assign tables for {unassigned_parties} guests"),
            action: "auto_assign_tables",
        });
    }

    SmartReminders {
        incomplete_dietary,
        unassigned_parties,
        days_until_event,
        recommended_actions: actions,
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DietaryRow {
    pub dietary_needs: String,
    pub table_number: Option<i32>,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DietaryRecommendation {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub requirement: String,
    pub count: i64,
    pub percentage: u32,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DietaryInsights {
    pub attending_guests: i64,
    pub overall_stats: BTreeMap<String, i64>,
    pub table_breakdown: BTreeMap<i32, BTreeMap<String, i64>>,
    pub recommendations: Vec<DietaryRecommendation>,
}

pub fn dietary_insights(rows: Vec<DietaryRow>, attending_guests: i64) -> DietaryInsights {
    let mut overall: BTreeMap<String, i64> = BTreeMap::new();
    let mut tables: BTreeMap<i32, BTreeMap<String, i64>> = BTreeMap::new();

    for row in rows {
        *overall.entry(row.dietary_needs.clone()).or_default() += row.count;
        if let Some(table) = row.table_number {
            *tables
                .entry(table)
                .or_default()
                .entry(row.dietary_needs)
                .or_default() += row.count;
        }
    }

    let mut recommendations: Vec<DietaryRecommendation> = overall
        .iter()
        .filter(|_| attending_guests > 0)
        .filter_map(|(requirement, &count)| {
            let percentage = count as f64 / attending_guests as f64 * 100.0;
            let (kind, suggestion) = if percentage > 20.0 {
                (
                    "high_priority",
                    format!("Consider making {requirement} options prominent in the menu"),
                )
            } else if percentage > 10.0 {
                (
                    "medium_priority",
                    format!("Ensure {requirement} options are clearly labeled"),
                )
            } else {
                return None;
            };
            Some(DietaryRecommendation {
                kind,
                requirement: requirement.clone(),
                count,
                percentage: percentage.round() as u32,
                suggestion,
            })
        })
        .collect();
    recommendations.sort_by(|a, b| b.count.cmp(&a.count));

    DietaryInsights {
        attending_guests,
        overall_stats: overall,
        table_breakdown: tables,
        recommendations,
    }
}

/// RSVPs received on one calendar day.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct DailyRsvps {
    pub date: NaiveDate,
    pub rsvps: i64,
    pub attending: i64,
    pub declined: i64,
}

/// Days between first submission and last update, across all RSVPs.
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize)]
pub struct ResponseTimes {
    pub avg_response_days: Option<f64>,
    pub fastest_response: Option<f64>,
    pub slowest_response: Option<f64>,
}

impl ResponseTimes {
    fn rounded(self) -> Self {
        let tenth = |v: Option<f64>| v.map(|d| (d * 10.0).round() / 10.0);
        Self {
            avg_response_days: tenth(self.avg_response_days),
            fastest_response: tenth(self.fastest_response),
            slowest_response: tenth(self.slowest_response),
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct DietaryCount {
    pub dietary_needs: String,
    pub count: i64,
}

/// Attending RSVPs grouped by party size.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct PartySize {
    pub guest_count: i32,
    pub rsvp_count: i64,
    pub total_guests: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GuestAnalytics {
    pub total_rsvps: i64,
    pub expected_guests: i64,
    pub rsvp_trends: Vec<DailyRsvps>,
    pub response_times: ResponseTimes,
    pub dietary_summary: Vec<DietaryCount>,
    pub guest_distribution: Vec<PartySize>,
}

pub fn guest_analytics(
    rsvp_trends: Vec<DailyRsvps>,
    response_times: ResponseTimes,
    dietary_summary: Vec<DietaryCount>,
    guest_distribution: Vec<PartySize>,
) -> GuestAnalytics {
    GuestAnalytics {
        total_rsvps: rsvp_trends.iter().map(|d| d.rsvps).sum(),
        expected_guests: guest_distribution.iter().map(|p| p.total_guests).sum(),
        rsvp_trends,
        response_times: response_times.rounded(),
        dietary_summary,
        guest_distribution,
    }
}

// Response rate is never projected above this.
const MAX_EXPECTED_RESPONSE_RATE: f64 = 0.95;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentStats {
    pub total_invited: i64,
    pub total_responded: i64,
    pub total_attending: i64,
    pub response_rate: u32,
    pub attendance_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Predictions {
    pub predicted_final_responses: i64,
    pub predicted_final_attendance: i64,
    pub expected_response_rate: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RsvpPrediction {
    pub current_stats: CurrentStats,
    pub predictions: Predictions,
    pub historical_trends: Vec<DailyRsvps>,
}

fn ratio(part: i64, whole: i64) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64
    } else {
        0.0
    }
}

fn percent(rate: f64) -> u32 {
    (rate * 100.0).round() as u32
}

/// Projects final responses and attendance from the current rates. Empty
/// totals yield zero rates rather than NaN.
pub fn rsvp_prediction(stats: &RsvpStats, historical_trends: Vec<DailyRsvps>) -> RsvpPrediction {
    let invited = stats.total_responses;
    let responded = stats.attending + stats.not_attending;

    let response_rate = ratio(responded, invited);
    let attendance_rate = ratio(stats.attending, responded);
    let expected_response_rate = (response_rate + 0.1)
        .min(MAX_EXPECTED_RESPONSE_RATE)
        .max(response_rate);

    RsvpPrediction {
        current_stats: CurrentStats {
            total_invited: invited,
            total_responded: responded,
            total_attending: stats.attending,
            response_rate: percent(response_rate),
            attendance_rate: percent(attendance_rate),
        },
        predictions: Predictions {
            predicted_final_responses: (invited as f64 * expected_response_rate).round() as i64,
            predicted_final_attendance: (invited as f64 * response_rate * attendance_rate).round() as i64,
            expected_response_rate: percent(expected_response_rate),
        },
        historical_trends,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_action_is_rejected() {
        assert_eq!(
            AutomationAction::parse("smart_reminders"),
            Some(AutomationAction::SmartReminders)
        );
        assert_eq!(
            AutomationAction::parse("rsvp_prediction"),
            Some(AutomationAction::RsvpPrediction)
        );
        assert_eq!(AutomationAction::parse("qr_codes"), None);
    }

    #[test]
    fn reminders_respect_event_windows() {
        let far = smart_reminders(3, 2, Some(45));
        assert!(far.recommended_actions.is_empty());

        let month = smart_reminders(3, 2, Some(25));
        assert_eq!(month.recommended_actions.len(), 1);
        assert_eq!(month.recommended_actions[0].kind, "table_assignment");

        let close = smart_reminders(3, 2, Some(10));
        assert_eq!(close.recommended_actions.len(), 2);
        assert_eq!(close.recommended_actions[0].kind, "dietary_reminder");
    }

    #[test]
    fn reminders_always_due_without_event_date() {
        let reminders = smart_reminders(1, 1, None);
        assert_eq!(reminders.recommended_actions.len(), 2);
    }

    #[test]
    fn nothing_outstanding_means_no_actions() {
        assert!(smart_reminders(0, 0, Some(1)).recommended_actions.is_empty());
    }

    fn row(needs: &str, table: Option<i32>, count: i64) -> DietaryRow {
        DietaryRow {
            dietary_needs: needs.to_string(),
            table_number: table,
            count,
        }
    }

    #[test]
    fn dietary_thresholds_use_attending_count() {
        let rows = vec![
            row("vegan", Some(1), 2),
            row("vegan", Some(2), 1),
            row("gluten-free", None, 2),
            row("nut allergy", Some(1), 1),
        ];
        let insights = dietary_insights(rows, 12);

        assert_eq!(insights.overall_stats["vegan"], 3);
        assert_eq!(insights.table_breakdown[&1]["vegan"], 2);
        assert!(!insights.table_breakdown.values().any(|t| t.contains_key("gluten-free")));

        // vegan 25% high, gluten-free ~17% medium, nut allergy ~8% none
        assert_eq!(insights.recommendations.len(), 2);
        assert_eq!(insights.recommendations[0].requirement, "vegan");
        assert_eq!(insights.recommendations[0].kind, "high_priority");
        assert_eq!(insights.recommendations[0].percentage, 25);
        assert_eq!(insights.recommendations[1].kind, "medium_priority");
    }

    #[test]
    fn no_attendees_means_no_recommendations() {
        let insights = dietary_insights(vec![row("vegan", None, 1)], 0);
        assert!(insights.recommendations.is_empty());
    }

    fn day(d: u32, rsvps: i64, attending: i64) -> DailyRsvps {
        DailyRsvps {
            date: NaiveDate::from_ymd_opt(2026, 3, d).unwrap(),
            rsvps,
            attending,
            declined: rsvps - attending,
        }
    }

    #[test]
    fn analytics_totals_and_rounding() {
        let analytics = guest_analytics(
            vec![day(1, 3, 2), day(2, 4, 4)],
            ResponseTimes {
                avg_response_days: Some(1.2345),
                fastest_response: Some(0.0),
                slowest_response: Some(6.96),
            },
            vec![DietaryCount { dietary_needs: "vegan".into(), count: 2 }],
            vec![
                PartySize { guest_count: 1, rsvp_count: 2, total_guests: 2 },
                PartySize { guest_count: 3, rsvp_count: 1, total_guests: 3 },
            ],
        );

        assert_eq!(analytics.total_rsvps, 7);
        assert_eq!(analytics.expected_guests, 5);
        assert_eq!(analytics.response_times.avg_response_days, Some(1.2));
        assert_eq!(analytics.response_times.slowest_response, Some(7.0));
    }

    #[test]
    fn analytics_without_rsvps_is_empty() {
        let analytics = guest_analytics(vec![], ResponseTimes::default(), vec![], vec![]);
        assert_eq!(analytics.total_rsvps, 0);
        assert_eq!(analytics.response_times.avg_response_days, None);
    }

    fn stats(total: i64, attending: i64, not_attending: i64) -> RsvpStats {
        RsvpStats {
            total_responses: total,
            attending,
            not_attending,
            total_guests: 0,
        }
    }

    #[test]
    fn prediction_projects_from_current_rates() {
        // 20 invited, 10 answered, 8 of those coming
        let prediction = rsvp_prediction(&stats(20, 8, 2), vec![day(1, 20, 8)]);

        assert_eq!(prediction.current_stats.response_rate, 50);
        assert_eq!(prediction.current_stats.attendance_rate, 80);
        assert_eq!(prediction.predictions.expected_response_rate, 60);
        assert_eq!(prediction.predictions.predicted_final_responses, 12);
        assert_eq!(prediction.predictions.predicted_final_attendance, 8);
        assert_eq!(prediction.historical_trends.len(), 1);
    }

    #[test]
    fn expected_rate_never_drops_below_current() {
        let prediction = rsvp_prediction(&stats(10, 7, 3), vec![]);
        assert_eq!(prediction.current_stats.response_rate, 100);
        assert_eq!(prediction.predictions.expected_response_rate, 100);
        assert_eq!(prediction.predictions.predicted_final_responses, 10);
    }

    #[test]
    fn prediction_without_rsvps_has_zero_rates() {
        let prediction = rsvp_prediction(&stats(0, 0, 0), vec![]);
        assert_eq!(prediction.current_stats.response_rate, 0);
        assert_eq!(prediction.current_stats.attendance_rate, 0);
        assert_eq!(prediction.predictions.predicted_final_attendance, 0);
        assert_eq!(prediction.predictions.predicted_final_responses, 0);
    }

    #[test]
    fn prediction_with_no_answers_has_zero_attendance_rate() {
        let prediction = rsvp_prediction(&stats(10, 0, 0), vec![]);
        assert_eq!(prediction.current_stats.response_rate, 0);
        assert_eq!(prediction.current_stats.attendance_rate, 0);
        assert_eq!(prediction.predictions.expected_response_rate, 10);
        assert_eq!(prediction.predictions.predicted_final_responses, 1);
    }
}
