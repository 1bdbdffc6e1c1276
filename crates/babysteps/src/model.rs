//! Entities held in a [`Snapshot`].
//!
//! Field names serialise in camelCase to match the persisted document. Dates
//! stay as the ISO strings they were written with so a load followed by a save
//! never rewrites them.

// Field and variant names mirror the stored document and are not documented
// one by one.
#![allow(missing_docs)]

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::snapshot::lenient;

/// Baby's sex, used for percentile tables and the fallback theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Boy.
    Boy,
    /// Girl.
    Girl,
}

/// Accent colour chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeColor {
    Rose,
    Sky,
    Violet,
    Emerald,
    Amber,
    Indigo,
    Slate,
    Teal,
    Orange,
    Green,
    Cyan,
    Fuchsia,
}

/// The baby profile. A singleton, always replaced as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BabyProfile {
    /// Display name.
    pub name: String,
    /// Birth date as an ISO string.
    pub birth_date: String,
    /// Sex.
    pub gender: Gender,
    /// Birth weight in kilograms.
    pub weight_at_birth: f64,
    /// Birth length in centimetres.
    pub height_at_birth: f64,
    /// Profile photo, usually a data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Whether the baby was born before term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_premature: Option<bool>,
    /// Gestational age at birth in weeks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gestational_weeks: Option<u32>,
    /// Explicit theme selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<ThemeColor>,
}

impl BabyProfile {
    /// The theme to render with: the explicit choice, else one derived from gender.
    #[must_use]
    pub fn theme(&self) -> ThemeColor {
        self.theme_color.unwrap_or(match self.gender {
            Gender::Boy => ThemeColor::Sky,
            Gender::Girl => ThemeColor::Rose,
        })
    }
}

/// Kind of inline media attached to a diary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

/// Diary entry category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryCategory {
    Memory,
    Feeding,
    Sleep,
    Diaper,
    Tooth,
}

/// Which side a breastfeed was on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedingSide {
    Left,
    Right,
    Both,
}

/// Category-specific details of a diary entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDetails {
    /// E.g. `breast`, `bottle`, `wet`, `dirty`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    /// Free-form quantity such as `120ml` or `20dk`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stool_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stool_consistency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<FeedingSide>,
    /// Tooth position code, e.g. `ul1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooth_id: Option<String>,
}

/// A diary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    /// Unique within the diary.
    pub id: String,
    /// ISO timestamp.
    pub date: String,
    /// Entry text.
    pub content: String,
    /// Inline media as a data URI or a remote URL. Opaque to the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<EntryCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<EntryDetails>,
}

/// A weight/height measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthRecord {
    pub id: String,
    /// ISO date of the measurement.
    pub date: String,
    /// Kilograms.
    pub weight: f64,
    /// Centimetres.
    pub height: f64,
    /// Centimetres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_circumference: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentile_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentile_height: Option<f64>,
}

/// A vaccine from the fixed schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vaccine {
    pub id: String,
    pub name: String,
    /// Age in months at which the dose is due.
    pub month_due: u32,
    pub completed: bool,
    /// Set exactly when `completed` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_completed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Developmental area of a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneCategory {
    Motor,
    Social,
    Language,
    Cognitive,
}

/// A developmental milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub title: String,
    /// Typical age in months.
    pub expected_month: u32,
    pub is_completed: bool,
    /// Set exactly when `is_completed` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_completed: Option<String>,
    pub category: MilestoneCategory,
}

/// Calendar event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Doctor,
    Playdate,
    Other,
}

/// A user-created calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    /// ISO timestamp.
    pub date: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Medical history category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryCategory {
    Allergy,
    Condition,
    Surgery,
}

/// An allergy, condition or surgery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalHistoryItem {
    pub id: String,
    pub category: HistoryCategory,
    pub title: String,
    /// Diagnosis or surgery date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Medical document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Lab,
    Imaging,
    Prescription,
    Report,
}

/// A scanned medical document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalDocument {
    pub id: String,
    pub title: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    /// The file as a data URI. Stored as-is, size and type unchecked.
    pub file_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The full application state, persisted as one record.
///
/// Only `profile` is required on read. Every collection tolerates being
/// absent or `null`, and elements that no longer parse are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub profile: BabyProfile,
    /// Newest first.
    #[serde(default, deserialize_with = "lenient::seq")]
    pub entries: Vec<DiaryEntry>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub growth_records: Vec<GrowthRecord>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub vaccines: Vec<Vaccine>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub milestones: Vec<Milestone>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub custom_events: Vec<CalendarEvent>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub medical_history: Vec<MedicalHistoryItem>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub documents: Vec<MedicalDocument>,
}

/// Format a completion stamp the way the rest of the document stores dates.
#[must_use]
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Snapshot {
    /// A snapshot holding only a profile.
    #[must_use]
    pub fn with_profile(profile: BabyProfile) -> Self {
        Self {
            profile,
            entries: Vec::new(),
            growth_records: Vec::new(),
            vaccines: Vec::new(),
            milestones: Vec::new(),
            custom_events: Vec::new(),
            medical_history: Vec::new(),
            documents: Vec::new(),
        }
    }

    /// Replace the profile wholesale.
    pub fn update_profile(&mut self, profile: BabyProfile) {
        self.profile = profile;
    }

    /// Add a diary entry at the front.
    pub fn add_entry(&mut self, entry: DiaryEntry) {
        self.entries.insert(0, entry);
    }

    /// Remove a diary entry. Returns `false` if no entry had that id.
    pub fn delete_entry(&mut self, id: &str) -> bool {
        remove_by(&mut self.entries, |e| e.id == id)
    }

    /// Append a growth measurement.
    pub fn add_growth_record(&mut self, record: GrowthRecord) {
        self.growth_records.push(record);
    }

    /// Append a custom milestone.
    pub fn add_milestone(&mut self, milestone: Milestone) {
        self.milestones.push(milestone);
    }

    /// Flip a vaccine's completion, stamping or clearing `date_completed`.
    pub fn toggle_vaccine(&mut self, id: &str) -> bool {
        self.toggle_vaccine_at(id, Utc::now())
    }

    /// [`toggle_vaccine`](Self::toggle_vaccine) with an explicit clock.
    pub fn toggle_vaccine_at(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        let Some(vaccine) = self.vaccines.iter_mut().find(|v| v.id == id) else {
            return false;
        };
        vaccine.completed = !vaccine.completed;
        vaccine.date_completed = vaccine.completed.then(|| timestamp(now));
        true
    }

    /// Flip a milestone's completion, stamping or clearing `date_completed`.
    pub fn toggle_milestone(&mut self, id: &str) -> bool {
        self.toggle_milestone_at(id, Utc::now())
    }

    /// [`toggle_milestone`](Self::toggle_milestone) with an explicit clock.
    pub fn toggle_milestone_at(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        let Some(milestone) = self.milestones.iter_mut().find(|m| m.id == id) else {
            return false;
        };
        milestone.is_completed = !milestone.is_completed;
        milestone.date_completed = milestone.is_completed.then(|| timestamp(now));
        true
    }

    pub fn add_event(&mut self, event: CalendarEvent) {
        self.custom_events.push(event);
    }

    pub fn delete_event(&mut self, id: &str) -> bool {
        remove_by(&mut self.custom_events, |e| e.id == id)
    }

    pub fn add_history(&mut self, item: MedicalHistoryItem) {
        self.medical_history.push(item);
    }

    pub fn delete_history(&mut self, id: &str) -> bool {
        remove_by(&mut self.medical_history, |i| i.id == id)
    }

    pub fn add_document(&mut self, document: MedicalDocument) {
        self.documents.push(document);
    }

    pub fn delete_document(&mut self, id: &str) -> bool {
        remove_by(&mut self.documents, |d| d.id == id)
    }

    /// The most recent growth measurement by date.
    ///
    /// Dates that don't parse as RFC 3339 compare as plain strings, which is
    /// still chronological for `YYYY-MM-DD` prefixes.
    #[must_use]
    pub fn latest_growth(&self) -> Option<&GrowthRecord> {
        self.growth_records.iter().max_by(|a, b| {
            match (
                DateTime::parse_from_rfc3339(&a.date),
                DateTime::parse_from_rfc3339(&b.date),
            ) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.date.cmp(&b.date),
            }
        })
    }
}

fn remove_by<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
    let before = items.len();
    items.retain(|item| !matches(item));
    items.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn profile() -> BabyProfile {
        BabyProfile {
            name: "Ada".to_string(),
            birth_date: "2024-01-15T00:00:00.000Z".to_string(),
            gender: Gender::Girl,
            weight_at_birth: 3.2,
            height_at_birth: 49.0,
            photo_url: None,
            is_premature: None,
            gestational_weeks: None,
            theme_color: None,
        }
    }

    fn vaccine(id: &str, completed: bool) -> Vaccine {
        Vaccine {
            id: id.to_string(),
            name: "Hepatit B".to_string(),
            month_due: 0,
            completed,
            date_completed: completed.then(|| "2024-01-15".to_string()),
            description: None,
        }
    }

    fn entry(id: &str) -> DiaryEntry {
        DiaryEntry {
            id: id.to_string(),
            date: "2024-02-01T10:00:00.000Z".to_string(),
            content: format!("entry {id}"),
            media_url: None,
            media_type: None,
            tags: None,
            category: None,
            details: None,
        }
    }

    fn growth(id: &str, date: &str) -> GrowthRecord {
        GrowthRecord {
            id: id.to_string(),
            date: date.to_string(),
            weight: 4.0,
            height: 54.0,
            head_circumference: None,
            percentile_weight: None,
            percentile_height: None,
        }
    }

    #[test]
    fn test_toggle_vaccine_stamps_and_clears() {
        let mut snapshot = Snapshot::with_profile(profile());
        snapshot.vaccines.push(vaccine("v6", false));
        let now = Utc.with_ymd_and_hms(2024, 7, 15, 9, 30, 0).unwrap();

        assert!(snapshot.toggle_vaccine_at("v6", now));
        assert!(snapshot.vaccines[0].completed);
        assert_eq!(
            snapshot.vaccines[0].date_completed.as_deref(),
            Some("2024-07-15T09:30:00.000Z")
        );

        assert!(snapshot.toggle_vaccine_at("v6", now));
        assert!(!snapshot.vaccines[0].completed);
        assert!(snapshot.vaccines[0].date_completed.is_none());
    }

    #[test]
    fn test_toggle_vaccine_unknown_id() {
        let mut snapshot = Snapshot::with_profile(profile());
        snapshot.vaccines.push(vaccine("v1", true));
        assert!(!snapshot.toggle_vaccine("missing"));
        assert!(snapshot.vaccines[0].completed);
    }

    #[test]
    fn test_toggle_milestone_follows_same_rule() {
        let mut snapshot = Snapshot::with_profile(profile());
        snapshot.add_milestone(Milestone {
            id: "m3".to_string(),
            title: "Ellerini Keşfetme".to_string(),
            expected_month: 3,
            is_completed: false,
            date_completed: None,
            category: MilestoneCategory::Motor,
        });

        assert!(snapshot.toggle_milestone("m3"));
        assert!(snapshot.milestones[0].is_completed);
        assert!(!snapshot.milestones[0]
            .date_completed
            .as_deref()
            .unwrap_or_default()
            .is_empty());

        assert!(snapshot.toggle_milestone("m3"));
        assert!(snapshot.milestones[0].date_completed.is_none());
    }

    #[test]
    fn test_add_entry_prepends() {
        let mut snapshot = Snapshot::with_profile(profile());
        snapshot.add_entry(entry("e1"));
        snapshot.add_entry(entry("e2"));
        let ids: Vec<_> = snapshot.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["e2", "e1"]);
    }

    #[test]
    fn test_delete_entry() {
        let mut snapshot = Snapshot::with_profile(profile());
        snapshot.add_entry(entry("e1"));
        assert!(snapshot.delete_entry("e1"));
        assert!(!snapshot.delete_entry("e1"));
        assert!(snapshot.entries.is_empty());
    }

    #[test]
    fn test_delete_event_history_document() {
        let mut snapshot = Snapshot::with_profile(profile());
        snapshot.add_event(CalendarEvent {
            id: "c1".to_string(),
            title: "Doktor kontrolü".to_string(),
            date: "2024-03-01T09:00:00.000Z".to_string(),
            kind: EventKind::Doctor,
            notes: None,
        });
        snapshot.add_history(MedicalHistoryItem {
            id: "h1".to_string(),
            category: HistoryCategory::Allergy,
            title: "Penisilin".to_string(),
            date: None,
            notes: None,
        });
        snapshot.add_document(MedicalDocument {
            id: "d1".to_string(),
            title: "Kan tahlili".to_string(),
            date: "2024-03-02".to_string(),
            kind: DocumentKind::Lab,
            file_url: "data:image/png;base64,AAAA".to_string(),
            notes: None,
        });

        assert!(snapshot.delete_event("c1"));
        assert!(snapshot.delete_history("h1"));
        assert!(snapshot.delete_document("d1"));
        assert!(!snapshot.delete_document("d1"));
        assert!(snapshot.custom_events.is_empty());
        assert!(snapshot.medical_history.is_empty());
        assert!(snapshot.documents.is_empty());
    }

    #[test]
    fn test_update_profile_replaces_wholesale() {
        let mut snapshot = Snapshot::with_profile(profile());
        let mut updated = profile();
        updated.name = "Deniz".to_string();
        updated.photo_url = None;
        snapshot.update_profile(updated.clone());
        assert_eq!(snapshot.profile, updated);
    }

    #[test]
    fn test_latest_growth() {
        let mut snapshot = Snapshot::with_profile(profile());
        assert!(snapshot.latest_growth().is_none());

        snapshot.add_growth_record(growth("g2", "2024-03-01T00:00:00.000Z"));
        snapshot.add_growth_record(growth("g3", "2024-04-01T00:00:00.000Z"));
        snapshot.add_growth_record(growth("g1", "2024-02-01T00:00:00.000Z"));
        assert_eq!(snapshot.latest_growth().unwrap().id, "g3");
    }

    #[test]
    fn test_theme_fallback() {
        let mut p = profile();
        assert_eq!(p.theme(), ThemeColor::Rose);
        p.gender = Gender::Boy;
        assert_eq!(p.theme(), ThemeColor::Sky);
        p.theme_color = Some(ThemeColor::Teal);
        assert_eq!(p.theme(), ThemeColor::Teal);
    }

    #[test]
    fn test_calendar_event_type_field() {
        let event = CalendarEvent {
            id: "c1".to_string(),
            title: "Park".to_string(),
            date: "2024-03-01".to_string(),
            kind: EventKind::Playdate,
            notes: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "playdate");
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn test_profile_camel_case() {
        let json = serde_json::to_value(profile()).unwrap();
        assert!(json.get("birthDate").is_some());
        assert!(json.get("weightAtBirth").is_some());
        assert!(json.get("themeColor").is_none());
    }
}
