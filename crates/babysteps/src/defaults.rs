//! Fresh-install state.
//!
//! Used whenever no usable snapshot could be loaded. The vaccine schedule and
//! the milestone list are fixed catalogs; the profile is a placeholder the
//! user edits during setup.

use chrono::{DateTime, Months, Utc};

use crate::model::{
    timestamp, BabyProfile, Gender, Milestone, MilestoneCategory, Snapshot, ThemeColor, Vaccine,
};

/// The default state, with relative dates computed from the current time.
#[must_use]
pub fn initial_snapshot() -> Snapshot {
    initial_snapshot_at(Utc::now())
}

/// The default state relative to `now`.
#[must_use]
pub fn initial_snapshot_at(now: DateTime<Utc>) -> Snapshot {
    let mut snapshot = Snapshot::with_profile(initial_profile(now));
    snapshot.vaccines = vaccine_catalog();
    snapshot.milestones = milestone_catalog(now);
    snapshot
}

fn initial_profile(now: DateTime<Utc>) -> BabyProfile {
    let birth = now.checked_sub_months(Months::new(3)).unwrap_or(now);
    BabyProfile {
        name: "Can Bebek".to_string(),
        birth_date: timestamp(birth),
        gender: Gender::Boy,
        weight_at_birth: 3.4,
        height_at_birth: 50.0,
        photo_url: None,
        is_premature: Some(false),
        gestational_weeks: Some(40),
        theme_color: Some(ThemeColor::Sky),
    }
}

/// The national vaccination schedule shipped with the app.
#[must_use]
pub fn vaccine_catalog() -> Vec<Vaccine> {
    const SCHEDULE: &[(&str, &str, u32, Option<&str>, Option<&str>)] = &[
        ("v1", "Hepatit B (1. Doz)", 0, Some("2023-10-01"), Some("Doğumda uygulanır.")),
        ("v2", "Hepatit B (2. Doz)", 1, Some("2023-11-01"), Some("1. ayın sonunda.")),
        ("v3", "BCG (Verem)", 2, Some("2023-12-01"), Some("2. ayın sonunda.")),
        ("v4", "KPA (Zatürre 1. Doz)", 2, Some("2023-12-01"), Some("Pnömokok aşısı.")),
        ("v5", "5'li Karma (1. Doz)", 2, Some("2023-12-01"), Some("DaBT-İPA-Hib")),
        ("v6", "Hepatit B (3. Doz)", 6, None, Some("6. ayın sonunda.")),
        ("v7", "KPA (Zatürre 2. Doz)", 4, None, None),
        ("v8", "5'li Karma (2. Doz)", 4, None, None),
        ("v9", "KKK (Kızamık)", 12, None, Some("1 yaş aşısı.")),
    ];

    SCHEDULE
        .iter()
        .map(|&(id, name, month_due, done, description)| Vaccine {
            id: id.to_string(),
            name: name.to_string(),
            month_due,
            completed: done.is_some(),
            date_completed: done.map(str::to_string),
            description: description.map(str::to_string),
        })
        .collect()
}

/// Developmental milestones for the first eighteen months.
#[must_use]
pub fn milestone_catalog(now: DateTime<Utc>) -> Vec<Milestone> {
    use MilestoneCategory::{Language, Motor, Social};

    const LIST: &[(&str, &str, u32, bool, MilestoneCategory)] = &[
        ("m1", "İlk Gülümseme", 1, true, Social),
        ("m2", "Başını Dik Tutma", 2, true, Motor),
        ("m3", "Ellerini Keşfetme", 3, false, Motor),
        ("m4", "Sesli Gülme", 3, false, Social),
        ("m5", "Dönme (Sırttan Karna)", 4, false, Motor),
        ("m6", "Destekli Oturma", 5, false, Motor),
        ("m7", "Katı Gıda Tadımı", 6, false, Motor),
        ("m8", "Emekleme", 8, false, Motor),
        ("m9", "İlk Kelime", 9, false, Language),
        ("m10", "Ayakta Durma", 10, false, Motor),
        ("m11", "İlk Adımlar", 12, false, Motor),
        ("m12", "Desteksiz Yürüme", 15, false, Motor),
        ("m13", "2 Kelimeli Cümle", 18, false, Language),
        ("m14", "Koşma", 18, false, Motor),
    ];

    LIST.iter()
        .map(|&(id, title, expected_month, done, category)| Milestone {
            id: id.to_string(),
            title: title.to_string(),
            expected_month,
            is_completed: done,
            date_completed: done.then(|| timestamp(now)),
            category,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    #[test]
    fn test_initial_snapshot_collections() {
        let snapshot = initial_snapshot();
        assert_eq!(snapshot.vaccines.len(), 9);
        assert_eq!(snapshot.milestones.len(), 14);
        assert!(snapshot.entries.is_empty());
        assert!(snapshot.growth_records.is_empty());
        assert!(snapshot.custom_events.is_empty());
        assert!(snapshot.medical_history.is_empty());
        assert!(snapshot.documents.is_empty());
    }

    #[test]
    fn test_birth_date_three_months_back() {
        let now = Utc.with_ymd_and_hms(2024, 6, 20, 12, 0, 0).unwrap();
        let snapshot = initial_snapshot_at(now);
        assert_eq!(snapshot.profile.birth_date, "2024-03-20T12:00:00.000Z");
    }

    #[test]
    fn test_catalog_ids_unique() {
        let vaccines: HashSet<_> = vaccine_catalog().into_iter().map(|v| v.id).collect();
        assert_eq!(vaccines.len(), 9);
        let milestones: HashSet<_> = milestone_catalog(Utc::now())
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(milestones.len(), 14);
    }

    #[test]
    fn test_completion_stamps_consistent() {
        for v in vaccine_catalog() {
            assert_eq!(v.completed, v.date_completed.is_some(), "{}", v.id);
        }
        for m in milestone_catalog(Utc::now()) {
            assert_eq!(m.is_completed, m.date_completed.is_some(), "{}", m.id);
        }
    }
}
