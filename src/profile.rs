use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::document::OrganizationContext;
use crate::parser::sports::classify_sports;
use crate::parser::ContactRecord;

static ROLE_FALLBACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(Head Coach|Assistant Coach|Defensive Coordinator|[A-Za-z\s]+Coach)").unwrap()
});

/// Unclaimed coach profile in the shape the claiming/search backend expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachProfile {
    pub username: String,
    pub display_name: String,
    pub email: Option<String>,
    pub bio: String,
    pub sports: Vec<String>,
    pub certifications: Vec<String>,
    pub hourly_rate: u32,
    pub location: String,
    pub availability: Vec<String>,
    pub specialties: Vec<String>,
    pub languages: Vec<String>,
    pub organization: String,
    pub university: String,
    pub role: String,
    pub gender: String,
    pub age_group: Vec<String>,
    pub source_url: String,
    pub average_rating: u32,
    pub total_reviews: u32,
    pub is_verified: bool,
    pub is_public: bool,
    pub has_active_services: bool,
    pub profile_image: String,
    pub website: String,
    pub social_media: SocialMedia,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub profile_completed: bool,
    pub is_claimed: bool,
    pub user_id: Option<String>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub verification_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialMedia {
    pub instagram: String,
    pub twitter: String,
    pub linkedin: String,
}

/// Build an unclaimed profile from one record plus the document's
/// organization context.
pub fn map_to_profile(record: &ContactRecord, org: &OrganizationContext) -> CoachProfile {
    let sports = classify_sports(record, org.default_sport());

    let role = if !record.title.trim().is_empty() {
        record.title.trim().to_string()
    } else if record.full_line.to_lowercase().contains("coach") {
        ROLE_FALLBACK_RE
            .captures(&record.full_line)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_else(|| "Coach".to_string())
    } else {
        "Coach".to_string()
    };

    let location = if !org.state.is_empty() {
        org.state.clone()
    } else if !org.location.is_empty() {
        org.location.clone()
    } else {
        "New Jersey".to_string()
    };
    let organization = if org.organization.is_empty() {
        "University Athletics".to_string()
    } else {
        org.organization.clone()
    };
    let source_url = if org.source.is_empty() {
        "University Athletics Directory".to_string()
    } else {
        org.source.clone()
    };

    let now = Utc::now();
    CoachProfile {
        username: record.username.clone(),
        display_name: record.display_name(),
        email: record.email.clone(),
        bio: format!(
            "Experienced {} specializing in {}.",
            role.to_lowercase(),
            sports.join(", ").to_lowercase()
        ),
        certifications: Vec::new(),
        hourly_rate: 0,
        location,
        availability: ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
            .iter()
            .map(|d| d.to_string())
            .collect(),
        specialties: sports.clone(),
        sports,
        languages: vec!["English".to_string()],
        organization,
        university: org.university.clone(),
        role,
        gender: String::new(),
        age_group: ["Adult", "Teen", "Youth"].iter().map(|g| g.to_string()).collect(),
        source_url,
        average_rating: 0,
        total_reviews: 0,
        is_verified: false,
        is_public: true,
        has_active_services: false,
        profile_image: String::new(),
        website: String::new(),
        social_media: SocialMedia::default(),
        created_at: now,
        updated_at: now,
        profile_completed: false,
        is_claimed: false,
        user_id: None,
        claimed_at: None,
        verification_status: "pending".to_string(),
        phone_number: record.phone.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ContactRecord {
        ContactRecord {
            first_name: "John".into(),
            last_name: "Smith".into(),
            email: Some("jsmith@rowan.edu".into()),
            username: "jsmith".into(),
            phone: Some("(856) 256-4687".into()),
            title: "Head Men's Soccer Coach".into(),
            sport_section: None,
            full_line: "John Smith Head Men's Soccer Coach jsmith@rowan.edu".into(),
            uploadable: true,
        }
    }

    fn org() -> OrganizationContext {
        OrganizationContext {
            university: "Rowan".into(),
            organization: "Rowan University Athletics".into(),
            location: "Glassboro, New Jersey".into(),
            source: "Rowan University Athletics Staff Directory".into(),
            state: "New Jersey".into(),
        }
    }

    #[test]
    fn maps_core_fields() {
        let profile = map_to_profile(&record(), &org());
        assert_eq!(profile.username, "jsmith");
        assert_eq!(profile.display_name, "John Smith");
        assert_eq!(profile.role, "Head Men's Soccer Coach");
        assert_eq!(profile.sports, vec!["Soccer"]);
        assert_eq!(profile.location, "New Jersey");
        assert!(!profile.is_claimed);
        assert_eq!(profile.phone_number.as_deref(), Some("(856) 256-4687"));
    }

    #[test]
    fn bio_mentions_role_and_sports() {
        let profile = map_to_profile(&record(), &org());
        assert_eq!(
            profile.bio,
            "Experienced head men's soccer coach specializing in soccer."
        );
    }

    #[test]
    fn role_falls_back_to_line_scan() {
        let mut r = record();
        r.title = String::new();
        r.full_line = "Assistant Coach jdoe@school.edu".into();
        let profile = map_to_profile(&r, &org());
        assert_eq!(profile.role, "Assistant Coach");
    }

    #[test]
    fn serializes_camel_case() {
        let profile = map_to_profile(&record(), &org());
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("displayName").is_some());
        assert!(json.get("isClaimed").is_some());
        assert!(json.get("verificationStatus").is_some());
        assert!(json.get("display_name").is_none());
    }
}
