use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A restaurant's public details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestaurantProfile {
    /// Assigned on first save when empty.
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub currency: String,
    pub logo_url: String,
    pub theme_color: String,
    pub description: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl RestaurantProfile {
    /// Returns the existing id, or one derived from the unix timestamp of `now`.
    pub fn id_or_new(&self, now: NaiveDateTime) -> String {
        if self.id.trim().is_empty() {
            now.and_utc().timestamp().to_string()
        } else {
            self.id.trim().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn new_id_from_timestamp() {
        let now = NaiveDate::from_ymd_opt(2025, 4, 23).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let p = RestaurantProfile::default();
        assert_eq!(p.id_or_new(now), "1745366400");
        let p = RestaurantProfile { id: "fok".into(), ..Default::default() };
        assert_eq!(p.id_or_new(now), "fok");
    }
}
