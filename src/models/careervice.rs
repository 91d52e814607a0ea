use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CareerUser {
    pub id: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub profile: CareerProfile,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicCareerUser {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub profile: CareerProfile,
}

impl From<&CareerUser> for PublicCareerUser {
    fn from(user: &CareerUser) -> Self {
        PublicCareerUser {
            id: user.id.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            profile: user.profile.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CareerProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub religion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citizenship: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl CareerProfile {
    /// Overlay the fields present in `other` on top of `self`. A blank
    /// value clears the field; an absent one leaves it alone.
    pub fn merge(&mut self, other: CareerProfile) {
        fn take(slot: &mut Option<String>, value: Option<String>) {
            if let Some(v) = value {
                *slot = if v.trim().is_empty() { None } else { Some(v) };
            }
        }
        take(&mut self.alternate_email, other.alternate_email);
        take(&mut self.mobile_number, other.mobile_number);
        take(&mut self.gender, other.gender);
        take(&mut self.religion, other.religion);
        take(&mut self.nationality, other.nationality);
        take(&mut self.citizenship, other.citizenship);
        take(&mut self.qualification, other.qualification);
        take(&mut self.location, other.location);
        take(&mut self.address, other.address);
        take(&mut self.pin_code, other.pin_code);
        take(&mut self.state, other.state);
        take(&mut self.country, other.country);
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CareerSuggestion {
    pub id: String,
    pub user_id: String,
    pub level: String,
    pub interests: Vec<String>,
    pub strengths: Vec<String>,
    pub fears: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_job_type: Option<String>,
    pub ai_response: String,
    pub created_at: String,
}

/// The questionnaire a suggestion is generated from.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdviceRequest {
    pub level: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub fears: Vec<String>,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub preferred_job_type: Option<String>,
}
