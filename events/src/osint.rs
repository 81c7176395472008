//! OSINT intelligence reports delivered through the webhook stream.
//!
//! Reports arrive from an untrusted source and are frequently partial while
//! reconnaissance is still running. [`coerce`] is the one place where their
//! shape is checked: everything downstream works with a fully populated
//! [`IntelligenceReport`].

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Company name used when a payload carries none.
pub const UNKNOWN_COMPANY: &str = "Unknown";

/// Completion percentage at which reconnaissance is considered finished.
pub const COMPLETE_PERCENTAGE: f64 = 100.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub name: String,
    pub domain: String,
    pub industry: String,
    pub founded: String,
    pub headquarters: String,
    pub employee_count: String,
    pub revenue: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechStackCategory {
    pub category: String,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialMediaProfile {
    pub platform: String,
    pub handle: String,
    pub followers: String,
    pub last_active: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPerson {
    pub name: String,
    pub role: String,
    pub email: String,
    pub linkedin: String,
    /// Usually `high`, `medium` or `low`, but any label is kept.
    pub risk_level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Usually `critical`, `high`, `medium` or `low`, but any label is kept.
    pub severity: String,
    pub description: String,
    pub exploitability: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackVector {
    pub id: String,
    pub name: String,
    pub channel: String,
    pub success_rate: f64,
    pub description: String,
}

const PERCENTAGE_KEY: &str = "osintCompletionPercentage";
const PROFILE_KEY: &str = "companyProfile";
const TECH_STACK_KEY: &str = "techStack";
const SOCIAL_MEDIA_KEY: &str = "socialMedia";
const KEY_PERSONNEL_KEY: &str = "keyPersonnel";
const VULNERABILITIES_KEY: &str = "vulnerabilities";
const ATTACK_VECTORS_KEY: &str = "attackVectors";

const SECTION_KEYS: [&str; 7] = [
    PERCENTAGE_KEY,
    PROFILE_KEY,
    TECH_STACK_KEY,
    SOCIAL_MEDIA_KEY,
    KEY_PERSONNEL_KEY,
    VULNERABILITIES_KEY,
    ATTACK_VECTORS_KEY,
];

const PROFILE_FIELD_KEYS: [&str; 8] = [
    "name",
    "domain",
    "industry",
    "founded",
    "headquarters",
    "employeeCount",
    "revenue",
    "description",
];

/// Keys the source payload actually carried. Coercion fills in everything
/// else, so this is the only record of what a partial update contained.
#[derive(Debug, Clone, Default, PartialEq)]
struct Provided {
    sections: BTreeSet<&'static str>,
    profile: BTreeSet<&'static str>,
}

impl Provided {
    fn from_payload(obj: &Map<String, Value>, profile: &Map<String, Value>) -> Self {
        Self {
            sections: present_keys(obj, &SECTION_KEYS),
            profile: present_keys(profile, &PROFILE_FIELD_KEYS),
        }
    }

    fn section(&self, key: &str) -> bool {
        self.sections.contains(key)
    }

    fn profile_field(&self, key: &str) -> bool {
        self.profile.contains(key)
    }
}

/// A fully populated OSINT report about one target company.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelligenceReport {
    pub osint_completion_percentage: f64,
    pub company_profile: CompanyProfile,
    pub tech_stack: Vec<TechStackCategory>,
    pub social_media: Vec<SocialMediaProfile>,
    pub key_personnel: Vec<KeyPerson>,
    pub vulnerabilities: Vec<Vulnerability>,
    pub attack_vectors: Vec<AttackVector>,
    #[serde(skip)]
    provided: Provided,
}

impl IntelligenceReport {
    pub fn company_name(&self) -> &str {
        &self.company_profile.name
    }

    /// True once reconnaissance has reached 100%.
    pub fn is_complete(&self) -> bool {
        self.osint_completion_percentage == COMPLETE_PERCENTAGE
    }

    /// Applies a newer report about the same company on top of this one.
    ///
    /// Sections and profile fields the newer payload carried replace the
    /// stored ones, even when empty. Everything it left out is kept.
    pub fn merge(&mut self, update: IntelligenceReport) {
        let IntelligenceReport {
            osint_completion_percentage,
            company_profile,
            tech_stack,
            social_media,
            key_personnel,
            vulnerabilities,
            attack_vectors,
            provided,
        } = update;

        replace_if(
            &mut self.osint_completion_percentage,
            osint_completion_percentage,
            provided.section(PERCENTAGE_KEY),
        );
        replace_if(&mut self.tech_stack, tech_stack, provided.section(TECH_STACK_KEY));
        replace_if(
            &mut self.social_media,
            social_media,
            provided.section(SOCIAL_MEDIA_KEY),
        );
        replace_if(
            &mut self.key_personnel,
            key_personnel,
            provided.section(KEY_PERSONNEL_KEY),
        );
        replace_if(
            &mut self.vulnerabilities,
            vulnerabilities,
            provided.section(VULNERABILITIES_KEY),
        );
        replace_if(
            &mut self.attack_vectors,
            attack_vectors,
            provided.section(ATTACK_VECTORS_KEY),
        );

        let profile = &mut self.company_profile;
        let given = |key: &str| provided.profile_field(key);
        replace_if(&mut profile.name, company_profile.name, given("name"));
        replace_if(&mut profile.domain, company_profile.domain, given("domain"));
        replace_if(&mut profile.industry, company_profile.industry, given("industry"));
        replace_if(&mut profile.founded, company_profile.founded, given("founded"));
        replace_if(
            &mut profile.headquarters,
            company_profile.headquarters,
            given("headquarters"),
        );
        replace_if(
            &mut profile.employee_count,
            company_profile.employee_count,
            given("employeeCount"),
        );
        replace_if(&mut profile.revenue, company_profile.revenue, given("revenue"));
        replace_if(
            &mut profile.description,
            company_profile.description,
            given("description"),
        );

        self.provided.sections.extend(provided.sections);
        self.provided.profile.extend(provided.profile);
    }
}

fn replace_if<T>(target: &mut T, value: T, present: bool) {
    if present {
        *target = value;
    }
}

fn present_keys(obj: &Map<String, Value>, keys: &[&'static str]) -> BTreeSet<&'static str> {
    keys.iter().copied().filter(|key| obj.contains_key(*key)).collect()
}

impl Default for IntelligenceReport {
    fn default() -> Self {
        coerce(&Value::Null)
    }
}

impl From<&Value> for IntelligenceReport {
    fn from(value: &Value) -> Self {
        coerce(value)
    }
}

/// Coerces any JSON value into a renderable [`IntelligenceReport`].
///
/// Missing or mistyped fields fall back to empty strings, `0` or empty lists,
/// list elements that are not objects are skipped, and entries left without
/// an identifying field are dropped. Never fails.
pub fn coerce(value: &Value) -> IntelligenceReport {
    let empty = Map::new();
    let obj = value.as_object().unwrap_or(&empty);
    let profile = obj
        .get(PROFILE_KEY)
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let company_profile = CompanyProfile {
        name: string_or(profile.get("name"), UNKNOWN_COMPANY),
        domain: string(profile.get("domain")),
        industry: string(profile.get("industry")),
        founded: string(profile.get("founded")),
        headquarters: string(profile.get("headquarters")),
        employee_count: string(profile.get("employeeCount")),
        revenue: string(profile.get("revenue")),
        description: string(profile.get("description")),
    };

    let tech_stack = records(obj.get(TECH_STACK_KEY))
        .map(|stack| TechStackCategory {
            category: string(stack.get("category")),
            technologies: strings(stack.get("technologies")),
        })
        .filter(|s| !s.category.is_empty() || !s.technologies.is_empty())
        .collect();

    let social_media = records(obj.get(SOCIAL_MEDIA_KEY))
        .map(|s| SocialMediaProfile {
            platform: string(s.get("platform")),
            handle: string(s.get("handle")),
            followers: string(s.get("followers")),
            last_active: string(s.get("lastActive")),
        })
        .filter(|s| !s.platform.is_empty() || !s.handle.is_empty())
        .collect();

    let key_personnel = records(obj.get(KEY_PERSONNEL_KEY))
        .map(|p| KeyPerson {
            name: string(p.get("name")),
            role: string(p.get("role")),
            email: string(p.get("email")),
            linkedin: string(p.get("linkedin")),
            risk_level: string(p.get("riskLevel")),
        })
        .filter(|p| !p.email.is_empty() || !p.name.is_empty())
        .collect();

    let vulnerabilities = records(obj.get(VULNERABILITIES_KEY))
        .map(|v| Vulnerability {
            id: string(v.get("id")),
            kind: string(v.get("type")),
            severity: string(v.get("severity")),
            description: string(v.get("description")),
            exploitability: number(v.get("exploitability")),
        })
        .filter(|v| !v.id.is_empty() || !v.kind.is_empty())
        .collect();

    let attack_vectors = records(obj.get(ATTACK_VECTORS_KEY))
        .map(|v| AttackVector {
            id: string(v.get("id")),
            name: string(v.get("name")),
            channel: string(v.get("channel")),
            success_rate: number(v.get("successRate")),
            description: string(v.get("description")),
        })
        .filter(|v| !v.id.is_empty() || !v.name.is_empty())
        .collect();

    IntelligenceReport {
        osint_completion_percentage: number(obj.get(PERCENTAGE_KEY)),
        company_profile,
        tech_stack,
        social_media,
        key_personnel,
        vulnerabilities,
        attack_vectors,
        provided: Provided::from_payload(obj, profile),
    }
}

fn string(value: Option<&Value>) -> String {
    string_or(value, "")
}

fn string_or(value: Option<&Value>, fallback: &str) -> String {
    value
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string()
}

fn number(value: Option<&Value>) -> f64 {
    value
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

fn strings(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Object elements of a JSON array; anything else yields nothing.
fn records(value: Option<&Value>) -> impl Iterator<Item = &Map<String, Value>> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}
