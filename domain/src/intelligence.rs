//! Latest OSINT report per target company.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use events::{DomainEvent, EventHandler, IntelligenceReport};
use log::*;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredReport {
    pub report: IntelligenceReport,
    pub first_seen: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// Reports keyed by company name. A newer report for the same company is
/// merged into the stored one: the sections it carries replace the old ones
/// and everything it leaves out is kept.
#[derive(Default)]
pub struct IntelligenceStore {
    reports: RwLock<HashMap<String, StoredReport>>,
}

impl IntelligenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, report: IntelligenceReport) {
        let company = report.company_name().to_string();
        let now = Utc::now();
        let mut reports = self.reports.write().await;

        debug!(
            "Storing intelligence for {company} ({}% complete)",
            report.osint_completion_percentage
        );
        match reports.get_mut(&company) {
            Some(stored) => {
                stored.report.merge(report);
                stored.last_updated = now;
            }
            None => {
                reports.insert(
                    company,
                    StoredReport {
                        report,
                        first_seen: now,
                        last_updated: now,
                    },
                );
            }
        }
        debug!("Companies with intelligence: {}", reports.len());
    }

    /// Finds the stored company matching `company`: an exact key first, then
    /// the first stored name that contains it or starts with it, ignoring case.
    pub async fn find_company(&self, company: &str) -> Option<String> {
        let reports = self.reports.read().await;
        Self::matching_key(&reports, company).map(str::to_string)
    }

    pub async fn get(&self, company: &str) -> Option<StoredReport> {
        let reports = self.reports.read().await;
        Self::matching_key(&reports, company).and_then(|key| reports.get(key).cloned())
    }

    /// The most recently updated report across all companies.
    pub async fn latest(&self) -> Option<StoredReport> {
        self.reports
            .read()
            .await
            .values()
            .max_by_key(|stored| stored.last_updated)
            .cloned()
    }

    /// Whether reconnaissance on `company` has finished.
    pub async fn is_complete(&self, company: &str) -> bool {
        self.get(company)
            .await
            .is_some_and(|stored| stored.report.is_complete())
    }

    pub async fn companies(&self) -> Vec<String> {
        let mut names: Vec<String> = self.reports.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Removes the report matching `company` (same lookup as [`Self::get`]).
    pub async fn remove(&self, company: &str) -> Option<StoredReport> {
        let mut reports = self.reports.write().await;
        let key = Self::matching_key(&reports, company)?.to_string();
        info!("Removing intelligence for {key}");
        reports.remove(&key)
    }

    pub async fn len(&self) -> usize {
        self.reports.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reports.read().await.is_empty()
    }

    fn matching_key<'a>(reports: &'a HashMap<String, StoredReport>, company: &str) -> Option<&'a str> {
        if let Some((key, _)) = reports.get_key_value(company) {
            return Some(key);
        }

        let needle = company.to_lowercase();
        let mut keys: Vec<&String> = reports.keys().collect();
        keys.sort();
        keys.into_iter()
            .find(|key| {
                let key = key.to_lowercase();
                key.contains(&needle) || key.starts_with(&needle)
            })
            .map(String::as_str)
    }
}

#[async_trait]
impl EventHandler for IntelligenceStore {
    async fn handle(&self, event: &DomainEvent) {
        if let DomainEvent::IntelligenceReport(report) = event {
            self.insert(report.clone()).await;
        }
    }
}
