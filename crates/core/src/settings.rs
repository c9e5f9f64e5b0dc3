//! Company-wide settings stamped on every migrated document.

use tallybridge_shared::config::MigrationConfig;

/// Target company and posting defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanySettings {
    /// Target company.
    pub company: String,
    /// Company abbreviation used to keep names unique.
    pub abbr: String,
    /// Cost center on every posting row and item.
    pub cost_center: String,
    /// Warehouse on invoice items.
    pub warehouse: Option<String>,
}

impl From<&MigrationConfig> for CompanySettings {
    fn from(config: &MigrationConfig) -> Self {
        Self {
            company: config.company.clone(),
            abbr: config.company_abbr.clone(),
            cost_center: config.default_cost_center.clone(),
            warehouse: config.default_warehouse.clone(),
        }
    }
}
