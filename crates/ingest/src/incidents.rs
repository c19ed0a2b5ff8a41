/// The eleven recognised natures of incident, in catalog order.
pub const NATURES_OF_INCIDENT: [&str; 11] = [
    "Theft",
    "Staff Attack",
    "ATM Theft",
    "Raid",
    "Customer Attack",
    "Staff Abuse",
    "Bomb Threat",
    "Terrorism",
    "Suspicious Incident",
    "Intelligence",
    "Cash Loss",
];

/// Fixed list of valid incident names with case-insensitive lookup.
#[derive(Debug, Clone, Copy)]
pub struct IncidentCatalog {
    entries: &'static [&'static str],
}

impl IncidentCatalog {
    pub const fn standard() -> Self {
        Self {
            entries: &NATURES_OF_INCIDENT,
        }
    }

    pub fn entries(&self) -> &'static [&'static str] {
        self.entries
    }

    pub fn contains(&self, nature: &str) -> bool {
        self.canonical_name(nature).is_some()
    }

    /// Catalog spelling of `nature`, matched case-insensitively.
    pub fn canonical_name(&self, nature: &str) -> Option<&'static str> {
        let nature = nature.trim();
        self.entries
            .iter()
            .copied()
            .find(|entry| entry.eq_ignore_ascii_case(nature))
    }
}

impl Default for IncidentCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case_and_padding() {
        let catalog = IncidentCatalog::standard();
        assert!(catalog.contains("theft"));
        assert!(catalog.contains("  ATM THEFT "));
        assert_eq!(catalog.canonical_name("bomb threat"), Some("Bomb Threat"));
    }

    #[test]
    fn unknown_incident_rejected() {
        let catalog = IncidentCatalog::standard();
        assert!(!catalog.contains("Theft of ATM"));
        assert!(!catalog.contains(""));
        assert_eq!(catalog.entries().len(), 11);
    }
}
