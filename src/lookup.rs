//! Reference data used to resolve ids in ticket rows and option panels.

use tracing::{debug, warn};

use crate::collection::{MatchRule, normalize_term};
use crate::error::Result;
use crate::remote::SupportService;
use crate::types::{Customer, EntityId, Responsible, Severity, Status, Version};

/// How many suggestions an option panel lists.
pub const OPTION_LIMIT: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct Lookups {
    pub customers: Vec<Customer>,
    /// Customers attached to the selected version (the customer options).
    pub version_customers: Vec<Customer>,
    pub responsibles: Vec<Responsible>,
    pub severities: Vec<Severity>,
    pub statuses: Vec<Status>,
    pub versions: Vec<Version>,
}

impl Lookups {
    /// Fetch every reference list concurrently.
    ///
    /// Lists load independently: a failed list is logged and left empty so
    /// ticket rows still render with blank names.
    pub async fn load(service: &dyn SupportService, version: Option<EntityId>) -> Self {
        let version_customers = async {
            match version {
                Some(id) => service.version_customers(id).await,
                None => Ok(Vec::new()),
            }
        };
        let (customers, version_customers, responsibles, severities, statuses, versions) =
            futures::join!(
                service.customers(),
                version_customers,
                service.responsibles(),
                service.severities(),
                service.statuses(),
                service.versions(),
            );

        let lookups = Self {
            customers: or_empty("customers", customers),
            version_customers: or_empty("version_customers", version_customers),
            responsibles: or_empty("responsibles", responsibles),
            severities: or_empty("severities", severities),
            statuses: or_empty("statuses", statuses),
            versions: or_empty("versions", versions),
        };
        debug!(
            customers = lookups.customers.len(),
            responsibles = lookups.responsibles.len(),
            severities = lookups.severities.len(),
            statuses = lookups.statuses.len(),
            "reference data loaded"
        );
        lookups
    }

    pub fn customer(&self, id: EntityId) -> Option<&Customer> {
        self.customers
            .iter()
            .chain(self.version_customers.iter())
            .find(|c| c.id == id)
    }

    /// Customer name, or an empty string when unknown.
    pub fn customer_name(&self, id: EntityId) -> String {
        self.customer(id).map(|c| c.name.clone()).unwrap_or_default()
    }

    pub fn responsible(&self, id: EntityId) -> Option<&Responsible> {
        self.responsibles.iter().find(|r| r.id == id)
    }

    /// "name surname", or an empty string for unassigned or unknown ids.
    pub fn responsible_name(&self, id: Option<EntityId>) -> String {
        id.and_then(|id| self.responsible(id))
            .map(Responsible::full_name)
            .unwrap_or_default()
    }

    pub fn status(&self, id: EntityId) -> Option<&Status> {
        self.statuses.iter().find(|s| s.id == id)
    }

    pub fn severity(&self, id: EntityId) -> Option<&Severity> {
        self.severities.iter().find(|s| s.id == id)
    }

    /// The severity row inquiry tickets point at.
    pub fn inquiry_severity(&self) -> Option<&Severity> {
        self.severities.iter().find(|s| s.is_inquiry())
    }

    /// Severities selectable for error tickets.
    pub fn error_severities(&self) -> impl Iterator<Item = &Severity> {
        self.severities.iter().filter(|s| !s.is_inquiry())
    }

    pub fn version(&self, id: EntityId) -> Option<&Version> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// Version customers whose name contains `term`, first [`OPTION_LIMIT`].
    pub fn search_customers(&self, term: &str) -> Vec<Customer> {
        search_customers(&self.version_customers, term, MatchRule::Contains)
    }

    /// Responsibles whose full name contains `term`, first [`OPTION_LIMIT`].
    pub fn search_responsibles(&self, term: &str) -> Vec<Responsible> {
        search_responsibles(&self.responsibles, term, MatchRule::Contains)
    }
}

fn or_empty<T>(list: &'static str, loaded: Result<Vec<T>>) -> Vec<T> {
    loaded.unwrap_or_else(|e| {
        warn!(list, error = %e, "failed to load reference list");
        Vec::new()
    })
}

/// Customers matching `term` by name under `rule`, first [`OPTION_LIMIT`].
/// A blank term lists every customer.
pub fn search_customers(customers: &[Customer], term: &str, rule: MatchRule) -> Vec<Customer> {
    match normalize_term(term) {
        None => customers.to_vec(),
        Some(needle) => customers
            .iter()
            .filter(|c| rule.matches(&c.name, &needle))
            .take(OPTION_LIMIT)
            .cloned()
            .collect(),
    }
}

/// Responsibles matching `term` by full name under `rule`, first
/// [`OPTION_LIMIT`]. A blank term lists everyone.
pub fn search_responsibles(
    responsibles: &[Responsible],
    term: &str,
    rule: MatchRule,
) -> Vec<Responsible> {
    match normalize_term(term) {
        None => responsibles.to_vec(),
        Some(needle) => responsibles
            .iter()
            .filter(|r| rule.matches(&r.full_name(), &needle))
            .take(OPTION_LIMIT)
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::fake::FakeSupport;

    fn customer(id: EntityId, name: &str) -> Customer {
        Customer {
            id,
            name: name.to_string(),
            cuit: None,
        }
    }

    fn lookups() -> Lookups {
        Lookups {
            customers: vec![customer(1, "Acme"), customer(2, "Globex")],
            version_customers: (1..=8).map(|i| customer(i, &format!("Cliente {i}"))).collect(),
            responsibles: vec![
                Responsible {
                    id: 10,
                    name: "Ana".into(),
                    surname: "Pérez".into(),
                },
                Responsible {
                    id: 11,
                    name: "Juan".into(),
                    surname: "Anaya".into(),
                },
            ],
            severities: vec![
                Severity {
                    id: 0,
                    name: "NA".into(),
                },
                Severity {
                    id: 1,
                    name: "S1".into(),
                },
            ],
            statuses: vec![Status {
                id: 1,
                name: "Abierto".into(),
            }],
            versions: vec![],
        }
    }

    #[test]
    fn test_resolves_names_by_id() {
        let l = lookups();
        assert_eq!(l.customer_name(2), "Globex");
        assert_eq!(l.customer_name(99), "");
        assert_eq!(l.responsible_name(Some(10)), "Ana Pérez");
        assert_eq!(l.responsible_name(None), "");
        assert_eq!(l.status(1).map(|s| s.name.as_str()), Some("Abierto"));
    }

    #[test]
    fn test_inquiry_and_error_severities() {
        let l = lookups();
        assert_eq!(l.inquiry_severity().map(|s| s.id), Some(0));
        assert_eq!(l.error_severities().map(|s| s.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_option_search_caps_results() {
        let l = lookups();
        assert_eq!(l.search_customers("cliente").len(), OPTION_LIMIT);
        assert_eq!(l.search_customers("").len(), 8);
        assert_eq!(
            l.search_responsibles("ana")
                .iter()
                .map(|r| r.id)
                .collect::<Vec<_>>(),
            vec![10, 11]
        );
    }

    #[test]
    fn test_prefix_search() {
        let l = lookups();
        let found = search_responsibles(&l.responsibles, "ana", MatchRule::Prefix);
        assert_eq!(found.iter().map(|r| r.id).collect::<Vec<_>>(), vec![10]);
        let none = search_customers(&l.customers, "cme", MatchRule::Prefix);
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_failed_list_is_left_empty() {
        let service = FakeSupport {
            statuses: vec![Status {
                id: 1,
                name: "Abierto".into(),
            }],
            severities: vec![Severity {
                id: 1,
                name: "S1".into(),
            }],
            customers: vec![customer(1, "Acme")],
            down: vec!["statuses", "version_customers"],
            ..Default::default()
        };
        let l = Lookups::load(&service, Some(1)).await;
        assert!(l.statuses.is_empty());
        assert!(l.version_customers.is_empty());
        assert_eq!(l.severities.len(), 1);
        assert_eq!(l.customer_name(1), "Acme");
    }
}
