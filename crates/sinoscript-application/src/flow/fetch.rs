//! Reference lists that depend on an upstream selection.

use sinoscript_core::error::PortalError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Ready,
    /// Last fetch failed; the list is empty.
    Degraded(String),
}

/// Stamp handed out when a fetch starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket<K> {
    pub generation: u64,
    pub dependency: K,
}

/// A fetched value tied to the dependency it was requested for.
///
/// Every [`begin`](Self::begin) bumps the generation. A result is applied
/// only when its ticket carries the current generation and the current
/// dependency value, so a slow response for an earlier selection can never
/// overwrite the list for the current one.
#[derive(Debug, Clone)]
pub struct DependentResource<K, T> {
    name: &'static str,
    generation: u64,
    dependency: Option<K>,
    value: T,
    status: FetchStatus,
}

impl<K: Clone + PartialEq + std::fmt::Debug, T: Default> DependentResource<K, T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            generation: 0,
            dependency: None,
            value: T::default(),
            status: FetchStatus::Idle,
        }
    }

    pub fn begin(&mut self, dependency: K) -> FetchTicket<K> {
        self.generation += 1;
        self.dependency = Some(dependency.clone());
        self.value = T::default();
        self.status = FetchStatus::Loading;
        FetchTicket {
            generation: self.generation,
            dependency,
        }
    }

    /// Drops the current value and invalidates outstanding tickets.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.dependency = None;
        self.value = T::default();
        self.status = FetchStatus::Idle;
    }

    /// Applies a finished fetch. Returns `false` when the ticket is stale.
    pub fn complete(
        &mut self,
        ticket: FetchTicket<K>,
        result: Result<T, PortalError>,
    ) -> bool {
        if ticket.generation != self.generation
            || self.dependency.as_ref() != Some(&ticket.dependency)
        {
            tracing::debug!(
                "[{}] Discarding stale response for {:?} (generation {} != {})",
                self.name,
                ticket.dependency,
                ticket.generation,
                self.generation
            );
            return false;
        }

        match result {
            Ok(value) => {
                self.value = value;
                self.status = FetchStatus::Ready;
            }
            Err(e) => {
                tracing::warn!(
                    "[{}] Fetch for {:?} failed: {}",
                    self.name,
                    ticket.dependency,
                    e
                );
                self.value = T::default();
                self.status = FetchStatus::Degraded(e.to_string());
            }
        }
        true
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn dependency(&self) -> Option<&K> {
        self.dependency.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.status, FetchStatus::Degraded(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_ticket_applies() {
        let mut texts: DependentResource<String, Vec<String>> = DependentResource::new("texts");

        let china = texts.begin("China".into());
        let vietnam = texts.begin("Vietnam".into());

        assert!(texts.complete(vietnam, Ok(vec!["Truyện Kiều".into()])));
        assert!(!texts.complete(china, Ok(vec!["Shijing".into()])));

        assert_eq!(texts.value(), &vec!["Truyện Kiều".to_string()]);
        assert_eq!(texts.status(), &FetchStatus::Ready);
    }

    #[test]
    fn test_same_dependency_older_generation_is_stale() {
        let mut texts: DependentResource<String, Vec<String>> = DependentResource::new("texts");
        let first = texts.begin("China".into());
        let second = texts.begin("China".into());

        assert!(!texts.complete(first, Ok(vec!["old".into()])));
        assert_eq!(texts.status(), &FetchStatus::Loading);
        assert!(texts.complete(second, Ok(vec!["new".into()])));
    }

    #[test]
    fn test_reset_invalidates_outstanding_ticket() {
        let mut texts: DependentResource<String, Vec<String>> = DependentResource::new("texts");
        let ticket = texts.begin("China".into());
        texts.reset();

        assert!(!texts.complete(ticket, Ok(vec!["Shijing".into()])));
        assert!(texts.value().is_empty());
        assert_eq!(texts.status(), &FetchStatus::Idle);
    }

    #[test]
    fn test_failure_empties_and_degrades() {
        let mut regions: DependentResource<(), Vec<String>> = DependentResource::new("regions");
        let ticket = regions.begin(());
        assert!(regions.complete(ticket, Err(PortalError::remote("timeout"))));
        assert!(regions.value().is_empty());
        assert!(regions.is_degraded());
    }
}
