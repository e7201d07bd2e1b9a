use ipmon_domain::ResolutionResult;

/// Port for the per-domain resolution cache shared by the pipeline and
/// the message router.
pub trait ResolutionCachePort: Send + Sync {
    /// Returns a fresh entry for `domain`. Local entries are only returned
    /// while `exclude_local_domains` is set.
    fn get(&self, domain: &str, exclude_local_domains: bool) -> Option<ResolutionResult>;
    fn put(&self, domain: &str, result: ResolutionResult);
    fn clear(&self);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
