//! Version pinning for multi-request reads.
//!
//! Each response's validators replace the stored ones, and every following
//! request asks the server to refuse it if the resource moved on since. The
//! reader therefore detects a concurrent rewrite instead of stitching bytes
//! from two versions of the archive together.

use crate::io::{Preconditions, RangeResponse};

/// Default number of attempts an extraction gets before a conflict is surfaced.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Validators of the resource version the handle is pinned to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsistencyState {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

impl ConsistencyState {
    /// Conditions for the next request. The entity tag wins over the
    /// modification time when both are known.
    pub fn preconditions(&self) -> Preconditions {
        match (&self.etag, &self.last_modified) {
            (Some(etag), _) => Preconditions {
                if_match: Some(etag.clone()),
                if_unmodified_since: None,
            },
            (None, Some(since)) => Preconditions {
                if_match: None,
                if_unmodified_since: Some(since.clone()),
            },
            (None, None) => Preconditions::default(),
        }
    }

    /// Pin to the version that produced `response`.
    pub fn observe(&mut self, response: &RangeResponse) {
        self.etag = response.etag.clone();
        self.last_modified = response.last_modified.clone();
    }

    pub fn clear(&mut self) {
        self.etag = None;
        self.last_modified = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(etag: Option<&str>, last_modified: Option<&str>) -> RangeResponse {
        RangeResponse {
            data: Vec::new(),
            etag: etag.map(str::to_string),
            last_modified: last_modified.map(str::to_string),
        }
    }

    #[test]
    fn unpinned_state_sends_no_conditions() {
        assert_eq!(ConsistencyState::default().preconditions(), Preconditions::default());
    }

    #[test]
    fn entity_tag_takes_precedence() {
        let mut state = ConsistencyState::default();
        state.observe(&response(Some("\"v1\""), Some("Wed, 21 Oct 2015 07:28:00 GMT")));
        assert_eq!(
            state.preconditions(),
            Preconditions {
                if_match: Some("\"v1\"".to_string()),
                if_unmodified_since: None,
            }
        );
    }

    #[test]
    fn falls_back_to_modification_time() {
        let mut state = ConsistencyState::default();
        state.observe(&response(None, Some("Wed, 21 Oct 2015 07:28:00 GMT")));
        assert_eq!(
            state.preconditions().if_unmodified_since.as_deref(),
            Some("Wed, 21 Oct 2015 07:28:00 GMT")
        );
        assert_eq!(state.preconditions().if_match, None);
    }

    #[test]
    fn latest_response_replaces_validators() {
        let mut state = ConsistencyState::default();
        state.observe(&response(Some("\"v1\""), None));
        state.observe(&response(None, Some("yesterday")));
        assert_eq!(state.etag, None);
        assert_eq!(state.last_modified.as_deref(), Some("yesterday"));

        state.clear();
        assert_eq!(state, ConsistencyState::default());
    }
}
