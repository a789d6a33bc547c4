// Draft state
//
// A committed value plus the working copy being edited. States move
// Clean -> Dirty on edit and back to Clean on commit or revert.

use crate::costing::types::DraftState;

#[derive(Debug, Clone, PartialEq)]
pub struct Draft<T> {
    committed: T,
    working: T,
}

impl<T: Clone + PartialEq> Draft<T> {
    /// Start a clean draft from a committed value
    pub fn new(committed: T) -> Self {
        let working = committed.clone();
        Self { committed, working }
    }

    pub fn committed(&self) -> &T {
        &self.committed
    }

    pub fn working(&self) -> &T {
        &self.working
    }

    pub fn working_mut(&mut self) -> &mut T {
        &mut self.working
    }

    /// Replace the working copy wholesale
    pub fn set_working(&mut self, value: T) {
        self.working = value;
    }

    pub fn is_dirty(&self) -> bool {
        self.working != self.committed
    }

    pub fn state(&self) -> DraftState {
        if self.is_dirty() {
            DraftState::Dirty
        } else {
            DraftState::Clean
        }
    }

    /// Make the working copy the committed value
    pub fn commit(&mut self) {
        self.committed = self.working.clone();
    }

    /// Discard the working copy
    pub fn revert(&mut self) {
        self.working = self.committed.clone();
    }

    /// Persist the working copy through `persist`, at most once
    ///
    /// Commits on success. On failure the working copy is discarded and the
    /// error is returned.
    pub fn save_with<E, F>(&mut self, persist: F) -> Result<(), E>
    where
        F: FnOnce(&T) -> Result<(), E>,
    {
        match persist(&self.working) {
            Ok(()) => {
                self.commit();
                Ok(())
            }
            Err(e) => {
                self.revert();
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_draft_is_clean() {
        let draft = Draft::new(vec![1, 2, 3]);
        assert!(!draft.is_dirty());
        assert_eq!(draft.state(), DraftState::Clean);
        assert_eq!(draft.working(), draft.committed());
    }

    #[test]
    fn test_edit_makes_dirty() {
        let mut draft = Draft::new(vec![1, 2, 3]);
        draft.working_mut().push(4);

        assert_eq!(draft.state(), DraftState::Dirty);
        assert_eq!(draft.committed(), &vec![1, 2, 3]);
    }

    #[test]
    fn test_edit_back_to_committed_is_clean() {
        let mut draft = Draft::new(10);
        *draft.working_mut() = 11;
        *draft.working_mut() = 10;
        assert_eq!(draft.state(), DraftState::Clean);
    }

    #[test]
    fn test_commit() {
        let mut draft = Draft::new("a".to_string());
        draft.set_working("b".to_string());
        draft.commit();

        assert_eq!(draft.committed(), "b");
        assert_eq!(draft.state(), DraftState::Clean);
    }

    #[test]
    fn test_revert() {
        let mut draft = Draft::new("a".to_string());
        draft.set_working("b".to_string());
        draft.revert();

        assert_eq!(draft.working(), "a");
        assert_eq!(draft.state(), DraftState::Clean);
    }

    #[test]
    fn test_save_success_commits() {
        let mut draft = Draft::new(1);
        draft.set_working(2);

        let mut persisted = None;
        let result: Result<(), String> = draft.save_with(|value| {
            persisted = Some(*value);
            Ok(())
        });

        assert!(result.is_ok());
        assert_eq!(persisted, Some(2));
        assert_eq!(*draft.committed(), 2);
        assert!(!draft.is_dirty());
    }

    #[test]
    fn test_save_failure_reverts() {
        let mut draft = Draft::new(1);
        draft.set_working(2);

        let mut attempts = 0;
        let result = draft.save_with(|_| {
            attempts += 1;
            Err("store offline")
        });

        assert_eq!(result, Err("store offline"));
        assert_eq!(attempts, 1);
        assert_eq!(*draft.working(), 1);
        assert_eq!(*draft.committed(), 1);
    }
}
