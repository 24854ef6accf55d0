//! Publish wizard state machine.
//!
//! `Files -> Metadata -> Review -> {Publishing | SavingDraft} -> {Published | DraftSaved | Failed}`.
//! The wizard only tracks navigation and intent; the save pipeline itself runs
//! server side and its outcome is fed back through [`PublishWizard::complete`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::value_objects::{enums::asset_slots::AssetSlot, products::ProductPayload};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Files,
    Metadata,
    Review,
}

impl WizardStep {
    fn previous(self) -> Self {
        match self {
            WizardStep::Files | WizardStep::Metadata => WizardStep::Files,
            WizardStep::Review => WizardStep::Metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardState {
    Editing(WizardStep),
    Publishing { from: WizardStep },
    SavingDraft { from: WizardStep },
    Published,
    DraftSaved,
    Failed { from: WizardStep, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Publish,
    Draft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    Close,
    ConfirmExit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitChoice {
    Discard,
    SaveAndExit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("Title is required")]
    TitleRequired,
    #[error("BPM must be a positive number")]
    BpmRequired,
    #[error("Already on the last step")]
    NoNextStep,
    #[error("Publishing is only possible from the review step")]
    NotOnReview,
    #[error("The wizard is busy or closed")]
    NotEditable,
    #[error("No save in progress")]
    NotSaving,
}

#[derive(Debug, Clone)]
pub struct PublishWizard {
    state: WizardState,
    payload: ProductPayload,
    changed_slots: HashSet<AssetSlot>,
    dirty: bool,
    tutorial_seen: bool,
    closed: bool,
}

impl PublishWizard {
    pub fn new(tutorial_seen: bool) -> Self {
        Self::edit(ProductPayload::default(), tutorial_seen)
    }

    /// Opens the wizard on an existing product (or draft).
    pub fn edit(payload: ProductPayload, tutorial_seen: bool) -> Self {
        Self {
            state: WizardState::Editing(WizardStep::Files),
            payload,
            changed_slots: HashSet::new(),
            dirty: false,
            tutorial_seen,
            closed: false,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn step(&self) -> Option<WizardStep> {
        match self.state {
            WizardState::Editing(step) => Some(step),
            _ => None,
        }
    }

    pub fn payload(&self) -> &ProductPayload {
        &self.payload
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn should_show_tutorial(&self) -> bool {
        !self.tutorial_seen
    }

    /// Returns `true` when the persisted flag has to be written.
    pub fn dismiss_tutorial(&mut self) -> bool {
        let first_time = !self.tutorial_seen;
        self.tutorial_seen = true;
        first_time
    }

    pub fn update<F>(&mut self, change: F) -> Result<(), WizardError>
    where
        F: FnOnce(&mut ProductPayload),
    {
        self.ensure_editing()?;
        change(&mut self.payload);
        self.dirty = true;
        Ok(())
    }

    pub fn attach_file(&mut self, slot: AssetSlot) -> Result<(), WizardError> {
        self.ensure_editing()?;
        self.changed_slots.insert(slot);
        self.dirty = true;
        Ok(())
    }

    /// Slots with a newly selected file, in upload order.
    pub fn changed_slots(&self) -> Vec<AssetSlot> {
        AssetSlot::ALL
            .into_iter()
            .filter(|slot| self.changed_slots.contains(slot))
            .collect()
    }

    /// Files are not checked when leaving the first step.
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        let step = self.ensure_editing()?;
        let next = match step {
            WizardStep::Files => {
                if self.payload.name.trim().is_empty() {
                    return Err(WizardError::TitleRequired);
                }
                WizardStep::Metadata
            }
            WizardStep::Metadata => {
                if !matches!(self.payload.bpm, Some(bpm) if bpm > 0) {
                    return Err(WizardError::BpmRequired);
                }
                WizardStep::Review
            }
            WizardStep::Review => return Err(WizardError::NoNextStep),
        };
        self.state = WizardState::Editing(next);
        Ok(next)
    }

    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        let previous = self.ensure_editing()?.previous();
        self.state = WizardState::Editing(previous);
        Ok(previous)
    }

    pub fn publish(&mut self) -> Result<SaveMode, WizardError> {
        match self.ensure_editing()? {
            WizardStep::Review => {
                self.state = WizardState::Publishing {
                    from: WizardStep::Review,
                };
                Ok(SaveMode::Publish)
            }
            _ => Err(WizardError::NotOnReview),
        }
    }

    pub fn save_draft(&mut self) -> Result<SaveMode, WizardError> {
        let from = self.ensure_editing()?;
        self.state = WizardState::SavingDraft { from };
        Ok(SaveMode::Draft)
    }

    pub fn needs_leave_confirmation(&self) -> bool {
        self.dirty && matches!(self.state, WizardState::Editing(_) | WizardState::Failed { .. })
    }

    pub fn request_close(&mut self) -> Result<CloseDecision, WizardError> {
        match self.state {
            WizardState::Publishing { .. } | WizardState::SavingDraft { .. } => {
                Err(WizardError::NotEditable)
            }
            _ if self.needs_leave_confirmation() => Ok(CloseDecision::ConfirmExit),
            _ => {
                self.closed = true;
                Ok(CloseDecision::Close)
            }
        }
    }

    /// Answer to the "exit without saving?" dialog.
    pub fn confirm_exit(&mut self, choice: ExitChoice) -> Result<Option<SaveMode>, WizardError> {
        match choice {
            ExitChoice::Discard => {
                self.closed = true;
                Ok(None)
            }
            ExitChoice::SaveAndExit => {
                if let WizardState::Failed { from, .. } = self.state {
                    self.state = WizardState::Editing(from);
                }
                self.save_draft().map(Some)
            }
        }
    }

    /// Feeds the save pipeline outcome back into the wizard.
    pub fn complete(&mut self, outcome: Result<(), String>) -> Result<&WizardState, WizardError> {
        let (from, done) = match self.state {
            WizardState::Publishing { from } => (from, WizardState::Published),
            WizardState::SavingDraft { from } => (from, WizardState::DraftSaved),
            _ => return Err(WizardError::NotSaving),
        };

        self.state = match outcome {
            Ok(()) => {
                self.dirty = false;
                self.changed_slots.clear();
                done
            }
            Err(message) => WizardState::Failed { from, message },
        };
        Ok(&self.state)
    }

    /// Returns to the step the failed save started from.
    pub fn dismiss_error(&mut self) -> Option<WizardStep> {
        match self.state {
            WizardState::Failed { from, .. } => {
                self.state = WizardState::Editing(from);
                Some(from)
            }
            _ => None,
        }
    }

    fn ensure_editing(&self) -> Result<WizardStep, WizardError> {
        if self.closed {
            return Err(WizardError::NotEditable);
        }
        match self.state {
            WizardState::Editing(step) => Ok(step),
            _ => Err(WizardError::NotEditable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(name: &str) -> PublishWizard {
        let mut wizard = PublishWizard::new(true);
        wizard.update(|payload| payload.name = name.to_string()).unwrap();
        wizard
    }

    #[test]
    fn empty_title_blocks_first_step() {
        let mut wizard = titled("   ");
        assert_eq!(wizard.next(), Err(WizardError::TitleRequired));
        assert_eq!(wizard.step(), Some(WizardStep::Files));
    }

    #[test]
    fn title_alone_passes_first_step_without_files() {
        let mut wizard = titled("Night Drive");
        assert!(wizard.changed_slots().is_empty());
        assert_eq!(wizard.next(), Ok(WizardStep::Metadata));
    }

    #[test]
    fn bpm_gates_review_and_back_is_always_allowed() {
        let mut wizard = titled("Night Drive");
        wizard.next().unwrap();
        assert_eq!(wizard.next(), Err(WizardError::BpmRequired));

        wizard.update(|payload| payload.bpm = Some(140)).unwrap();
        assert_eq!(wizard.next(), Ok(WizardStep::Review));
        assert_eq!(wizard.back(), Ok(WizardStep::Metadata));
        assert_eq!(wizard.back(), Ok(WizardStep::Files));
        assert_eq!(wizard.back(), Ok(WizardStep::Files));
    }

    #[test]
    fn publish_only_from_review() {
        let mut wizard = titled("Night Drive");
        assert_eq!(wizard.publish(), Err(WizardError::NotOnReview));

        wizard.update(|payload| payload.bpm = Some(90)).unwrap();
        wizard.next().unwrap();
        wizard.next().unwrap();
        assert_eq!(wizard.publish(), Ok(SaveMode::Publish));
        assert_eq!(wizard.next(), Err(WizardError::NotEditable));

        assert_eq!(wizard.complete(Ok(())), Ok(&WizardState::Published));
        assert!(!wizard.is_dirty());
    }

    #[test]
    fn failed_save_returns_to_prior_step() {
        let mut wizard = titled("Night Drive");
        wizard.next().unwrap();
        assert_eq!(wizard.save_draft(), Ok(SaveMode::Draft));

        let state = wizard.complete(Err("bucket not found".to_string())).unwrap().clone();
        assert_eq!(
            state,
            WizardState::Failed {
                from: WizardStep::Metadata,
                message: "bucket not found".to_string()
            }
        );
        assert!(wizard.is_dirty());
        assert_eq!(wizard.dismiss_error(), Some(WizardStep::Metadata));
        assert_eq!(wizard.save_draft(), Ok(SaveMode::Draft));
        assert_eq!(wizard.complete(Ok(())), Ok(&WizardState::DraftSaved));
    }

    #[test]
    fn closing_a_dirty_wizard_asks_first() {
        let mut clean = PublishWizard::new(true);
        assert_eq!(clean.request_close(), Ok(CloseDecision::Close));
        assert!(clean.is_closed());

        let mut dirty = PublishWizard::new(true);
        dirty.attach_file(AssetSlot::Mp3).unwrap();
        assert!(dirty.needs_leave_confirmation());
        assert_eq!(dirty.request_close(), Ok(CloseDecision::ConfirmExit));
        assert_eq!(dirty.confirm_exit(ExitChoice::SaveAndExit), Ok(Some(SaveMode::Draft)));
        assert_eq!(dirty.request_close(), Err(WizardError::NotEditable));

        let mut discarded = PublishWizard::new(true);
        discarded.attach_file(AssetSlot::Cover).unwrap();
        assert_eq!(discarded.confirm_exit(ExitChoice::Discard), Ok(None));
        assert!(discarded.is_closed());
        assert_eq!(discarded.next(), Err(WizardError::NotEditable));
    }

    #[test]
    fn changed_slots_follow_upload_order() {
        let mut wizard = PublishWizard::new(true);
        wizard.attach_file(AssetSlot::Stems).unwrap();
        wizard.attach_file(AssetSlot::Cover).unwrap();
        wizard.attach_file(AssetSlot::Mp3).unwrap();

        assert_eq!(
            wizard.changed_slots(),
            vec![AssetSlot::Cover, AssetSlot::Mp3, AssetSlot::Stems]
        );
    }

    #[test]
    fn tutorial_is_shown_once() {
        let mut wizard = PublishWizard::new(false);
        assert!(wizard.should_show_tutorial());
        assert!(wizard.dismiss_tutorial());
        assert!(!wizard.should_show_tutorial());
        assert!(!wizard.dismiss_tutorial());
    }
}
