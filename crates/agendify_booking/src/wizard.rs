// --- File: crates/agendify_booking/src/wizard.rs ---
//! State of the public booking wizard:
//! specialty → professional → date → time → client → confirmation.
//!
//! Changing a selection clears everything downstream of it. Network work
//! (candidate dates, slots) happens outside; the wizard only keeps the
//! results that belong to its current selection.

use agendify_common::models::{Professional, SelectOption, Slot, Specialty};
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::booking::{BookingRequest, MissingField};
use crate::recurrence::RecurrenceRule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Specialty,
    Professional,
    Date,
    Time,
    Client,
    Confirmation,
}

impl WizardStep {
    fn previous(self) -> Self {
        match self {
            WizardStep::Specialty | WizardStep::Professional => WizardStep::Specialty,
            WizardStep::Date => WizardStep::Professional,
            WizardStep::Time => WizardStep::Date,
            WizardStep::Client => WizardStep::Time,
            WizardStep::Confirmation => WizardStep::Client,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("select a {0} first")]
    OutOfOrder(&'static str),
    #[error("{0} is not a working day of the selected professional")]
    DateNotOffered(NaiveDate),
    #[error("slot is not offered for the selected date")]
    SlotNotOffered,
}

#[derive(Debug, Clone, Default)]
pub struct BookingWizard {
    specialty: Option<Specialty>,
    professional: Option<Professional>,
    candidate_dates: Vec<NaiveDate>,
    date: Option<NaiveDate>,
    offered_slots: Vec<Slot>,
    slot: Option<Slot>,
    client_id: Option<Uuid>,
    notes: Option<String>,
    recurrence: Option<RecurrenceRule>,
    step: Option<WizardStep>,
}

impl BookingWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step.unwrap_or(WizardStep::Specialty)
    }

    pub fn specialty_options(specialties: &[Specialty]) -> Vec<SelectOption> {
        specialties.iter().map(SelectOption::from).collect()
    }

    pub fn professional_options(professionals: &[Professional]) -> Vec<SelectOption> {
        professionals.iter().map(SelectOption::from).collect()
    }

    pub fn select_specialty(&mut self, specialty: Specialty) {
        if self.specialty.as_ref().map(|s| s.id) != Some(specialty.id) {
            self.clear_from(WizardStep::Professional);
        }
        self.specialty = Some(specialty);
        self.step = Some(WizardStep::Professional);
    }

    /// Selects the professional together with their candidate dates.
    pub fn select_professional(
        &mut self,
        professional: Professional,
        candidate_dates: Vec<NaiveDate>,
    ) -> Result<(), WizardError> {
        if self.specialty.is_none() {
            return Err(WizardError::OutOfOrder("specialty"));
        }
        if self.professional.as_ref().map(|p| p.id) != Some(professional.id) {
            self.clear_from(WizardStep::Date);
        }
        self.professional = Some(professional);
        self.candidate_dates = candidate_dates;
        self.step = Some(WizardStep::Date);
        Ok(())
    }

    /// Replaces the candidate dates after a working-hours change. Ignored if
    /// `professional_id` is no longer selected. A selected date that is no
    /// longer offered is dropped together with its slot.
    pub fn refresh_candidate_dates(&mut self, professional_id: Uuid, dates: Vec<NaiveDate>) {
        if self.professional_id() != Some(professional_id) {
            return;
        }
        self.candidate_dates = dates;
        if let Some(date) = self.date {
            if !self.candidate_dates.contains(&date) {
                self.clear_from(WizardStep::Date);
                self.step = Some(WizardStep::Date);
            }
        }
    }

    pub fn candidate_dates(&self) -> &[NaiveDate] {
        &self.candidate_dates
    }

    pub fn select_date(&mut self, date: NaiveDate) -> Result<(), WizardError> {
        if self.professional.is_none() {
            return Err(WizardError::OutOfOrder("professional"));
        }
        if !self.candidate_dates.contains(&date) {
            return Err(WizardError::DateNotOffered(date));
        }
        if self.date != Some(date) {
            self.clear_from(WizardStep::Time);
        }
        self.date = Some(date);
        self.step = Some(WizardStep::Time);
        Ok(())
    }

    /// Slots shown for the selected date, as published by the slot board.
    pub fn show_slots(&mut self, date: NaiveDate, slots: Vec<Slot>) {
        if self.date == Some(date) {
            self.offered_slots = slots;
        }
    }

    pub fn offered_slots(&self) -> &[Slot] {
        &self.offered_slots
    }

    pub fn select_slot(&mut self, slot: Slot) -> Result<(), WizardError> {
        if self.date.is_none() {
            return Err(WizardError::OutOfOrder("date"));
        }
        if !self.offered_slots.contains(&slot) {
            return Err(WizardError::SlotNotOffered);
        }
        self.slot = Some(slot);
        self.step = Some(WizardStep::Client);
        Ok(())
    }

    pub fn select_client(&mut self, client_id: Uuid, notes: Option<String>) -> Result<(), WizardError> {
        if self.slot.is_none() {
            return Err(WizardError::OutOfOrder("time"));
        }
        self.client_id = Some(client_id);
        self.notes = notes;
        self.step = Some(WizardStep::Confirmation);
        Ok(())
    }

    pub fn set_recurrence(&mut self, recurrence: Option<RecurrenceRule>) {
        self.recurrence = recurrence;
    }

    /// Goes one step back, discarding the selection of the step being left.
    pub fn back(&mut self) {
        let current = self.step();
        let previous = current.previous();
        match current {
            WizardStep::Specialty => {}
            WizardStep::Professional => {
                self.specialty = None;
                self.clear_from(WizardStep::Professional);
            }
            WizardStep::Date => self.clear_from(WizardStep::Professional),
            WizardStep::Time => self.clear_from(WizardStep::Date),
            // Offered slots stay so another one can be picked.
            WizardStep::Client => self.slot = None,
            WizardStep::Confirmation => self.clear_from(WizardStep::Client),
        }
        self.step = Some(previous);
    }

    pub fn professional_id(&self) -> Option<Uuid> {
        self.professional.as_ref().map(|p| p.id)
    }

    pub fn request(&self) -> BookingRequest {
        BookingRequest {
            specialty_id: self.specialty.as_ref().map(|s| s.id),
            professional_id: self.professional_id(),
            calendar_id: self.professional.as_ref().map(|p| p.calendar_id),
            date: self.date,
            slot: self.slot,
            client_id: self.client_id,
            notes: self.notes.clone(),
            recurrence: self.recurrence,
        }
    }

    /// The request to submit, or what is still missing.
    pub fn confirmation(&self) -> Result<BookingRequest, Vec<MissingField>> {
        let request = self.request();
        let missing = request.missing_fields();
        if missing.is_empty() {
            Ok(request)
        } else {
            Err(missing)
        }
    }

    fn clear_from(&mut self, step: WizardStep) {
        if step <= WizardStep::Professional {
            self.professional = None;
            self.candidate_dates.clear();
        }
        if step <= WizardStep::Date {
            self.date = None;
        }
        if step <= WizardStep::Time {
            self.offered_slots.clear();
            self.slot = None;
        }
        if step <= WizardStep::Client {
            self.client_id = None;
            self.notes = None;
        }
    }
}
