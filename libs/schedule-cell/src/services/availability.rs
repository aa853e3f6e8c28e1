use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate, NaiveTime, Weekday};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{AddSlotRequest, AppointmentType, DaySchedule, ScheduleError, TimeSlot};

/// Default working-day slots as (start hour, end hour, type).
const DEFAULT_TEMPLATE: &[(u32, u32, AppointmentType)] = &[
    (9, 10, AppointmentType::InPerson),
    (10, 11, AppointmentType::InPerson),
    (11, 12, AppointmentType::Telehealth),
    (14, 15, AppointmentType::InPerson),
    (15, 16, AppointmentType::Telehealth),
];

pub fn default_template() -> Vec<TimeSlot> {
    DEFAULT_TEMPLATE
        .iter()
        .filter_map(|&(start, end, kind)| {
            Some(TimeSlot::new(
                NaiveTime::from_hms_opt(start, 0, 0)?,
                NaiveTime::from_hms_opt(end, 0, 0)?,
                kind,
            ))
        })
        .collect()
}

impl DaySchedule {
    /// A day nobody has edited yet: weekdays work on the template, weekends are off.
    pub fn untouched(date: NaiveDate) -> Self {
        let is_working_day = !matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        Self {
            date,
            is_working_day,
            slots: if is_working_day { default_template() } else { Vec::new() },
        }
    }

    /// Flip the working flag. Going off clears every slot; coming back
    /// restores the default template.
    pub fn toggle_working_day(&mut self) {
        self.is_working_day = !self.is_working_day;
        self.slots = if self.is_working_day { default_template() } else { Vec::new() };
    }

    pub fn add_slot(
        &mut self,
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
        appointment_type: AppointmentType,
    ) -> Result<&TimeSlot, ScheduleError> {
        let (Some(start_time), Some(end_time)) = (start_time, end_time) else {
            return Err(ScheduleError::MissingTime);
        };
        if start_time >= end_time {
            return Err(ScheduleError::InvalidRange);
        }
        if !self.is_working_day {
            return Err(ScheduleError::DayOff(self.date));
        }

        // Equal starts go after existing slots.
        let index = self.slots.partition_point(|slot| slot.start_time <= start_time);
        self.slots.insert(index, TimeSlot::new(start_time, end_time, appointment_type));
        Ok(&self.slots[index])
    }

    pub fn remove_slot(&mut self, slot_id: Uuid) -> Result<TimeSlot, ScheduleError> {
        let index = self.slot_index(slot_id)?;
        Ok(self.slots.remove(index))
    }

    pub fn toggle_slot(&mut self, slot_id: Uuid) -> Result<&TimeSlot, ScheduleError> {
        let index = self.slot_index(slot_id)?;
        let slot = &mut self.slots[index];
        slot.is_available = !slot.is_available;
        Ok(&*slot)
    }

    pub fn available_slots(&self) -> impl Iterator<Item = &TimeSlot> {
        self.slots.iter().filter(|slot| slot.is_available)
    }

    fn slot_index(&self, slot_id: Uuid) -> Result<usize, ScheduleError> {
        self.slots
            .iter()
            .position(|slot| slot.id == slot_id)
            .ok_or(ScheduleError::SlotNotFound(slot_id))
    }
}

type DayKey = (String, NaiveDate);

/// Per-specialist day schedules held in memory.
#[derive(Clone, Default)]
pub struct AvailabilityStore {
    days: Arc<RwLock<HashMap<DayKey, DaySchedule>>>,
}

impl AvailabilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_day(&self, specialist_id: &str, date: NaiveDate) -> DaySchedule {
        self.days
            .read()
            .await
            .get(&(specialist_id.to_string(), date))
            .cloned()
            .unwrap_or_else(|| DaySchedule::untouched(date))
    }

    /// Seven consecutive days starting at `from`.
    pub async fn get_week(
        &self,
        specialist_id: &str,
        from: NaiveDate,
    ) -> Result<Vec<DaySchedule>, ScheduleError> {
        let dates = (0..7)
            .map(|offset| from.checked_add_days(Days::new(offset)))
            .collect::<Option<Vec<_>>>()
            .ok_or(ScheduleError::WeekOutOfRange(from))?;

        let days = self.days.read().await;
        Ok(dates
            .into_iter()
            .map(|date| {
                days.get(&(specialist_id.to_string(), date))
                    .cloned()
                    .unwrap_or_else(|| DaySchedule::untouched(date))
            })
            .collect())
    }

    pub async fn toggle_day(&self, specialist_id: &str, date: NaiveDate) -> DaySchedule {
        let mut days = self.days.write().await;
        let day = Self::entry(&mut days, specialist_id, date);
        day.toggle_working_day();
        info!(
            "Specialist {} marked {} as {}",
            specialist_id,
            date,
            if day.is_working_day { "working" } else { "off" }
        );
        day.clone()
    }

    pub async fn add_slot(
        &self,
        specialist_id: &str,
        date: NaiveDate,
        request: AddSlotRequest,
    ) -> Result<TimeSlot, ScheduleError> {
        let mut days = self.days.write().await;
        let day = Self::entry(&mut days, specialist_id, date);
        let slot = day
            .add_slot(request.start_time, request.end_time, request.appointment_type)?
            .clone();
        debug!("Added slot {} on {} for specialist {}", slot.id, date, specialist_id);
        Ok(slot)
    }

    pub async fn remove_slot(
        &self,
        specialist_id: &str,
        date: NaiveDate,
        slot_id: Uuid,
    ) -> Result<TimeSlot, ScheduleError> {
        let mut days = self.days.write().await;
        let day = Self::entry(&mut days, specialist_id, date);
        let removed = day.remove_slot(slot_id)?;
        debug!("Removed slot {} on {} for specialist {}", slot_id, date, specialist_id);
        Ok(removed)
    }

    pub async fn toggle_slot(
        &self,
        specialist_id: &str,
        date: NaiveDate,
        slot_id: Uuid,
    ) -> Result<TimeSlot, ScheduleError> {
        let mut days = self.days.write().await;
        let day = Self::entry(&mut days, specialist_id, date);
        let slot = day.toggle_slot(slot_id)?.clone();
        Ok(slot)
    }

    fn entry<'a>(
        days: &'a mut HashMap<DayKey, DaySchedule>,
        specialist_id: &str,
        date: NaiveDate,
    ) -> &'a mut DaySchedule {
        days.entry((specialist_id.to_string(), date))
            .or_insert_with(|| DaySchedule::untouched(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn saturday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 8).unwrap()
    }

    fn t(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn starts(day: &DaySchedule) -> Vec<NaiveTime> {
        day.slots.iter().map(|slot| slot.start_time).collect()
    }

    #[test]
    fn test_untouched_days() {
        let weekday = DaySchedule::untouched(monday());
        assert!(weekday.is_working_day);
        assert_eq!(weekday.slots.len(), DEFAULT_TEMPLATE.len());

        let weekend = DaySchedule::untouched(saturday());
        assert!(!weekend.is_working_day);
        assert!(weekend.slots.is_empty());
    }

    #[test]
    fn test_toggle_off_empties_and_on_restores_template() {
        let mut day = DaySchedule::untouched(monday());
        day.add_slot(Some(t(17, 0)), Some(t(18, 0)), AppointmentType::Telehealth).unwrap();

        day.toggle_working_day();
        assert!(!day.is_working_day);
        assert!(day.slots.is_empty());

        day.toggle_working_day();
        assert!(day.is_working_day);
        let template = default_template();
        assert_eq!(starts(&day), template.iter().map(|s| s.start_time).collect::<Vec<_>>());
        assert!(day.slots.iter().all(|slot| slot.is_available));
    }

    #[test]
    fn test_add_slot_keeps_start_order() {
        let mut day = DaySchedule::untouched(monday());
        day.add_slot(Some(t(12, 30)), Some(t(13, 0)), AppointmentType::InPerson).unwrap();
        day.add_slot(Some(t(8, 0)), Some(t(8, 30)), AppointmentType::InPerson).unwrap();
        day.add_slot(Some(t(16, 0)), Some(t(16, 45)), AppointmentType::Telehealth).unwrap();

        let ordered = starts(&day);
        let mut sorted = ordered.clone();
        sorted.sort();
        assert_eq!(ordered, sorted);
        assert_eq!(ordered.first(), Some(&t(8, 0)));
        assert_eq!(ordered.last(), Some(&t(16, 0)));
    }

    #[test]
    fn test_add_slot_validation() {
        let mut day = DaySchedule::untouched(monday());
        assert_matches!(day.add_slot(None, Some(t(9, 0)), AppointmentType::InPerson), Err(ScheduleError::MissingTime));
        assert_matches!(day.add_slot(Some(t(9, 0)), None, AppointmentType::InPerson), Err(ScheduleError::MissingTime));
        assert_matches!(day.add_slot(Some(t(10, 0)), Some(t(9, 0)), AppointmentType::InPerson), Err(ScheduleError::InvalidRange));

        let mut off = DaySchedule::untouched(saturday());
        assert_matches!(off.add_slot(Some(t(9, 0)), Some(t(10, 0)), AppointmentType::InPerson), Err(ScheduleError::DayOff(_)));
    }

    #[test]
    fn test_overlapping_slots_are_allowed() {
        let mut day = DaySchedule::untouched(monday());
        let before = day.slots.len();
        day.add_slot(Some(t(9, 15)), Some(t(9, 45)), AppointmentType::InPerson).unwrap();
        assert_eq!(day.slots.len(), before + 1);
    }

    #[test]
    fn test_fresh_ids() {
        let mut day = DaySchedule::untouched(monday());
        let id = day.add_slot(Some(t(18, 0)), Some(t(19, 0)), AppointmentType::InPerson).unwrap().id;
        assert_eq!(day.slots.iter().filter(|slot| slot.id == id).count(), 1);
    }

    #[test]
    fn test_remove_and_toggle_slot() {
        let mut day = DaySchedule::untouched(monday());
        let id = day.slots[0].id;

        assert!(!day.toggle_slot(id).unwrap().is_available);
        assert_eq!(day.available_slots().count(), DEFAULT_TEMPLATE.len() - 1);

        let removed = day.remove_slot(id).unwrap();
        assert_eq!(removed.id, id);
        assert_matches!(day.remove_slot(id), Err(ScheduleError::SlotNotFound(missing)) if missing == id);
    }

    #[tokio::test]
    async fn test_store_is_per_specialist() {
        let store = AvailabilityStore::new();
        store.toggle_day("7", monday()).await;

        assert!(!store.get_day("7", monday()).await.is_working_day);
        assert!(store.get_day("8", monday()).await.is_working_day);
    }

    #[tokio::test]
    async fn test_store_week_view() {
        let store = AvailabilityStore::new();
        store.toggle_day("7", saturday()).await;

        let week = store.get_week("7", monday()).await.unwrap();
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, monday());
        assert!(week[5].is_working_day);
        assert!(!week[6].is_working_day);
    }

    #[tokio::test]
    async fn test_week_past_last_date_is_rejected() {
        let store = AvailabilityStore::new();
        let from = NaiveDate::MAX - Days::new(2);

        assert_matches!(
            store.get_week("7", from).await,
            Err(ScheduleError::WeekOutOfRange(date)) if date == from
        );
    }
}
