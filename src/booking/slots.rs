//! Business hours and the bookable slot allow-list.
//!
//! Hours are 07:00-17:30 inclusive; the bookable slots are the fixed
//! half-hour windows from 08:00 to 17:30. A time can therefore sit inside
//! business hours and still be rejected as a non-bookable slot.

/// Every half-hour window a booking may occupy, in wire form.
pub const SLOTS: [&str; 20] = [
    "08:00", "08:30", "09:00", "09:30", "10:00", "10:30", "11:00", "11:30", "12:00", "12:30",
    "13:00", "13:30", "14:00", "14:30", "15:00", "15:30", "16:00", "16:30", "17:00", "17:30",
];

pub fn is_listed_slot(slot: &str) -> bool {
    SLOTS.contains(&slot)
}

/// Parses `HH:MM`. Returns None for anything that is not a two-part
/// zero-padded 24h time.
pub fn parse_time(slot: &str) -> Option<(u32, u32)> {
    let (hour, minute) = slot.split_once(':')?;
    if hour.len() != 2 || minute.len() != 2 {
        return None;
    }
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

pub fn within_business_hours(hour: u32, minute: u32) -> bool {
    !(hour < 7 || hour > 17 || (hour == 17 && minute > 30))
}
