//! Validation Gate (C9). See §4.9.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::blocks::types::Block;
use crate::error::{TriadError, TriadResult};
use crate::venue::VenueCandidate;

/// Drops events whose end time is not strictly in the future, in the
/// snapshot's timezone. A closed interval on the past: an event whose
/// `end_time` equals "now" is treated as expired (§8 boundary case).
pub fn drop_stale_events(venue: &mut VenueCandidate, now_utc: DateTime<Utc>, tz: Tz) {
    let now_local = now_utc.with_timezone(&tz);
    venue.events.retain(|event| match event.end_time {
        None => true,
        Some(end) => end.with_timezone(&tz) > now_local,
    });
}

/// Schema + order-contiguity check over an assembled artifact. Returns
/// the first failing rule, per §4.9's "include the first failing rule in
/// the error".
pub fn validate_artifact(blocks: &[Block]) -> TriadResult<()> {
    if blocks.is_empty() {
        return Err(TriadError::ValidationFailed("artifact has no blocks".to_string()));
    }

    let mut orders: Vec<u32> = blocks.iter().map(|b| b.order).collect();
    orders.sort_unstable();
    let expected: Vec<u32> = (1..=orders.len() as u32).collect();
    if orders != expected {
        return Err(TriadError::ValidationFailed(format!(
            "block order must be a contiguous 1..N permutation, got {orders:?}"
        )));
    }

    for block in blocks {
        block.validate()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::types::BlockVariant;
    use crate::venue::VenueEvent;
    use chrono::Duration;
    use uuid::Uuid;

    fn block(order: u32, variant: BlockVariant) -> Block {
        Block {
            id: Uuid::new_v4(),
            order,
            variant,
        }
    }

    #[test]
    fn rejects_gap_in_order() {
        let blocks = vec![
            block(1, BlockVariant::Divider),
            block(3, BlockVariant::Divider),
        ];
        assert!(validate_artifact(&blocks).is_err());
    }

    #[test]
    fn accepts_contiguous_order() {
        let blocks = vec![
            block(1, BlockVariant::Divider),
            block(2, BlockVariant::Paragraph { text: "hi".to_string() }),
        ];
        assert!(validate_artifact(&blocks).is_ok());
    }

    fn venue_with_event(end_time: Option<DateTime<Utc>>) -> VenueCandidate {
        use crate::snapshot::Coordinates;
        VenueCandidate {
            name: "V".to_string(),
            coordinates: Coordinates::new(0.0, 0.0).unwrap(),
            staging_coordinates: Coordinates::new(0.0, 0.0).unwrap(),
            category: "bar".to_string(),
            estimated_earnings: "$20-30".to_string(),
            rationale: "r".to_string(),
            events: vec![VenueEvent {
                description: "Happy hour".to_string(),
                end_time,
            }],
            drive_time_s: None,
            hours: crate::enrichment::types::BusinessHours::Unknown,
            reliability_score: None,
        }
    }

    #[test]
    fn drops_event_ending_exactly_now() {
        let now = Utc::now();
        let mut venue = venue_with_event(Some(now));
        drop_stale_events(&mut venue, now, chrono_tz::UTC);
        assert!(venue.events.is_empty());
    }

    #[test]
    fn drops_event_ended_in_the_past() {
        let now = Utc::now();
        let mut venue = venue_with_event(Some(now - Duration::hours(1)));
        drop_stale_events(&mut venue, now, chrono_tz::UTC);
        assert!(venue.events.is_empty());
    }

    #[test]
    fn keeps_event_ending_in_the_future() {
        let now = Utc::now();
        let mut venue = venue_with_event(Some(now + Duration::hours(1)));
        drop_stale_events(&mut venue, now, chrono_tz::UTC);
        assert_eq!(venue.events.len(), 1);
    }

    #[test]
    fn keeps_event_with_no_end_time() {
        let now = Utc::now();
        let mut venue = venue_with_event(None);
        drop_stale_events(&mut venue, now, chrono_tz::UTC);
        assert_eq!(venue.events.len(), 1);
    }
}
