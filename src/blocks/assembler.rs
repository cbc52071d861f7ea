//! Block Assembler (C8). See §4.8.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::blocks::types::{Block, BlockVariant, HeaderLevel};
use crate::enrichment::types::BusinessHours;
use crate::venue::VenueCandidate;

fn nfc(text: &str) -> String {
    text.nfc().collect()
}

struct OrderCounter(u32);

impl OrderCounter {
    fn next(&mut self) -> u32 {
        self.0 += 1;
        self.0
    }
}

fn header(order: u32, text: &str, level: HeaderLevel) -> Block {
    Block {
        id: Uuid::new_v4(),
        order,
        variant: BlockVariant::Header {
            text: nfc(text),
            level,
        },
    }
}

fn paragraph(order: u32, text: &str) -> Block {
    Block {
        id: Uuid::new_v4(),
        order,
        variant: BlockVariant::Paragraph { text: nfc(text) },
    }
}

fn divider(order: u32) -> Block {
    Block {
        id: Uuid::new_v4(),
        order,
        variant: BlockVariant::Divider,
    }
}

fn hours_item(hours: &BusinessHours) -> String {
    match hours {
        BusinessHours::Unknown => "Hours unknown".to_string(),
        BusinessHours::Known(days) => {
            let parts: Vec<String> = days
                .iter()
                .map(|d| match (&d.open, &d.close) {
                    (Some(o), Some(c)) => format!("{:?} {o}-{c}", d.weekday),
                    _ => format!("{:?} closed", d.weekday),
                })
                .collect();
            parts.join(", ")
        }
    }
}

fn drive_time_item(drive_time_s: Option<f64>) -> String {
    match drive_time_s {
        Some(s) => format!("Drive time: {} min", (s / 60.0).round() as i64),
        None => "Drive time unavailable".to_string(),
    }
}

/// Items for a venue's metadata list block. Returns an empty vec when
/// there is genuinely nothing to show — the caller omits the block in
/// that case (§4.9 freshness rule: "if dropping leaves an empty list
/// block, the list block itself is omitted").
fn venue_list_items(venue: &VenueCandidate) -> Vec<String> {
    let mut items = vec![hours_item(&venue.hours), drive_time_item(venue.drive_time_s)];
    if !venue.estimated_earnings.trim().is_empty() {
        items.push(format!("Earnings: {}", venue.estimated_earnings));
    }
    for event in &venue.events {
        items.push(event.description.clone());
    }
    items
}

/// Builds a `list` block from pre-filtered items, or returns `None` when
/// there is nothing left to show.
fn build_list_block(order: u32, items: Vec<String>) -> Option<Block> {
    if items.is_empty() {
        return None;
    }
    Some(Block {
        id: Uuid::new_v4(),
        order,
        variant: BlockVariant::List {
            items: items.into_iter().map(|i| nfc(&i)).collect(),
            style: Default::default(),
        },
    })
}

/// Deterministic block ordering per §4.8:
/// 1. header (narrative title)
/// 2. paragraph (Strategist narrative)
/// 3. divider
/// 4. per venue: header (level 3), paragraph (rationale), list, optional cta
/// 5. terminal divider
pub fn assemble(title: &str, narrative: &str, venues: &[VenueCandidate]) -> Vec<Block> {
    let mut counter = OrderCounter(0);
    let mut blocks = Vec::new();

    blocks.push(header(counter.next(), title, HeaderLevel::H1));
    blocks.push(paragraph(counter.next(), narrative));
    blocks.push(divider(counter.next()));

    for venue in venues {
        blocks.push(header(counter.next(), &venue.name, HeaderLevel::H3));
        blocks.push(paragraph(counter.next(), &venue.rationale));

        let items = venue_list_items(venue);
        if let Some(list_block) = build_list_block(counter.next(), items) {
            blocks.push(list_block);
        } else {
            // The order slot we reserved for this block goes unused;
            // renumber below keeps the sequence dense regardless.
            counter.0 -= 1;
        }
    }

    blocks.push(divider(counter.next()));
    renumber(blocks)
}

/// Re-assigns dense 1..N order after any blocks were conditionally
/// skipped, preserving relative sequence.
fn renumber(mut blocks: Vec<Block>) -> Vec<Block> {
    for (i, block) in blocks.iter_mut().enumerate() {
        block.order = (i + 1) as u32;
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Coordinates;

    fn venue(earnings: &str) -> VenueCandidate {
        VenueCandidate {
            name: "Stockyards Station".to_string(),
            coordinates: Coordinates::new(32.9, -97.0).unwrap(),
            staging_coordinates: Coordinates::new(32.9, -97.0).unwrap(),
            category: "entertainment".to_string(),
            estimated_earnings: earnings.to_string(),
            rationale: "High foot traffic after events".to_string(),
            events: vec![],
            drive_time_s: Some(600.0),
            hours: BusinessHours::Unknown,
            reliability_score: Some(0.7),
        }
    }

    #[test]
    fn order_is_dense_one_based() {
        let blocks = assemble("Strategy for now", "Head north.", &[venue("$20-30")]);
        let orders: Vec<u32> = blocks.iter().map(|b| b.order).collect();
        let expected: Vec<u32> = (1..=orders.len() as u32).collect();
        assert_eq!(orders, expected);
    }

    #[test]
    fn starts_with_header_then_paragraph_then_divider() {
        let blocks = assemble("Title", "Narrative", &[]);
        assert!(matches!(blocks[0].variant, BlockVariant::Header { .. }));
        assert!(matches!(blocks[1].variant, BlockVariant::Paragraph { .. }));
        assert!(matches!(blocks[2].variant, BlockVariant::Divider));
    }

    #[test]
    fn ends_with_terminal_divider() {
        let blocks = assemble("Title", "Narrative", &[venue("$10")]);
        assert!(matches!(blocks.last().unwrap().variant, BlockVariant::Divider));
    }

    #[test]
    fn omits_list_block_when_no_items() {
        assert!(build_list_block(1, vec![]).is_none());
    }

    #[test]
    fn keeps_list_block_when_items_present() {
        let block = build_list_block(1, vec!["Hours unknown".to_string()]).unwrap();
        assert!(matches!(block.variant, BlockVariant::List { .. }));
    }
}
