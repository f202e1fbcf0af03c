//! Statistics generation from the record database
//!
//! This module provides functionality for extracting and displaying
//! statistics about the harvested authors.

use crate::storage::SqliteRecordStore;
use crate::HarvestError;

/// Record statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestStatistics {
    /// Total number of stored rows
    pub total_records: u64,

    /// Number of distinct author ids
    pub distinct_authors: u64,

    /// Records with at least one phone number or public email
    pub with_contact: u64,

    /// Row counts per hashtag, largest first
    pub records_by_tag: Vec<(String, u64)>,
}

impl HarvestStatistics {
    /// Rows beyond the first for an author; non-zero only after a dedupe race
    pub fn duplicate_rows(&self) -> u64 {
        self.total_records.saturating_sub(self.distinct_authors)
    }
}

/// Loads statistics from the record store
///
/// # Arguments
///
/// * `store` - The record store to query
///
/// # Returns
///
/// * `Ok(HarvestStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - Failed to query statistics
pub fn load_statistics(store: &SqliteRecordStore) -> Result<HarvestStatistics, HarvestError> {
    Ok(HarvestStatistics {
        total_records: store.count()?,
        distinct_authors: store.count_distinct_authors()?,
        with_contact: store.count_with_contact()?,
        records_by_tag: store.count_by_tag()?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Stored records: {}", stats.total_records);
    println!("  Distinct authors: {}", stats.distinct_authors);
    println!("  Duplicate rows: {}", stats.duplicate_rows());
    println!();

    if !stats.records_by_tag.is_empty() {
        println!("Records by Hashtag:");
        for (tag, count) in &stats.records_by_tag {
            let percentage = if stats.total_records > 0 {
                (*count as f64 / stats.total_records as f64) * 100.0
            } else {
                0.0
            };
            println!("  #{}: {} ({:.1}%)", tag, count, percentage);
        }
        println!();
    }

    let contact_rate = if stats.total_records > 0 {
        (stats.with_contact as f64 / stats.total_records as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Contact Rate: {:.1}% ({} / {} records with a phone number or email)",
        contact_rate, stats.with_contact, stats.total_records
    );
}
