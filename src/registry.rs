// 📚 Rate Area Registry - ZIP → rate areas, rate area id → RateArea
//
// One registry per run. The pipeline builds it, hands it to the catalog
// loader and the resolver by reference, then drops it.

use crate::entities::{RateArea, RateAreaId};
use crate::error::SlcspError;
use crate::records::ZipRecord;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

#[derive(Debug, Default)]
pub struct RateAreaRegistry {
    rate_areas: HashMap<RateAreaId, RateArea>,

    /// A ZIP with more than one entry here is ambiguous
    zip_index: HashMap<String, BTreeSet<RateAreaId>>,
}

/// Parse a rate_area cell into the composite id
pub fn parse_rate_area_id(state: &str, rate_area: &str) -> Result<RateAreaId, SlcspError> {
    let area = rate_area
        .trim()
        .parse::<u32>()
        .map_err(|_| SlcspError::InvalidRateArea {
            state: state.trim().to_string(),
            value: rate_area.to_string(),
        })?;

    Ok(RateAreaId::new(state, area))
}

impl RateAreaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty both mappings so the registry can serve another run
    pub fn clear(&mut self) {
        self.rate_areas.clear();
        self.zip_index.clear();
    }

    // ========================================================================
    // LOADING
    // ========================================================================

    /// Record one (zipcode, state, rate_area, county) row.
    ///
    /// Duplicate or contradictory rows are never errors: collections union,
    /// and a ZIP seen under two ids is indexed under both.
    pub fn add_zip(&mut self, zipcode: &str, id: RateAreaId, county: &str) {
        let zipcode = zipcode.trim();

        let rate_area = self.get_or_create(&id);
        rate_area.add_zipcode(zipcode);
        rate_area.add_county(county.trim());

        self.zip_index
            .entry(zipcode.to_string())
            .or_default()
            .insert(id);
    }

    /// Build the registry from zips.csv rows
    pub fn load_zip_records<I>(&mut self, records: I) -> Result<usize, SlcspError>
    where
        I: IntoIterator<Item = ZipRecord>,
    {
        let mut count = 0;
        for record in records {
            let id = parse_rate_area_id(&record.state, &record.rate_area)?;
            debug!("zip {} -> {}", record.zipcode, id);
            self.add_zip(&record.zipcode, id, &record.name);
            count += 1;
        }

        Ok(count)
    }

    /// Look up a rate area, creating an empty one on first reference
    pub fn get_or_create(&mut self, id: &RateAreaId) -> &mut RateArea {
        self.rate_areas
            .entry(id.clone())
            .or_insert_with(|| RateArea::new(id.clone()))
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn get(&self, id: &RateAreaId) -> Option<&RateArea> {
        self.rate_areas.get(id)
    }

    pub fn get_mut(&mut self, id: &RateAreaId) -> Option<&mut RateArea> {
        self.rate_areas.get_mut(id)
    }

    pub fn contains(&self, id: &RateAreaId) -> bool {
        self.rate_areas.contains_key(id)
    }

    /// Rate area ids a ZIP was seen under (None if never seen)
    pub fn rate_areas_for_zip(&self, zipcode: &str) -> Option<&BTreeSet<RateAreaId>> {
        self.zip_index.get(zipcode.trim())
    }

    /// All rate area ids, sorted
    pub fn ids(&self) -> Vec<RateAreaId> {
        let mut ids: Vec<RateAreaId> = self.rate_areas.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn rate_area_count(&self) -> usize {
        self.rate_areas.len()
    }

    pub fn zip_count(&self) -> usize {
        self.zip_index.len()
    }

    pub fn ambiguous_zip_count(&self) -> usize {
        self.zip_index.values().filter(|ids| ids.len() > 1).count()
    }
}

// ============================================================================
// TESTS
// ============================================================================
