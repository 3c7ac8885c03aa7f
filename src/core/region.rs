use geo::{BoundingRect, MultiPoint, Point};
use crate::models::{Candidate, Region};

/// Compute the viewport region for a set of candidates
///
/// The rectangle is the min/max of latitude and longitude across all
/// candidates. Padding is a screen-space margin the renderer applies when it
/// fits the viewport, so it is carried alongside rather than added to the
/// coordinates.
///
/// # Returns
/// `None` when there are no candidates
pub fn bounding_region(candidates: &[Candidate], padding_px: u32) -> Option<Region> {
    // geo points are (x = longitude, y = latitude)
    let points: MultiPoint<f64> = candidates
        .iter()
        .map(|c| Point::new(c.coordinate.longitude, c.coordinate.latitude))
        .collect();

    let rect = points.bounding_rect()?;

    Some(Region {
        min_lat: rect.min().y,
        max_lat: rect.max().y,
        min_lon: rect.min().x,
        max_lon: rect.max().x,
        padding_px,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, SearchQuery};

    fn at(lat: f64, lon: f64) -> Candidate {
        let center = Coordinate { latitude: lat, longitude: lon };
        Candidate {
            coordinate: center,
            name: "Place".to_string(),
            address: "Somewhere".to_string(),
            source_query: SearchQuery::category(vec![], center, 10_000, 50),
        }
    }

    #[test]
    fn test_empty_has_no_region() {
        assert!(bounding_region(&[], 50).is_none());
    }

    #[test]
    fn test_single_point_region() {
        let region = bounding_region(&[at(33.70, 73.05)], 50).unwrap();
        assert_eq!(region.min_lat, 33.70);
        assert_eq!(region.max_lat, 33.70);
        assert_eq!(region.min_lon, 73.05);
        assert_eq!(region.max_lon, 73.05);
        assert_eq!(region.padding_px, 50);
    }

    #[test]
    fn test_region_encloses_all() {
        let candidates = vec![at(33.70, 73.05), at(33.60, 73.10), at(33.65, 72.98)];
        let region = bounding_region(&candidates, 50).unwrap();

        assert_eq!(region.min_lat, 33.60);
        assert_eq!(region.max_lat, 33.70);
        assert_eq!(region.min_lon, 72.98);
        assert_eq!(region.max_lon, 73.10);

        for c in &candidates {
            assert!((region.min_lat..=region.max_lat).contains(&c.coordinate.latitude));
            assert!((region.min_lon..=region.max_lon).contains(&c.coordinate.longitude));
        }
    }
}
