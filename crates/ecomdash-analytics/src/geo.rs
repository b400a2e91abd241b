//! Customer to geolocation join and per-city customer distribution.

use ecomdash_common::{Coordinate, CoordinateStrategy, CustomerRecord, GeolocationRecord, ZipPrefix};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, instrument};

/// One representative coordinate per zip prefix.
#[derive(Debug, Clone, Default)]
pub struct GeoIndex {
    by_zip: HashMap<ZipPrefix, Coordinate>,
}

impl GeoIndex {
    pub fn build(samples: &[GeolocationRecord], strategy: CoordinateStrategy) -> Self {
        let by_zip = match strategy {
            CoordinateStrategy::FirstSample => {
                let mut by_zip = HashMap::new();
                for sample in samples {
                    by_zip
                        .entry(sample.zip_prefix.clone())
                        .or_insert(sample.coordinate);
                }
                by_zip
            }
            CoordinateStrategy::Centroid => {
                let mut grouped: HashMap<&ZipPrefix, Vec<Coordinate>> = HashMap::new();
                for sample in samples {
                    grouped.entry(&sample.zip_prefix).or_default().push(sample.coordinate);
                }
                grouped
                    .into_iter()
                    .filter_map(|(zip, points)| {
                        Coordinate::centroid(&points).map(|c| (zip.clone(), c))
                    })
                    .collect()
            }
        };

        debug!(%strategy, zips = by_zip.len(), samples = samples.len(), "Built geolocation index");
        Self { by_zip }
    }

    pub fn lookup(&self, zip: &ZipPrefix) -> Option<Coordinate> {
        self.by_zip.get(zip).copied()
    }

    pub fn len(&self) -> usize {
        self.by_zip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_zip.is_empty()
    }
}

/// A customer with the coordinate of its zip prefix, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedCustomer<'a> {
    pub customer: &'a CustomerRecord,
    pub coordinate: Option<Coordinate>,
}

/// Left join: every customer appears exactly once, unmatched ones with no
/// coordinate.
pub fn left_join<'a>(customers: &'a [CustomerRecord], index: &GeoIndex) -> Vec<JoinedCustomer<'a>> {
    customers
        .iter()
        .map(|customer| JoinedCustomer {
            customer,
            coordinate: index.lookup(&customer.zip_prefix),
        })
        .collect()
}

/// Customer distribution entry for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityCustomers {
    pub city: String,
    /// Distinct `customer_unique_id` values
    pub customers: u64,
    /// Zip prefix that supplied `coordinate`
    pub zip_prefix: Option<ZipPrefix>,
    pub coordinate: Option<Coordinate>,
}

#[derive(Default)]
struct CityAccumulator<'a> {
    unique_ids: HashSet<&'a str>,
    representative: Option<(&'a ZipPrefix, Coordinate)>,
}

/// One row per city, sorted by city name.
///
/// The city's coordinate comes from the smallest matched zip prefix among
/// its customers; a city without any match keeps `None`.
pub fn customers_by_city(joined: &[JoinedCustomer<'_>]) -> Vec<CityCustomers> {
    let mut cities: BTreeMap<&str, CityAccumulator<'_>> = BTreeMap::new();

    for row in joined {
        let acc = cities.entry(row.customer.city.as_str()).or_default();
        acc.unique_ids.insert(row.customer.customer_unique_id.as_str());

        if let Some(coordinate) = row.coordinate {
            let zip = &row.customer.zip_prefix;
            let replace = acc
                .representative
                .map_or(true, |(current, _)| zip.as_str() < current.as_str());
            if replace {
                acc.representative = Some((zip, coordinate));
            }
        }
    }

    cities
        .into_iter()
        .map(|(city, acc)| CityCustomers {
            city: city.to_string(),
            customers: acc.unique_ids.len() as u64,
            zip_prefix: acc.representative.map(|(zip, _)| zip.clone()),
            coordinate: acc.representative.map(|(_, c)| c),
        })
        .collect()
}

/// Joins customers to geolocation samples with a fixed coordinate strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoJoiner {
    pub strategy: CoordinateStrategy,
}

impl GeoJoiner {
    pub fn new(strategy: CoordinateStrategy) -> Self {
        Self { strategy }
    }

    #[instrument(skip_all, fields(customers = customers.len(), samples = samples.len()))]
    pub fn distribution(
        &self,
        customers: &[CustomerRecord],
        samples: &[GeolocationRecord],
    ) -> Vec<CityCustomers> {
        let index = GeoIndex::build(samples, self.strategy);
        let joined = left_join(customers, &index);
        let unmatched = joined.iter().filter(|row| row.coordinate.is_none()).count();

        let cities = customers_by_city(&joined);
        debug!(
            cities = cities.len(),
            unmatched, "Aggregated customer distribution by city"
        );
        cities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(id: &str, unique: &str, zip: &str, city: &str) -> CustomerRecord {
        CustomerRecord {
            customer_id: id.to_string(),
            customer_unique_id: unique.to_string(),
            zip_prefix: ZipPrefix::parse(zip).unwrap(),
            city: city.to_string(),
            state: None,
        }
    }

    fn sample(zip: &str, lat: f64, lng: f64) -> GeolocationRecord {
        GeolocationRecord {
            zip_prefix: ZipPrefix::parse(zip).unwrap(),
            coordinate: Coordinate::new(lat, lng),
            city: None,
            state: None,
        }
    }

    fn samples() -> Vec<GeolocationRecord> {
        vec![
            sample("2000", -10.0, -40.0),
            sample("1500", -12.0, -42.0),
            sample("1500", -14.0, -44.0),
        ]
    }

    #[test]
    fn test_first_sample_strategy() {
        let index = GeoIndex::build(&samples(), CoordinateStrategy::FirstSample);
        let zip = ZipPrefix::parse("1500").unwrap();
        assert_eq!(index.lookup(&zip), Some(Coordinate::new(-12.0, -42.0)));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_centroid_strategy() {
        let index = GeoIndex::build(&samples(), CoordinateStrategy::Centroid);
        let zip = ZipPrefix::parse("1500").unwrap();
        assert_eq!(index.lookup(&zip), Some(Coordinate::new(-13.0, -43.0)));
    }

    #[test]
    fn test_left_join_keeps_unmatched_customer() {
        let customers = vec![customer("c1", "u1", "1000", "nowhere")];
        let index = GeoIndex::build(&samples(), CoordinateStrategy::FirstSample);

        let joined = left_join(&customers, &index);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].customer.customer_id, "c1");
        assert!(joined[0].coordinate.is_none());
    }

    #[test]
    fn test_left_join_does_not_multiply_rows() {
        let customers = vec![customer("c1", "u1", "1500", "campinas")];
        let index = GeoIndex::build(&samples(), CoordinateStrategy::FirstSample);

        assert_eq!(left_join(&customers, &index).len(), 1);
    }

    #[test]
    fn test_city_uses_smallest_matched_zip() {
        let customers = vec![
            customer("c1", "u1", "2000", "campinas"),
            customer("c2", "u2", "1500", "campinas"),
            customer("c3", "u2", "0999", "campinas"),
        ];
        let distribution = GeoJoiner::default().distribution(&customers, &samples());

        assert_eq!(distribution.len(), 1);
        let city = &distribution[0];
        assert_eq!(city.customers, 2);
        assert_eq!(city.zip_prefix.as_ref().map(ZipPrefix::as_str), Some("1500"));
        assert_eq!(city.coordinate, Some(Coordinate::new(-12.0, -42.0)));
    }

    #[test]
    fn test_cities_are_sorted_and_unmatched_kept() {
        let customers = vec![
            customer("c1", "u1", "2000", "sorocaba"),
            customer("c2", "u2", "1000", "atibaia"),
        ];
        let distribution = GeoJoiner::default().distribution(&customers, &samples());

        let names: Vec<_> = distribution.iter().map(|c| c.city.as_str()).collect();
        assert_eq!(names, vec!["atibaia", "sorocaba"]);
        assert_eq!(distribution[0].coordinate, None);
        assert_eq!(distribution[0].customers, 1);
    }
}
