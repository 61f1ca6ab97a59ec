//! Point → county hit testing for pointer events.
//!
//! An R-tree over county bounding boxes narrows the candidates; exact
//! containment decides. When several counties contain the point (shared
//! borders), the first in feature order wins.

use geo::{BoundingRect, Contains, Point};
use rstar::{AABB, RTree, RTreeObject};

use crate::domain::GeoFeature;

struct CountyEnvelope {
    index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for CountyEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

pub struct CountyLocator {
    tree: RTree<CountyEnvelope>,
}

impl CountyLocator {
    pub fn new(counties: &[GeoFeature]) -> Self {
        let items = counties
            .iter()
            .enumerate()
            .filter_map(|(index, feature)| {
                let rect = feature.geometry.bounding_rect()?;
                Some(CountyEnvelope {
                    index,
                    aabb: AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
                })
            })
            .collect();
        Self {
            tree: RTree::bulk_load(items),
        }
    }

    /// The county (from the same slice passed to `new`) containing `(x, y)`.
    pub fn locate<'a>(&self, counties: &'a [GeoFeature], x: f64, y: f64) -> Option<&'a GeoFeature> {
        self.locate_index(counties, x, y).and_then(|i| counties.get(i))
    }

    /// Position in `counties` of the county containing `(x, y)`.
    pub fn locate_index(&self, counties: &[GeoFeature], x: f64, y: f64) -> Option<usize> {
        let point = Point::new(x, y);
        let envelope = AABB::from_point([x, y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|candidate| candidate.index)
            .filter(|&i| counties.get(i).is_some_and(|f| f.geometry.contains(&point)))
            .min()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
