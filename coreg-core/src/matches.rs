use crate::ControlPoint;

/// A master/slave control point correspondence.
///
/// The first element is the observation in the master raster, the second the
/// matching observation in the slave raster.
#[derive(Debug, Clone, PartialEq)]
pub struct GcpMatch(pub ControlPoint, pub ControlPoint);

impl GcpMatch {
    pub fn master(&self) -> &ControlPoint {
        &self.0
    }

    pub fn slave(&self) -> &ControlPoint {
        &self.1
    }
}

/// Joins a master and a slave control point set by point name.
///
/// Iteration order follows the slave set; slave points with no master point
/// of the same name are dropped. This is how correspondences are formed from
/// independently recorded per-raster GCP lists before a registration run.
pub fn pair_control_points(master: &[ControlPoint], slave: &[ControlPoint]) -> Vec<GcpMatch> {
    slave
        .iter()
        .filter_map(|s| {
            master
                .iter()
                .find(|m| m.name == s.name)
                .map(|m| GcpMatch(m.clone(), s.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_by_name_in_slave_order() {
        let master = vec![
            ControlPoint::new("a", 1.0, 2.0),
            ControlPoint::new("b", 3.0, 4.0),
        ];
        let slave = vec![
            ControlPoint::new("b", 3.5, 4.5),
            ControlPoint::new("c", 9.0, 9.0),
            ControlPoint::new("a", 1.5, 2.5),
        ];
        let matches = pair_control_points(&master, &slave);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].master().name, "b");
        assert_eq!(matches[0].slave().x(), 3.5);
        assert_eq!(matches[1].master().name, "a");
    }
}
