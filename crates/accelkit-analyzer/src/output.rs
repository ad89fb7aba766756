//! Analysis output: clusters and per-module summaries.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A maximal run of adjacent channels within one module.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cluster {
    /// Module the cluster lies in
    pub module: u32,
    /// Lowest channel of the cluster
    pub first_channel: u32,
    /// Number of hits in the cluster
    pub size: u32,
    /// Sum of calibrated hit charges
    pub charge: f32,
    /// Charge-weighted mean channel
    pub centroid: f32,
}

/// Clusters and charge of one module.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModuleSummary {
    /// Module id
    pub module: u32,
    /// Number of clusters found in the module
    pub clusters: u32,
    /// Total cluster charge
    pub charge: f64,
}

/// Everything `analyze` produces.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Output {
    /// Clusters in `(module, first_channel)` order
    pub clusters: Vec<Cluster>,
    /// One entry per module with at least one cluster, by module id
    pub modules: Vec<ModuleSummary>,
    /// Charge summed over all clusters
    pub total_charge: f64,
    /// Number of hits analysed
    pub digis: usize,
}

impl Output {
    /// Assembles an output from downloaded clusters and per-thread charge partials.
    ///
    /// Partials are summed in thread order.
    pub(crate) fn from_parts(clusters: Vec<Cluster>, partials: &[f64], digis: usize) -> Self {
        let total_charge = partials.iter().sum();
        let mut modules: Vec<ModuleSummary> = Vec::new();
        for c in &clusters {
            match modules.last_mut() {
                Some(m) if m.module == c.module => {
                    m.clusters += 1;
                    m.charge += f64::from(c.charge);
                }
                _ => modules.push(ModuleSummary {
                    module: c.module,
                    clusters: 1,
                    charge: f64::from(c.charge),
                }),
            }
        }
        Self {
            clusters,
            modules,
            total_charge,
            digis,
        }
    }

    /// Whether the analysis produced no results.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty() && self.modules.is_empty() && self.digis == 0
    }

    /// Summary of `module`, if it has clusters.
    pub fn module(&self, module: u32) -> Option<&ModuleSummary> {
        self.modules
            .binary_search_by_key(&module, |m| m.module)
            .ok()
            .map(|i| &self.modules[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cluster(module: u32, first_channel: u32, charge: f32) -> Cluster {
        Cluster {
            module,
            first_channel,
            size: 1,
            charge,
            centroid: first_channel as f32,
        }
    }

    #[test]
    fn test_module_summaries() {
        let out = Output::from_parts(
            vec![cluster(0, 1, 2.0), cluster(0, 5, 3.0), cluster(4, 0, 1.5)],
            &[4.0, 2.5],
            3,
        );
        assert_eq!(
            out.modules,
            vec![
                ModuleSummary {
                    module: 0,
                    clusters: 2,
                    charge: 5.0
                },
                ModuleSummary {
                    module: 4,
                    clusters: 1,
                    charge: 1.5
                },
            ]
        );
        assert_eq!(out.total_charge, 6.5);
        assert_eq!(out.module(4).map(|m| m.clusters), Some(1));
        assert!(out.module(1).is_none());
        assert!(!out.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_shape() {
        let out = Output::from_parts(vec![cluster(2, 8, 1.0)], &[1.0], 1);
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["clusters"][0]["first_channel"], 8);
        assert_eq!(json["modules"][0]["module"], 2);
        assert_eq!(json["digis"], 1);

        let back: Output = serde_json::from_value(json).unwrap();
        assert_eq!(back, out);
    }

    #[test]
    fn test_default_is_empty() {
        assert!(Output::default().is_empty());
        assert!(Output::from_parts(vec![], &[], 0).is_empty());
    }
}
