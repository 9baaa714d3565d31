mod analysis;
mod build;
mod clusters;
mod load;
mod model;
mod records;

pub use analysis::NetworkInsights;
pub use build::{BuildOptions, build_network};
pub use clusters::{CLUSTER_AREA_RADIUS, Cluster, ClusterRegistry, Viewport};
pub use load::load_dataset;
pub use model::{BuildReport, Link, LinkKind, NetworkGraph, Node, NodeKind, adjacency};
pub use records::{Dataset, PartnerRecord, StaffRecord};
