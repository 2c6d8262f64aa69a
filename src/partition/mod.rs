mod contiguity;
mod district_set;
mod edge_set;
mod partition;
mod random;
mod recombine;

use district_set::DistrictSet;
use edge_set::EdgeSet;
pub(crate) use partition::Partition;
pub(crate) use recombine::BalanceBounds;
