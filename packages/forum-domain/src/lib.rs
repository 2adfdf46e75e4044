pub mod anonymous;
pub mod query;
pub mod sort;

pub type Tid = i64;
pub type Cid = i64;
pub type Pid = i64;
pub type Uid = i64;

/// Category id reserved for topics that were never filed under a real category.
pub const UNCATEGORIZED_CID: Cid = -1;

pub const MS_PER_DAY: i64 = 86_400_000;
